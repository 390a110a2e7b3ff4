//! Offline settlement balance simulator CLI.
//!
//! Runs Monte Carlo settlements through the same pipeline the service uses.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                          # 1000 combat runs, 8h, level 10
//!   cargo run --bin simulate -- -a gathering -H 24    # Full-window gathering
//!   cargo run --bin simulate -- --seed 42             # Reproducible run

use offline_settle::core::types::{Activity, Profession};
use offline_settle::core::EngineConfig;
use offline_settle::simulator::{run_simulation, SimConfig};
use offline_settle::utils::version_string;
use std::env;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = parse_args(&args);

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              OFFLINE SETTLEMENT SIMULATOR                     ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Runs:           {}", config.num_runs);
    println!("  Activity:       {}", config.activity.name());
    println!("  Profession:     {}", config.profession.name());
    println!("  Level:          {}", config.level);
    println!("  Hours Offline:  {:.1}", config.hours);
    if config.activity == Activity::Combat {
        println!("  Battles/Hour:   {:.1}", config.combat.battles_per_hour);
        println!("  Battle Cap:     {}", config.combat.max_battles);
    }
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!();

    info!(runs = config.num_runs, "running simulation");
    let report = run_simulation(&config);

    println!("{}", report.to_text());

    if args.iter().any(|a| a == "--json") {
        let json = report.to_json();
        let filename = format!(
            "settle_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        match std::fs::write(&filename, json) {
            Ok(()) => println!("JSON report saved to: {}", filename),
            Err(e) => {
                error!(error = %e, file = %filename, "failed to write JSON report");
                std::process::exit(1);
            }
        }
    }
}

fn parse_args(args: &[String]) -> SimConfig {
    let mut config = SimConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--runs" => {
                if i + 1 < args.len() {
                    config.num_runs = args[i + 1].parse().unwrap_or(1000);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-H" | "--hours" => {
                if i + 1 < args.len() {
                    config.hours = args[i + 1].parse().unwrap_or(8.0);
                    i += 1;
                }
            }
            "-l" | "--level" => {
                if i + 1 < args.len() {
                    config.level = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "-a" | "--activity" => {
                if i + 1 < args.len() {
                    config.activity = Activity::parse(&args[i + 1]);
                    i += 1;
                }
            }
            "-p" | "--profession" => {
                if i + 1 < args.len() {
                    config.profession = Profession::parse(&args[i + 1]);
                    i += 1;
                }
            }
            "-c" | "--config" => {
                if i + 1 < args.len() {
                    match EngineConfig::load(Path::new(&args[i + 1])) {
                        Ok(engine) => {
                            config.combat = engine.combat;
                            if config.seed.is_none() {
                                config.seed = engine.seed;
                            }
                        }
                        Err(e) => {
                            error!(error = %e, path = %args[i + 1], "could not load engine config");
                            std::process::exit(1);
                        }
                    }
                    i += 1;
                }
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-q" | "--quiet" => {
                config.verbosity = 0;
            }
            "--full" => {
                config = SimConfig::full_window(config.level);
            }
            "-V" | "--version" => {
                println!("{}", version_string());
                std::process::exit(0);
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Offline Settlement Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -n, --runs <N>          Number of settlement runs (default: 1000)");
    println!("    -s, --seed <S>          Random seed for reproducibility");
    println!("    -H, --hours <H>         Hours offline, capped at 24 (default: 8)");
    println!("    -l, --level <L>         Player level (default: 10)");
    println!("    -a, --activity <A>      combat | gathering | crafting | idle (default: combat)");
    println!("    -p, --profession <P>    warrior | ranger | mage | other (default: warrior)");
    println!("    -c, --config <FILE>     Load combat parameters from an engine config JSON");
    println!("    -v, --verbose           Log every run");
    println!("    -q, --quiet             Suppress per-run logging");
    println!("    --full                  Full 24h window, 200 runs");
    println!("    --json                  Save JSON report");
    println!("    -V, --version           Show version and build info");
    println!("    -h, --help              Show this help");
    println!();
    println!("EXAMPLES:");
    println!("    cargo run --bin simulate                           # Default run");
    println!("    cargo run --bin simulate -- -a crafting -H 12      # Half-day crafting");
    println!("    cargo run --bin simulate -- --seed 42 --json       # Reproducible, with JSON");
    println!("    cargo run --bin simulate -- -l 30 -p mage --full   # High-level mage, full window");
}
