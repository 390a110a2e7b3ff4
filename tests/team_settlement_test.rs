//! Integration test: team and batch settlement
//!
//! Exercises sync classification through the service, the cooperative
//! segment, team-wide bonuses, member resolution edge cases, and batch
//! isolation of per-player failures.

use chrono::{DateTime, Duration, TimeZone, Utc};
use offline_settle::core::types::{Activity, Profession, RewardCategory, TeamSnapshot};
use offline_settle::team::CooperationMode;
use offline_settle::{
    EngineConfig, MemoryStore, PlayerSnapshot, SettlementError, SettlementService,
    SettlementStore,
};
use std::sync::Arc;
use uuid::Uuid;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn member(tag: u128, activity: Activity, away_hours: i64) -> PlayerSnapshot {
    let mut p = PlayerSnapshot::new(format!("Member {}", tag), activity, Profession::Ranger);
    p.id = Uuid::from_u128(tag);
    p.level = 10;
    p.experience = 900;
    p.last_active_at = fixed_now() - Duration::hours(away_hours);
    p
}

fn setup(members: &[PlayerSnapshot], extra_ids: &[Uuid]) -> (SettlementService<MemoryStore>, Uuid) {
    let store = MemoryStore::new();
    for m in members {
        store.insert_player(m.clone()).unwrap();
    }
    let mut member_ids: Vec<Uuid> = members.iter().map(|m| m.id).collect();
    member_ids.extend_from_slice(extra_ids);
    let team = TeamSnapshot {
        id: Uuid::from_u128(0x7ea),
        name: "Night Shift".to_string(),
        captain_id: member_ids[0],
        member_ids,
    };
    let team_id = team.id;
    store.insert_team(team).unwrap();
    (
        SettlementService::new(Arc::new(store), EngineConfig::quick_test(99)),
        team_id,
    )
}

fn count(result: &offline_settle::SettlementResult, category: RewardCategory) -> usize {
    result.rewards.iter().filter(|r| r.category == category).count()
}

#[tokio::test]
async fn test_synchronized_team_fights_together() {
    let members = vec![
        member(1, Activity::Combat, 5),
        member(2, Activity::Gathering, 5),
        member(3, Activity::Crafting, 5),
    ];
    let (service, team_id) = setup(&members, &[]);

    let team = service.settle_team_at(team_id, fixed_now()).await.unwrap();

    assert_eq!(team.sync.mode, CooperationMode::HighSync);
    assert_eq!(team.sync.sync_rate, 1.0);
    assert!((team.plan.team_bonus - 1.6).abs() < 1e-9, "3 members, full sync: 1 + 0.3 + 0.3");
    assert_eq!(team.results.len(), 3);
    for result in &team.results {
        assert_eq!(count(result, RewardCategory::TeamCooperation), 1);
        assert!(!result.battles.is_empty(), "everyone fights in the shared segment");
        assert_eq!(
            result.rewards.iter().map(|r| r.experience).sum::<u64>(),
            result.total_experience
        );
    }
    // Whole window was shared, so no individual activity entries remain
    assert_eq!(count(&team.results[1], RewardCategory::Gathering), 0);
}

#[tokio::test]
async fn test_divergent_team_settles_individually_with_bonuses() {
    let members = vec![
        member(11, Activity::Crafting, 1),
        member(12, Activity::Crafting, 1),
        member(13, Activity::Crafting, 23),
    ];
    let (service, team_id) = setup(&members, &[]);

    let team = service.settle_team_at(team_id, fixed_now()).await.unwrap();

    assert_eq!(team.sync.mode, CooperationMode::Individual);
    assert!(team.sync.sync_rate < 0.2);
    let long = team.result_for(Uuid::from_u128(13)).unwrap();
    assert_eq!(count(long, RewardCategory::TeamCooperation), 0);
    assert_eq!(count(long, RewardCategory::Crafting), 1);
    // 23h of crafting is 3450 xp before the team level bonus
    assert!(long.total_experience > 3450);
    assert!(team.bonus_rates.level_rate > 0.0 && team.bonus_rates.level_rate <= 0.2);
    assert!(team.bonus_rates.loyalty_rate > 0.0 && team.bonus_rates.loyalty_rate <= 0.15);
}

#[tokio::test]
async fn test_medium_sync_team_shares_part_of_the_window() {
    let members = vec![
        member(71, Activity::Gathering, 5),
        member(72, Activity::Gathering, 11),
        member(73, Activity::Gathering, 14),
    ];
    let (service, team_id) = setup(&members, &[]);

    let team = service.settle_team_at(team_id, fixed_now()).await.unwrap();

    assert_eq!(team.sync.mode, CooperationMode::MediumSync);
    assert_eq!(team.plan.segment_seconds, 6 * 3600, "60% of the 10h mean");
    assert!(team.plan.team_bonus < 1.0 + 2.0 * 0.15 + team.sync.sync_rate * 0.3);
    for result in &team.results {
        assert_eq!(count(result, RewardCategory::TeamCooperation), 1);
    }

    let short = team.result_for(Uuid::from_u128(71)).unwrap();
    assert_eq!(
        count(short, RewardCategory::Gathering),
        0,
        "a 5h member spends all of it in the shared segment"
    );
    let long = team.result_for(Uuid::from_u128(73)).unwrap();
    let gathering = long
        .rewards
        .iter()
        .find(|r| r.category == RewardCategory::Gathering)
        .expect("time past the segment is settled individually");
    // 8h left * 5 actions * 20 xp
    assert_eq!(gathering.experience, 800);
}

#[tokio::test]
async fn test_missing_and_duplicate_members_are_skipped() {
    let a = member(21, Activity::Idle, 4);
    let b = member(22, Activity::Idle, 4);
    let (service, team_id) = setup(&[a.clone(), b.clone()], &[Uuid::from_u128(999), a.id]);

    let team = service.settle_team_at(team_id, fixed_now()).await.unwrap();

    assert_eq!(team.results.len(), 2, "ghost and duplicate ids are not settled");
    assert_eq!(team.sync.team_size(), 2);
    let records = service.store().records().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.team_id == Some(team_id)));
}

#[tokio::test]
async fn test_team_updates_every_member_snapshot() {
    let members = vec![member(31, Activity::Gathering, 6), member(32, Activity::Combat, 6)];
    let (service, team_id) = setup(&members, &[]);

    let team = service.settle_team_at(team_id, fixed_now()).await.unwrap();

    for (before, result) in members.iter().zip(&team.results) {
        let stored = service.store().get_player(before.id).unwrap().unwrap();
        assert_eq!(result.player_id, before.id, "results keep team order");
        assert_eq!(stored.experience, before.experience + result.total_experience);
        assert_eq!(stored.gold, before.gold + result.total_gold);
        assert_eq!(stored.last_active_at, fixed_now());
    }
    assert_eq!(
        team.total_experience(),
        team.results.iter().map(|r| r.total_experience).sum::<u64>()
    );
}

#[tokio::test]
async fn test_unknown_team() {
    let (service, _) = setup(&[member(41, Activity::Idle, 1)], &[]);
    let err = service.settle_team(Uuid::from_u128(12345)).await.unwrap_err();
    assert!(matches!(err, SettlementError::TeamNotFound(_)));
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let ok_a = member(51, Activity::Gathering, 2);
    let ok_b = member(52, Activity::Combat, 3);
    let mut future = member(53, Activity::Idle, 0);
    future.last_active_at = fixed_now() + Duration::hours(1);
    let (service, _) = setup(&[ok_a.clone(), ok_b.clone(), future.clone()], &[]);
    let ghost = Uuid::from_u128(54);

    let ids = [ok_a.id, ghost, ok_b.id, future.id];
    let batch = service.settle_batch_at(&ids, fixed_now()).await;

    assert_eq!(batch.items.len(), 4);
    let order: Vec<Uuid> = batch.items.iter().map(|i| i.player_id).collect();
    assert_eq!(order, ids.to_vec(), "items keep input order");
    assert_eq!(batch.success_count, 2);
    assert_eq!(batch.error_count, 2);
    assert!(matches!(batch.get(ghost), Some(Err(SettlementError::PlayerNotFound(_)))));
    assert!(matches!(batch.get(future.id), Some(Err(SettlementError::AlreadyCurrent(_)))));
    // 2h gathering: 10 actions
    let gathered = batch.get(ok_a.id).unwrap().as_ref().unwrap();
    assert_eq!(gathered.total_experience, 200);
}

#[tokio::test]
async fn test_empty_batch() {
    let (service, _) = setup(&[member(61, Activity::Idle, 1)], &[]);
    let batch = service.settle_batch(&[]).await;
    assert!(batch.items.is_empty());
    assert_eq!(batch.success_count + batch.error_count, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_batch_settles_a_repeated_player_once() {
    let fighter = member(81, Activity::Combat, 20);
    let (service, _) = setup(&[fighter.clone()], &[]);

    let ids = [fighter.id, fighter.id, fighter.id];
    let batch = service.settle_batch_at(&ids, fixed_now()).await;

    assert_eq!(batch.items.len(), 3, "every requested entry gets an item");
    assert_eq!(batch.success_count, 1);
    assert!(batch.items[1..]
        .iter()
        .all(|item| matches!(item.outcome, Err(SettlementError::DuplicateInBatch(_)))));
    let settled = batch.items[0].outcome.as_ref().unwrap();
    let stored = service.store().get_player(fighter.id).unwrap().unwrap();
    assert_eq!(stored.experience, fighter.experience + settled.total_experience);
    assert_eq!(service.store().records().unwrap().len(), 1);
}
