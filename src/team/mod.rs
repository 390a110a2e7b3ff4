//! Team offline settlement: synchronization analysis and cooperative play.

pub mod cooperative;
pub mod sync;

pub use cooperative::{apply_team_bonuses, settle_member, CooperativePlan, TeamBonusRates};
pub use sync::{analyze_team_sync, CooperationMode, TeamSyncInfo};
