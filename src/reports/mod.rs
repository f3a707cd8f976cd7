//! Financial progress reporting over materialized contractor records.
//!
//! Nothing in here talks to the database: callers load the records and pass
//! an explicit `now`.

pub mod dashboard;
pub mod fleet;
pub mod progress;

pub use dashboard::{ConceptRecord, ContractorDashboard, PaymentRecord, ProjectRef, build_dashboard};
pub use fleet::{FleetStats, FleetStatsSource, compute_fleet_stats};
pub use progress::{YearMonth, progress_pct};
