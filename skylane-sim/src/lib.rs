pub mod lifecycle;
pub mod settlement;
pub mod synthesis;

pub use lifecycle::{DaySync, LifecycleEngine, LifecycleError};
pub use settlement::{SettlementEngine, SettlementError, SettlementSummary};
