use std::sync::Arc;

use skylane_core::clock::Clock;
use skylane_core::repository::{FlightInstanceRepository, RouteTemplateRepository};
use skylane_sim::{DaySync, LifecycleEngine, SettlementEngine};

#[derive(Clone)]
pub struct AppState {
    pub templates: Arc<dyn RouteTemplateRepository>,
    pub instances: Arc<dyn FlightInstanceRepository>,
    pub lifecycle: Arc<LifecycleEngine>,
    pub day_sync: Arc<DaySync>,
    pub settlement: Arc<SettlementEngine>,
    pub clock: Arc<dyn Clock>,
}
