pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod instance_repo;
pub mod template_repo;
pub mod user_repo;

pub use app_config::{Config, SettlementRules, SimulationRules};
pub use booking_repo::PostgresBookingRepository;
pub use database::DbClient;
pub use instance_repo::PostgresFlightInstanceRepository;
pub use template_repo::PostgresRouteTemplateRepository;
pub use user_repo::PostgresUserRepository;
