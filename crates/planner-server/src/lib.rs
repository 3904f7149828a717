pub mod config;
pub mod cors;
pub mod handlers;
pub mod invoke;
pub mod logging;
pub mod response;
pub mod server;
pub mod state;

pub use config::{ApiKey, ConfigError, PlannerArgs, StoreBackend};
pub use cors::CorsPolicy;
pub use handlers::plan::TravelPlanHandler;
pub use server::{app_config, run_server};
pub use state::AppState;
