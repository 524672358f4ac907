pub mod config;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

pub use config::Config;
pub use errors::{ApiError, ApiResult};
pub use handlers::AppState;
pub use routes::build_router;
pub use services::DatabaseService;
