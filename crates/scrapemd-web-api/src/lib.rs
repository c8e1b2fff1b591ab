pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use config::{Config, LogFormat};
pub use error::ApiError;
pub use handlers::AppState;
pub use routes::create_router;
