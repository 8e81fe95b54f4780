// Web frontend module
pub mod routes;
pub mod server;

pub use routes::{create_router, AppError, AppState};
pub use server::{WebServer, WebServerConfig};
