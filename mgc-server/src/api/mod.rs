//! HTTP API handlers for mgc-server

pub mod auth;
pub mod buildinfo;
pub mod health;
pub mod predict;
pub mod predictions;
pub mod session;

pub use auth::auth_routes;
pub use health::health_routes;
pub use predict::predict_routes;
pub use predictions::prediction_routes;
pub use session::CurrentPrincipal;
