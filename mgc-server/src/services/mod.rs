//! Service layer
//!
//! - `prediction_client`: the single gateway to the external classifier
//! - `identity`: sign-up, sign-in, anonymous sign-in, sign-out, token lookup
//! - `persistence`: authorization-gated prediction writes
//! - `history`: owner-scoped history reads
//! - `statistics`: owner-scoped genre counts

pub mod history;
pub mod identity;
pub mod persistence;
pub mod prediction_client;
pub mod statistics;

pub use prediction_client::{ClassificationError, PredictionClient};
