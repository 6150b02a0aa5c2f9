//! # MGC Common Library
//!
//! Shared code for the music genre classifier service:
//! - Genre vocabulary and probability records
//! - Upload validation
//! - Configuration loading
//! - Database schema initialization
//! - Error types and time helpers

pub mod config;
pub mod db;
pub mod error;
pub mod genre;
pub mod time;
pub mod validation;

pub use error::{Error, Result};
pub use genre::{
    fallback_prediction, Genre, GenreProbabilities, PredictionResponse, FALLBACK_PROBABILITIES,
};
