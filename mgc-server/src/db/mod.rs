//! Database access for mgc-server
//!
//! Row-level queries only; authorization and shaping live in `services`.

pub mod predictions;
pub mod sessions;
pub mod users;
