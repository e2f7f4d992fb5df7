//! Core business logic for resgate.

pub mod services;

pub use services::*;
