pub mod analysis;
pub mod clock;
pub mod config;
pub mod curriculum;
pub mod db;
pub mod domain;
pub mod error;
pub mod session;
pub mod srs;
pub mod store;
pub mod strategy;

#[cfg(test)]
pub mod testing;

pub use error::{EngineError, Result};
