//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for settings and UI output.

mod settings;
mod tracing_sink;

pub use settings::ConfigSettings;
pub use tracing_sink::TracingSink;
