//! # Domain Module
//!
//! Core domain types for remote node confirmation.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod registry;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use registry::*;
pub use value_objects::*;
