//! # Algorithms Module
//!
//! Pure functions: response canonicalization, request eligibility and
//! trust scoring.

pub mod canonicalize;
pub mod eligibility;
pub mod trust_score;

pub use canonicalize::{attachment_kinds, canonicalize};
pub use eligibility::{base_request_type, RequestCatalog};
pub use trust_score::{
    indicator_color, rejection_ratio, score, DISTRUSTED_COLOR, TRUSTED_COLOR, WARNING_COLOR,
};
