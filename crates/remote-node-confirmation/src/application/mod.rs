//! # Application Module
//!
//! Application services orchestrating the domain and outbound ports.

pub mod context;
pub mod coordinator;
pub mod discovery;
pub mod service;

pub use context::TrustContext;
pub use coordinator::ConfirmationCoordinator;
pub use discovery::PeerDiscoveryLoop;
pub use service::ConfirmationService;
