//! # frame-ports
//!
//! Port traits for the frame hexagonal architecture.
//!
//! This crate defines the interfaces between the domain and infrastructure
//! layers. It depends only on `domain` and `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod logger;
pub mod user;

pub use logger::*;
pub use user::*;

// Re-export domain types used in port signatures, so adapter crates
// can implement ports without directly depending on `frame-domain`.
pub use frame_domain::{NewUser, Page, User, UserId, UserStatus};
