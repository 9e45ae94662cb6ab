//! # frame-domain
//!
//! Domain entities and value objects for the frame backend.
//!
//! - **User** - `User`, `NewUser`, `UserStatus` with field validation
//! - **Paging** - `Page` (1-based page number + page size)
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use frame_shared::shared_crate_version;

pub mod paging;
pub mod user;

pub use paging::{MAX_PAGE_SIZE, Page, PageError};
pub use user::{NewUser, User, UserError, UserId, UserStatus};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
