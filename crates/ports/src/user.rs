//! User persistence boundary contract.

use frame_domain::{NewUser, Page, User, UserId};
use frame_shared::Result;

/// Boundary contract for user storage.
///
/// Soft-deleted rows are invisible to every read.
pub trait UserRepositoryPort: Send + Sync {
    /// Fetch one user by id. `Ok(None)` when no visible row matches.
    fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Users whose name contains `name_fragment`, ordered by id.
    ///
    /// An empty fragment matches every visible user.
    fn find_many(&self, name_fragment: &str, page: Page) -> Result<Vec<User>>;

    /// Persist a new user and return the stored row.
    fn insert(&self, user: NewUser) -> Result<User>;
}
