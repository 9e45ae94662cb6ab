//! Opens the user repository behind its port.

use crate::InfraResult;
use frame_adapters::SqliteUserRepository;
use frame_ports::UserRepositoryPort;
use std::path::Path;
use std::sync::Arc;

/// Open the SQLite user store at `db_path`, creating it when missing.
pub fn open_user_repository(db_path: &Path) -> InfraResult<Arc<dyn UserRepositoryPort>> {
    let repo = SqliteUserRepository::open(db_path)?;
    tracing::debug!(path = %db_path.display(), "user repository opened");
    Ok(Arc::new(repo))
}
