//! Data-access layer for the noise-monitoring tables.
//!
//! The layer follows the repository pattern so storage backends can be
//! swapped without touching the report logic:
//!
//! ```text
//! HTTP handlers / services
//!          │
//!   NoiseRepository trait (repository/)   ← the only seam storage is read through
//!          │
//!   ┌──────┴───────┐
//!   │ MysqlRepository │  feature `mysql-repo`
//!   │ LocalRepository │  feature `local-repo` (default; tests, development)
//!   └──────────────┘
//! ```
//!
//! All access is read-only. Ingestion happens elsewhere; this service only
//! reads and reports.

// Feature flag priority: mysql > local.
// When both are enabled (e.g. --all-features), mysql takes precedence.
#[cfg(not(any(feature = "mysql-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod models;
pub mod repositories;
pub mod repository;

pub use models::{
    ExtremesRow, LaeqDataRow, LaeqRow, MetricsRow, MqttStatusRow, Series, SortDirection, SortSpec,
    StatusSortField, TodayStats,
};
pub use repositories::LocalRepository;
#[cfg(feature = "mysql-repo")]
pub use repositories::{MysqlConfig, MysqlRepository};
pub use repository::{ErrorContext, NoiseRepository, RepositoryError, RepositoryResult};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn NoiseRepository>> = OnceLock::new();

#[cfg(feature = "mysql-repo")]
fn create_selected_repository() -> RepositoryResult<Arc<dyn NoiseRepository>> {
    let config = MysqlConfig::from_env()?;
    let repo = MysqlRepository::connect(&config)?;
    Ok(Arc::new(repo))
}

#[cfg(all(feature = "local-repo", not(feature = "mysql-repo")))]
fn create_selected_repository() -> RepositoryResult<Arc<dyn NoiseRepository>> {
    Ok(Arc::new(LocalRepository::new()))
}

/// Initialize the global repository singleton for the selected backend.
pub fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo = create_selected_repository().map_err(|e| anyhow::Error::msg(e.to_string()))?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn NoiseRepository>> {
    if REPOSITORY.get().is_none() {
        let _ = init_repository();
    }

    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}
