//! Repository implementations.
//!
//! - `mysql`: MySQL implementation with Diesel ORM
//! - `local`: in-memory implementation for unit testing and local development

pub mod local;
#[cfg(feature = "mysql-repo")]
pub mod mysql;

pub use local::LocalRepository;
#[cfg(feature = "mysql-repo")]
pub use mysql::{MysqlConfig, MysqlRepository};
