//! DAO subsystem
//!
//! Read-only entry point of the mapping layer:
//! - `select` decodes one row into a fresh entity
//! - `select_all` scans a table into a lazy sequence of entities
//! - `release_entity` closes the paged fields of a decoded entity
//!
//! Entity specs are built once per type on first use and cached for the
//! life of the DAO.

mod config;
#[allow(clippy::module_inception)]
mod dao;
mod errors;
mod scanner;

pub use config::DaoConfig;
pub use dao::Dao;
pub use errors::{DaoError, DaoResult};
pub use scanner::EntityScanner;
