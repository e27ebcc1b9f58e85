//! Persistence layer for the vendor catalog.
//!
//! [`CatalogStore`] is the seam the ingestion pipeline and the HTTP handlers depend on.
//! [`PgCatalogStore`] backs it with PostgreSQL; [`InMemoryCatalogStore`] keeps everything
//! in process and is used by tests and when no `DATABASE_URL` is configured.

pub mod db;

pub use db::{CatalogStore, InMemoryCatalogStore, PgCatalogStore};
