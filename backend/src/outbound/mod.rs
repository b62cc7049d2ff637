//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Currently a single concern: PostgreSQL persistence (repositories, the
//! attendance store, and the PostGIS geo index). Adapters translate between
//! domain types and infrastructure representations and contain no business
//! logic.

pub mod persistence;
