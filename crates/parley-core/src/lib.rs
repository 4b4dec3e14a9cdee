//! Business logic and repository trait definitions for Parley.
//!
//! This crate defines the "ports" (repository traits) that the
//! infrastructure layer implements, plus the services built on them:
//! chat resolution, the message ingest pipeline, live delivery fan-out,
//! and the read-only query service. It depends only on `parley-types` --
//! never on `parley-infra` or any database/IO crate.

pub mod chat;
pub mod delivery;
pub mod query;
pub mod repository;

#[cfg(test)]
pub(crate) mod testsupport;
