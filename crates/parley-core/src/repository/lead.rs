//! UserRepository trait definition.
//!
//! Covers both user reads and lead writes; users themselves are created
//! outside this core (registration flow).

use parley_types::error::RepositoryError;
use parley_types::lead::{Lead, User};

/// Repository trait for user and lead records.
pub trait UserRepository: Send + Sync {
    /// List all registered users.
    fn list_users(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<User>, RepositoryError>> + Send;

    /// Insert a batch of fully-formed lead records.
    fn insert_leads(
        &self,
        leads: &[Lead],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List all stored leads.
    fn list_leads(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Lead>, RepositoryError>> + Send;
}
