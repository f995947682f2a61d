//! Backend trait definition for secret storage integrations.
//!
//! This module defines the [`SecretBackend`] trait that both client
//! variants (the `op` CLI subprocess and the Connect REST API) satisfy,
//! giving the loader and exporter a uniform read/write contract.

use crate::{FlatMap, Result};
use async_trait::async_trait;

/// A secret storage backend.
///
/// All implementations must be `Send + Sync` to support concurrent access
/// across async tasks.
///
/// # Implementations
///
/// - [`OpCliBackend`](crate::backends::cli::OpCliBackend): subprocess calls
///   to the `op` command-line tool
/// - [`ConnectBackend`](crate::backends::connect::ConnectBackend): HTTP
///   calls to a 1Password Connect server
#[async_trait]
pub trait SecretBackend: Send + Sync {
    /// Returns the backend name (e.g., "op-cli", "connect").
    fn name(&self) -> &str;

    /// Returns the raw text of a single field addressed by
    /// `op://Vault/Item/Field`. For a bare `op://Vault/Item` address the
    /// notes-field text is returned, or an empty string if absent.
    async fn read(&self, address: &str) -> Result<String>;

    /// Returns the full item (all fields) as serialized JSON text.
    ///
    /// When `vault` is `None`, all accessible vaults are searched.
    ///
    /// # Errors
    ///
    /// [`OpdotenvError::NotFound`](crate::OpdotenvError::NotFound) if no
    /// item with that title exists.
    async fn get_item(&self, title: &str, vault: Option<&str>) -> Result<String>;

    /// Creates a new secure-note item whose notes field holds `notes`.
    async fn create_note(&self, vault: &str, title: &str, notes: &str) -> Result<()>;

    /// Creates an item with the given fields, or updates it field-by-field
    /// when an item with that title already exists in the vault, replacing
    /// existing fields by label and adding new ones.
    async fn create_or_update_fields(
        &self,
        vault: &str,
        item: &str,
        fields: &FlatMap,
    ) -> Result<()>;
}
