//! Parsing of `op://Vault/Item[/Field]` secret addresses.

use crate::{OpdotenvError, Result};

/// Accepted scheme prefixes, primary first.
const SCHEMES: &[&str] = &["op://", "connect://"];

/// A parsed secret address.
///
/// `vault` and `item` are always non-empty. `field`, when present, is a
/// single opaque token; it is never parsed for further structure even if
/// it contains `/` separators itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Vault name or id
    pub vault: String,
    /// Item title or id
    pub item: String,
    /// Optional field label or id
    pub field: Option<String>,
}

impl Address {
    /// Parses an exact address: `scheme://vault/item[/field]`.
    ///
    /// The item segment stops at the next `/`; everything after it is the
    /// field token, embedded slashes included. Use this dialect when the
    /// caller controls the path shape (exact-path fetches).
    ///
    /// # Errors
    ///
    /// [`OpdotenvError::AddressFormat`] if the scheme is missing, the
    /// vault/item segments are empty, or the address ends with a
    /// dangling `/`.
    ///
    /// # Example
    ///
    /// ```
    /// use opdotenv::Address;
    ///
    /// let addr = Address::parse("op://Prod/App/notesPlain").unwrap();
    /// assert_eq!(addr.vault, "Prod");
    /// assert_eq!(addr.item, "App");
    /// assert_eq!(addr.field.as_deref(), Some("notesPlain"));
    /// ```
    pub fn parse(address: &str) -> Result<Address> {
        let rest = strip_scheme(address)?;
        let (vault, rest) = rest
            .split_once('/')
            .ok_or_else(|| OpdotenvError::AddressFormat(address.to_string()))?;

        let (item, field) = match rest.split_once('/') {
            Some((item, field)) if !field.is_empty() => (item, Some(field.to_string())),
            // a trailing slash promises a field and delivers none
            Some(_) => return Err(OpdotenvError::AddressFormat(address.to_string())),
            None => (rest, None),
        };

        if vault.is_empty() || item.is_empty() {
            return Err(OpdotenvError::AddressFormat(address.to_string()));
        }

        Ok(Address {
            vault: vault.to_string(),
            item: item.to_string(),
            field,
        })
    }

    /// Parses the loose dialect: `scheme://vault/item` where the entire
    /// remainder after the vault is the item segment.
    ///
    /// Item titles may legitimately contain `/`, so free-form config
    /// sources use this dialect and split the segment themselves.
    pub fn parse_vault_item(address: &str) -> Result<(String, String)> {
        let rest = strip_scheme(address)?;
        let (vault, item) = rest
            .split_once('/')
            .ok_or_else(|| OpdotenvError::AddressFormat(address.to_string()))?;

        if vault.is_empty() || item.is_empty() {
            return Err(OpdotenvError::AddressFormat(address.to_string()));
        }

        Ok((vault.to_string(), item.to_string()))
    }

    /// Returns true if the string starts with a recognized scheme.
    pub fn has_scheme(address: &str) -> bool {
        SCHEMES.iter().any(|s| address.starts_with(s))
    }
}

fn strip_scheme(address: &str) -> Result<&str> {
    SCHEMES
        .iter()
        .find_map(|s| address.strip_prefix(s))
        .ok_or_else(|| OpdotenvError::AddressFormat(address.to_string()))
}
