//! Source descriptors for declarative secret configuration.
//!
//! A source is one configured secret address. Parsing a bare address
//! infers which field to fetch and how to decode it, so callers can list
//! plain `op://` strings and let the loader work out the rest.

use crate::{Address, Format, OpdotenvError, Result};

/// Sentinel field holding a secure note's free-form text.
pub const NOTES_PLAIN_FIELD: &str = "notesPlain";

/// A normalized secret source: where to fetch and how to decode.
///
/// Immutable after construction. `field_name == None` signals "fetch all
/// item fields, do not decode".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// The `op://` address string
    pub path: String,
    /// Field to fetch, or `None` for a full field listing
    pub field_name: Option<String>,
    /// How to decode the fetched text, or `None` for no decoding
    pub field_type: Option<Format>,
}

impl Source {
    /// Pass-through constructor for already-structured descriptors.
    pub fn new(
        path: impl Into<String>,
        field_name: Option<String>,
        field_type: Option<Format>,
    ) -> Self {
        Self {
            path: path.into(),
            field_name,
            field_type,
        }
    }

    /// Parses a bare address string into a normalized descriptor.
    ///
    /// The item segment is split on `/`: the first token is the item name,
    /// the second (if any) an explicit field name.
    ///
    /// - Explicit field name: the format is inferred from the field name
    ///   itself (may be `None` if it carries no recognizable extension).
    /// - No field, but the item name infers a format: the secret is
    ///   assumed stored in the item's notes, so `field_name` becomes
    ///   [`NOTES_PLAIN_FIELD`] with the inferred format.
    /// - Neither: fetch all fields, no decoding.
    ///
    /// # Errors
    ///
    /// [`OpdotenvError::AddressFormat`] if the input does not begin with a
    /// recognized scheme.
    ///
    /// # Example
    ///
    /// ```
    /// use opdotenv::{Format, Source};
    ///
    /// let src = Source::parse("op://Prod/.env.production").unwrap();
    /// assert_eq!(src.field_name.as_deref(), Some("notesPlain"));
    /// assert_eq!(src.field_type, Some(Format::Dotenv));
    ///
    /// let src = Source::parse("op://Prod/App").unwrap();
    /// assert_eq!(src.field_name, None);
    /// ```
    pub fn parse(source: &str) -> Result<Source> {
        if !Address::has_scheme(source) {
            return Err(OpdotenvError::AddressFormat(source.to_string()));
        }

        let (_, item) = Address::parse_vault_item(source)?;

        let mut parts = item.splitn(2, '/');
        let item_name = parts.next().unwrap_or_default().to_string();
        let field_name = parts.next().map(str::to_string);

        if let Some(field) = field_name {
            let field_type = Format::infer(&field);
            Ok(Source::new(source, Some(field), field_type))
        } else if let Some(field_type) = Format::infer(&item_name) {
            Ok(Source::new(
                source,
                Some(NOTES_PLAIN_FIELD.to_string()),
                Some(field_type),
            ))
        } else {
            Ok(Source::new(source, None, None))
        }
    }
}
