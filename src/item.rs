//! Serde model of the 1Password item JSON shared by both backends.

use serde::{Deserialize, Serialize};

/// Purpose marker for the free-form notes field.
pub const NOTES_PURPOSE: &str = "NOTES";

/// Item category used for secure notes on the Connect API.
pub const SECURE_NOTE_CATEGORY: &str = "SECURE_NOTE";

/// Item category flag understood by `op item create`.
pub const SECURE_NOTE_CLI_CATEGORY: &str = "secure-note";

/// Item category used when creating field-holding items.
pub const LOGIN_CATEGORY: &str = "LOGIN";

/// An item as returned by `op item get --format json` or the Connect API.
///
/// Only the parts this crate reads are modeled; unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault: Option<VaultRef>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Reference to the vault containing an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One labeled key/value slot of an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

impl Field {
    /// Returns true if this field holds the item's free-form notes.
    pub fn is_notes(&self) -> bool {
        self.purpose.as_deref() == Some(NOTES_PURPOSE)
            || self.label.as_deref() == Some(crate::source::NOTES_PLAIN_FIELD)
    }
}

impl Item {
    /// Looks up a field by name using an ordered list of match predicates:
    /// label first, then raw field id, then the purpose marker for the
    /// special notes field. The first hit wins.
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        let by_label = |f: &&Field| f.label.as_deref() == Some(name);
        let by_id = |f: &&Field| f.id == name;
        let by_notes_purpose = |f: &&Field| {
            name == crate::source::NOTES_PLAIN_FIELD
                && f.purpose.as_deref() == Some(NOTES_PURPOSE)
        };

        self.fields
            .iter()
            .find(by_label)
            .or_else(|| self.fields.iter().find(by_id))
            .or_else(|| self.fields.iter().find(by_notes_purpose))
    }

    /// Returns the notes field, matched by purpose or by the `notesPlain`
    /// label.
    pub fn notes_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_notes())
    }
}
