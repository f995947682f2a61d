//! opdotenv - Load and export application secrets from 1Password.
//!
//! Secrets are addressed with `op://Vault/Item[/Field]` locators, fetched
//! through either the `op` command-line tool or a 1Password Connect
//! server, decoded as dotenv/JSON/YAML, and merged into a caller-supplied
//! string map. The inverse direction serializes a map and writes it back
//! as a secure note or as discrete item fields.
//!
//! # Quick Start
//!
//! ```no_run
//! use opdotenv::{factory, loader, Config, FlatMap};
//!
//! #[tokio::main]
//! async fn main() -> opdotenv::Result<()> {
//!     // Connect API when OP_CONNECT_URL/OP_CONNECT_TOKEN are set,
//!     // the op CLI otherwise.
//!     let backend = factory::create(&Config::from_env())?;
//!
//!     let mut env = FlatMap::new();
//!     let source = opdotenv::Source::parse("op://Production/.env.production")?;
//!     loader::load_source(&*backend, &source, &mut env, true).await?;
//!
//!     println!("loaded {} keys", env.len());
//!     Ok(())
//! }
//! ```
//!
//! # Address dialects
//!
//! - Exact: `op://Vault/Item/Field`, where the item stops at the next `/`
//!   and the whole remainder is one field token.
//! - Loose: `op://Vault/Item Title`, where everything after the vault is
//!   the item, which may itself contain `/`.
//!
//! `connect://` is accepted as a scheme alias everywhere.
//!
//! # What gets decoded
//!
//! Item or field names containing `.env`, or ending with `.json`,
//! `.yaml`, or `.yml`, are assumed to hold a whole configuration file in
//! the item's notes and are decoded into a flat map. Other items resolve
//! to their discrete labeled fields, undecoded.
//!
//! Secret values never appear in errors or log events: subprocess output
//! and HTTP response bodies are never surfaced.

pub mod address;
pub mod backend;
pub mod backends;
pub mod codec;
pub mod config;
pub mod error;
pub mod exporter;
pub mod factory;
pub mod format;
pub mod item;
pub mod loader;
pub mod source;
pub mod validation;

pub use address::Address;
pub use backend::SecretBackend;
pub use codec::FlatMap;
pub use config::{Config, HttpConfig};
pub use error::{OpdotenvError, Result};
pub use exporter::export;
pub use format::Format;
pub use item::{Field, Item};
pub use loader::{load, load_source, LoadOptions};
pub use source::Source;
