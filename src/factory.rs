//! Backend selection based on configuration presence.

use crate::backends::cli::OpCliBackend;
use crate::backends::connect::ConnectBackend;
use crate::{Config, Result, SecretBackend};

/// Creates the appropriate backend for the given configuration.
///
/// Presence of both a Connect base URL and an access token selects the
/// [`ConnectBackend`]; otherwise the [`OpCliBackend`] is used, honoring
/// an overridden executable path when configured.
///
/// # Example
///
/// ```
/// use opdotenv::{factory, Config};
///
/// let backend = factory::create(&Config::default()).unwrap();
/// assert_eq!(backend.name(), "op-cli");
/// ```
pub fn create(config: &Config) -> Result<Box<dyn SecretBackend>> {
    match (&config.connect_url, &config.connect_token) {
        (Some(url), Some(token)) => {
            let http = config.http.clone().unwrap_or_default();
            Ok(Box::new(ConnectBackend::new(url, token, http)?))
        }
        _ => Ok(Box::new(OpCliBackend::new(config.op_binary.clone()))),
    }
}

/// Creates a backend from process environment variables.
///
/// Shorthand for `create(&Config::from_env())`.
pub fn from_env() -> Result<Box<dyn SecretBackend>> {
    create(&Config::from_env())
}
