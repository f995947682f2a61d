//! Configuration for backend selection and construction.

use std::time::Duration;

/// HTTP timeouts for the Connect backend.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// TCP connect timeout (default 5 seconds)
    pub connect_timeout: Duration,
    /// Response read timeout (default 10 seconds)
    pub read_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

/// Configuration for creating a backend.
///
/// Presence of both a Connect base URL and an access token selects the
/// Connect API backend; otherwise the `op` CLI backend is used.
///
/// Use the builder pattern for ergonomic configuration:
///
/// ```
/// use opdotenv::Config;
///
/// let config = Config::default()
///     .with_connect("http://localhost:8080", "token")
///     .with_op_binary("/usr/local/bin/op");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Connect API base URL
    pub connect_url: Option<String>,

    /// Connect API access token
    pub connect_token: Option<String>,

    /// Path to the `op` executable (default: "op" from PATH)
    pub op_binary: Option<String>,

    /// HTTP client timeouts
    pub http: Option<HttpConfig>,
}

impl Config {
    /// Builds configuration from process environment variables.
    ///
    /// Recognized variables:
    ///
    /// - `OP_CONNECT_URL` / `OPDOTENV_CONNECT_URL`
    /// - `OP_CONNECT_TOKEN` / `OPDOTENV_CONNECT_TOKEN`
    /// - `OPDOTENV_OP_BINARY`
    /// - `OPDOTENV_HTTP_CONNECT_TIMEOUT` (seconds)
    /// - `OPDOTENV_HTTP_READ_TIMEOUT` (seconds)
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let mut http = HttpConfig::default();
        if let Some(secs) = var("OPDOTENV_HTTP_CONNECT_TIMEOUT").and_then(|v| v.parse().ok()) {
            http.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = var("OPDOTENV_HTTP_READ_TIMEOUT").and_then(|v| v.parse().ok()) {
            http.read_timeout = Duration::from_secs(secs);
        }

        Self {
            connect_url: var("OP_CONNECT_URL").or_else(|| var("OPDOTENV_CONNECT_URL")),
            connect_token: var("OP_CONNECT_TOKEN").or_else(|| var("OPDOTENV_CONNECT_TOKEN")),
            op_binary: var("OPDOTENV_OP_BINARY"),
            http: Some(http),
        }
    }

    /// Sets the Connect API endpoint and token.
    pub fn with_connect(mut self, url: impl Into<String>, token: impl Into<String>) -> Self {
        self.connect_url = Some(url.into());
        self.connect_token = Some(token.into());
        self
    }

    /// Overrides the `op` executable path.
    pub fn with_op_binary(mut self, path: impl Into<String>) -> Self {
        self.op_binary = Some(path.into());
        self
    }

    /// Overrides the HTTP timeouts used by the Connect backend.
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = Some(http);
        self
    }
}
