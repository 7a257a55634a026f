//! Gateway endpoint addressing.
//!
//! The gateway is reached at `wss://<host>/<path>?access_key=<credential>`.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{PublishError, Result};

/// Query parameter carrying the gateway credential.
pub const ACCESS_KEY_PARAM: &str = "access_key";

/// Default bound on establishing the socket.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A fully-resolved gateway address plus the connection bound.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayEndpoint {
    url: Url,
    timeout: Duration,
}

impl GatewayEndpoint {
    /// Build an endpoint from a `ws://`/`wss://` base URL and an access key.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::InvalidEndpoint` if the URL does not parse,
    /// uses another scheme, has no host, or the access key is empty.
    pub fn new(base_url: &str, access_key: &str, timeout: Duration) -> Result<Self> {
        let mut url = Url::parse(base_url)
            .map_err(|e| PublishError::InvalidEndpoint(format!("{base_url}: {e}")))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(PublishError::InvalidEndpoint(format!(
                "unsupported scheme {:?}, expected ws or wss",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(PublishError::InvalidEndpoint("missing host".to_string()));
        }
        if access_key.is_empty() {
            return Err(PublishError::InvalidEndpoint(
                "access key must not be empty".to_string(),
            ));
        }
        if timeout.is_zero() {
            return Err(PublishError::InvalidEndpoint(
                "timeout must be positive".to_string(),
            ));
        }

        url.query_pairs_mut()
            .append_pair(ACCESS_KEY_PARAM, access_key);

        Ok(Self { url, timeout })
    }

    /// The URL to connect to, including the access key.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The connection bound.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `scheme://host[:port]/path` without the query, for logs.
    #[must_use]
    pub fn redacted(&self) -> String {
        let mut shown = self.url.clone();
        shown.set_query(None);
        shown.to_string()
    }
}

impl fmt::Debug for GatewayEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayEndpoint")
            .field("url", &self.redacted())
            .field("timeout", &self.timeout)
            .finish()
    }
}
