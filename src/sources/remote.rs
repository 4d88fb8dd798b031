//! Remote key-value store provider.
//!
//! Override values live in a single hash per deployment. The hash name is
//! `<client>:<stage>`, or just `<stage>` for single-tenant stores; fields are
//! the upper-cased configuration keys.

use super::ValueSource;
use crate::error::{EntrypointError, Result};
use redis::Commands;
use std::time::Duration;
use tracing::{debug, warn};

/// Build the hash name for a deployment.
pub fn hash_key(client: Option<&str>, stage: &str) -> String {
    match client.map(str::trim).filter(|c| !c.is_empty()) {
        Some(client) => format!("{}:{}", client, stage),
        None => stage.to_string(),
    }
}

/// Minimal hash-field lookup a remote store must support.
pub trait HashStore {
    fn hget(&mut self, hash: &str, field: &str) -> Result<Option<String>>;
}

/// Redis-backed [`HashStore`].
///
/// The connection is opened on first use with a bounded connect timeout, and
/// reads and writes are bounded by the same timeout. A failed connection is
/// remembered: later lookups fail immediately instead of waiting again.
pub struct RedisStore {
    url: String,
    timeout: Duration,
    conn: Option<redis::Connection>,
    failed: Option<String>,
}

impl RedisStore {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            conn: None,
            failed: None,
        }
    }

    fn connection(&mut self) -> Result<&mut redis::Connection> {
        if let Some(ref reason) = self.failed {
            return Err(EntrypointError::Remote(reason.clone()));
        }
        if self.conn.is_none() {
            match self.connect() {
                Ok(conn) => self.conn = Some(conn),
                Err(e) => {
                    self.failed = Some(e.to_string());
                    return Err(e);
                }
            }
        }
        self.conn
            .as_mut()
            .ok_or_else(|| EntrypointError::Remote("connection unavailable".to_string()))
    }

    fn connect(&self) -> Result<redis::Connection> {
        debug!(url = %self.url, timeout_ms = self.timeout.as_millis() as u64, "Connecting to remote store");
        let client = redis::Client::open(self.url.as_str())?;
        let conn = client.get_connection_with_timeout(self.timeout)?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        Ok(conn)
    }
}

impl HashStore for RedisStore {
    fn hget(&mut self, hash: &str, field: &str) -> Result<Option<String>> {
        let conn = self.connection()?;
        let value: Option<String> = conn.hget(hash, field)?;
        Ok(value)
    }
}

/// Resolves keys from one hash of a [`HashStore`].
///
/// Store errors never escape: they are logged and the key is treated as
/// having no override.
pub struct RemoteSource<S> {
    store: S,
    hash: String,
}

impl<S: HashStore> RemoteSource<S> {
    pub fn new(store: S, hash: impl Into<String>) -> Self {
        Self {
            store,
            hash: hash.into(),
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl<S: HashStore> ValueSource for RemoteSource<S> {
    fn resolve(&mut self, key: &str) -> Option<String> {
        let field = key.trim().to_uppercase();
        match self.store.hget(&self.hash, &field) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(hash = %self.hash, key = %field, error = %e, "Remote lookup failed, keeping current value");
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
