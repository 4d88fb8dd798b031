//! Override value providers.
//!
//! The overlay engine only needs to ask "what is the value for this key?".
//! Each provider answers that question from a different place:
//!
//! - [`EnvSource`] - the environment snapshot, looked up by upper-cased key
//! - [`PendingVars`] - the `ODOORC_`-prefixed subset of the environment,
//!   known in advance so unmatched keys can be appended
//! - [`RemoteSource`] - a hash in a remote key-value store, keyed by client and stage

mod env;
mod prefixed;
mod remote;

pub use env::EnvSource;
pub use prefixed::{DEFAULT_PREFIX, PendingVars};
pub use remote::{HashStore, RedisStore, RemoteSource, hash_key};

/// Capability to resolve a configuration key to an override value.
///
/// `None` means "no override": the engine keeps the line as it is. Providers
/// must not fail; lookup errors are logged and reported as `None`.
pub trait ValueSource {
    fn resolve(&mut self, key: &str) -> Option<String>;

    /// Short provider name used in log output.
    fn name(&self) -> &'static str;
}
