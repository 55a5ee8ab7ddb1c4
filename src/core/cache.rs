//! Cache abstraction for provider responses

use async_trait::async_trait;
use std::time::Duration;

/// A collection of cached byte values with optional expiry.
///
/// Providers serialize their own payloads; the collection only stores bytes
/// and enforces TTL on read.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>);
    async fn remove(&self, key: &[u8]);
}
