// # Secret Lookup Trait
//
// Defines the interface for resolving the provider API credential.
//
// ## Purpose
//
// The solver configuration never carries the API token itself, only a
// reference to it (`apiKeySecretRef`). The token is resolved on every
// Present/CleanUp call, scoped to the challenge's resource namespace.
//
// ## Implementations
//
// - In-memory: `MemorySecretLookup` (tests, embedding)
// - Mounted secrets directory: `DirSecretLookup`

use async_trait::async_trait;

/// Trait for secret lookup implementations
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Read secrets from its backing store
///
/// ## Forbidden Capabilities
/// - ❌ Cache secrets beyond a single call
/// - ❌ Log secret values
#[async_trait]
pub trait SecretLookup: Send + Sync {
    /// Get one key of a named secret
    ///
    /// # Parameters
    ///
    /// - `namespace`: Lookup scope (the challenge's resource namespace)
    /// - `name`: Secret name
    /// - `key`: Key within the secret
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The secret value
    /// - `Err(Error::SecretNotFound)`: The secret or the key does not exist
    /// - `Err(Error)`: Backend failure
    async fn get(&self, namespace: &str, name: &str, key: &str) -> Result<String, crate::Error>;
}
