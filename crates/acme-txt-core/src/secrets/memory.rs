// # Memory Secret Lookup
//
// In-memory implementation of SecretLookup.
//
// ## When to Use
//
// - Tests
// - Embedding the reconciler in a process that already holds the credential

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::SecretLookup;

/// (namespace, secret name) -> key -> value
type SecretMap = HashMap<(String, String), HashMap<String, String>>;

/// In-memory secret lookup
///
/// # Example
///
/// ```rust,no_run
/// use acme_txt_core::secrets::MemorySecretLookup;
/// use acme_txt_core::traits::SecretLookup;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let secrets = MemorySecretLookup::new();
///     secrets.insert("cert-manager", "f5xc-credentials", "api-token", "s3cr3t").await;
///
///     let token = secrets.get("cert-manager", "f5xc-credentials", "api-token").await?;
///     assert_eq!(token, "s3cr3t");
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct MemorySecretLookup {
    inner: Arc<RwLock<SecretMap>>,
}

// Values stay out of Debug output
impl std::fmt::Debug for MemorySecretLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySecretLookup")
            .field("secrets", &"<REDACTED>")
            .finish()
    }
}

impl MemorySecretLookup {
    /// Create a new empty secret lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a secret lookup pre-populated with
    /// `(namespace, name, key, value)` entries
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S, S)>,
        S: Into<String>,
    {
        let mut map = SecretMap::new();
        for (namespace, name, key, value) in entries {
            map.entry((namespace.into(), name.into()))
                .or_default()
                .insert(key.into(), value.into());
        }

        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Store one key of a secret, replacing any previous value
    pub async fn insert(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        let mut guard = self.inner.write().await;
        guard
            .entry((namespace.into(), name.into()))
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Remove a whole secret
    pub async fn remove(&self, namespace: &str, name: &str) {
        let mut guard = self.inner.write().await;
        guard.remove(&(namespace.to_string(), name.to_string()));
    }
}

#[async_trait]
impl SecretLookup for MemorySecretLookup {
    async fn get(&self, namespace: &str, name: &str, key: &str) -> Result<String, Error> {
        let guard = self.inner.read().await;

        let secret = guard
            .get(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| {
                Error::secret_not_found(format!("secret '{}/{}' not found", namespace, name))
            })?;

        secret.get(key).cloned().ok_or_else(|| {
            Error::secret_not_found(format!(
                "key {:?} not found in secret '{}/{}'",
                key, namespace, name
            ))
        })
    }
}
