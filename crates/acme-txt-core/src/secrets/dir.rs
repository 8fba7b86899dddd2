// # Directory Secret Lookup
//
// Reads secrets from a mounted directory tree.
//
// ## Layout
//
// ```text
// <root>/
//   <namespace>/
//     <secret name>/
//       <key>          # file content is the value
// ```
//
// This is the layout produced when secrets are mounted as volumes, one file
// per key. A single trailing newline is stripped from the value, since
// hand-written secret files usually end with one.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::Error;
use crate::traits::SecretLookup;

/// Secret lookup backed by a directory tree
#[derive(Debug, Clone)]
pub struct DirSecretLookup {
    root: PathBuf,
}

impl DirSecretLookup {
    /// Create a lookup rooted at `root`
    ///
    /// The directory is not required to exist yet; lookups against a missing
    /// root report [`Error::SecretNotFound`].
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory of this lookup
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject components that would escape the secret's directory
    fn check_component(kind: &str, value: &str) -> Result<(), Error> {
        if value.is_empty()
            || value == "."
            || value == ".."
            || value.contains('/')
            || value.contains('\\')
            || value.contains('\0')
        {
            return Err(Error::config(format!("invalid secret {}: {:?}", kind, value)));
        }
        Ok(())
    }
}

#[async_trait]
impl SecretLookup for DirSecretLookup {
    async fn get(&self, namespace: &str, name: &str, key: &str) -> Result<String, Error> {
        // An empty namespace reads directly below the root
        if !namespace.is_empty() {
            Self::check_component("namespace", namespace)?;
        }
        Self::check_component("name", name)?;
        Self::check_component("key", key)?;

        let secret_dir = self.root.join(namespace).join(name);

        match fs::metadata(&secret_dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(Error::secret_store(format!(
                    "{} is not a directory",
                    secret_dir.display()
                )));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::secret_not_found(format!(
                    "secret '{}/{}' not found",
                    namespace, name
                )));
            }
            Err(e) => {
                return Err(Error::secret_store(format!(
                    "Failed to read {}: {}",
                    secret_dir.display(),
                    e
                )));
            }
        }

        let path = secret_dir.join(key);
        debug!(namespace = %namespace, name = %name, key = %key, "Reading secret");

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::secret_not_found(format!(
                    "key {:?} not found in secret '{}/{}'",
                    key, namespace, name
                )));
            }
            Err(e) => {
                return Err(Error::secret_store(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let value = content
            .strip_suffix("\r\n")
            .or_else(|| content.strip_suffix('\n'))
            .unwrap_or(&content);

        Ok(value.to_string())
    }
}
