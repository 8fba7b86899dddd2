// # TXT Record API Trait
//
// Defines the interface for reading and mutating a single TXT resource
// record set (RRSet) through a DNS provider's REST API.
//
// ## Implementations
//
// - F5 Distributed Cloud: `acme-txt-provider-f5xc` crate
//
// ## Usage
//
// ```rust,ignore
// use acme_txt_core::traits::{RecordKey, TxtRecordApi};
//
// async fn show(api: &dyn TxtRecordApi) -> acme_txt_core::Result<()> {
//     let key = RecordKey::new("example.com", "acme", "_acme-challenge");
//
//     match api.fetch(&key).await? {
//         Some(record) => println!("{} -> {:?}", key, record.values),
//         None => println!("{} does not exist yet", key),
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SolverConfig;

/// TTL (seconds) given to every record created for a challenge
pub const CHALLENGE_RECORD_TTL: u32 = 60;

/// Natural key of a record set: zone, group and record name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    /// The DNS zone under management
    pub zone_name: String,
    /// Provider-specific grouping of record sets within the zone
    pub group_name: String,
    /// Record name relative to the zone (e.g. "_acme-challenge")
    pub record_name: String,
}

impl RecordKey {
    /// Create a new record key
    pub fn new(
        zone_name: impl Into<String>,
        group_name: impl Into<String>,
        record_name: impl Into<String>,
    ) -> Self {
        Self {
            zone_name: zone_name.into(),
            group_name: group_name.into(),
            record_name: record_name.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zone_name, self.group_name, self.record_name)
    }
}

/// A TXT record set as stored by the provider
///
/// `values` is the only field the solver ever changes. Everything the
/// provider returns beyond the modelled fields is kept in `extra` and sent
/// back untouched on a full-record replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    /// The DNS zone under management
    pub zone_name: String,
    /// Provider-specific grouping of record sets within the zone
    pub group_name: String,
    /// Record name relative to the zone
    pub record_name: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// TXT payloads currently published under this name, in provider order
    pub values: Vec<String>,
    /// Provider-specific fields, round-tripped verbatim
    #[serde(default)]
    pub extra: serde_json::Value,
}

impl RecordSet {
    /// Create a record set as it looks right after creation
    pub fn new(key: &RecordKey, values: Vec<String>) -> Self {
        Self {
            zone_name: key.zone_name.clone(),
            group_name: key.group_name.clone(),
            record_name: key.record_name.clone(),
            ttl: CHALLENGE_RECORD_TTL,
            values,
            extra: serde_json::Value::Null,
        }
    }

    /// The natural key of this record set
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.zone_name, &self.group_name, &self.record_name)
    }

    /// Whether `value` is currently published
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Copy of this record set carrying a different value set
    pub fn with_values(&self, values: Vec<String>) -> Self {
        Self {
            values,
            ..self.clone()
        }
    }
}

/// Trait for TXT record API clients
///
/// One implementation talks to one provider tenant with one credential.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to the provider endpoint only
/// - ✅ Translate status codes into [`crate::Error`] variants
///
/// ## Forbidden Capabilities
/// - ❌ Decide the value set of a record (owned by [`crate::mutator`])
/// - ❌ Retry, back off or sleep (owned by the caller)
/// - ❌ Issue more than one HTTP request per method call
/// - ❌ Log the API token
#[async_trait]
pub trait TxtRecordApi: Send + Sync {
    /// Read a record set
    ///
    /// # Returns
    ///
    /// - `Ok(Some(RecordSet))`: The record exists
    /// - `Ok(None)`: The provider reported "not found"
    /// - `Err(Error)`: Any other failure
    async fn fetch(&self, key: &RecordKey) -> Result<Option<RecordSet>, crate::Error>;

    /// Create a record set holding exactly one value, with TTL
    /// [`CHALLENGE_RECORD_TTL`]
    async fn create(&self, key: &RecordKey, initial_value: &str)
    -> Result<RecordSet, crate::Error>;

    /// Replace a record set with `record`, whose values are already final
    async fn replace(
        &self,
        key: &RecordKey,
        record: &RecordSet,
    ) -> Result<RecordSet, crate::Error>;

    /// Delete a record set
    ///
    /// Deleting a record that does not exist succeeds.
    async fn delete(&self, key: &RecordKey) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing API clients once the credential is known
///
/// The reconciler resolves the API token per call and hands it to the
/// factory, so a factory holds only what is shared across calls (the HTTP
/// transport, endpoint overrides).
pub trait TxtRecordApiFactory: Send + Sync {
    /// Create a client for the tenant named in `config`
    fn create(
        &self,
        config: &SolverConfig,
        api_token: &str,
    ) -> Result<Box<dyn TxtRecordApi>, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key_display() {
        let key = RecordKey::new("example.com", "g1", "_acme-challenge");
        assert_eq!(key.to_string(), "example.com/g1/_acme-challenge");
    }

    #[test]
    fn test_with_values_keeps_extra_fields() {
        let key = RecordKey::new("example.com", "g1", "_acme-challenge");
        let mut record = RecordSet::new(&key, vec!["tok-1".to_string()]);
        record.extra = serde_json::json!({ "description": "managed" });

        let updated = record.with_values(vec!["tok-1".to_string(), "tok-2".to_string()]);

        assert_eq!(updated.values, vec!["tok-1", "tok-2"]);
        assert_eq!(updated.extra, record.extra);
        assert_eq!(updated.key(), key);
        assert_eq!(updated.ttl, CHALLENGE_RECORD_TTL);
    }
}
