//! Configuration types for the ACME TXT solver
//!
//! The issuer hands the solver an opaque JSON blob per challenge. It is
//! decoded into [`SolverConfig`] once per Present/CleanUp call and never
//! mutated afterwards.
//!
//! ```json
//! {
//!   "tenantName": "acme-corp",
//!   "zoneName": "example.com",
//!   "rrGroupName": "acme",
//!   "apiKeySecretRef": { "name": "f5xc-credentials", "key": "api-token" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::challenge::ChallengeRequest;
use crate::error::{Error, Result};

/// Label the issuer publishes DNS-01 tokens under
pub const ACME_CHALLENGE_LABEL: &str = "_acme-challenge";

/// Reference to one key of a named secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeyRef {
    /// Secret name
    #[serde(default)]
    pub name: String,
    /// Key within the secret
    #[serde(default)]
    pub key: String,
}

impl SecretKeyRef {
    /// Create a new secret reference
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Validate that both halves of the reference are set
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::config("Missing secret ref name"));
        }
        if self.key.is_empty() {
            return Err(Error::config("Missing secret key name"));
        }
        Ok(())
    }
}

/// Per-challenge solver configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    /// Provider tenant, used to build the API host
    #[serde(default)]
    pub tenant_name: String,

    /// DNS zone under management (e.g. "example.com")
    #[serde(default)]
    pub zone_name: String,

    /// Record set group within the zone
    #[serde(default, rename = "rrGroupName", alias = "groupName")]
    pub group_name: String,

    /// Fixed record name relative to the zone
    ///
    /// When absent, the name is derived from the challenge (see
    /// [`SolverConfig::record_name_for`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_name: Option<String>,

    /// Where the provider API token is stored
    #[serde(default)]
    pub api_key_secret_ref: SecretKeyRef,

    /// Delete the record set when CleanUp removes its last value
    ///
    /// Off by default: an emptied record set is left in place.
    #[serde(default)]
    pub delete_empty_record: bool,
}

impl SolverConfig {
    /// Decode the configuration blob attached to a challenge
    ///
    /// A missing or `null` blob yields an empty configuration, which then
    /// fails [`SolverConfig::validate`].
    pub fn from_json(raw: Option<&serde_json::Value>) -> Result<Self> {
        let raw = match raw {
            None | Some(serde_json::Value::Null) => {
                info!("Empty config loaded");
                return Ok(Self::default());
            }
            Some(raw) => raw,
        };

        let config = serde_json::from_value(raw.clone())
            .map_err(|e| Error::config(format!("error decoding solver config: {}", e)))?;

        info!("Config loaded");
        Ok(config)
    }

    /// Decode and validate the configuration of a challenge
    pub fn from_challenge(challenge: &ChallengeRequest) -> Result<Self> {
        let config = Self::from_json(challenge.config.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.tenant_name.is_empty() {
            return Err(Error::config("tenantName is required"));
        }

        // The tenant becomes the leftmost label of the API host
        if !self
            .tenant_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(Error::config(format!(
                "tenantName '{}' must contain only letters, digits and hyphens",
                self.tenant_name
            )));
        }

        if self.zone_name.trim_end_matches('.').is_empty() {
            return Err(Error::config("zoneName is required"));
        }

        if self.group_name.is_empty() {
            return Err(Error::config("rrGroupName is required"));
        }

        if let Some(ref name) = self.record_name {
            if name.is_empty() {
                return Err(Error::config("recordName cannot be empty when set"));
            }
        }

        self.api_key_secret_ref.validate()
    }

    /// Resolve the record name (relative to the zone) for a challenge
    ///
    /// A configured `recordName` wins. Otherwise the challenge FQDN is taken
    /// from `resolvedFQDN`, or built as `_acme-challenge.<dnsName>` with any
    /// wildcard label dropped, and the zone suffix is stripped from it.
    pub fn record_name_for(&self, challenge: &ChallengeRequest) -> Result<String> {
        if let Some(ref name) = self.record_name {
            return Ok(name.clone());
        }

        let fqdn = match challenge.resolved_fqdn.as_deref() {
            Some(fqdn) if !fqdn.is_empty() => fqdn.to_string(),
            _ => format!(
                "{}.{}",
                ACME_CHALLENGE_LABEL,
                challenge.dns_name.trim_start_matches("*.")
            ),
        };

        let fqdn = fqdn.trim_end_matches('.').to_ascii_lowercase();
        let zone = self.zone_name.trim_end_matches('.').to_ascii_lowercase();

        match fqdn
            .strip_suffix(zone.as_str())
            .and_then(|rest| rest.strip_suffix('.'))
        {
            Some(relative) if !relative.is_empty() => Ok(relative.to_string()),
            _ => Err(Error::config(format!(
                "challenge record '{}' is not inside zone '{}'",
                fqdn, zone
            ))),
        }
    }
}
