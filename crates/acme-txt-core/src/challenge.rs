//! DNS-01 challenge request as handed over by the issuing framework
//!
//! The request is read-only input to the reconciler. Field names follow the
//! framework's camelCase JSON so a request can be decoded as-is.

use serde::{Deserialize, Serialize};

/// A single DNS-01 challenge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Identifier of the challenge (logging only)
    #[serde(default)]
    pub uid: String,

    /// Requested action as named by the framework (logging only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Namespace the credential lookup is scoped to
    #[serde(default)]
    pub resource_namespace: String,

    /// Domain being validated (e.g. "www.example.com")
    pub dns_name: String,

    /// The exact token that must appear as one TXT value
    pub key: String,

    /// Fully-qualified challenge record name, if the framework resolved it
    #[serde(
        default,
        rename = "resolvedFQDN",
        alias = "resolvedFqdn",
        skip_serializing_if = "Option::is_none"
    )]
    pub resolved_fqdn: Option<String>,

    /// Zone the framework resolved for the challenge, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_zone: Option<String>,

    /// Opaque solver configuration blob
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl ChallengeRequest {
    /// Create a challenge request carrying only the required fields
    pub fn new(
        resource_namespace: impl Into<String>,
        dns_name: impl Into<String>,
        key: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            resource_namespace: resource_namespace.into(),
            dns_name: dns_name.into(),
            key: key.into(),
            config: Some(config),
            ..Default::default()
        }
    }
}
