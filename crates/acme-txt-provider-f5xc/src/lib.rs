// # F5 Distributed Cloud DNS Provider
//
// This crate provides the TXT record API client for F5 Distributed Cloud
// (F5 XC) DNS zones, used to publish ACME DNS-01 challenge tokens.
//
// ## Implementation Status
//
// - ✅ Exactly one HTTP request per trait method call
// - ✅ Full error propagation to the reconciler (no local recovery)
// - ✅ HTTP timeout configured through the factory (30 seconds by default)
// - ✅ Uniform status interpretation (2xx, 401, 403, 404, other)
// - ✅ Full-record replace keeps every field the API returned
// - ✅ Injected `reqwest::Client`, no process-wide client
// - ❌ NO retry logic (owned by the calling framework)
// - ❌ NO backoff or rate limiting (owned by the calling framework)
// - ❌ NO value-set decisions (owned by the record mutator)
// - ❌ NO caching between calls
//
// ## Trust Level: Untrusted (DNS Provider)
//
// **Allowed Capabilities**:
// - ✅ Perform HTTPS API calls to the tenant endpoint only
// - ✅ Parse provider-specific responses
//
// **Forbidden Capabilities**:
// - ❌ Spawn tasks or threads
// - ❌ Implement retry logic
// - ❌ Access secret storage (the token is handed in by the reconciler)
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Client construction fails if the token is empty or not header-safe
//
// ## API Reference
//
// Base: `https://{tenant}.console.ves.volterra.io/api`
//
// - Get:    GET    `config/dns/namespaces/system/dns_zones/{zone}/rrsets/{group}/{name}/TXT`
// - Create: POST   `config/dns/namespaces/system/dns_zones/{zone}/rrsets/{group}`
// - Update: PUT    `config/dns/namespaces/system/dns_zones/{zone}/rrsets/{group}/{name}/TXT`
// - Delete: DELETE `config/dns/namespaces/system/dns_zones/{zone}/rrsets/{group}/{name}/TXT`

pub mod wire;

use acme_txt_core::config::SolverConfig;
use acme_txt_core::traits::{RecordKey, RecordSet, TxtRecordApi, TxtRecordApiFactory};
use acme_txt_core::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::wire::RrSetDocument;

/// Name under which the solver is registered with the issuer
pub const PROVIDER_NAME: &str = "f5-xc";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Host suffix of tenant API endpoints
const API_HOST_SUFFIX: &str = "console.ves.volterra.io";

/// Media type sent as both Content-Type and Accept
const JSON_MEDIA_TYPE: &str = "application/json; charset=utf-8";

/// Path from the API root to the zone collection
const ZONES_PATH: [&str; 5] = ["config", "dns", "namespaces", "system", "dns_zones"];

/// API base URL of a tenant
pub fn tenant_base_url(tenant: &str) -> String {
    format!("https://{tenant}.{API_HOST_SUFFIX}/api")
}

/// Interpreted response of a single API call
///
/// Only the statuses a caller can act on survive as values; every other
/// status has already become an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome {
    /// 2xx, carrying the response body
    Success(String),
    /// 404
    NotFound,
}

/// Map an HTTP status and body to an [`ApiOutcome`] or a typed error
///
/// - 2xx → `Success(body)`
/// - 404 → `NotFound`
/// - 401 → [`Error::Authentication`]
/// - 403 → [`Error::Permission`]
/// - anything else → [`Error::Transport`] with the decoded diagnostic
///   payload, or the raw body when it is not JSON
pub fn interpret(status: u16, body: String) -> Result<ApiOutcome> {
    match status {
        200..=299 => Ok(ApiOutcome::Success(body)),
        404 => Ok(ApiOutcome::NotFound),
        401 => Err(Error::auth("credentials not valid")),
        403 => Err(Error::permission("permission missing for requested resource")),
        _ => {
            let body = match serde_json::from_str::<Value>(&body) {
                Ok(payload) => {
                    error!(status, %payload, "Unexpected response from DNS API");
                    payload.to_string()
                }
                Err(e) => {
                    error!(status, error = %e, %body, "Unexpected response from DNS API, body is not JSON");
                    body
                }
            };
            Err(Error::transport(status, body))
        }
    }
}

/// F5 XC TXT record API client
///
/// # Trust Level: Untrusted
///
/// Stateless and single-shot: every method issues exactly one request and
/// returns whatever the API answered.
///
/// # Security
///
/// The Debug implementation does NOT expose the API token.
#[derive(Clone)]
pub struct F5xcClient {
    /// Shared HTTP transport
    http: reqwest::Client,

    /// API root, e.g. `https://acme.console.ves.volterra.io/api`
    base_url: Url,

    /// Pre-built `APIToken <token>` header, marked sensitive
    /// ⚠️ NEVER log this value
    authorization: HeaderValue,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for F5xcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("F5xcClient")
            .field("base_url", &self.base_url.as_str())
            .field("authorization", &"<REDACTED>")
            .finish()
    }
}

impl F5xcClient {
    /// Create a client for a tenant's public API endpoint
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the token is empty or contains characters not
    /// allowed in an HTTP header, or if the tenant does not form a valid host.
    pub fn new(http: reqwest::Client, tenant: &str, api_token: &str) -> Result<Self> {
        Self::with_base_url(http, &tenant_base_url(tenant), api_token)
    }

    /// Create a client for an explicit API root
    pub fn with_base_url(http: reqwest::Client, base_url: &str, api_token: &str) -> Result<Self> {
        if api_token.is_empty() {
            return Err(Error::config("F5 XC API token is required"));
        }

        let mut authorization = HeaderValue::from_str(&format!("APIToken {api_token}"))
            .map_err(|_| Error::config("F5 XC API token contains characters not allowed in a header"))?;
        authorization.set_sensitive(true);

        let base_url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("invalid DNS API base URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "DNS API base URL {base_url} cannot carry a path"
            )));
        }

        Ok(Self {
            http,
            base_url,
            authorization,
        })
    }

    /// API root this client talks to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `.../dns_zones/{zone}/rrsets/{group}`
    fn group_url(&self, key: &RecordKey) -> Result<Url> {
        self.endpoint(&[key.zone_name.as_str(), "rrsets", key.group_name.as_str()])
    }

    /// `.../dns_zones/{zone}/rrsets/{group}/{name}/TXT`
    fn record_url(&self, key: &RecordKey) -> Result<Url> {
        self.endpoint(&[
            key.zone_name.as_str(),
            "rrsets",
            key.group_name.as_str(),
            key.record_name.as_str(),
            "TXT",
        ])
    }

    fn endpoint(&self, tail: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config("DNS API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(ZONES_PATH)
            .extend(tail);
        Ok(url)
    }

    /// Issue one request and interpret its status
    async fn send(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<ApiOutcome> {
        debug!(%method, %url, "Sending DNS API request");

        let mut request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .header(AUTHORIZATION, self.authorization.clone());
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(network_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(network_error)?;

        debug!(status, "Received DNS API response");
        interpret(status, body)
    }

    /// Issue a write whose response carries the stored record set
    async fn write(
        &self,
        method: Method,
        url: Url,
        key: &RecordKey,
        document: &RrSetDocument,
    ) -> Result<RecordSet> {
        let body = serde_json::to_vec(document).map_err(|e| Error::encoding(e.to_string()))?;

        match self.send(method, url, Some(body)).await? {
            ApiOutcome::Success(body) => Ok(decode(&body)?.into_record(key)),
            ApiOutcome::NotFound => Err(Error::transport(
                404,
                format!("zone or group of {key} not found"),
            )),
        }
    }
}

fn network_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::network(format!("request timed out: {e}"))
    } else {
        Error::network(format!("HTTP request failed: {e}"))
    }
}

fn decode(body: &str) -> Result<RrSetDocument> {
    serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "Error decoding JSON response");
        Error::decoding(e.to_string())
    })
}

#[async_trait]
impl TxtRecordApi for F5xcClient {
    async fn fetch(&self, key: &RecordKey) -> Result<Option<RecordSet>> {
        info!(
            "Getting record {:?} from group {:?} for zone {:?}",
            key.record_name, key.group_name, key.zone_name
        );

        match self.send(Method::GET, self.record_url(key)?, None).await? {
            ApiOutcome::Success(body) => Ok(Some(decode(&body)?.into_record(key))),
            ApiOutcome::NotFound => Ok(None),
        }
    }

    async fn create(&self, key: &RecordKey, initial_value: &str) -> Result<RecordSet> {
        info!(record = %key, "Creating TXT record");

        let document = RrSetDocument::for_create(key, initial_value);
        self.write(Method::POST, self.group_url(key)?, key, &document)
            .await
    }

    async fn replace(&self, key: &RecordKey, record: &RecordSet) -> Result<RecordSet> {
        info!(record = %key, values = record.values.len(), "Updating TXT record");

        let document = RrSetDocument::from_record(record);
        self.write(Method::PUT, self.record_url(key)?, key, &document)
            .await
    }

    async fn delete(&self, key: &RecordKey) -> Result<()> {
        info!(record = %key, "Deleting TXT record");

        match self.send(Method::DELETE, self.record_url(key)?, None).await? {
            ApiOutcome::Success(_) => Ok(()),
            ApiOutcome::NotFound => {
                debug!(record = %key, "TXT record already gone");
                Ok(())
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating F5 XC clients
///
/// Owns the HTTP transport shared by every client it creates. The API token
/// is supplied per call by the reconciler.
#[derive(Debug, Clone)]
pub struct F5xcClientFactory {
    http: reqwest::Client,

    /// Overrides the per-tenant endpoint (private endpoints, tests)
    base_url: Option<String>,
}

impl F5xcClientFactory {
    /// Create a factory with a transport using [`DEFAULT_HTTP_TIMEOUT`]
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a factory with a transport using `timeout` per request
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_http_client(http))
    }

    /// Create a factory around an existing transport
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: None,
        }
    }

    /// Send every request to `base_url` instead of the tenant endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl TxtRecordApiFactory for F5xcClientFactory {
    fn create(&self, config: &SolverConfig, api_token: &str) -> Result<Box<dyn TxtRecordApi>> {
        let client = match &self.base_url {
            Some(base_url) => F5xcClient::with_base_url(self.http.clone(), base_url, api_token)?,
            None => F5xcClient::new(self.http.clone(), &config.tenant_name, api_token)?,
        };

        debug!(base_url = %client.base_url(), "Created F5 XC client");
        Ok(Box::new(client))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
