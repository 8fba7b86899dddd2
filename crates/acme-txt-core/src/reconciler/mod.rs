//! Challenge reconciler
//!
//! The ChallengeReconciler is responsible for:
//! - Decoding the solver configuration of a challenge
//! - Resolving the API credential via SecretLookup
//! - Reading the current record set via TxtRecordApi
//! - Writing back only when the mutator says a change is needed
//!
//! ## Architecture
//!
//! ```text
//!                      ┌─────────────────────┐
//!   ChallengeRequest ──│ ChallengeReconciler │
//!                      └─────────────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//! ┌───────────────┐      ┌─────────────────┐      ┌───────────────┐
//! │ SecretLookup  │      │  TxtRecordApi   │      │    mutator    │
//! │ (credential)  │      │ (fetch / write) │      │    (plan)     │
//! └───────────────┘      └─────────────────┘      └───────────────┘
//! ```
//!
//! ## Call Flow
//!
//! 1. Decode and validate the configuration blob
//! 2. Resolve the API token and build a client
//! 3. Fetch the record set (absent is a valid answer)
//! 4. Plan the change
//! 5. Perform at most one write
//!
//! Each call is a single attempt: at most one read and one write, no retry,
//! no locking. Errors propagate unchanged so the issuer can retry on its own
//! schedule.

use tracing::{debug, info};

use crate::challenge::ChallengeRequest;
use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::mutator::{Plan, plan_clean_up, plan_present};
use crate::traits::{RecordKey, RecordSet, SecretLookup, TxtRecordApi, TxtRecordApiFactory};

/// What a Present or CleanUp call wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The record set already had the desired state (no write)
    Unchanged,
    /// The record set was created
    Created {
        /// Values of the new record set
        values: Vec<String>,
    },
    /// The value set of the record set was replaced
    Updated {
        /// Values after the update
        values: Vec<String>,
    },
    /// The emptied record set was deleted
    Deleted,
}

impl ReconcileOutcome {
    /// Whether the provider was written to
    pub fn wrote(&self) -> bool {
        !matches!(self, ReconcileOutcome::Unchanged)
    }
}

/// Everything a single call needs once the challenge is resolved
struct Target {
    config: SolverConfig,
    key: RecordKey,
    api: Box<dyn TxtRecordApi>,
}

/// Present/CleanUp state machine for DNS-01 challenges
///
/// ## Lifecycle
///
/// 1. Create with [`ChallengeReconciler::new()`], injecting the secret
///    lookup and the API client factory
/// 2. Call [`ChallengeReconciler::present()`] before validation
/// 3. Call [`ChallengeReconciler::clean_up()`] afterwards
///
/// Both calls are safe to repeat.
pub struct ChallengeReconciler {
    /// Resolves the API credential
    secrets: Box<dyn SecretLookup>,

    /// Builds API clients once the credential is known
    factory: Box<dyn TxtRecordApiFactory>,
}

impl ChallengeReconciler {
    /// Create a new reconciler
    pub fn new(secrets: Box<dyn SecretLookup>, factory: Box<dyn TxtRecordApiFactory>) -> Self {
        Self { secrets, factory }
    }

    /// Solver name, as referenced from the issuer configuration
    pub fn name(&self) -> &'static str {
        self.factory.provider_name()
    }

    /// Publish the challenge key
    ///
    /// Creates the record set if it does not exist, appends the key if it is
    /// missing, and does nothing if the key is already published.
    pub async fn present(&self, challenge: &ChallengeRequest) -> Result<ReconcileOutcome> {
        info!("Got challenge for {}", challenge.dns_name);

        let target = self.resolve(challenge).await?;
        let existing = target.api.fetch(&target.key).await?;

        match &existing {
            Some(record) => debug!(
                record = %target.key,
                values = record.values.len(),
                "Found existing TXT record"
            ),
            None => info!(
                record = %target.key,
                "No existing TXT record found, a new TXT record will be created"
            ),
        }

        let plan = plan_present(existing.as_ref(), &challenge.key);
        let outcome = self.apply(&target, existing, plan).await?;

        match outcome {
            ReconcileOutcome::Unchanged => info!(
                record = %target.key,
                "Challenge key already exists in record, not applying any change"
            ),
            _ => info!("Created DNS challenge record for {}", challenge.dns_name),
        }

        Ok(outcome)
    }

    /// Remove the challenge key
    ///
    /// Only the key of this challenge is removed; values published for other
    /// challenges on the same name stay. An absent record or key is not an
    /// error.
    pub async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<ReconcileOutcome> {
        info!("Cleaning up challenge for {}", challenge.dns_name);

        let target = self.resolve(challenge).await?;
        let existing = target.api.fetch(&target.key).await?;

        let plan = plan_clean_up(existing.as_ref(), &challenge.key);
        let outcome = self.apply(&target, existing, plan).await?;

        match outcome {
            ReconcileOutcome::Unchanged => info!(
                record = %target.key,
                "Challenge key not present in record, nothing to clean up"
            ),
            _ => info!("Cleaned up DNS challenge record for {}", challenge.dns_name),
        }

        Ok(outcome)
    }

    /// Resolve configuration, credential, record key and API client
    async fn resolve(&self, challenge: &ChallengeRequest) -> Result<Target> {
        let config = SolverConfig::from_challenge(challenge)?;

        if challenge.key.is_empty() {
            return Err(Error::config("challenge key is empty"));
        }

        let record_name = config.record_name_for(challenge)?;

        let secret_ref = &config.api_key_secret_ref;
        let api_token = self
            .secrets
            .get(&challenge.resource_namespace, &secret_ref.name, &secret_ref.key)
            .await?;

        let api = self.factory.create(&config, &api_token)?;

        let key = RecordKey::new(
            config.zone_name.trim_end_matches('.'),
            &config.group_name,
            record_name,
        );

        debug!(
            provider = api.provider_name(),
            tenant = %config.tenant_name,
            record = %key,
            "Resolved challenge target"
        );

        Ok(Target { config, key, api })
    }

    /// Execute a plan against the provider
    async fn apply(
        &self,
        target: &Target,
        existing: Option<RecordSet>,
        plan: Plan,
    ) -> Result<ReconcileOutcome> {
        match (plan, existing) {
            (Plan::NoOp, _) => Ok(ReconcileOutcome::Unchanged),

            (Plan::Create { initial_value }, _) => {
                let created = target.api.create(&target.key, &initial_value).await?;
                Ok(ReconcileOutcome::Created {
                    values: created.values,
                })
            }

            (Plan::Update { values }, Some(_))
                if values.is_empty() && target.config.delete_empty_record =>
            {
                info!(record = %target.key, "Record has no values left, deleting it");
                target.api.delete(&target.key).await?;
                Ok(ReconcileOutcome::Deleted)
            }

            (Plan::Update { values }, Some(existing)) => {
                debug!(record = %target.key, values = ?values, "Updating TXT record");
                let replacement = existing.with_values(values);
                let updated = target.api.replace(&target.key, &replacement).await?;
                Ok(ReconcileOutcome::Updated {
                    values: updated.values,
                })
            }

            (Plan::Update { .. }, None) => Err(Error::Other(format!(
                "update planned for {} without an existing record",
                target.key
            ))),
        }
    }
}
