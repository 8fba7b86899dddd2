// # acme-txt-core
//
// Core library for publishing ACME DNS-01 challenge tokens as TXT records.
//
// ## Architecture Overview
//
// - **TxtRecordApi**: Trait for reading and mutating one TXT record set
// - **SecretLookup**: Trait for resolving the provider API credential
// - **mutator**: Pure planning of create / update / no-op
// - **ChallengeReconciler**: Present/CleanUp orchestration
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Planning is pure, I/O stays in the client
// 2. **Idempotency**: Repeated Present/CleanUp calls never write twice
// 3. **Selective Cleanup**: Only the challenge's own value is removed
// 4. **Library-First**: The daemon is a thin wrapper around this crate

pub mod challenge;
pub mod config;
pub mod error;
pub mod mutator;
pub mod reconciler;
pub mod secrets;
pub mod traits;

// Re-export core types for convenience
pub use challenge::ChallengeRequest;
pub use config::{SecretKeyRef, SolverConfig};
pub use error::{Error, Result};
pub use mutator::{Plan, plan_clean_up, plan_present};
pub use reconciler::{ChallengeReconciler, ReconcileOutcome};
pub use secrets::{DirSecretLookup, MemorySecretLookup};
pub use traits::{RecordKey, RecordSet, SecretLookup, TxtRecordApi, TxtRecordApiFactory};
