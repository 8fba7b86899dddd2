//! Core traits for the ACME TXT solver
//!
//! This module defines the abstract interfaces the reconciler is wired with.
//!
//! - [`TxtRecordApi`]: Read and mutate one TXT record set at the provider
//! - [`TxtRecordApiFactory`]: Build an API client once the credential is known
//! - [`SecretLookup`]: Resolve the API credential

pub mod secret_lookup;
pub mod txt_record_api;

pub use secret_lookup::SecretLookup;
pub use txt_record_api::{
    CHALLENGE_RECORD_TTL, RecordKey, RecordSet, TxtRecordApi, TxtRecordApiFactory,
};
