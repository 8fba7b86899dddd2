//! Test doubles and common utilities for reconciler contract tests
//!
//! The mock API keeps record sets in memory and counts every call, so tests
//! can assert exactly how many reads and writes a Present/CleanUp issued.

#![allow(dead_code)]

use acme_txt_core::config::SolverConfig;
use acme_txt_core::error::{Error, Result};
use acme_txt_core::secrets::MemorySecretLookup;
use acme_txt_core::traits::{RecordKey, RecordSet, TxtRecordApi, TxtRecordApiFactory};
use acme_txt_core::{ChallengeReconciler, ChallengeRequest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const NAMESPACE: &str = "cert-manager";
pub const SECRET_NAME: &str = "f5xc-credentials";
pub const SECRET_KEY: &str = "api-token";
pub const API_TOKEN: &str = "test-api-token";

/// A write the mock API received
#[derive(Debug, Clone, PartialEq)]
pub enum WriteCall {
    Create { key: RecordKey, initial_value: String },
    Replace { key: RecordKey, values: Vec<String> },
    Delete { key: RecordKey },
}

/// An in-memory TxtRecordApi that tracks calls
#[derive(Clone, Default)]
pub struct MockTxtRecordApi {
    records: Arc<Mutex<HashMap<RecordKey, RecordSet>>>,
    fetch_call_count: Arc<AtomicUsize>,
    writes: Arc<Mutex<Vec<WriteCall>>>,
    next_fetch_error: Arc<Mutex<Option<Error>>>,
    next_write_error: Arc<Mutex<Option<Error>>>,
}

impl MockTxtRecordApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record set as if it already existed at the provider
    pub fn seed(&self, key: &RecordKey, values: &[&str]) {
        let record = RecordSet::new(key, values.iter().map(|v| v.to_string()).collect());
        self.records.lock().unwrap().insert(key.clone(), record);
    }

    /// Seed a full record set
    pub fn seed_record(&self, record: RecordSet) {
        self.records.lock().unwrap().insert(record.key(), record);
    }

    /// Current record set stored under `key`
    pub fn record(&self, key: &RecordKey) -> Option<RecordSet> {
        self.records.lock().unwrap().get(key).cloned()
    }

    /// Get the number of times fetch() was called
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }

    /// Get every write received, in order
    pub fn writes(&self) -> Vec<WriteCall> {
        self.writes.lock().unwrap().clone()
    }

    /// Get the number of writes received
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Make the next fetch() fail with `error`
    pub fn fail_next_fetch(&self, error: Error) {
        *self.next_fetch_error.lock().unwrap() = Some(error);
    }

    /// Make the next write fail with `error`
    pub fn fail_next_write(&self, error: Error) {
        *self.next_write_error.lock().unwrap() = Some(error);
    }

    fn take_write_error(&self) -> Result<()> {
        match self.next_write_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl TxtRecordApi for MockTxtRecordApi {
    async fn fetch(&self, key: &RecordKey) -> Result<Option<RecordSet>> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_fetch_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.record(key))
    }

    async fn create(&self, key: &RecordKey, initial_value: &str) -> Result<RecordSet> {
        self.writes.lock().unwrap().push(WriteCall::Create {
            key: key.clone(),
            initial_value: initial_value.to_string(),
        });
        self.take_write_error()?;

        let record = RecordSet::new(key, vec![initial_value.to_string()]);
        self.records
            .lock()
            .unwrap()
            .insert(key.clone(), record.clone());
        Ok(record)
    }

    async fn replace(&self, key: &RecordKey, record: &RecordSet) -> Result<RecordSet> {
        self.writes.lock().unwrap().push(WriteCall::Replace {
            key: key.clone(),
            values: record.values.clone(),
        });
        self.take_write_error()?;

        self.records
            .lock()
            .unwrap()
            .insert(key.clone(), record.clone());
        Ok(record.clone())
    }

    async fn delete(&self, key: &RecordKey) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push(WriteCall::Delete { key: key.clone() });
        self.take_write_error()?;

        self.records.lock().unwrap().remove(key);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A factory handing out clones of one shared MockTxtRecordApi
#[derive(Clone, Default)]
pub struct MockApiFactory {
    api: MockTxtRecordApi,
    tokens: Arc<Mutex<Vec<String>>>,
    tenants: Arc<Mutex<Vec<String>>>,
}

impl MockApiFactory {
    pub fn new(api: &MockTxtRecordApi) -> Self {
        Self {
            api: api.clone(),
            ..Default::default()
        }
    }

    /// API tokens the factory was called with
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    /// Tenants the factory was called with
    pub fn tenants(&self) -> Vec<String> {
        self.tenants.lock().unwrap().clone()
    }
}

impl TxtRecordApiFactory for MockApiFactory {
    fn create(&self, config: &SolverConfig, api_token: &str) -> Result<Box<dyn TxtRecordApi>> {
        self.tokens.lock().unwrap().push(api_token.to_string());
        self.tenants.lock().unwrap().push(config.tenant_name.clone());
        Ok(Box::new(self.api.clone()))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// The record key every test challenge resolves to
pub fn challenge_key() -> RecordKey {
    RecordKey::new("example.com", "g1", "_acme-challenge")
}

/// Solver configuration blob for zone example.com / group g1
pub fn config_blob() -> serde_json::Value {
    serde_json::json!({
        "tenantName": "acme-corp",
        "zoneName": "example.com",
        "rrGroupName": "g1",
        "apiKeySecretRef": { "name": SECRET_NAME, "key": SECRET_KEY }
    })
}

/// Challenge for example.com carrying `key`
pub fn challenge(key: &str) -> ChallengeRequest {
    ChallengeRequest::new(NAMESPACE, "example.com", key, config_blob())
}

/// Challenge for example.com carrying `key` and a custom configuration blob
pub fn challenge_with_config(key: &str, config: serde_json::Value) -> ChallengeRequest {
    ChallengeRequest::new(NAMESPACE, "example.com", key, config)
}

/// Secret lookup holding the test credential
pub fn secrets() -> MemorySecretLookup {
    MemorySecretLookup::from_entries([(NAMESPACE, SECRET_NAME, SECRET_KEY, API_TOKEN)])
}

/// Reconciler wired to `api` and the test credential
pub fn reconciler(api: &MockTxtRecordApi) -> (ChallengeReconciler, MockApiFactory) {
    let factory = MockApiFactory::new(api);
    let reconciler = ChallengeReconciler::new(Box::new(secrets()), Box::new(factory.clone()));
    (reconciler, factory)
}
