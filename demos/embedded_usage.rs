//! Minimal embedding example for acme-txt-core
//!
//! This example drives the challenge reconciler with an in-process record
//! store instead of a real DNS API. Two challenges for the same name are
//! presented and cleaned up in turn, as happens when a certificate covers
//! both `example.com` and `*.example.com`.

use acme_txt_core::secrets::MemorySecretLookup;
use acme_txt_core::traits::{RecordKey, RecordSet, TxtRecordApi, TxtRecordApiFactory};
use acme_txt_core::{ChallengeReconciler, ChallengeRequest, Result, SolverConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-process record store standing in for the provider
#[derive(Clone, Default)]
struct EmbeddedTxtApi {
    records: Arc<Mutex<HashMap<RecordKey, RecordSet>>>,
    write_calls: Arc<AtomicUsize>,
}

impl EmbeddedTxtApi {
    fn write_count(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn values(&self, key: &RecordKey) -> Option<Vec<String>> {
        self.records
            .lock()
            .unwrap()
            .get(key)
            .map(|record| record.values.clone())
    }
}

#[async_trait::async_trait]
impl TxtRecordApi for EmbeddedTxtApi {
    async fn fetch(&self, key: &RecordKey) -> Result<Option<RecordSet>> {
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    async fn create(&self, key: &RecordKey, initial_value: &str) -> Result<RecordSet> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        println!("[Embedded] POST {} = [{}]", key, initial_value);

        let record = RecordSet::new(key, vec![initial_value.to_string()]);
        self.records
            .lock()
            .unwrap()
            .insert(key.clone(), record.clone());
        Ok(record)
    }

    async fn replace(&self, key: &RecordKey, record: &RecordSet) -> Result<RecordSet> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        println!("[Embedded] PUT  {} = {:?}", key, record.values);

        self.records
            .lock()
            .unwrap()
            .insert(key.clone(), record.clone());
        Ok(record.clone())
    }

    async fn delete(&self, key: &RecordKey) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        println!("[Embedded] DELETE {}", key);

        self.records.lock().unwrap().remove(key);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "embedded"
    }
}

/// Hands out clones of one shared store
struct EmbeddedFactory {
    api: EmbeddedTxtApi,
}

impl TxtRecordApiFactory for EmbeddedFactory {
    fn create(&self, _config: &SolverConfig, _api_token: &str) -> Result<Box<dyn TxtRecordApi>> {
        Ok(Box::new(self.api.clone()))
    }

    fn provider_name(&self) -> &'static str {
        "embedded"
    }
}

fn challenge(dns_name: &str, key: &str) -> ChallengeRequest {
    ChallengeRequest::new(
        "cert-manager",
        dns_name,
        key,
        serde_json::json!({
            "tenantName": "acme-corp",
            "zoneName": "example.com",
            "rrGroupName": "acme",
            "apiKeySecretRef": { "name": "f5xc-credentials", "key": "api-token" }
        }),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded acme-txt-core Example ===\n");

    let api = EmbeddedTxtApi::default();
    let secrets = MemorySecretLookup::from_entries([(
        "cert-manager",
        "f5xc-credentials",
        "api-token",
        "not-a-real-token",
    )]);
    let reconciler = ChallengeReconciler::new(
        Box::new(secrets),
        Box::new(EmbeddedFactory { api: api.clone() }),
    );

    let key = RecordKey::new("example.com", "acme", "_acme-challenge");
    let apex = challenge("example.com", "tok-apex");
    let wildcard = challenge("*.example.com", "tok-wildcard");

    println!("1. Present both challenges");
    println!("   -> {:?}", reconciler.present(&apex).await?);
    println!("   -> {:?}", reconciler.present(&wildcard).await?);
    println!("   values: {:?}\n", api.values(&key));

    println!("2. Present the apex challenge again (no write expected)");
    println!("   -> {:?}\n", reconciler.present(&apex).await?);

    println!("3. Clean up the apex challenge");
    println!("   -> {:?}", reconciler.clean_up(&apex).await?);
    println!("   values: {:?}\n", api.values(&key));

    println!("4. Clean up the wildcard challenge");
    println!("   -> {:?}", reconciler.clean_up(&wildcard).await?);
    println!("   values: {:?}\n", api.values(&key));

    println!("=== {} write(s) issued for 5 calls ===", api.write_count());
    println!("Key Points:");
    println!("- Repeated Present calls do not write");
    println!("- CleanUp removes only the challenge's own token");
    println!("- The emptied record set is left in place");

    Ok(())
}
