//! Contract Test: Present
//!
//! Constraints verified:
//! - An absent record is created with the key as its only value
//! - A key that is already published causes zero writes
//! - A new key is appended, existing values are never dropped
//! - Provider-specific fields survive a full-record replace
//!
//! If this test fails, Present is no longer idempotent or additive.

mod common;

use acme_txt_core::ReconcileOutcome;
use acme_txt_core::traits::RecordSet;
use common::*;

#[tokio::test]
async fn present_on_absent_record_creates_it() {
    let api = MockTxtRecordApi::new();
    let (reconciler, factory) = reconciler(&api);

    let outcome = reconciler.present(&challenge("tok-1")).await.unwrap();

    assert_eq!(
        outcome,
        ReconcileOutcome::Created {
            values: vec!["tok-1".to_string()]
        }
    );
    assert_eq!(api.fetch_call_count(), 1);
    assert_eq!(
        api.writes(),
        vec![WriteCall::Create {
            key: challenge_key(),
            initial_value: "tok-1".to_string(),
        }]
    );

    // The credential was resolved from the challenge namespace
    assert_eq!(factory.tokens(), vec![API_TOKEN.to_string()]);
    assert_eq!(factory.tenants(), vec!["acme-corp".to_string()]);
}

#[tokio::test]
async fn present_with_published_key_writes_nothing() {
    let api = MockTxtRecordApi::new();
    api.seed(&challenge_key(), &["tok-1"]);
    let (reconciler, _factory) = reconciler(&api);

    let outcome = reconciler.present(&challenge("tok-1")).await.unwrap();

    assert_eq!(outcome, ReconcileOutcome::Unchanged);
    assert_eq!(api.fetch_call_count(), 1);
    assert_eq!(api.write_count(), 0, "Expected zero writes for a published key");
}

#[tokio::test]
async fn present_appends_new_key() {
    let api = MockTxtRecordApi::new();
    api.seed(&challenge_key(), &["tok-1"]);
    let (reconciler, _factory) = reconciler(&api);

    let outcome = reconciler.present(&challenge("tok-2")).await.unwrap();

    assert_eq!(
        outcome,
        ReconcileOutcome::Updated {
            values: vec!["tok-1".to_string(), "tok-2".to_string()]
        }
    );
    assert_eq!(
        api.writes(),
        vec![WriteCall::Replace {
            key: challenge_key(),
            values: vec!["tok-1".to_string(), "tok-2".to_string()],
        }]
    );
}

#[tokio::test]
async fn repeated_present_writes_once() {
    let api = MockTxtRecordApi::new();
    let (reconciler, _factory) = reconciler(&api);

    let first = reconciler.present(&challenge("tok-1")).await.unwrap();
    let second = reconciler.present(&challenge("tok-1")).await.unwrap();

    assert!(first.wrote());
    assert_eq!(second, ReconcileOutcome::Unchanged);
    assert_eq!(api.fetch_call_count(), 2);
    assert_eq!(
        api.write_count(),
        1,
        "Expected 1 write for 2 identical Present calls"
    );
    assert_eq!(api.record(&challenge_key()).unwrap().values, vec!["tok-1"]);
}

#[tokio::test]
async fn concurrent_challenges_share_one_record() {
    let api = MockTxtRecordApi::new();
    let (reconciler, _factory) = reconciler(&api);

    reconciler.present(&challenge("tok-1")).await.unwrap();
    reconciler.present(&challenge("tok-2")).await.unwrap();
    reconciler.present(&challenge("tok-3")).await.unwrap();

    assert_eq!(
        api.record(&challenge_key()).unwrap().values,
        vec!["tok-1", "tok-2", "tok-3"]
    );
}

#[tokio::test]
async fn present_keeps_provider_fields_on_replace() {
    let api = MockTxtRecordApi::new();
    let mut existing = RecordSet::new(&challenge_key(), vec!["tok-1".to_string()]);
    existing.ttl = 300;
    existing.extra = serde_json::json!({ "description": "managed by issuer" });
    api.seed_record(existing.clone());
    let (reconciler, _factory) = reconciler(&api);

    reconciler.present(&challenge("tok-2")).await.unwrap();

    let stored = api.record(&challenge_key()).unwrap();
    assert_eq!(stored.values, vec!["tok-1", "tok-2"]);
    assert_eq!(stored.ttl, 300);
    assert_eq!(stored.extra, existing.extra);
}

#[tokio::test]
async fn present_uses_configured_record_name() {
    let api = MockTxtRecordApi::new();
    let (reconciler, _factory) = reconciler(&api);

    let mut config = config_blob();
    config["recordName"] = serde_json::json!("_acme-challenge.www");

    reconciler
        .present(&challenge_with_config("tok-1", config))
        .await
        .unwrap();

    let key = acme_txt_core::RecordKey::new("example.com", "g1", "_acme-challenge.www");
    assert_eq!(api.record(&key).unwrap().values, vec!["tok-1"]);
    assert!(api.record(&challenge_key()).is_none());
}

#[tokio::test]
async fn reconciler_reports_solver_name() {
    let api = MockTxtRecordApi::new();
    let (reconciler, _factory) = reconciler(&api);
    assert_eq!(reconciler.name(), "mock");
}
