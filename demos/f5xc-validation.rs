// # F5 XC Provider Real Environment Validation Tool
//
// Runs one Present followed by one CleanUp against a real F5 Distributed
// Cloud tenant, using the same reconciler the solver binary uses.
//
// ## Usage
//
// ```bash
// # Read-only mode (default - safe): fetches the record and prints plans
// F5XC_TENANT=acme-corp \
// F5XC_API_TOKEN=your_token \
// F5XC_ZONE=example.com \
// F5XC_RR_GROUP=acme \
// cargo run -p acme-txt-demos --bin f5xc_validation
//
// # Live mode (makes actual changes!)
// ACME_TXT_MODE=live F5XC_TENANT=... cargo run -p acme-txt-demos --bin f5xc_validation
// ```
//
// ## Environment Variables
//
// Required:
// - `F5XC_TENANT`: Tenant name (first label of the console host)
// - `F5XC_API_TOKEN`: API token with write access to the zone
// - `F5XC_ZONE`: DNS zone (e.g. "example.com")
// - `F5XC_RR_GROUP`: Record set group within the zone
//
// Optional:
// - `ACME_TXT_DNS_NAME`: Domain being validated (default: the zone)
// - `ACME_TXT_TEST_KEY`: TXT value to publish (default: "acme-txt-validation")
// - `ACME_TXT_MODE`: "read-only" or "live" (default: read-only)

use acme_txt_core::secrets::MemorySecretLookup;
use acme_txt_core::traits::{RecordKey, TxtRecordApi, TxtRecordApiFactory};
use acme_txt_core::{
    ChallengeReconciler, ChallengeRequest, SolverConfig, plan_clean_up, plan_present,
};
use acme_txt_provider_f5xc::F5xcClientFactory;
use std::env;

fn required(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        tracing::error!("{} environment variable is required", name);
        std::process::exit(1);
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    tracing::info!("=== F5 XC Provider Real Environment Validation ===");

    let tenant = required("F5XC_TENANT");
    let api_token = required("F5XC_API_TOKEN");
    let zone = required("F5XC_ZONE");
    let group = required("F5XC_RR_GROUP");
    let dns_name = env::var("ACME_TXT_DNS_NAME").unwrap_or_else(|_| zone.clone());
    let test_key =
        env::var("ACME_TXT_TEST_KEY").unwrap_or_else(|_| "acme-txt-validation".to_string());
    let live = env::var("ACME_TXT_MODE").is_ok_and(|mode| mode == "live");

    let challenge = ChallengeRequest::new(
        "validation",
        dns_name,
        test_key,
        serde_json::json!({
            "tenantName": tenant,
            "zoneName": zone,
            "rrGroupName": group,
            "apiKeySecretRef": { "name": "f5xc", "key": "api-token" }
        }),
    );

    let factory = F5xcClientFactory::new()?;

    if !live {
        tracing::info!("Mode: READ-ONLY (set ACME_TXT_MODE=live to write)");

        let config = SolverConfig::from_challenge(&challenge)?;
        let key = RecordKey::new(
            config.zone_name.trim_end_matches('.'),
            &config.group_name,
            config.record_name_for(&challenge)?,
        );
        let api = factory.create(&config, &api_token)?;

        let existing = api.fetch(&key).await?;
        tracing::info!(
            "Current record {}: {:?}",
            key,
            existing.as_ref().map(|r| &r.values)
        );
        tracing::info!("Present would: {:?}", plan_present(existing.as_ref(), &challenge.key));
        tracing::info!("CleanUp would: {:?}", plan_clean_up(existing.as_ref(), &challenge.key));
        return Ok(());
    }

    tracing::warn!("Mode: LIVE - the record set will be modified");

    let secrets = MemorySecretLookup::from_entries([(
        "validation".to_string(),
        "f5xc".to_string(),
        "api-token".to_string(),
        api_token,
    )]);
    let reconciler = ChallengeReconciler::new(Box::new(secrets), Box::new(factory));

    let presented = reconciler.present(&challenge).await?;
    tracing::info!("Present: {:?}", presented);

    let repeated = reconciler.present(&challenge).await?;
    tracing::info!("Present (repeat): {:?}", repeated);
    if repeated.wrote() {
        tracing::error!("Repeated Present wrote to the API");
    }

    let cleaned = reconciler.clean_up(&challenge).await?;
    tracing::info!("CleanUp: {:?}", cleaned);

    tracing::info!("=== Validation complete ===");
    Ok(())
}
