// # acme-txtd - ACME DNS-01 solver
//
// ⚠️ ARCHITECTURAL CONSTRAINTS ⚠️
//
// - This is a THIN integration layer ONLY
// - DO NOT add record logic or retry logic here
// - All reconciliation logic MUST be in acme-txt-core
// - Configuration is via environment variables ONLY
//
// One invocation handles one challenge:
// 1. Read configuration from environment variables
// 2. Initialize tracing and the runtime
// 3. Read the challenge request (JSON) from a file or stdin
// 4. Run Present or CleanUp once and exit
//
// ## Usage
//
// ```bash
// acme-txtd present  < challenge.json
// acme-txtd cleanup  < challenge.json
// ```
//
// ## Configuration
//
// - `ACME_TXT_SECRETS_DIR`: Root of mounted secrets, laid out as
//   `<root>/<namespace>/<name>/<key>` (required)
// - `ACME_TXT_CHALLENGE_FILE`: Challenge JSON file (default: stdin)
// - `ACME_TXT_API_BASE_URL`: Override the per-tenant API endpoint
// - `ACME_TXT_HTTP_TIMEOUT_SECS`: Per-request timeout, 1-300 (default: 30)
// - `ACME_TXT_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export ACME_TXT_SECRETS_DIR=/var/run/secrets/acme-txt
// export ACME_TXT_CHALLENGE_FILE=/tmp/challenge.json
//
// acme-txtd present
// ```

use acme_txt_core::{ChallengeReconciler, ChallengeRequest, DirSecretLookup, ReconcileOutcome};
use acme_txt_provider_f5xc::F5xcClientFactory;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: The challenge was reconciled
/// - 1: Configuration or input error
/// - 2: Runtime error (provider, network, secret store)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcmeTxtExitCode {
    /// Success (normal exit)
    Success = 0,
    /// Configuration error or invalid input
    ConfigError = 1,
    /// Runtime error (the caller may retry)
    RuntimeError = 2,
}

impl From<AcmeTxtExitCode> for ExitCode {
    fn from(code: AcmeTxtExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Which half of the challenge lifecycle to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Present,
    CleanUp,
}

impl Action {
    fn parse(arg: Option<&str>) -> Result<Self> {
        match arg {
            Some("present") => Ok(Action::Present),
            Some("cleanup") | Some("clean-up") => Ok(Action::CleanUp),
            Some(other) => anyhow::bail!(
                "Unknown action '{}'. Usage: acme-txtd <present|cleanup>",
                other
            ),
            None => anyhow::bail!("Missing action. Usage: acme-txtd <present|cleanup>"),
        }
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    secrets_dir: PathBuf,
    challenge_file: Option<PathBuf>,
    api_base_url: Option<String>,
    http_timeout_secs: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let http_timeout_secs = match non_empty("ACME_TXT_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().with_context(|| {
                format!("ACME_TXT_HTTP_TIMEOUT_SECS must be a number of seconds. Got: {raw}")
            })?,
            None => 30,
        };

        Ok(Self {
            secrets_dir: non_empty("ACME_TXT_SECRETS_DIR")
                .map(PathBuf::from)
                .context(
                    "ACME_TXT_SECRETS_DIR is required. \
                    Set it via: export ACME_TXT_SECRETS_DIR=/var/run/secrets/acme-txt",
                )?,
            challenge_file: non_empty("ACME_TXT_CHALLENGE_FILE").map(PathBuf::from),
            api_base_url: non_empty("ACME_TXT_API_BASE_URL"),
            http_timeout_secs,
            log_level: non_empty("ACME_TXT_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if !self.secrets_dir.is_dir() {
            anyhow::bail!(
                "ACME_TXT_SECRETS_DIR does not exist or is not a directory: {}",
                self.secrets_dir.display()
            );
        }

        if let Some(ref url) = self.api_base_url
            && !url.starts_with("https://")
            && !url.starts_with("http://")
        {
            anyhow::bail!(
                "ACME_TXT_API_BASE_URL must use HTTP or HTTPS scheme. Got: {}",
                url
            );
        }

        if !(1..=300).contains(&self.http_timeout_secs) {
            anyhow::bail!(
                "ACME_TXT_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            );
        }

        self.level()?;

        Ok(())
    }

    /// Parsed log level
    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "ACME_TXT_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    let action = match Action::parse(env::args().nth(1).as_deref()) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", e);
            return AcmeTxtExitCode::ConfigError.into();
        }
    };

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return AcmeTxtExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return AcmeTxtExitCode::ConfigError.into();
    }

    let log_level = config.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AcmeTxtExitCode::ConfigError.into();
    }

    info!("Starting acme-txtd ({:?})", action);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AcmeTxtExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(config, action).await {
            Ok(outcome) => {
                info!(?outcome, "Challenge reconciled");
                AcmeTxtExitCode::Success
            }
            Err(e) => {
                error!("{:#}", e);
                exit_code_for(&e)
            }
        }
    });

    code.into()
}

/// Reconcile one challenge
async fn run(config: Config, action: Action) -> Result<ReconcileOutcome> {
    let challenge = read_challenge(config.challenge_file.as_ref()).await?;

    let mut factory =
        F5xcClientFactory::with_timeout(Duration::from_secs(config.http_timeout_secs))?;
    if let Some(base_url) = config.api_base_url {
        info!("Using DNS API endpoint override: {}", base_url);
        factory = factory.with_base_url(base_url);
    }

    let secrets = DirSecretLookup::new(config.secrets_dir);
    let reconciler = ChallengeReconciler::new(Box::new(secrets), Box::new(factory));

    info!(
        solver = reconciler.name(),
        uid = %challenge.uid,
        dns_name = %challenge.dns_name,
        "Handling challenge"
    );

    let outcome = match action {
        Action::Present => reconciler.present(&challenge).await?,
        Action::CleanUp => reconciler.clean_up(&challenge).await?,
    };

    Ok(outcome)
}

/// Read the challenge request from `path`, or stdin when absent
async fn read_challenge(path: Option<&PathBuf>) -> Result<ChallengeRequest> {
    let raw = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read challenge file {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read challenge from stdin")?;
            raw
        }
    };

    parse_challenge(&raw)
}

fn parse_challenge(raw: &str) -> Result<ChallengeRequest> {
    serde_json::from_str(raw).context("Invalid challenge request JSON")
}

/// Configuration and input problems exit with 1, everything else with 2
///
/// The only I/O in this binary is reading the challenge request.
fn exit_code_for(e: &anyhow::Error) -> AcmeTxtExitCode {
    if e.downcast_ref::<serde_json::Error>().is_some()
        || e.downcast_ref::<std::io::Error>().is_some()
    {
        return AcmeTxtExitCode::ConfigError;
    }

    match e.downcast_ref::<acme_txt_core::Error>() {
        Some(acme_txt_core::Error::Config(_)) => AcmeTxtExitCode::ConfigError,
        _ => AcmeTxtExitCode::RuntimeError,
    }
}
