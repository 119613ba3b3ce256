pub mod aws;
pub mod convert;
pub mod error;
pub mod import;
pub mod publish;
pub mod store;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::aws::AwsStoreClient;
use crate::publish::{PublishConfig, Publisher, DEFAULT_REGION};

/// CLI for account-bucket: validate and publish AWS account inventories.
#[derive(Parser)]
#[clap(
    name = "account-bucket",
    version,
    about = "Validate a directory of AWS account data and publish it to an S3 bucket"
)]
pub struct Cli {
    /// Directory with the account YAML files to import
    #[clap(
        long,
        value_name = "DIR",
        required_unless_present = "check_billing",
        conflicts_with = "check_billing"
    )]
    pub import: Option<PathBuf>,

    /// Billing bucket to check (not yet implemented)
    #[clap(long = "check-billing", value_name = "BUCKET")]
    pub check_billing: Option<String>,

    /// AWS organization id allowed to read the published data, repeatable
    #[clap(long = "organization-id", value_name = "ID")]
    pub organization_ids: Vec<String>,

    /// IP range allowed to read the destination bucket, repeatable
    #[clap(long = "allowed-ip", value_name = "IP")]
    pub allowed_ips: Vec<String>,

    /// Region the destination bucket is created in
    #[clap(long, value_name = "REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Destination bucket name
    #[clap(value_name = "BUCKET")]
    pub destination_bucket: String,

    /// Enable verbose output
    #[clap(long, short)]
    pub verbose: bool,
}

/// Async CLI entrypoint shared by `main()` and the integration tests.
///
/// The unimplemented billing path is handled in `main()` before this is
/// called; it exits without going through the pipeline.
pub async fn run(cli: Cli) -> Result<()> {
    let Some(directory) = cli.import.as_deref() else {
        anyhow::bail!("--import is required");
    };

    let accounts = import::load_directory(directory)?;
    let artifacts = convert::convert(&accounts)?;

    // The imported accounts themselves are the principals allowed to read
    // the published data.
    let allowed_account_ids = accounts.values().map(|account| account.id.clone()).collect();
    let config = PublishConfig {
        bucket_name: cli.destination_bucket.clone(),
        region: cli.region.clone(),
        allowed_ips: cli.allowed_ips.clone(),
        allowed_account_ids,
        allowed_organization_ids: cli.organization_ids.clone(),
    };

    let client = AwsStoreClient::new(&config.region).await;
    let publisher = Publisher::new(client, config);
    publisher.setup_infrastructure().await?;
    publisher.upload_artifacts(&artifacts).await?;

    println!(
        "Published {} accounts to {}",
        accounts.len(),
        cli.destination_bucket
    );
    Ok(())
}
