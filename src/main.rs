use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use account_bucket::{run, Cli};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Argument-parse failures exit 1; help/version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    // The billing check is accepted by the parser but not implemented; it
    // prints exactly one fixed line and exits 1.
    if cli.check_billing.is_some() {
        println!("This feature is not yet implemented.");
        std::process::exit(1);
    }

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    if let Err(err) = run(cli).await {
        tracing::error!(error = ?err, "run failed");
        eprintln!("[ERROR] {err:#}");
        std::process::exit(1);
    }
}
