use std::process::ExitCode;

use donation_ledger::config::AppConfig;
use donation_ledger::logging::init_logging;
use donation_ledger::server::run;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.server);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Service stopped");
            ExitCode::FAILURE
        }
    }
}
