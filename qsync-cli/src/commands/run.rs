//! Run command - daemon mode: GPS receiver feeding the sync orchestrator.

use tracing::info;

use qsync::config::ConfigFile;
use qsync::logging::init_logging;
use qsync::receiver::FixReceiver;
use qsync::sync::SyncOrchestrator;

use crate::error::CliError;

/// Run the daemon: listen for GPS fixes and keep every configured
/// controller's clock and location in sync until interrupted.
pub fn run(config_path: &str) -> Result<(), CliError> {
    let config = ConfigFile::load(config_path)?;
    if config.targets.is_empty() {
        return Err(CliError::NoTargets);
    }

    let _guard = init_logging(&config.logging.directory, &config.logging.file)
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    info!(
        version = qsync::VERSION,
        config = config_path,
        targets = config.targets.len(),
        "qsync starting"
    );

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    runtime.block_on(async {
        let (fix_tx, fix_rx) = tokio::sync::mpsc::channel(16);
        let receiver = FixReceiver::new(config.receiver_config(), fix_tx);
        let receiver_handle = receiver.start();

        let orchestrator = SyncOrchestrator::from_config(&config);

        tokio::select! {
            _ = orchestrator.run(fix_rx) => Ok(()),
            result = receiver_handle => receiver_outcome(result),
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                Ok(())
            }
        }
    })
}

/// Map the receiver task's exit into the daemon's outcome. A task that
/// died without reporting (panic, cancellation) is a failure, not a clean
/// shutdown.
fn receiver_outcome(
    result: Result<Result<(), qsync::receiver::ReceiverError>, tokio::task::JoinError>,
) -> Result<(), CliError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(CliError::Receiver(e)),
        Err(e) => Err(CliError::ReceiverTask(e)),
    }
}
