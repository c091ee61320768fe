//! Sync command - push one position to all controllers and exit.

use tracing::info;

use qsync::config::ConfigFile;
use qsync::logging::init_logging;
use qsync::position::PositionFix;
use qsync::sync::{SyncOrchestrator, SyncOutcome};

use crate::error::CliError;

/// Run a one-shot manual sync for the given coordinates.
///
/// The supplied position always qualifies: a fresh orchestrator treats its
/// starting position as already expired.
pub fn run(config_path: &str, lat: f64, lon: f64) -> Result<(), CliError> {
    let config = ConfigFile::load(config_path)?;
    if config.targets.is_empty() {
        return Err(CliError::NoTargets);
    }

    let _guard = init_logging(&config.logging.directory, &config.logging.file)
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    info!(lat, lon, targets = config.targets.len(), "Manual sync");

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    let outcome = runtime.block_on(async {
        let mut orchestrator = SyncOrchestrator::from_config(&config);
        orchestrator.handle_fix(PositionFix::new(lat, lon)).await
    });

    match outcome {
        SyncOutcome::Synced => {
            println!("All {} controller(s) synced", config.targets.len());
            Ok(())
        }
        SyncOutcome::Skipped | SyncOutcome::Failed => Err(CliError::SyncFailed),
    }
}
