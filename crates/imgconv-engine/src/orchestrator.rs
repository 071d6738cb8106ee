// crates/imgconv-engine/src/orchestrator.rs

//! Ties the four strategies together behind one entry contract. State
//! machine is trivial: INIT -> EXECUTE -> FINALIZE; any subcomponent error
//! short-circuits straight to FINALIZE-with-error.

use anyhow::Result;
use imgconv_core::{Image, Mode, RunConfig};

use crate::{master_worker, nosft, serial, sft};

/// Run the strategy named by `config.mode` and return the composed image.
///
/// # Errors
/// Returns an error if the chosen strategy fails at any stage; this is the
/// single place a subcomponent's error is allowed to propagate to the
/// caller rather than triggering an internal abort.
pub fn run(config: &RunConfig) -> Result<Image> {
    tracing::info!(mode = ?config.mode, input = %config.input.display(), "orchestrator: starting run");
    let result = match config.mode {
        Mode::Serial => serial::run_serial(config),
        Mode::Sft => sft::run_sft(config),
        Mode::NoSft => nosft::run_nosft(config),
        Mode::MasterWorker => master_worker::run_master_worker(config),
    };
    match &result {
        Ok(image) => tracing::info!(width = image.width(), height = image.height(), "orchestrator: run finished"),
        Err(err) => tracing::error!(error = %err, "orchestrator: run aborted"),
    }
    result
}
