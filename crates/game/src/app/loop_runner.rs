use std::process::ExitCode;

use skirmish_engine::{run_app, AppError};
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app(app.config, app.session) {
        error!(error = %err, "run_failed");
        return ExitCode::FAILURE;
    }

    info!("clean_exit");
    ExitCode::SUCCESS
}

pub(crate) fn report_startup_failure(err: &AppError) -> ExitCode {
    error!(error = %err, "startup_failed");
    ExitCode::FAILURE
}
