mod bootstrap;
mod loop_runner;

use std::process::ExitCode;

pub(crate) fn run() -> ExitCode {
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => loop_runner::report_startup_failure(&err),
    }
}
