use std::process::ExitCode;

use safe_sort::output as out;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = safe_sort::cli::parse();
    match app::run(args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            ExitCode::from(app::EXIT_SETUP)
        }
    }
}
