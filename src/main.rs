use std::process::ExitCode;

use cursor_trail::app::App;
use cursor_trail::config::CursorTrailOptions;
use cursor_trail::error::AppError;

fn run() -> Result<(), AppError> {
    let options = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading options from {}", path);
            CursorTrailOptions::load(path)?
        }
        None => CursorTrailOptions::default(),
    };

    App::new(options).run()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("cursor_trail=info"))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
