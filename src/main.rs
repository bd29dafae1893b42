use std::process::ExitCode;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use monjez::storage::{Config, config::LoggingConfig};

mod cli;
use cli::{Command, USAGE, parse_command, report_error, run};

fn main() -> ExitCode {
    let config = match Config::load_or_create() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error, using defaults: {}", e);
            Config::default()
        }
    };

    let _guard = setup_logging(&config.logging);

    let command = match parse_command(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    if command == Command::Help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    match run(command, &config) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(&logging.directory) {
        eprintln!(
            "Logging disabled, cannot create {}: {}",
            logging.directory.display(),
            e
        );
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&logging.directory, "monjez.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    tracing::info!("monjez started");
    Some(guard)
}
