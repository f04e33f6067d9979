//! main.rs
//! Entry point for jls

use jls::app::{Session, run};
use jls::config::Config;
use jls::utils::cli::Cli;
use jls::utils::error_line;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_env("JLS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    if cli.init {
        let path = Config::default_path();
        return match Config::generate_default(&path) {
            Ok(()) => {
                println!("Default config written to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", error_line("jls", &e));
                ExitCode::FAILURE
            }
        };
    }

    let config = Config::load();
    let session = Session::new(&cli, &config);

    let stdout = io::stdout();
    let stderr = io::stderr();
    let result = run(&session, stdout.lock(), &mut stderr.lock());

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            let _ = io::stdout().flush();
            eprintln!("{}", error_line(session.program(), &e));
            ExitCode::FAILURE
        }
    }
}
