use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};

mod log;
mod utils;

#[derive(Parser)]
#[command(version)]
struct Args {
    /// Set config file path
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let cfg: registrar::config::Config = match utils::load("registrar", args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    log::set(log::filter(&cfg.log.level));
    warn!("set log level : {}", cfg.log.level);
    debug!("config : {:?}", cfg);

    if let Err(e) = cfg.validate() {
        error!("invalid configuration: {e:#}");
        return ExitCode::FAILURE;
    }

    let listener = match tokio::net::TcpListener::bind(cfg.http.listen).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("cannot listen on {}: {e}", cfg.http.listen);
            return ExitCode::FAILURE;
        }
    };

    match registrar::serve(cfg, listener, utils::shutdown_signal()).await {
        Ok(()) => {
            info!("Server shutdown");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("registrar failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
