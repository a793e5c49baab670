//! `intserver portnum [maxthreads]`
//!
//! Listens on `portnum` (0 lets the OS choose; the bound port is printed to
//! stderr) and serves validation and integration requests. At most
//! `maxthreads` workers run at once across all clients when it is given.
//!
//! SIGHUP prints the statistics report. SIGINT and SIGTERM stop the server.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use integration_service::config::{load_config, ConfigError, ServerConfig};
use integration_service::lifecycle::{self, signals};
use integration_service::observability::{logging, metrics};

const USAGE: &str = "Usage: intserver portnum [maxthreads]";

#[derive(Parser)]
#[command(name = "intserver")]
#[command(about = "Numerical integration server", long_about = None)]
struct Cli {
    /// Port to listen on (0 = any free port)
    portnum: u16,

    /// Cap on concurrently running workers across all clients
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    maxthreads: Option<u32>,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn server_config(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };

        config.listener.port = self.portnum;
        if let Some(max) = self.maxthreads {
            config.workers.max_workers = max as usize;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            eprintln!("{USAGE}");
            return ExitCode::from(1);
        }
    };

    let config = match cli.server_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("intserver: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = logging::init(&config.observability.log_level) {
        eprintln!("intserver: failed to initialise logging: {e}");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(error = %e, "Invalid metrics address"),
        }
    }

    let running = match lifecycle::start(&config).await {
        Ok(running) => running,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start listener");
            eprintln!("intserver: unable to open socket for listening");
            return ExitCode::from(3);
        }
    };

    eprintln!("{}", running.port);

    let signal_task = match signals::spawn_signal_handler(running.stats.clone(), running.shutdown.clone()) {
        Ok(task) => task,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install signal handlers");
            running.stop().await;
            return ExitCode::FAILURE;
        }
    };

    running.wait().await;
    signal_task.abort();

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}
