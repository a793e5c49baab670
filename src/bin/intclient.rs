//! `intclient [-v] portnum [jobfile]`
//!
//! Reads jobs from `jobfile` (or stdin), one per line, and asks the server on
//! `localhost:portnum` to integrate each. `-v` asks for the per-worker
//! breakdown.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};

use integration_service::client::{RunError, Runner, ServerConnection};
use integration_service::observability::logging;

const USAGE: &str = "Usage: intclient [-v] portnum [jobfile]";

#[derive(Parser)]
#[command(name = "intclient")]
#[command(about = "Submit integration jobs to an intserver", long_about = None)]
struct Cli {
    /// Print each worker's share before the result
    #[arg(short = 'v')]
    verbose: bool,

    /// Server port on localhost
    portnum: String,

    /// Job file; stdin when absent
    jobfile: Option<PathBuf>,
}

impl Cli {
    /// Parse `args` (program name first). `-v` is only recognised as the
    /// first argument.
    fn parse_args(args: &[String]) -> Result<Self, clap::Error> {
        if args.iter().skip(2).any(|a| a == "-v") {
            return Err(clap::Error::new(ErrorKind::ArgumentConflict));
        }
        Self::try_parse_from(args)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let cli = match Cli::parse_args(&args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            eprintln!("{USAGE}");
            return ExitCode::from(1);
        }
    };

    // Quiet unless RUST_LOG says otherwise; stderr carries user diagnostics.
    let _ = logging::init("off");

    let input: Box<dyn AsyncBufRead + Unpin> = match &cli.jobfile {
        Some(path) => match tokio::fs::File::open(path).await {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Cannot open job file");
                eprintln!("intclient: unable to open \"{}\" for reading", path.display());
                return ExitCode::from(4);
            }
        },
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let conn = match connect(&cli.portnum).await {
        Some(conn) => conn,
        None => {
            eprintln!("intclient: unable to connect to port {}", cli.portnum);
            return ExitCode::from(2);
        }
    };

    let mut runner = Runner::new(conn, cli.verbose, std::io::stdout(), std::io::stderr());
    match runner.run(input).await {
        Ok(summary) => {
            tracing::debug!(
                answered = summary.answered,
                rejected = summary.rejected,
                failed = summary.failed,
                "Job input exhausted"
            );
            ExitCode::SUCCESS
        }
        Err(RunError::Communication(e)) => {
            tracing::debug!(error = %e, "Server communication failed");
            eprintln!("intclient: communications error");
            ExitCode::from(3)
        }
        Err(e @ RunError::Output(_)) => {
            eprintln!("intclient: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn connect(port: &str) -> Option<ServerConnection> {
    let port: u16 = port.parse().ok()?;
    match ServerConnection::connect(("localhost", port)).await {
        Ok(conn) => Some(conn),
        Err(e) => {
            tracing::debug!(port, error = %e, "Connect failed");
            None
        }
    }
}
