use clap::Parser;
use lamport_lock::{config::Config, executor::ExternalExecutor, log, process::Process};
use std::{net::IpAddr, path::PathBuf, process::ExitCode, sync::Arc};

#[derive(Parser, Debug)]
#[command(name = "lamport-lock")]
#[command(about = "Run one peer of the Lamport distributed lock")]
struct Args {
    /// Id of this process, in `[0, N)`.
    id: usize,

    /// Instruction script shared by every process.
    script: PathBuf,

    /// JSON file with settings; flags below override it.
    #[arg(short, long, env = "LAMPORT_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "LAMPORT_HOST")]
    host: Option<IpAddr>,

    /// Peer `i` listens on `base-port + i`.
    #[arg(short = 'p', long, env = "LAMPORT_BASE_PORT")]
    base_port: Option<u16>,

    /// Program run as `<executor> <id> <duration>` inside the critical section.
    #[arg(short, long, env = "LAMPORT_EXECUTOR")]
    executor: Option<PathBuf>,

    #[arg(long, env = "LAMPORT_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    #[arg(long, env = "LAMPORT_EXIT_GRACE_MS")]
    exit_grace_ms: Option<u64>,

    #[arg(short, long, env = "LAMPORT_VERBOSE")]
    verbose: bool,
}

impl Args {
    fn config(&self) -> lamport_lock::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(base_port) = self.base_port {
            config.base_port = base_port;
        }
        if let Some(executor) = &self.executor {
            config.executor = executor.clone();
        }
        if let Some(poll_interval_ms) = self.poll_interval_ms {
            config.poll_interval_ms = poll_interval_ms;
        }
        if let Some(exit_grace_ms) = self.exit_grace_ms {
            config.exit_grace_ms = exit_grace_ms;
        }
        config.verbose |= self.verbose;

        Ok(config)
    }
}

/// Function that maps a rejected command line to an exit status.
///
/// `--help` also surfaces as an error, but exits successfully.
fn usage_status(e: &clap::Error) -> ExitCode {
    if e.use_stderr() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return usage_status(&e);
        }
    };
    log::init(args.id, args.verbose);

    let process = match args
        .config()
        .and_then(|config| Process::load(config, args.id, &args.script))
    {
        Ok(process) => process,
        Err(e) => {
            log::error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    log::init(process.id, process.config.verbose);
    let executor = Arc::new(ExternalExecutor::new(process.config.executor.clone()));

    match process.run(executor).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
