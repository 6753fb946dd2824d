use clap::{Parser, Subcommand};
use kubedebug::config::Config;
use kubedebug::ui::Repl;
use kubedebug::{AppResult, Pipeline};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Ask questions about a Kubernetes cluster and run the suggested kubectl command
#[derive(Debug, Parser)]
#[command(name = "kubedebug", version, about)]
#[command(after_help = "Example: kubedebug \"What pods are running in the default namespace?\"")]
struct Cli {
    /// Config file (default: ~/.config/kubedebug/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,

    /// Question to answer once; starts the interactive prompt when omitted
    question: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a default config file (at --config, or the default location)
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Serve the HTTP endpoint (POST /debug)
    Serve {
        /// Address to bind, overrides server.bind from the config file
        #[arg(long)]
        bind: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kubedebug=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> AppResult<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

async fn run(cli: Cli) -> AppResult<()> {
    if let Some(Command::Init { force }) = cli.command {
        let path = match cli.config {
            Some(path) => path,
            None => Config::config_path()?,
        };
        Config::write_default(&path, force)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let mut config = load_config(cli.config.as_ref())?;

    if let Some(Command::Serve { bind }) = cli.command {
        if let Some(bind) = bind {
            config.server.bind = bind;
        }
        let addr = config.bind_addr()?;
        let pipeline = Arc::new(Pipeline::from_config(&config)?);
        tracing::info!(allowed = %pipeline.validator().allow_list(), "allow-list loaded");
        kubedebug::server::serve(pipeline, addr).await?;
        return Ok(());
    }

    let pipeline = Pipeline::from_config(&config)?;
    let stdin = io::stdin();
    let mut repl = Repl::new(&pipeline, stdin.lock(), io::stdout());

    if cli.question.is_empty() {
        repl.run().await?;
    } else {
        let question = cli.question.join(" ");
        kubedebug::ui::repl::report(repl.ask(&question).await);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
