use clap::{Parser, Subcommand};
use rust_log_dispatcher::console::ConsoleApp;
use rust_log_dispatcher::validation::{parse_level_or_default, parse_port, validate_file_name};
use rust_log_dispatcher::{create_sink, DispatchError, Dispatcher, SinkConfig};
use std::io::{self, IsTerminal};
use std::process::ExitCode;

#[derive(Parser)]
#[command(version)]
#[command(about = "Queue log messages from the console and dispatch them to a file or a TCP log server.", long_about = None)]
struct Args {
    /// Print pipeline diagnostics (connects, failures) to stderr
    #[arg(global = true, long)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append to a local .txt file
    File {
        path: String,
        /// DEBUG, INFO or ERROR (default: INFO)
        level: Option<String>,
    },

    /// Send to a TCP log server
    #[command(alias = "network")]
    Socket {
        host: String,
        #[arg(value_parser = parse_port)]
        port: u16,
        /// DEBUG, INFO or ERROR (default: INFO)
        level: Option<String>,
    },
}

impl Command {
    fn sink_config(&self) -> Result<SinkConfig, DispatchError> {
        match self {
            Command::File { path, level } => {
                validate_file_name(path)?;
                Ok(SinkConfig::file(path.clone()).with_level(level_or_default(level)))
            }
            Command::Socket { host, port, level } => {
                Ok(SinkConfig::network(host.clone(), *port).with_level(level_or_default(level)))
            }
        }
    }
}

fn level_or_default(level: &Option<String>) -> rust_log_dispatcher::LogLevel {
    level.as_deref().map(parse_level_or_default).unwrap_or_default()
}

fn run(args: Args) -> Result<(), DispatchError> {
    let config = args.cmd.sink_config()?;
    let sink = create_sink(&config)?;

    let mut dispatcher = Dispatcher::new(sink);
    dispatcher.start()?;

    let stdout = io::stdout();
    let use_colors = stdout.is_terminal();
    let mut app = ConsoleApp::new(dispatcher, io::stdin().lock(), stdout.lock())?
        .with_colors(use_colors);
    app.run()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let max_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(max_level)
        .init();

    match run(args) {
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(1)
        }
        Ok(()) => ExitCode::SUCCESS,
    }
}
