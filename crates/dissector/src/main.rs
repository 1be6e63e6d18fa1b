use std::process;

use clap::{Parser, Subcommand};
use dissector_core::config::Config;
use dissector_core::types::DebuggerType;
use dissector_utils::{init_logging, init_logging_with_level, LogFormat, LogLevel};

mod commands;

/// Choose which view debugger gets injected into which iOS app.
#[derive(Parser, Debug)]
#[command(name = "dissector")]
#[command(version)]
#[command(about = "Choose which view debugger (Reveal, Spark Inspector) gets injected into which iOS app", long_about = None)]
struct Cli
{
    /// Log level (error, warn, info, debug, trace); defaults to RUST_LOG or info
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// List supported debuggers and whether their libraries are installed
    List,
    /// Show the current preferences
    Status
    {
        /// Also show which debugger this application would get
        #[arg(long)]
        bundle_id: Option<String>,
    },
    /// Set the debugger used for enabled applications
    SetDebugger
    {
        /// None, SparkInspector, or Reveal
        debugger: DebuggerType,
    },
    /// Turn Dissector on
    Enable,
    /// Turn Dissector off everywhere
    Disable,
    /// Configure Dissector for SpringBoard
    Springboard
    {
        /// Stop loading the debugger into SpringBoard
        #[arg(long, default_value_t = false)]
        off: bool,
    },
    /// Configure a single application
    App
    {
        /// Bundle identifier, e.g. com.apple.mobilesafari
        bundle_id: String,
        /// Use this debugger instead of the global one
        #[arg(long, conflicts_with_all = ["off", "remove"])]
        debugger: Option<DebuggerType>,
        /// Disable Dissector for this application
        #[arg(long, default_value_t = false, conflicts_with = "remove")]
        off: bool,
        /// Forget this application
        #[arg(long, default_value_t = false)]
        remove: bool,
    },
    /// Validate a debugger's library without loading it
    CheckLibrary
    {
        /// SparkInspector or Reveal
        debugger: DebuggerType,
    },
}

fn main()
{
    let cli = Cli::parse();

    // An explicit --log-level wins over RUST_LOG
    let logging = match cli.log_level {
        Some(level) => init_logging_with_level(level, LogFormat::Pretty),
        None => init_logging(),
    };
    if let Err(e) = logging {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let config = Config::from_env();
    let mut out = std::io::stdout().lock();
    if let Err(e) = run_command(cli.command, &config, &mut out) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_command(command: Commands, config: &Config, out: &mut impl std::io::Write) -> dissector_core::Result<()>
{
    match command {
        Commands::List => commands::list(config, out),
        Commands::Status { bundle_id } => commands::status(config, bundle_id.as_deref(), out),
        Commands::SetDebugger { debugger } => commands::set_debugger(config, debugger, out),
        Commands::Enable => commands::set_enabled(config, true, out),
        Commands::Disable => commands::set_enabled(config, false, out),
        Commands::Springboard { off } => commands::set_springboard(config, !off, out),
        Commands::App {
            bundle_id,
            debugger,
            off,
            remove,
        } => {
            let change = if remove {
                commands::AppChange::Remove
            } else if off {
                commands::AppChange::Disable
            } else if let Some(debugger) = debugger {
                commands::AppChange::Override(debugger)
            } else {
                commands::AppChange::Enable
            };
            commands::configure_app(config, &bundle_id, change, out)
        }
        Commands::CheckLibrary { debugger } => commands::check_library(config, debugger, out),
    }
}
