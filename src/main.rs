/*!
 * apexctl - command line control for streaming applications
 */

use apex_control::{
    cli_style::Theme,
    config::GatewayConfig,
    error::{ApexError, Result, EXIT_SUCCESS},
    logging,
    shell::Shell,
    ApexSession,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;

#[derive(Parser)]
#[command(name = "apexctl")]
#[command(version, about = "Launch, track, and kill streaming applications on a remote engine", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Gateway endpoint (overrides config and APEX_GATEWAY_ENDPOINT)
    #[arg(short = 'e', long = "endpoint", value_name = "URL", global = true)]
    endpoint: Option<String>,

    /// Gateway handshake token
    #[arg(long = "token", value_name = "TOKEN", global = true)]
    token: Option<String>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, configure, and launch one application
    Launch {
        /// Application name
        #[arg(short = 'n', long = "name")]
        name: String,

        /// Folder the engine reads input from
        #[arg(short = 'i', long = "input-dir", value_name = "DIR")]
        input_dir: Option<String>,

        /// Print the stream output inside the engine
        #[arg(short = 'p', long = "print")]
        print: bool,
    },

    /// Interactive shell reading commands from stdin
    Shell,
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("{} {}", Theme::error("Error:"), e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn load_config(cli: &Cli) -> Result<GatewayConfig> {
    let mut config = match cli.config {
        Some(ref path) => GatewayConfig::from_file(path)?,
        None => GatewayConfig::default(),
    };
    config.apply_env_overrides();

    if let Some(ref endpoint) = cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(ref token) = cli.token {
        config.token = Some(token.clone());
    }
    if cli.verbose {
        config.verbose = true;
    }

    config.validate()?;
    Ok(config)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    logging::init_logging(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ApexError::Io)?;

    runtime.block_on(async {
        let session = ApexSession::connect(&config).await?;

        match cli.command {
            Commands::Launch {
                name,
                input_dir,
                print,
            } => {
                let app = session.new_app(&name).await?;
                if let Some(dir) = input_dir {
                    app.from_folder(&dir).await?;
                }
                if print {
                    app.print_stream().await?;
                }
                let app_id = app.launch_dag().await?;
                println!("{}", Theme::success(format!("AppID: {} started.", app_id)));
                Ok(())
            }
            Commands::Shell => {
                let mut shell = Shell::new(&session);
                let stdin = BufReader::new(tokio::io::stdin());
                let mut stdout = std::io::stdout();
                shell.run(stdin, &mut stdout).await
            }
        }
    })
}
