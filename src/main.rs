// Entry point - CLI parsing and wiring

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod client;
mod command;
mod config;
mod error;
mod output;
mod path;
mod secret;
mod select;
mod store;

use crate::app::App;
use crate::client::SecretClient;
use crate::command::Action;
use crate::config::{Config, OutputFormat, Overrides};
use crate::select::PromptSelector;
use crate::store::SsmStore;

#[derive(Parser)]
#[command(name = "lockr", version)]
#[command(about = "Manage secrets in AWS SSM Parameter Store")]
#[command(long_about = "Manage secrets in AWS SSM Parameter Store.\n\n\
Configuration precedence: CLI flags > LOCKR_* environment > config file > defaults.\n\
Relative paths are placed under LOCKR_PREFIX and LOCKR_ENV, e.g. with\n\
LOCKR_PREFIX=/infra/saas and LOCKR_ENV=prod, 'datadog/api-key' becomes\n\
/infra/saas/prod/datadog/api-key.")]
struct Cli {
    /// Config file (default: ~/.config/lockr/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Path prefix for relative paths
    #[arg(long, global = true)]
    prefix: Option<String>,
    /// Environment segment for relative paths (e.g. prod, staging)
    #[arg(long, global = true)]
    env: Option<String>,
    /// Output format
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,
    /// AWS region (default: from AWS config)
    #[arg(long, global = true)]
    region: Option<String>,
    /// KMS key used for new values (default: alias/aws/ssm)
    #[arg(long, global = true)]
    kms_key: Option<String>,
    /// Log debug output to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "lockr=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("LOCKR_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false),
        )
        .init();
}

fn run(cli: Cli) -> Result<(), error::Error> {
    let command = match cli.action {
        Action::Version => {
            print!("{}", app::version_text());
            return Ok(());
        }
        Action::Secret(command) => command,
    };

    let overrides = Overrides {
        prefix: cli.prefix,
        env: cli.env,
        output: cli.output,
        kms_key: cli.kms_key,
        region: cli.region,
    };
    let config = Config::load(cli.config.as_deref(), &overrides)?;
    tracing::debug!(?config, "configuration loaded");

    let store = SsmStore::connect(config.region())?;
    let mut app = App::new(
        config,
        SecretClient::new(store),
        Box::new(PromptSelector::default()),
        Box::new(std::io::stdout()),
    );
    app.run(command)
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                tracing::debug!(cause = %cause, "caused by");
                source = cause.source();
            }
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::FAILURE
        }
    }
}
