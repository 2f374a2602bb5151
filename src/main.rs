use anyhow::{Context, Result};
use clap::Parser;
use gt::app::App;
use gt::cli::Cli;
use gt::config::Config;
use gt::listing::{Palette, color_allowed};
use gt::ssh::LaunchError;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging(cli: &Cli, ansi: bool) {
    let filter =
        EnvFilter::try_from_env("GT_LOG").unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_or_default(cli.settings.as_deref())?;
    if let Some(path) = &cli.config {
        config.ssh.config_path = path.to_string_lossy().into_owned();
    }
    config.expand_path()?;
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli, app: &App) -> Result<()> {
    if cli.lists_hosts() {
        return app.list(&mut io::stdout().lock());
    }

    let alias = cli.alias.as_deref().context("no host alias given")?;
    if cli.scp {
        app.copy(alias, &cli.remote_args())
    } else {
        app.connect(alias, &cli.remote_args())
    }
}

/// A failing ssh/scp passes its own exit code through.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    err.downcast_ref::<LaunchError>()
        .and_then(LaunchError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
        .map(ExitCode::from)
        .unwrap_or(ExitCode::FAILURE)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli, color_allowed(!cli.no_color, &io::stderr()));

    let config = match load_settings(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading settings: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    config.warn_missing_programs();

    let palette = Palette::for_stream(!cli.no_color && config.ui.color, &io::stdout());
    let app = match App::load(config, cli.user.clone(), palette) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code(&e)
        }
    }
}
