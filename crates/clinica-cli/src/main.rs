// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod export;

use anyhow::{Context, Result, anyhow};
use clinica_api::Client;
use clinica_app::{AppState, EntityKind};
use config::Config;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `clinica --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let _log_guard = init_logging(&config)?;
    info!(config = %options.config_path.display(), "clinica starting");

    let client = Client::new(config.api_base_url(), config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    let ui_options = config.ui_options()?;
    if options.check_only {
        return Ok(());
    }

    if let Some(kind) = options.export_html {
        print!("{}", export::export_html(&client, kind)?);
        return Ok(());
    }

    let mut state = AppState::default();
    clinica_tui::run_app(&mut state, &client, &ui_options)
}

/// File-only subscriber: the console owns the terminal.
fn init_logging(config: &Config) -> Result<WorkerGuard> {
    let dir = config.log_dir()?;
    fs::create_dir_all(&dir).with_context(|| {
        format!(
            "create log directory {} -- set [log].dir to a writable path",
            dir.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::never(&dir, "clinica.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.log_level())
            .with_context(|| format!("invalid log level {:?}", config.log_level()))?,
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter),
        )
        .try_init()
        .context("install log subscriber")?;
    Ok(guard)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    export_html: Option<EntityKind>,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        export_html: None,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--export-html" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--export-html requires an entity name"))?;
                let kind = EntityKind::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown entity {:?}; expected one of: {}",
                        value.as_ref(),
                        entity_names()
                    )
                })?;
                options.export_html = Some(kind);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn entity_names() -> String {
    EntityKind::ALL
        .iter()
        .map(|kind| kind.path())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_help() {
    println!("clinica");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and API client settings");
    println!("  --export-html <entity>   Print the HTML table for one entity");
    println!("                           ({})", entity_names());
    println!("  --help                   Show this help");
}
