use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{value_parser, Arg, ArgMatches, Command};
use pullpolicy_fn::{load_config, transform};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("pullpolicy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Set imagePullPolicy on workload containers by image name")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("PullPolicyTransformer config file"),
        )
        .arg(
            Arg::new("manifests")
                .value_parser(value_parser!(PathBuf))
                .help("Manifest stream to transform (stdin if omitted or '-')"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_parser(value_parser!(PathBuf))
                .help("Write the result here instead of stdout"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log filter, overrides RUST_LOG (default: warn)"),
        )
}

fn init_tracing(level: Option<&String>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading manifests from {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading manifests from stdin")?;
            Ok(text)
        }
    }
}

fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let config_path = args
        .get_one::<PathBuf>("config")
        .context("missing --config")?;
    let config_text = std::fs::read_to_string(config_path)
        .with_context(|| format!("reading config from {}", config_path.display()))?;
    let config = load_config(&config_text)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let manifests = read_input(args.get_one::<PathBuf>("manifests"))?;
    let result = transform(config, &manifests)?;
    tracing::info!(
        "{} of {} containers updated",
        result.stats.updated,
        result.stats.containers
    );

    match args.get_one::<PathBuf>("output") {
        Some(path) => std::fs::write(path, &result.output)
            .with_context(|| format!("writing output to {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(result.output.as_bytes())
            .context("writing output to stdout")?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_one::<String>("log-level"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
