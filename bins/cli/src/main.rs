//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Parser, Subcommand};
use commands::{
    run_check_env, run_lookup, run_show, run_summary, run_tables, run_validate_request,
};
use dashboard_config::{AppConfig, DashboardEnv, Environment, LogLevel};
use dashboard_shared::{ErrorEnvelope, ErrorKind, is_secret_key};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode, pretty_json};
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "dashcfg",
    version,
    about = "Inspect the analytics dashboard configuration",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    /// Client config file (JSON/TOML). Overrides `DASHBOARD_CLIENT_CONFIG`.
    #[arg(long, global = true)]
    client_config: Option<PathBuf>,

    /// Environment profile name. Overrides `DASHBOARD_ENV`/`FLASK_ENV`.
    #[arg(long = "env", global = true)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the effective profile.
    Show,
    /// List the active table mapping.
    Tables,
    /// Look up a table id in the fresh and legacy mappings.
    Lookup {
        /// Table id to resolve.
        table_id: String,
    },
    /// Show the client summary (requires a client config).
    Summary,
    /// Check that upstream API credentials are configured.
    CheckEnv,
    /// Validate a records request against the active profile.
    ValidateRequest {
        /// Request JSON; use `-` to read from stdin.
        input_json: String,
    },
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

impl CliOutput {
    const fn ok(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: ExitCode::Ok,
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    match run(&cli, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(cli: &Cli, mode: OutputMode) -> Result<CliOutput, CliError> {
    run_with_env(cli, mode, &collect_env())
}

fn run_with_env(
    cli: &Cli,
    mode: OutputMode,
    vars: &BTreeMap<String, String>,
) -> Result<CliOutput, CliError> {
    let env = match DashboardEnv::from_map(vars) {
        Ok(env) => apply_cli_flags(env, cli),
        Err(error) => return Ok(format_error_output(mode, &ErrorEnvelope::from(error))),
    };
    init_tracing(mode, &env);

    match &cli.command {
        Commands::Show => run_show(mode, &env),
        Commands::Tables => run_tables(mode, &env),
        Commands::Lookup { table_id } => run_lookup(mode, &env, table_id),
        Commands::Summary => run_summary(mode, &env),
        Commands::CheckEnv => run_check_env(mode, &env),
        Commands::ValidateRequest { input_json } => {
            let input = resolve_request_input(input_json)?;
            run_validate_request(mode, &env, &input)
        },
    }
}

fn apply_cli_flags(mut env: DashboardEnv, cli: &Cli) -> DashboardEnv {
    if let Some(path) = cli.client_config.as_ref() {
        env.client_config_path = Some(path.clone());
    }
    if let Some(environment) = cli.environment.as_ref() {
        env.environment = Some(environment.clone());
    }
    env
}

fn log_level(mode: OutputMode, env: &DashboardEnv) -> LogLevel {
    if mode.quiet {
        return LogLevel::Error;
    }
    let environment = Environment::resolve(env.environment.as_deref());
    AppConfig::resolve(environment, None).logging.level
}

/// `RUST_LOG` wins; otherwise the selected profile's level applies.
fn init_tracing(mode: OutputMode, env: &DashboardEnv) {
    let level = log_level(mode, env).to_tracing_level();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    let result = if mode.is_json() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(error) = result {
        tracing::debug!(%error, "tracing subscriber already installed");
    }
}

fn resolve_request_input(input_json: &str) -> Result<String, CliError> {
    let input = if input_json == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        input_json.to_string()
    };

    if input.trim().is_empty() {
        return Err(CliError::EmptyRequest);
    }
    Ok(input)
}

pub(crate) fn format_error_output(mode: OutputMode, error: &ErrorEnvelope) -> CliOutput {
    let exit_code = ExitCode::for_envelope(error);
    let secret_keys: Vec<&str> = error
        .metadata
        .keys()
        .map(String::as_str)
        .filter(|key| is_secret_key(key))
        .collect();
    let error = error.clone().redact_metadata(&secret_keys);
    let metadata = &error.metadata;
    let kind = match error.kind {
        ErrorKind::Expected => "EXPECTED",
        ErrorKind::Unexpected => "UNEXPECTED",
    };

    if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": {
                "code": error.code.to_wire(),
                "message": error.message,
                "kind": kind,
                "meta": metadata,
            },
        });
        return match pretty_json(&payload) {
            Ok(stdout) => CliOutput {
                stdout,
                stderr: String::new(),
                exit_code,
            },
            Err(serialize_error) => CliOutput {
                stdout: String::new(),
                stderr: format!("error: {serialize_error}\n"),
                exit_code: ExitCode::Internal,
            },
        };
    }

    let mut out = String::new();
    out.push_str("status: error\n");
    out.push_str("code: ");
    out.push_str(&error.code.to_wire());
    out.push('\n');
    out.push_str("message: ");
    out.push_str(&error.message);
    out.push('\n');
    out.push_str("kind: ");
    out.push_str(kind);
    out.push('\n');
    if !metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in metadata {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    }

    CliOutput {
        stdout: out,
        stderr: String::new(),
        exit_code,
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}

fn collect_env() -> BTreeMap<String, String> {
    dashboard_config::env::ENV_VARS
        .iter()
        .filter_map(|name| {
            std::env::var(name)
                .ok()
                .map(|value| ((*name).to_string(), value))
        })
        .collect()
}
