use std::path::{Path, PathBuf};

use argpass::{CollectingArgumentParser, Namespace, ParserSpec};
use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "ARGPASS_LOG";

/// Parser used when no `--spec` is given.
const DEMO_SPEC: &str = r#"
parser:
  prog: argpass
  description: Demonstration parser with two forwarded argument lists
arguments:
  - names: ["--file"]
    options:
      help: input file
  - names: ["--regular-arg"]
  - names: ["--args-to-pass-on-1"]
    options:
      nargs: collect_until_next_known
      help: arguments forwarded verbatim
  - names: ["--args-to-pass-on-2"]
    options:
      nargs: collect_until_next_known
      help: arguments forwarded verbatim
"#;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argpass")]
#[command(version)]
#[command(about = "Parse a token list with collect-until-next-known flags")]
struct Cli {
    /// Parser spec file (YAML, or JSON with a .json extension).
    #[arg(long)]
    spec: Option<PathBuf>,
    /// Report unrecognized tokens instead of failing on them.
    #[arg(long)]
    lenient: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Tokens to parse, given after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Serialize)]
struct LenientOutput {
    namespace: Namespace,
    unknown: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let parser = load_parser(cli.spec.as_deref())?;
    debug!(tokens = cli.tokens.len(), lenient = cli.lenient, "parsing tokens");

    if cli.lenient {
        let (namespace, unknown) = parser
            .try_parse_known_from(cli.tokens)
            .unwrap_or_else(|err| parser.exit(&err));
        print_output(&LenientOutput { namespace, unknown }, cli.format)
    } else {
        let namespace = parser
            .try_parse_from(cli.tokens)
            .unwrap_or_else(|err| parser.exit(&err));
        print_output(&namespace, cli.format)
    }
}

fn load_parser(path: Option<&Path>) -> Result<CollectingArgumentParser, String> {
    let spec = match path {
        Some(path) => ParserSpec::load(path)
            .map_err(|e| format!("failed to load spec '{}': {e}", path.display()))?,
        None => ParserSpec::from_yaml_str(DEMO_SPEC)
            .map_err(|e| format!("built-in spec is invalid: {e}"))?,
    };
    spec.build()
        .map_err(|e| format!("failed to build parser: {e}"))
}

fn print_output<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<(), String> {
    let rendered = match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {e}"))?,
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))?
        }
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
