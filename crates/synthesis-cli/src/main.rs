//! synthesize: run the synthesis engine over a JSON batch of signal records.
//!
//! Reads a bare array of records (or `{"signals": [...]}`) and prints the
//! synthesis result as JSON on stdout. Logs go to stderr.
//!
//! Usage:
//!   cargo run -p synthesis-cli -- fixtures/aapl.json
//!   cat fixtures/aapl.json | cargo run -p synthesis-cli -- --pretty
//!   cargo run -p synthesis-cli -- --input fixtures/aapl.json --max-takeaways 3

use anyhow::{Context, Result};
use signal_core::{load_batch, parse_batch};
use synthesis_engine::{EngineConfig, SynthesisEngine};

#[derive(Debug, Default)]
struct CliArgs {
    input: Option<String>,
    pretty: bool,
    max_takeaways: Option<usize>,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pretty" => parsed.pretty = true,
            "--input" => {
                parsed.input = Some(iter.next().context("--input requires a path")?.clone());
            }
            "--max-takeaways" => {
                let raw = iter.next().context("--max-takeaways requires a number")?;
                parsed.max_takeaways = Some(
                    raw.parse()
                        .with_context(|| format!("invalid --max-takeaways value '{}'", raw))?,
                );
            }
            other if !other.starts_with("--") && parsed.input.is_none() => {
                parsed.input = Some(other.to_string());
            }
            other => anyhow::bail!("unrecognized argument '{}'", other),
        }
    }

    Ok(parsed)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args)?;

    let mut config = EngineConfig::from_env().context("invalid synthesis configuration")?;
    if let Some(max) = cli.max_takeaways {
        config.max_takeaways = max;
        config.validate()?;
    }
    tracing::debug!("Engine configuration: {:?}", config);

    let signals = match &cli.input {
        Some(path) => load_batch(path).with_context(|| format!("failed to load {}", path))?,
        None => {
            let raw = std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?;
            parse_batch(&raw).context("failed to parse signal batch from stdin")?
        }
    };
    tracing::info!("Loaded {} signal records", signals.len());

    let result = SynthesisEngine::with_config(config).synthesize(&signals);

    let output = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);

    Ok(())
}
