use anyhow::Result;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use mailpilot_app::{Router, RouterOutcome, SenderContext};
use mailpilot_core::test_support::InMemoryHost;
use mailpilot_core::{Generator, MailHost};
use mailpilot_generate::StubGenerator;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = parse_cli_flags()?;

    let settings = match cli.config {
        Some(path) => mailpilot_config::load_from_path(path)?,
        None => mailpilot_config::load_from_env()?,
    };
    tracing::info!(
        ai_model = settings.ai_model.as_str(),
        reply_tone = settings.reply_tone.as_str(),
        summary_length = settings.summary_length.as_str(),
        privacy_mode = settings.privacy_mode,
        "mailpilot coordinator starting"
    );
    if !settings.has_api_key() {
        tracing::warn!("no API key configured, generation uses the placeholder backend");
    }

    let router = Router::new(InMemoryHost::new(), StubGenerator)?;
    serve_stdio(&router).await
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Default)]
struct CliFlags {
    config: Option<String>,
}

fn parse_cli_flags() -> Result<CliFlags> {
    let mut flags = CliFlags::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().ok_or_else(|| {
                    anyhow::anyhow!("Missing value after --config. Use --config <path>.")
                })?;
                let value = value.trim().to_owned();
                if value.is_empty() {
                    anyhow::bail!("Flag '--config' requires a non-empty value.");
                }
                flags.config = Some(value);
            }
            "--help" | "-h" => {
                print_cli_help();
                std::process::exit(0);
            }
            value if value.starts_with("--") => {
                anyhow::bail!("Unknown flag '{value}'. Run with --help for valid flags.");
            }
            unknown => {
                anyhow::bail!("Unexpected argument '{unknown}'. Run with --help for valid flags.");
            }
        }
    }

    Ok(flags)
}

fn print_cli_help() {
    println!("Usage: mailpilot-app [--config <path>]");
    println!();
    println!("  --config <path>   Load settings from <path> instead of MAILPILOT_CONFIG");
    println!("  --help            Show this help message");
}

/// Serve commands over stdio, one JSON message per line.
///
/// Each handled command prints its response value; messages the router does
/// not recognize print `false`, mirroring what an unhandled listener returns
/// inside the mail client.
async fn serve_stdio<H: MailHost, G: Generator>(router: &Router<H, G>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed input line");
                continue;
            }
        };

        let rendered = match router.handle(message, SenderContext::default()).await {
            RouterOutcome::Response(value) => value.to_string(),
            RouterOutcome::Unhandled => Value::Bool(false).to_string(),
        };
        stdout.write_all(rendered.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
