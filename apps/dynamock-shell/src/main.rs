//! Dynamock shell - drive an in-process item store from a command script.
//!
//! Each input line is `<Operation> <json body>`; the body may be omitted and
//! then defaults to `{}`. Blank lines and lines starting with `#` are
//! skipped. One JSON line is printed per command: the response body, or
//! `{"__type": <code>, "message": <text>}` when the operation fails.
//!
//! # Usage
//!
//! ```text
//! dynamock-shell commands.txt
//! echo 'ListTables {}' | dynamock-shell
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DEFAULT_REGION` | `us-east-1` | Region used in table ARNs |
//! | `DYNAMOCK_ENFORCE_KEY_TYPES` | `true` | Reject key values of the wrong type |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | *(unset)* | `json` for JSON log lines |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dynamock_core::{
    Dynamock, DynamockConfig, DynamockHandler, DynamockJsonHandler, dispatch_operation,
    error_to_json,
};

/// Initialize the tracing subscriber on stderr, keeping stdout for responses.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

/// Split a script line into operation name and body.
///
/// Returns `None` for blank lines and `#` comments.
fn parse_command_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((op, body)) => (op, body.trim_start()),
        None => (line, ""),
    })
}

/// Run one command, returning the JSON line to print.
async fn run_command<H: DynamockHandler>(handler: &H, op: &str, body: &str) -> Bytes {
    let body = if body.is_empty() { "{}" } else { body };
    match dispatch_operation(handler, op, Bytes::copy_from_slice(body.as_bytes())).await {
        Ok(response) => response,
        Err(e) => {
            debug!(operation = %op, error = %e, "command failed");
            error_to_json(&e)
        }
    }
}

/// Execute every command read from `input`, writing responses to `output`.
///
/// Returns the number of commands executed.
async fn run_script<H, R, W>(handler: &H, input: R, output: &mut W) -> Result<usize>
where
    H: DynamockHandler,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut executed = 0;
    while let Some(line) = lines.next_line().await.context("failed to read command")? {
        let Some((op, body)) = parse_command_line(&line) else {
            continue;
        };
        let response = run_command(handler, op, body).await;
        output
            .write_all(&response)
            .await
            .context("failed to write response")?;
        output.write_all(b"\n").await.context("failed to write response")?;
        executed += 1;
    }
    output.flush().await.context("failed to flush output")?;
    Ok(executed)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&log_level())?;

    let config = DynamockConfig::from_env();
    info!(
        region = %config.default_region,
        enforce_key_types = config.enforce_key_types,
        "starting dynamock shell"
    );
    let handler = DynamockJsonHandler::new(Arc::new(Dynamock::new(config)));
    let mut stdout = tokio::io::stdout();

    let executed = if let Some(path) = std::env::args().nth(1) {
        let file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("failed to open script {path}"))?;
        run_script(&handler, BufReader::new(file), &mut stdout).await?
    } else {
        run_script(&handler, BufReader::new(tokio::io::stdin()), &mut stdout).await?
    };

    info!(commands = executed, "script finished");
    Ok(())
}
