// Test Alerts - command line entry point
//
// Runs a test command (or reads libtest output from stdin), echoes its output,
// and sends the session summary to the configured destinations.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use test_alerts::storage::{EnvOptions, FileOptions, LayeredOptions};
use test_alerts::{AlertDelivery, AlertService, AppError, AppResult, ExitStatus, TestSession};

/// Run a test command and send its summary to Slack and/or Telegram.
#[derive(Parser, Debug)]
#[command(name = "test-alerts", version)]
struct Cli {
    /// JSON file with option values (lowest precedence)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Slack incoming webhook URL
    #[arg(long, value_name = "URL")]
    slack_webhook: Option<String>,

    /// First line of the Slack message
    #[arg(long, value_name = "TEXT")]
    slack_message_prefix: Option<String>,

    /// Test suite name shown in the Slack message
    #[arg(long, value_name = "NAME")]
    slack_test_name: Option<String>,

    /// Slack request timeout in seconds
    #[arg(long, value_name = "SECS")]
    slack_timeout: Option<String>,

    /// Telegram bot token
    #[arg(long, value_name = "TOKEN")]
    telegram_bot_token: Option<String>,

    /// Telegram chat id
    #[arg(long, value_name = "ID")]
    telegram_chat_id: Option<String>,

    /// First line of the Telegram message
    #[arg(long, value_name = "TEXT")]
    telegram_message_prefix: Option<String>,

    /// Test suite name shown in the Telegram message
    #[arg(long, value_name = "NAME")]
    telegram_test_name: Option<String>,

    /// Telegram request timeout in seconds
    #[arg(long, value_name = "SECS")]
    telegram_timeout: Option<String>,

    /// List failed tests in the message
    #[arg(long)]
    show_details: bool,

    /// Leave failure messages out of the failed test list
    #[arg(long)]
    hide_errors: bool,

    /// Test command to run; libtest output is read from stdin when omitted
    #[arg(last = true, value_name = "COMMAND")]
    command: Vec<String>,
}

impl Cli {
    /// Flags given on the command line, keyed by option name.
    fn option_layer(&self) -> HashMap<String, String> {
        let values = [
            ("slack_webhook", &self.slack_webhook),
            ("slack_message_prefix", &self.slack_message_prefix),
            ("slack_test_name", &self.slack_test_name),
            ("slack_timeout", &self.slack_timeout),
            ("telegram_bot_token", &self.telegram_bot_token),
            ("telegram_chat_id", &self.telegram_chat_id),
            ("telegram_message_prefix", &self.telegram_message_prefix),
            ("telegram_test_name", &self.telegram_test_name),
            ("telegram_timeout", &self.telegram_timeout),
        ];

        let mut layer: HashMap<String, String> = values
            .into_iter()
            .filter_map(|(name, value)| value.clone().map(|v| (name.to_string(), v)))
            .collect();

        // Unset flags stay absent so the environment or config file can enable them
        if self.show_details {
            layer.insert("show_details".to_string(), "true".to_string());
        }
        if self.hide_errors {
            layer.insert("hide_errors".to_string(), "true".to_string());
        }

        layer
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Echo every line of `reader` to stdout and feed it to the session.
///
/// Lines are decoded lossily so binary output cannot end the session. A read
/// error stops reading; whatever was observed so far is kept.
async fn observe<R: AsyncRead + Unpin>(reader: R, session: &mut TestSession) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);
                println!("{}", line);
                session.observe_line(line);
            }
            Err(e) => {
                warn!("Stopped reading test output: {}", e);
                break;
            }
        }
    }
}

/// Run the wrapped command. Returns the exit code to leave with.
async fn run_command(command: &[String], service: &AlertService) -> AppResult<i32> {
    let label = command.join(" ");
    let (program, args) = command
        .split_first()
        .ok_or_else(|| AppError::command("no command given"))?;

    let mut child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| AppError::command(format!("failed to start '{}': {}", label, e)))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| AppError::command("test command stdout was not captured"))?;

    let mut session = TestSession::new(label.as_str());
    observe(stdout, &mut session).await;

    let code = match child.wait().await {
        Ok(status) => status.code().unwrap_or(1),
        Err(e) => {
            warn!("Failed to wait for '{}': {}", label, e);
            1
        }
    };

    let deliveries = session.finish_and_notify(ExitStatus(code), service).await;
    report(&deliveries);
    Ok(code)
}

/// Read libtest output from stdin. The exit status comes from the outcomes.
async fn run_stdin(service: &AlertService) -> AppResult<i32> {
    let mut session = TestSession::new("stdin");
    observe(tokio::io::stdin(), &mut session).await;

    let result = session.finish(ExitStatus::SUCCESS);
    let exit_status = ExitStatus::from_result(&result);
    report(&service.notify(&result, exit_status).await);
    Ok(0)
}

fn report(deliveries: &[AlertDelivery]) {
    if !deliveries.is_empty() {
        let sent = deliveries.iter().filter(|d| d.is_success()).count();
        info!("Delivered {}/{} test summary notification(s)", sent, deliveries.len());
    }
}

async fn run(cli: Cli) -> AppResult<i32> {
    let mut options = LayeredOptions::new()
        .with_layer(cli.option_layer())
        .with_layer(EnvOptions::new());
    if let Some(ref path) = cli.config {
        options = options.with_layer(FileOptions::load(path)?);
    }

    let service = AlertService::from_options(&options);
    if service.is_empty() {
        info!("No alert destination configured; the summary will not be sent");
    }

    if cli.command.is_empty() {
        run_stdin(&service).await
    } else {
        run_command(&cli.command, &service).await
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let code = match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            2
        }
    };

    std::process::exit(code);
}
