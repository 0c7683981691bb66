#![forbid(unsafe_code)]

//! `availcheck` probe.
//!
//! Types a value into a live availability field one character at a time,
//! against the HTTP endpoints, and prints every status transition:
//!
//! ```text
//! $ availcheck slug my-slug --pick-suggestion
//! checking     my-slug
//! unavailable  my-slug  suggestions=my-slug-1,my-slug-2
//! checking     my-slug-1
//! available    my-slug-1
//! ```
//!
//! Exit status: 0 when the final value is available, 1 when it is not,
//! 2 on setup errors.

use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use availcheck::prelude::*;
use availcheck::{LoggingConfig, logging};
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "availcheck")]
#[command(about = "Type a value into an availability field and watch it settle")]
struct Cli {
    /// Which uniqueness rule to check.
    #[arg(value_enum)]
    kind: KindArg,
    /// The value to type.
    value: String,
    /// API root (overrides AVAILCHECK_BASE_URL).
    #[arg(long)]
    base_url: Option<String>,
    /// Quiet window in milliseconds (overrides AVAILCHECK_DEBOUNCE_MS).
    #[arg(long)]
    debounce_ms: Option<u64>,
    /// Request timeout in milliseconds (overrides AVAILCHECK_TIMEOUT_MS).
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Delay between simulated keystrokes.
    #[arg(long, default_value_t = 40)]
    keystroke_gap_ms: u64,
    /// Accept the first usable suggestion if the value is taken, and re-check.
    #[arg(long, default_value_t = false)]
    pick_suggestion: bool,
    /// Print each transition as a JSON handle.
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Dump the check trace as JSON lines on exit (also AVAILCHECK_TRACE).
    #[arg(long, default_value_t = false)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Email,
    Phone,
    Slug,
}

impl From<KindArg> for FieldKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Email => Self::Email,
            KindArg::Phone => Self::Phone,
            KindArg::Slug => Self::Slug,
        }
    }
}

/// Prints transitions as they happen.
struct Printer {
    json: bool,
    last: Option<(Status, String)>,
}

impl Printer {
    fn observe(&mut self, field: &FieldLoop<HttpBackend>) {
        let status = field.status();
        let value = field.field().value().to_string();
        if status == Status::Idle {
            return;
        }
        let key = (status, value);
        if self.last.as_ref() == Some(&key) {
            return;
        }
        let handle = field.handle();
        if self.json {
            let line = serde_json::json!({
                "status": status.as_str(),
                "value": &key.1,
                "handle": handle,
            });
            println!("{line}");
        } else if handle.suggestions.is_empty() {
            println!("{:<12} {}", status.as_str(), key.1);
        } else {
            println!(
                "{:<12} {}  suggestions={}",
                status.as_str(),
                key.1,
                handle.suggestions.join(",")
            );
        }
        self.last = Some(key);
    }
}

fn settle(field: &mut FieldLoop<HttpBackend>, printer: &mut Printer, max: Duration) {
    let deadline = Instant::now() + max;
    loop {
        field.pump();
        printer.observe(field);
        if field.is_quiescent() || Instant::now() >= deadline {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

/// Layer command-line overrides on top of the environment settings.
fn field_config(cli: &Cli, mut config: FieldConfig) -> FieldConfig {
    if cli.trace {
        config = config.with_trace(true);
    }
    if let Some(ms) = cli.debounce_ms {
        config = config.with_debounce(Duration::from_millis(ms));
    }
    if let Some(ms) = cli.timeout_ms.filter(|ms| *ms > 0) {
        config = config.with_request_timeout(Duration::from_millis(ms));
    }
    config
}

fn run(cli: Cli) -> Result<Status> {
    let mut http = HttpConfig::from_env()?;
    if let Some(base) = &cli.base_url {
        http = HttpConfig::new(base)?.with_timeout(http.timeout);
    }
    let config = field_config(&cli, FieldConfig::from_env());
    if let Some(ms) = cli.timeout_ms.filter(|ms| *ms > 0) {
        http = http.with_timeout(Duration::from_millis(ms));
    }

    let kind = FieldKind::from(cli.kind);
    let wait = config.debounce + config.request_timeout + Duration::from_secs(1);
    let gap = Duration::from_millis(cli.keystroke_gap_ms);
    tracing::info!(kind = kind.as_str(), base_url = %http.base_url, "probing availability");

    let mut field = FieldLoop::new(kind, config, HttpBackend::new(http)?);
    let mut printer = Printer {
        json: cli.json,
        last: None,
    };

    let mut typed = String::new();
    for ch in cli.value.chars() {
        typed.push(ch);
        field.keystroke(typed.clone());
        thread::sleep(gap);
        field.pump();
        printer.observe(&field);
    }
    settle(&mut field, &mut printer, wait);

    if cli.pick_suggestion && field.status() == Status::Unavailable {
        for suggestion in field.handle().suggestions {
            match field.select_suggestion(&suggestion) {
                Ok(_) => {
                    settle(&mut field, &mut printer, wait);
                    break;
                }
                Err(FieldError::SuggestionNotCheckable(_)) => {
                    tracing::debug!(suggestion = %suggestion, "skipping unusable suggestion");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    if field.field().config().enable_trace {
        print!("{}", field.field().trace().to_jsonl());
    }

    let status = field.status();
    if status == Status::Idle {
        tracing::warn!(
            kind = kind.as_str(),
            "value was never checked (too short or malformed)"
        );
    }
    Ok(status)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LoggingConfig::from_env().unwrap_or_else(|err| {
        eprintln!("availcheck: {err}; using defaults");
        LoggingConfig::default()
    });
    if let Err(err) = logging::init(&log_config) {
        eprintln!("availcheck: {err}");
    }

    match run(cli) {
        Ok(Status::Available) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(err) => {
            eprintln!("availcheck: {err}");
            ExitCode::from(2)
        }
    }
}
