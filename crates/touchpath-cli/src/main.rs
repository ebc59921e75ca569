//! CLI for simulating touch swipes in a browser via the DevTools protocol.
//!
//! Start Chrome with `--remote-debugging-port=9222`, then drive gestures
//! against elements of the open page.
//!
//! # Usage
//!
//! ```bash
//! # Vertical one-finger swipe on a canvas
//! touchpath swipe --selector "#pixi canvas" 100,100 100,300
//!
//! # Same canvas inside an iframe, in the tab whose URL contains "game"
//! touchpath swipe --frame "#game" --selector canvas --page game 100,100 100,300
//!
//! # Two-finger swipe through a waypoint, slower, without trail
//! touchpath swipe -S canvas --delay 2000 --no-draw \
//!     "100,100;300,100" "100,300;300,300" "150,300;350,300"
//!
//! # Show the planned events without a browser
//! touchpath --format json plan 100,100 100,300
//!
//! # Render the planned trail to an SVG file
//! touchpath plan --svg trail.svg "0,0;50,0" "0,200;50,200"
//!
//! # Point at another browser
//! touchpath config set-endpoint http://10.0.0.5:9222
//! ```

mod checkpoint;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use touchpath_core::cdp::{CdpClient, CdpPage, PageTrail};
use touchpath_core::config::TouchpathConfig;
use touchpath_core::controller::GestureController;
use touchpath_core::error::SwipeError;
use touchpath_core::geometry::Point;
use touchpath_core::gesture::{Gesture, GestureConfig};
use touchpath_core::interpolate::{plan, GesturePlan};
use touchpath_core::layout::ElementTarget;
use touchpath_core::log::{MemoryLog, TeeLog, TracingLog};
use touchpath_core::trail::{SvgCanvas, TrailMark};
use touchpath_core::transport::{TouchEventKind, TransportError};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::checkpoint::parse_checkpoints;

/// Simulate multi-finger touch swipes in a browser page.
#[derive(Parser)]
#[command(name = "touchpath")]
#[command(about = "Simulate touch swipes in a browser via the Chrome DevTools Protocol")]
#[command(version)]
struct Cli {
    /// DevTools HTTP endpoint (overrides the config file)
    #[arg(short, long, env = "TOUCHPATH_ENDPOINT")]
    endpoint: Option<String>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Also write logs to this file
    #[arg(long, env = "TOUCHPATH_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Perform a swipe on an element of a live page
    Swipe {
        /// CSS selector of the target element
        #[arg(short = 'S', long)]
        selector: String,
        /// CSS selector of an iframe to descend into (repeat for nesting, outermost first)
        #[arg(short = 'F', long = "frame")]
        frames: Vec<String>,
        /// Only use a page whose URL contains this text
        #[arg(short, long)]
        page: Option<String>,
        #[command(flatten)]
        timing: TimingArgs,
        /// Do not draw the finger trail
        #[arg(long)]
        no_draw: bool,
        /// Checkpoints, each `x,y` per finger separated by `;`
        #[arg(required = true, allow_hyphen_values = true)]
        checkpoints: Vec<String>,
    },

    /// Print the events a swipe would dispatch, without a browser
    Plan {
        #[command(flatten)]
        timing: TimingArgs,
        /// Write the finger trail as an SVG document
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Checkpoints, each `x,y` per finger separated by `;`
        #[arg(required = true, allow_hyphen_values = true)]
        checkpoints: Vec<String>,
    },

    /// Show or change the persistent configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct TimingArgs {
    /// Total gesture duration in milliseconds
    #[arg(short, long, env = "TOUCHPATH_DELAY")]
    delay: Option<u64>,
    /// Steps per checkpoint transition (derived when omitted)
    #[arg(short, long, env = "TOUCHPATH_STEPS")]
    steps: Option<u32>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Set the DevTools endpoint
    SetEndpoint {
        /// Endpoint URL, e.g. http://localhost:9222
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_file.as_deref()) {
        eprintln!("Error: {}", e);
        return e.exit_code();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<(), CliError> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    );

    let file_layer = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| CliError::InvalidInput(format!("not a file: {}", path.display())))?;
            std::fs::create_dir_all(dir)
                .and_then(|_| {
                    std::fs::OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(path)
                })
                .map_err(|e| CliError::InvalidInput(format!("cannot open {}: {}", path.display(), e)))?;
            let appender = tracing_appender::rolling::never(dir, name);
            Some(
                fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_filter(EnvFilter::new("info,touchpath_core=debug")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

#[derive(Debug)]
enum CliError {
    Connection(String),
    GestureFailed(String),
    InvalidInput(String),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Connection(_) => ExitCode::from(2),
            CliError::GestureFailed(_) => ExitCode::from(1),
            CliError::InvalidInput(_) => ExitCode::from(3),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Connection(msg) => write!(f, "Connection error: {}", msg),
            CliError::GestureFailed(msg) => write!(f, "Gesture failed: {}", msg),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl From<SwipeError> for CliError {
    fn from(e: SwipeError) -> Self {
        match &e {
            SwipeError::Gesture(_) => CliError::InvalidInput(e.to_string()),
            SwipeError::Transport(t) if is_connection_error(t) => CliError::Connection(e.to_string()),
            _ => CliError::GestureFailed(e.to_string()),
        }
    }
}

fn is_connection_error(e: &TransportError) -> bool {
    matches!(
        e,
        TransportError::NotConnected
            | TransportError::ConnectionLost(_)
            | TransportError::Timeout(_)
            | TransportError::Http(_)
            | TransportError::WebSocket(_)
            | TransportError::Io(_)
    )
}

fn gesture_config(config: &TouchpathConfig, timing: &TimingArgs, no_draw: bool) -> GestureConfig {
    let mut gesture = config.gesture_config();
    if let Some(delay) = timing.delay {
        gesture.delay_ms = delay;
    }
    if let Some(steps) = timing.steps {
        gesture.steps = Some(steps);
    }
    if no_draw {
        gesture.draw = false;
    }
    gesture
}

fn parse_gesture(args: &[String]) -> Result<Gesture, CliError> {
    let checkpoints = parse_checkpoints(args).map_err(CliError::InvalidInput)?;
    Gesture::new(checkpoints).map_err(|e| CliError::InvalidInput(e.to_string()))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = TouchpathConfig::load();

    match cli.command {
        Command::Swipe {
            selector,
            frames,
            page,
            timing,
            no_draw,
            checkpoints,
        } => {
            let gesture = parse_gesture(&checkpoints)?;
            let gesture_config = gesture_config(&config, &timing, no_draw);
            gesture
                .timing(&gesture_config)
                .map_err(|e| CliError::InvalidInput(e.to_string()))?;
            let endpoint = cli.endpoint.unwrap_or(config.endpoint);
            let target = frames
                .into_iter()
                .fold(ElementTarget::new(selector), |t, f| t.within_frame(f));

            debug!(%endpoint, page = ?page, "connecting");
            let client = CdpClient::connect(&endpoint, page.as_deref())
                .await
                .map_err(|e| CliError::Connection(format!("{}: {}", endpoint, e)))?;
            let page = Arc::new(CdpPage::new(Arc::new(client)));

            let memory = MemoryLog::new();
            let mut controller = GestureController::new(page.clone(), page.clone())
                .with_log(Arc::new(TeeLog::new(TracingLog, memory.clone())))
                .with_cancellation(cancel_on_ctrl_c());
            if gesture_config.draw {
                controller = controller.with_trail(Arc::new(PageTrail::new(page, target.clone())));
            }

            let report = controller.run(&target, &gesture, &gesture_config).await?;
            if cli.format == OutputFormat::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "element": target.to_string(),
                        "timing": report.timing,
                        "events": report.events.len(),
                        "elapsed_ms": report.elapsed.as_millis() as u64,
                        "log": memory.entries(),
                    })
                );
            } else if !cli.quiet {
                println!(
                    "Swiped {}: {} events in {}ms ({} steps, {}ms/step)",
                    target,
                    report.events.len(),
                    report.elapsed.as_millis(),
                    report.timing.steps,
                    report.timing.step_delay_ms,
                );
            }

            if let Some(teardown) = report.teardown {
                let _ = teardown.await;
            }
        }

        Command::Plan {
            timing,
            svg,
            checkpoints,
        } => {
            let gesture = parse_gesture(&checkpoints)?;
            let gesture_config = gesture_config(&config, &timing, false);
            let plan = plan(&gesture, &gesture_config)
                .map_err(|e| CliError::InvalidInput(e.to_string()))?;

            if let Some(path) = &svg {
                std::fs::write(path, render_trail(&plan))
                    .map_err(|e| CliError::InvalidInput(format!("cannot write {}: {}", path.display(), e)))?;
            }

            if cli.format == OutputFormat::Json {
                let value = serde_json::to_value(&plan)
                    .map_err(|e| CliError::GestureFailed(e.to_string()))?;
                println!("{}", value);
            } else if !cli.quiet {
                print_plan(&plan);
            }
        }

        Command::Config { action } => match action {
            ConfigAction::Show => {
                if cli.format == OutputFormat::Json {
                    let value = serde_json::to_value(&config)
                        .map_err(|e| CliError::GestureFailed(e.to_string()))?;
                    println!("{}", value);
                } else {
                    println!("endpoint: {}", config.endpoint);
                    println!("delay_ms: {}", config.delay_ms);
                    match config.steps {
                        Some(steps) => println!("steps: {}", steps),
                        None => println!("steps: auto"),
                    }
                    println!("draw: {}", config.draw);
                    if !cli.quiet {
                        println!("file: {}", TouchpathConfig::path().display());
                    }
                }
            }
            ConfigAction::SetEndpoint { url } => {
                let mut config = config;
                config.endpoint = url;
                config
                    .save()
                    .map_err(|e| CliError::InvalidInput(format!("cannot save config: {}", e)))?;
                if !cli.quiet {
                    println!("endpoint set to {}", config.endpoint);
                }
            }
        },
    }

    Ok(())
}

fn format_fingers(fingers: &[Point]) -> String {
    fingers
        .iter()
        .map(|p| format!("({})", p))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_plan(plan: &GesturePlan) {
    println!(
        "{} events, {} steps per transition, {}ms per step, {}ms total",
        plan.events.len(),
        plan.timing.steps,
        plan.timing.step_delay_ms,
        plan.total_delay().as_millis(),
    );
    for (i, event) in plan.events.iter().enumerate() {
        println!(
            "{:>4}  +{:>4}ms  {:<11} {}{}",
            i,
            event.delay_before.as_millis(),
            event.kind.event_name(),
            format_fingers(&event.fingers),
            if event.checkpoint { "  [checkpoint]" } else { "" },
        );
    }
}

/// Draws the planned events the same way a live swipe draws its trail, with
/// the element at the origin.
fn render_trail(plan: &GesturePlan) -> String {
    let (mut width, mut height) = (0.0_f64, 0.0_f64);
    for p in plan.events.iter().flat_map(|e| e.fingers.iter()) {
        width = width.max(p.x);
        height = height.max(p.y);
    }
    let mut canvas = SvgCanvas::new(width + 20.0, height + 20.0);
    for event in &plan.events {
        for (finger, &point) in event.fingers.iter().enumerate() {
            let mark = match event.kind {
                TouchEventKind::Start => TrailMark::Start { finger, point },
                TouchEventKind::Move => TrailMark::Move {
                    finger,
                    point,
                    checkpoint: event.checkpoint,
                },
                TouchEventKind::End => TrailMark::End { finger, point },
                TouchEventKind::Cancel => continue,
            };
            canvas.apply(mark);
        }
    }
    canvas.render()
}

/// A token cancelled when the user presses Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
    token
}
