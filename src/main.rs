use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use benchwatch::{events, ui, App, HostMetricsPoller, Settings, TelemetryContext};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "benchwatch=info";

/// How long the subscriber gets to stop after quitting.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "benchwatch")]
#[command(about = "Live latency and resource telemetry for stream-processing benchmark runs")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// MQTT broker host
    #[arg(long)]
    host: Option<String>,

    /// MQTT broker port
    #[arg(long)]
    port: Option<u16>,

    /// Topic carrying benchmark result events
    #[arg(short, long)]
    topic: Option<String>,

    /// Container or process label to select on startup
    #[arg(short, long)]
    entity: Option<String>,

    /// Resource polling interval in milliseconds
    #[arg(long)]
    stats_interval: Option<u64>,

    /// Write logs to this file (the dashboard discards them otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// List monitorable containers or processes and exit
    #[arg(long, conflicts_with = "probe")]
    list_entities: bool,

    /// Poll one entity once, print the reading as JSON and exit
    #[arg(long, value_name = "ID")]
    probe: Option<String>,
}

impl Args {
    fn interactive(&self) -> bool {
        !self.list_entities && self.probe.is_none()
    }

    /// Resolve settings with command line flags taking precedence.
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(ref host) = self.host {
            settings.bus.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.bus.port = port;
        }
        if let Some(ref topic) = self.topic {
            settings.bus.topic = topic.clone();
        }
        if let Some(ms) = self.stats_interval {
            settings.monitoring.stats_interval_ms = ms;
        }
        Ok(settings)
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.interactive())?;

    let settings = args.settings()?;
    let runtime = Runtime::new()?;
    let context = TelemetryContext::new(settings);

    // Handle non-interactive modes
    if args.list_entities {
        runtime.block_on(list_entities(&context));
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(ref id) = args.probe {
        return runtime.block_on(probe(&context, id));
    }

    let subscriber = spawn_subscriber(&runtime, &context);

    let result = run_tui(&runtime, &context, args.entity.as_deref());

    // Signal shutdown
    context.shutdown();
    if let Some(handle) = subscriber {
        runtime.block_on(async {
            if tokio::time::timeout(SHUTDOWN_GRACE, handle).await.is_err() {
                warn!("Bus subscriber did not stop within {:?}", SHUTDOWN_GRACE);
            }
        });
    }

    result.map(|()| ExitCode::SUCCESS)
}

/// Route logs to a file, to stderr, or nowhere.
///
/// The dashboard owns the terminal, so it only logs when given a file.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(std::sync::Mutex::new(file)).try_init()
        }
        None if interactive => builder.with_writer(io::sink).try_init(),
        None => builder.with_writer(io::stderr).try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}

/// Start the latency subscription on the runtime.
#[cfg(feature = "mqtt")]
fn spawn_subscriber(runtime: &Runtime, context: &TelemetryContext) -> Option<JoinHandle<()>> {
    use benchwatch::subscribe::MqttConnector;
    use benchwatch::BusSubscriber;

    let connector = MqttConnector::new(&context.settings().bus);
    let subscriber = BusSubscriber::new(connector, context);
    Some(runtime.spawn(subscriber.run(context.shutdown_signal())))
}

#[cfg(not(feature = "mqtt"))]
fn spawn_subscriber(_runtime: &Runtime, _context: &TelemetryContext) -> Option<JoinHandle<()>> {
    warn!("Built without the mqtt feature; latency will not be collected");
    None
}

/// Print monitorable entities and the container runtime status
async fn list_entities(context: &TelemetryContext) {
    let poller = HostMetricsPoller::new(context);

    match poller.runtime_status().await.reason() {
        None => println!("Container runtime: available"),
        Some(reason) => println!("Container runtime: unavailable ({})", reason),
    }

    let entities = poller.list_entities().await;
    if entities.is_empty() {
        println!("No containers or processes found");
    }
    for id in entities {
        println!("{}", id);
    }
}

/// Poll one entity and print the reading as JSON
async fn probe(context: &TelemetryContext, id: &str) -> Result<ExitCode> {
    let poller = HostMetricsPoller::new(context);

    match poller.poll(id).await {
        Ok(reading) => {
            let output = serde_json::json!({ "entity": id, "reading": reading });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Run the dashboard until the user quits
fn run_tui(runtime: &Runtime, context: &TelemetryContext, entity: Option<&str>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let poller = HostMetricsPoller::new(context);
    let mut app = App::new(context.clone(), poller, runtime.handle().clone());
    app.refresh_entities();
    if let Some(id) = entity {
        app.select_entity(id);
    }
    app.on_update_tick();
    info!(
        entities = app.entities.len(),
        selected = ?app.selected_entity(),
        "Dashboard started"
    );

    let monitoring = &context.settings().monitoring;
    let result = run_app(
        &mut terminal,
        &mut app,
        monitoring.update_interval(),
        monitoring.stats_interval(),
    );

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    update_interval: Duration,
    stats_interval: Duration,
) -> Result<()> {
    let mut last_update = Instant::now();
    let mut last_stats = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 80;
    const MIN_HEIGHT: u16 = 20;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            let alert_height = if app.runtime_status.is_available() { 0 } else { 1 };
            let chunks = Layout::vertical([
                Constraint::Length(1),            // Header bar
                Constraint::Length(alert_height), // Container runtime alert
                Constraint::Percentage(40),       // Latency chart
                Constraint::Min(10),              // Entities and resource charts
                Constraint::Length(1),            // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_runtime_alert(frame, app, chunks[1]);
            ui::latency::render(frame, app, chunks[2]);
            ui::resources::render(frame, app, chunks[3]);
            ui::common::render_status_bar(frame, app, chunks[4]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        if last_update.elapsed() >= update_interval {
            app.on_update_tick();
            last_update = Instant::now();
        }

        if last_stats.elapsed() >= stats_interval {
            app.on_stats_tick();
            last_stats = Instant::now();
        }
    }

    Ok(())
}
