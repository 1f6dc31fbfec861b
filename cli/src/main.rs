mod field;
mod script;

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use typewriter_core::driver::{self, HostEvent};
use typewriter_core::{Config, Display, EngineListener, TokioClock, TypewriterEngine};

use field::HostField;
use script::Command;

/// Replay scripted typing through the typewriter engine
#[derive(Parser)]
#[command(name = "typewriter", version, about)]
struct Args {
    /// Script to play; reads stdin when omitted
    script: Option<PathBuf>,

    /// TOML config file (overrides --preset)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "default")]
    preset: Preset,

    /// Delay between revealed characters, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Maximum accepted length in characters
    #[arg(long)]
    max_length: Option<usize>,

    /// Print one JSON object per event instead of text frames
    #[arg(long)]
    json: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Default,
    Name,
    Keywords,
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => match args.preset {
            Preset::Default => Config::default(),
            Preset::Name => Config::person_name(),
            Preset::Keywords => Config::keywords(),
        },
    };

    if let Some(ms) = args.delay_ms {
        config.character_delay = Duration::from_millis(ms).as_secs_f64();
    }
    if let Some(max) = args.max_length {
        config.max_length = Some(max);
    }
    config.validate()?;
    Ok(config)
}

fn read_script(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display())),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("failed to read script from stdin")?;
            Ok(source)
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    Display { at_ms: u64, text: &'a str, cursor: usize },
    Settled { at_ms: u64, text: &'a str },
    Overflow { at_ms: u64 },
}

/// Mirrors engine output into the simulated field and prints it.
struct CliListener {
    field: HostField,
    json: bool,
    start: Instant,
}

impl CliListener {
    fn new(json: bool) -> Self {
        Self {
            field: HostField::new(),
            json,
            start: Instant::now(),
        }
    }

    fn at_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn print(&self, event: &Event<'_>) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!("failed to encode event: {e}"),
            }
            return;
        }

        match event {
            Event::Display { at_ms, text, cursor } => {
                let frame = HostField::render(text, *cursor, self.field.marked());
                println!("[{at_ms:>5}ms] {frame}");
            }
            Event::Settled { at_ms, text } => println!("[{at_ms:>5}ms] settled {text:?}"),
            Event::Overflow { at_ms } => println!("[{at_ms:>5}ms] overflow"),
        }
    }
}

impl EngineListener for CliListener {
    fn on_settled(&mut self, text: &str) {
        self.print(&Event::Settled {
            at_ms: self.at_ms(),
            text,
        });
    }

    fn on_overflow(&mut self) {
        self.print(&Event::Overflow { at_ms: self.at_ms() });
    }

    fn on_display(&mut self, display: &Display) {
        self.field.apply(display);
        self.print(&Event::Display {
            at_ms: self.at_ms(),
            text: &display.text,
            cursor: display.cursor,
        });
    }
}

/// Translate a scripted key action into what the host would report.
fn host_event(field: &mut HostField, command: Command) -> Result<HostEvent> {
    let event = match command {
        Command::Type(text) => HostEvent::Edit(field.type_text(&text)?),
        Command::Backspace(count) => HostEvent::Edit(field.backspace(count)?),
        Command::Left(count) => HostEvent::Edit(field.move_left(count)),
        Command::Right(count) => HostEvent::Edit(field.move_right(count)),
        Command::Home => HostEvent::Edit(field.move_home()),
        Command::End => HostEvent::Edit(field.move_end()),
        Command::Compose(text) => HostEvent::Edit(field.compose(&text)),
        Command::Commit(text) => HostEvent::Edit(field.commit(&text)),
        Command::Force(text) => HostEvent::ForceSet(text),
        Command::Cancel => HostEvent::Cancel,
        Command::Wait(_) => bail!("`wait` is not a host event"),
    };
    Ok(event)
}

async fn play(config: Config, commands: Vec<Command>, json: bool) -> Result<String> {
    let mut engine = TypewriterEngine::with_clock(config, CliListener::new(json), TokioClock)?;

    for (idx, command) in commands.into_iter().enumerate() {
        debug!(step = idx + 1, ?command, "script");
        match command {
            Command::Wait(ms) => {
                let until = Instant::now() + Duration::from_millis(ms);
                driver::advance_until(&mut engine, until).await;
            }
            command => {
                let event = host_event(&mut engine.listener_mut().field, command)
                    .with_context(|| format!("step {}", idx + 1))?;
                driver::dispatch(&mut engine, event);
            }
        }
    }

    driver::settle(&mut engine).await;
    Ok(engine.confirmed_text().to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let config = load_config(&args)?;
    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let source = read_script(args.script.as_ref())?;
    let commands = script::parse_script(&source)?;
    info!(commands = commands.len(), "loaded script");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start runtime")?;
    let text = runtime.block_on(play(config, commands, args.json))?;
    info!(text = %text, "script finished");
    Ok(())
}
