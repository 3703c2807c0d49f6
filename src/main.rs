//! ═══════════════════════════════════════════════════════════════════════════════
//! SUITCAST — Engine Entry Point
//! ═══════════════════════════════════════════════════════════════════════════════
//! Thin transport shell: inbound events arrive as JSON lines on stdin,
//! outbound publishes and edits leave as lines on stdout. The real chat
//! connectivity layer replaces this shell in deployment; the engine does not
//! care which one feeds it.
//! ═══════════════════════════════════════════════════════════════════════════════

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossbeam_channel::unbounded;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use suitcast::engine::{EngineEvent, InboundEvent, PredictionEngine, Publisher};
use suitcast::error::PublishError;
use suitcast::registry::MessageHandle;
use suitcast::reset::{DailyAnchor, ResetScheduler};
use suitcast::suit::{first_card_in, suits_in};
use suitcast::{parse_announcement, DispatchMode, EngineConfig, TransformPolicy};

#[derive(Parser)]
#[command(name = "suitcast")]
#[command(about = "Card-round prediction scheduling and verification engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine: JSON-line events on stdin, publishes on stdout
    Run {
        /// Source channel identity the engine listens to
        #[arg(long, allow_hyphen_values = true)]
        channel: i64,

        /// Config file path (defaults to the platform config dir)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use the simple transformation policy instead of the extended one
        #[arg(long)]
        simple_policy: bool,

        /// Cap on live predictions; enables the bounded-stock dispatcher
        #[arg(long)]
        max_active: Option<usize>,

        /// Promotion band for queued predictions (bounded-stock only)
        #[arg(long, default_value = "3")]
        proximity: u64,

        /// Periodic full reset interval in seconds (0 disables)
        #[arg(long, default_value = "0")]
        reset_every: u64,

        /// Disable the daily 00:59 UTC+1 reset
        #[arg(long)]
        no_daily_reset: bool,
    },

    /// Evaluate one announcement text against both policies and exit
    Eval {
        /// Raw announcement text
        text: String,
    },

    /// Print the default config file path
    ConfigPath,
}

/// Publisher that writes outbound calls as stdout lines
struct StdoutPublisher {
    next_id: i64,
}

impl StdoutPublisher {
    fn new() -> Self {
        Self { next_id: 1 }
    }
}

impl Publisher for StdoutPublisher {
    fn publish(&mut self, text: &str) -> Result<MessageHandle, PublishError> {
        let handle = MessageHandle(self.next_id);
        self.next_id += 1;
        println!("PUBLISH {} {}", handle.0, text);
        Ok(handle)
    }

    fn edit(&mut self, handle: MessageHandle, text: &str) -> Result<(), PublishError> {
        println!("EDIT {} {}", handle.0, text);
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            channel,
            config,
            simple_policy,
            max_active,
            proximity,
            reset_every,
            no_daily_reset,
        } => run(
            channel,
            config,
            simple_policy,
            max_active,
            proximity,
            reset_every,
            no_daily_reset,
        ),
        Commands::Eval { text } => eval(&text),
        Commands::ConfigPath => {
            println!("{}", EngineConfig::default_path().display());
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    channel: i64,
    config_path: Option<PathBuf>,
    simple_policy: bool,
    max_active: Option<usize>,
    proximity: u64,
    reset_every: u64,
    no_daily_reset: bool,
) -> Result<()> {
    let config_path = config_path.unwrap_or_else(EngineConfig::default_path);
    let config = EngineConfig::load(&config_path)
        .map_err(|e| anyhow::anyhow!("loading config {}: {}", config_path.display(), e))?;

    let policy = if simple_policy {
        TransformPolicy::Simple
    } else {
        TransformPolicy::Extended
    };
    let dispatch = match max_active {
        Some(max_active) => DispatchMode::BoundedStock {
            max_active,
            proximity,
        },
        None => DispatchMode::Immediate,
    };

    let mut engine = PredictionEngine::new(StdoutPublisher::new(), config, channel)
        .with_policy(policy)
        .with_dispatch(dispatch)
        .with_config_path(config_path);

    let (tx, rx) = unbounded::<EngineEvent>();

    let mut scheduler = ResetScheduler::new();
    if reset_every > 0 {
        scheduler = scheduler.with_periodic(Duration::from_secs(reset_every));
    }
    if !no_daily_reset {
        scheduler = scheduler.with_daily(DailyAnchor::default_reset());
    }
    scheduler.spawn(tx.clone());

    // stdin reader feeds the same serialized channel as the timers
    let stdin_tx = tx;
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<InboundEvent>(&line) {
                Ok(event) => {
                    if stdin_tx.send(EngineEvent::Message(event)).is_err() {
                        break;
                    }
                }
                Err(e) => log::warn!("unparseable event line: {}", e),
            }
        }
    });

    log::info!("engine running, listening on channel {}", channel);
    for event in rx {
        engine.handle(event);
    }
    Ok(())
}

fn eval(text: &str) -> Result<()> {
    let facts = match parse_announcement(text) {
        Some(f) => f,
        None => {
            println!("not a round announcement");
            return Ok(());
        }
    };
    println!("round: {}", facts.round);
    println!("finalized: {}", facts.finalized);
    println!("groups: {:?}", facts.groups);

    if let Some(group) = facts.groups.first() {
        let present: String = suits_in(group).iter().map(|s| s.glyph()).collect();
        println!("verification suits: {}", present);
    }

    if let Some(group) = facts.groups.get(1) {
        if let Some(card) = first_card_in(group) {
            println!(
                "observed: {} (rank {:?}, parity {:?})",
                card.suit,
                card.rank,
                card.rank_parity()
            );
            for policy in [TransformPolicy::Simple, TransformPolicy::Extended] {
                let predicted = policy.predict(card.suit, facts.round, card.rank_parity());
                println!("{:?} policy predicts: {}", policy, predicted);
            }
        } else {
            println!("no suit in trigger group");
        }
    } else {
        println!("fewer than two evidence groups");
    }
    Ok(())
}
