#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Fog Forage in a terminal.

mod config;
mod view;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use fog_forage_core::WELCOME_BANNER;
use fog_forage_input::{action_for_key, direction_for_key, is_restart_key};
use fog_forage_world::{self as world, query, Session};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Explore a fogged world and forage before your energy runs out.
#[derive(Debug, Parser)]
#[command(name = "fog-forage", version)]
struct CliArgs {
    /// TOML file with session settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for world generation; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Side length of the square world.
    #[arg(long, value_name = "CELLS")]
    world_size: Option<u32>,
    /// Keys to play instead of reading standard input (w/a/s/d move, r restarts).
    #[arg(long, value_name = "KEYS")]
    moves: Option<String>,
}

/// Entry point for the Fog Forage command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = CliArgs::parse();
    let config = config::load(
        args.config.as_deref(),
        config::Overrides {
            seed: args.seed,
            world_size: args.world_size,
        },
    )?;
    let session = Session::new(config).context("failed to start a session")?;
    info!(seed = session.seed(), "starting fog forage");

    let stdout = io::stdout();
    let mut driver = Driver {
        session,
        out: stdout.lock(),
        show_window: args.moves.is_none(),
    };
    driver.intro()?;

    match args.moves {
        Some(script) => {
            for key in script.chars().filter(|key| !key.is_whitespace()) {
                driver.press(&key.to_string())?;
            }
            driver.finish()
        }
        None => {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line.context("failed to read keys from standard input")?;
                let line = line.trim();
                if matches!(line, "q" | "quit") {
                    break;
                }
                for key in split_keys(line) {
                    driver.press(key)?;
                }
            }
            driver.finish()
        }
    }
}

/// Splits an input line into key names.
///
/// A line that names a single key (`ArrowUp`, `space`) is taken whole;
/// anything else is read one character at a time.
fn split_keys(line: &str) -> Vec<&str> {
    if line.is_empty() {
        return Vec::new();
    }
    if direction_for_key(line).is_some() || is_restart_key(line) {
        return vec![line];
    }
    line.char_indices()
        .filter(|(_, key)| !key.is_whitespace())
        .map(|(index, key)| &line[index..index + key.len_utf8()])
        .collect()
}

struct Driver<W: Write> {
    session: Session,
    out: W,
    show_window: bool,
}

impl<W: Write> Driver<W> {
    fn intro(&mut self) -> Result<()> {
        writeln!(self.out, "{WELCOME_BANNER}")?;
        writeln!(self.out, "seed {}", self.session.seed())?;
        self.report()
    }

    fn press(&mut self, key: &str) -> Result<()> {
        let Some(action) = action_for_key(key, query::phase(&self.session)) else {
            debug!(key, "key ignored");
            return Ok(());
        };

        let mut events = Vec::new();
        world::apply(&mut self.session, action.into_command(), &mut events)
            .context("failed to restart the session")?;
        for message in events.iter().filter_map(view::describe) {
            writeln!(self.out, "{message}")?;
        }
        self.report()
    }

    fn report(&mut self) -> Result<()> {
        let state = query::state(&self.session);
        writeln!(self.out, "{}", view::status_line(state))?;
        if self.show_window {
            write!(self.out, "{}", view::render_window(state))?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        let state = query::state(&self.session);
        if !self.show_window {
            write!(self.out, "{}", view::render_window(state))?;
        }
        if let Some(outcome) = query::outcome(state) {
            writeln!(self.out, "{}", view::outcome_line(&outcome))?;
        }
        self.out.flush()?;
        Ok(())
    }
}
