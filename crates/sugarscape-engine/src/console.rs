//! Operator console on standard input.
//!
//! One command per line:
//!
//! - `pause` / `resume`
//! - `stop`
//! - `speed <ms>` -- delay between ticks, 0 for flat out
//!
//! Commands take effect between ticks. Unknown input is logged and ignored.
//! The reader runs on a detached thread so a pending read never holds up
//! shutdown.

use std::io::BufRead;
use std::sync::Arc;

use sugarscape_core::operator::OperatorState;
use tracing::{info, warn};

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Hold the run loop.
    Pause,
    /// Release a paused run loop.
    Resume,
    /// Stop after the current tick.
    Stop,
    /// Change the tick interval in milliseconds.
    Speed(u64),
}

/// Parse one console line. Returns `None` for blank or unrecognised input.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match words.next()?.to_ascii_lowercase().as_str() {
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "stop" | "quit" => Command::Stop,
        "speed" => Command::Speed(words.next()?.parse().ok()?),
        _ => return None,
    };
    words.next().is_none().then_some(command)
}

/// Apply a command to the shared operator state.
pub fn apply(operator: &OperatorState, command: Command) {
    match command {
        Command::Pause => {
            operator.pause();
            info!("Pause requested");
        }
        Command::Resume => {
            operator.resume();
            info!("Resume requested");
        }
        Command::Stop => {
            operator.request_stop();
            info!("Stop requested");
        }
        Command::Speed(ms) => {
            let previous = operator.set_tick_interval_ms(ms);
            info!(previous_ms = previous, tick_interval_ms = ms, "Tick interval changed");
        }
    }
}

/// Read commands from stdin on a background thread until it closes.
pub fn spawn(operator: Arc<OperatorState>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("operator-console".to_owned())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "Console input failed, operator console disabled");
                        return;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(command) => apply(&operator, command),
                    None => warn!(input = %line.trim(), "Unknown console command"),
                }
            }
        })?;
    Ok(())
}
