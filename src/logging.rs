//! Tracing setup and timing scopes.
//!
//! By default only warnings reach stderr. `--render-debug-log PATH` sends
//! every event, including per-frame render traces, to a file instead so the
//! terminal UI stays clean. `--perf` enables [`Scope`] timings.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

static PERF_ENABLED: AtomicBool = AtomicBool::new(false);

/// Level used when `RUST_LOG` does not say otherwise.
pub const fn default_level(debug_log: bool, perf: bool) -> Level {
    if debug_log {
        Level::TRACE
    } else if perf {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails when the debug log file cannot be created or a subscriber is
/// already installed.
pub fn init(debug_log: Option<&Path>, perf: bool) -> Result<()> {
    PERF_ENABLED.store(perf, Ordering::Relaxed);
    let filter = EnvFilter::from_default_env()
        .add_directive(default_level(debug_log.is_some(), perf).into());

    let installed = if let Some(path) = debug_log {
        let file = File::create(path)
            .with_context(|| format!("Failed to create debug log {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };
    installed.map_err(|err| anyhow::anyhow!("Failed to install logger: {err}"))?;
    tracing::debug!(target: "folio::render", "render debug log start");
    Ok(())
}

pub fn is_perf_enabled() -> bool {
    PERF_ENABLED.load(Ordering::Relaxed)
}

/// Logs its own lifetime when dropped, if `--perf` is on.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Scope {
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_perf_enabled() {
            return;
        }
        tracing::info!(target: "folio::perf", "{}: {:.2} ms", self.name, self.elapsed_ms());
    }
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_enables_perf_scopes() {
        // The flag is stored even if another test already installed a subscriber.
        let _ = init(None, true);
        assert!(is_perf_enabled());
    }

    #[test]
    fn test_default_level_prefers_debug_log() {
        assert_eq!(default_level(true, false), Level::TRACE);
        assert_eq!(default_level(true, true), Level::TRACE);
        assert_eq!(default_level(false, true), Level::INFO);
        assert_eq!(default_level(false, false), Level::WARN);
    }

    #[test]
    fn test_scope_measures_elapsed_time() {
        let scope = scope("test.scope");
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(scope.elapsed_ms() >= 1.0);
    }
}
