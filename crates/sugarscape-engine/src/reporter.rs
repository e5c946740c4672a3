//! Tick callback that reports metrics snapshots.
//!
//! Every `report_every` ticks the snapshot is logged. When a metrics path
//! is configured, every snapshot is also appended to it as one JSON line,
//! so batch runs can be charted after the fact.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sugarscape_core::runner::TickCallback;
use sugarscape_core::world::{TickSummary, World};
use sugarscape_types::MetricsSnapshot;
use tracing::{info, warn};

/// One line of the metrics file.
#[derive(Debug, Serialize)]
struct MetricsLine<'a> {
    recorded_at: DateTime<Utc>,
    world: &'a str,
    #[serde(flatten)]
    snapshot: &'a MetricsSnapshot,
}

/// Logs and optionally persists metrics snapshots.
pub struct MetricsReporter {
    report_every: u64,
    sink: Option<BufWriter<File>>,
}

impl MetricsReporter {
    /// A reporter that logs every `report_every` ticks (0 = never) and
    /// appends to `metrics_path` when given.
    pub fn new(report_every: u64, metrics_path: Option<&Path>) -> std::io::Result<Self> {
        let sink = match metrics_path {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                info!(path = %path.display(), "Writing metrics snapshots");
                Some(BufWriter::new(file))
            }
            None => None,
        };
        Ok(Self { report_every, sink })
    }

    /// Persist a snapshot without logging it. Used for the tick-0 state.
    pub fn record(&mut self, world: &str, snapshot: &MetricsSnapshot) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let line = MetricsLine {
            recorded_at: Utc::now(),
            world,
            snapshot,
        };
        let written = serde_json::to_writer(&mut *sink, &line)
            .map_err(std::io::Error::from)
            .and_then(|()| sink.write_all(b"\n"));
        if let Err(e) = written {
            warn!(error = %e, "Metrics file write failed, disabling metrics file");
            self.sink = None;
        }
    }

    /// Flush buffered lines to disk.
    pub fn finish(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.flush() {
                warn!(error = %e, "Failed to flush metrics file");
            }
        }
    }

    fn due(&self, tick: u64) -> bool {
        self.report_every > 0 && tick.checked_rem(self.report_every) == Some(0)
    }
}

impl TickCallback for MetricsReporter {
    fn on_tick(&mut self, summary: &TickSummary, world: &World) {
        let snapshot = &summary.snapshot;
        if self.due(summary.tick) {
            info!(
                tick = snapshot.tick,
                living = snapshot.living_agents,
                deaths = snapshot.deaths,
                starved = summary.starved,
                spawned = summary.spawned,
                death_rate = snapshot.death_rate,
                death_rate_low_sensing = snapshot.death_rate_low_sensing,
                death_rate_high_sensing = snapshot.death_rate_high_sensing,
                death_rate_individualist = snapshot.death_rate_individualist,
                min_wealth = snapshot.wealth.min,
                max_wealth = snapshot.wealth.max,
                mean_wealth = snapshot.wealth.mean,
                stdev_wealth = snapshot.wealth.stdev,
                pool_balance = snapshot.pool_balance,
                standing_resource = snapshot.standing_resource,
                "Metrics"
            );
        }
        self.record(world.name(), snapshot);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sugarscape_core::config::SimulationConfig;
    use sugarscape_world::CapacityMap;

    use super::*;

    #[test]
    fn schedule_respects_report_every() {
        let reporter = MetricsReporter::new(10, None).unwrap();
        assert!(!reporter.due(5));
        assert!(reporter.due(10));
        assert!(reporter.due(20));
        let silent = MetricsReporter::new(0, None).unwrap();
        assert!(!silent.due(10));
    }

    #[test]
    fn appends_one_json_line_per_tick() {
        let path = std::env::temp_dir().join(format!(
            "sugarscape-metrics-{}.jsonl",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut config = SimulationConfig::default();
        config.population.initial_population = 5;
        let map = CapacityMap::uniform(6, 6, 3).unwrap();
        let mut world = World::new(&config, &map).unwrap();

        let mut reporter = MetricsReporter::new(1, Some(&path)).unwrap();
        reporter.record(world.name(), &world.snapshot());
        for _ in 0..3 {
            let summary = world.tick().unwrap();
            reporter.on_tick(&summary, &world);
        }
        reporter.finish();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines.last().unwrap()["tick"], 3);
        assert!(lines.first().unwrap()["wealth"]["mean"].is_number());
        let _ = std::fs::remove_file(&path);
    }
}
