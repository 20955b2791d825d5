//! End-of-session metrics handed to reporting collaborators.
//!
//! The engine produces a [`GameMetrics`] record on every `game-over`. Where it
//! goes afterwards is up to a [`MetricsSink`]; remote transports (auth,
//! retries, wire format) live outside this crate.

use std::io::Write;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    pub final_score: u64,
    pub difficulty: Difficulty,
    pub played_at: DateTime<Utc>,
    /// Countdown seconds consumed before the session ended.
    pub time_survived_secs: u32,
}

impl GameMetrics {
    pub fn new(final_score: u64, difficulty: Difficulty, time_survived_secs: u32) -> Self {
        Self {
            final_score,
            difficulty,
            played_at: Utc::now(),
            time_survived_secs,
        }
    }

    /// Short Markdown summary, suitable for a comment or a terminal.
    pub fn summary(&self) -> String {
        let badge = match self.difficulty {
            Difficulty::Easy => "🟢",
            Difficulty::Medium => "🟡",
            Difficulty::Hard => "🔴",
        };
        format!(
            "{badge} **Game Score Recorded**\n\n\
             - **Score**: {} points\n\
             - **Difficulty**: {}\n\
             - **Time Survived**: {}s\n\
             - **Recorded At**: {}\n",
            self.final_score,
            self.difficulty,
            self.time_survived_secs,
            self.played_at.to_rfc3339(),
        )
    }
}

/// Destination for finished-game records.
pub trait MetricsSink: Send + Sync {
    /// Unique identifier used in logs.
    fn name(&self) -> &str;

    fn record(&self, metrics: &GameMetrics) -> Result<()>;
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> MetricsSink for JsonLinesSink<W> {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn record(&self, metrics: &GameMetrics) -> Result<()> {
        let line = serde_json::to_string(metrics)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| CoreError::Custom("metrics writer lock poisoned".into()))?;
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}

/// Hand `metrics` to every sink, logging failures instead of propagating them.
/// Returns the number of sinks that accepted the record.
pub fn report(sinks: &[&dyn MetricsSink], metrics: &GameMetrics) -> usize {
    let mut delivered = 0;
    for sink in sinks {
        match sink.record(metrics) {
            Ok(()) => delivered += 1,
            Err(err) => tracing::warn!(sink = sink.name(), error = %err, "failed to record game metrics"),
        }
    }
    delivered
}
