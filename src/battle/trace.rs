use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    #[default]
    Off,
    /// Collect human-readable progress lines into the battle outcome.
    Lines,
}

/// Per-battle sink for progress lines. Lines are also emitted as `debug` tracing events.
#[derive(Debug, Clone, Default)]
pub struct TraceCollector {
    mode: TraceMode,
    lines: Vec<String>,
}

impl TraceCollector {
    pub fn new(mode: TraceMode) -> Self {
        Self {
            mode,
            lines: Vec::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.mode == TraceMode::Lines
    }

    /// Record a line. `line` is only evaluated when someone is listening.
    pub fn record(&mut self, line: impl FnOnce() -> String) {
        let collect = self.enabled();
        if !collect && !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        let line = line();
        tracing::debug!(target: "awakening::battle", "{line}");
        if collect {
            self.lines.push(line);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
