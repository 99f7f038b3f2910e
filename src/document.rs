use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{DegeneratePolicy, NormalizeConfig, TimePrecision};
use crate::error::SubnormError;
use crate::normalize::{symbol_count, BreakRuleFactory, LineBalancer, Retimer};
use crate::subtitle::{DialogueEvent, ScriptLine};

/// Counters collected while normalizing one or more scripts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub lines: usize,
    pub events_read: usize,
    pub events_written: usize,
    pub events_split: usize,
    pub malformed_lines: usize,
    pub degenerate_events: usize,
    pub zero_symbol_events: usize,
}

impl NormalizeReport {
    pub fn absorb(&mut self, other: &NormalizeReport) {
        self.lines += other.lines;
        self.events_read += other.events_read;
        self.events_written += other.events_written;
        self.events_split += other.events_split;
        self.malformed_lines += other.malformed_lines;
        self.degenerate_events += other.degenerate_events;
        self.zero_symbol_events += other.zero_symbol_events;
    }
}

/// Normalized script text together with what happened to it
#[derive(Debug, Clone)]
pub struct NormalizedScript {
    pub content: String,
    pub report: NormalizeReport,
}

/// Applies the retimer to every dialogue line of a script
pub struct Normalizer {
    retimer: Retimer,
    precision: TimePrecision,
    policy: DegeneratePolicy,
    fallback_symbols_per_second: f64,
}

impl Normalizer {
    pub fn new(config: &NormalizeConfig) -> Self {
        let rule = BreakRuleFactory::create_rule(config.break_rule);
        Self {
            retimer: Retimer::new(LineBalancer::new(config.max_symbols, rule)),
            precision: config.time_precision,
            policy: config.degenerate_policy,
            fallback_symbols_per_second: config.fallback_symbols_per_second,
        }
    }

    pub fn retimer(&self) -> &Retimer {
        &self.retimer
    }

    /// Normalize a whole script, passing non-dialogue lines through untouched
    pub fn normalize(&self, content: &str) -> NormalizedScript {
        let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
        let mut report = NormalizeReport::default();
        let mut output: Vec<String> = Vec::new();

        for (index, line) in content.lines().enumerate() {
            report.lines += 1;
            match ScriptLine::classify(line) {
                ScriptLine::Other(line) => output.push(line),
                ScriptLine::Malformed(line) => {
                    let error = SubnormError::UnparsableLine {
                        line_number: index + 1,
                        line: line.clone(),
                    };
                    warn!("{}", error);
                    report.malformed_lines += 1;
                    output.push(line);
                }
                ScriptLine::Dialogue(event) => {
                    report.events_read += 1;
                    let written = self.normalize_event(index + 1, line, &event, &mut report);
                    report.events_written += written.len();
                    output.extend(written);
                }
            }
        }

        let mut content_out = output.join(newline);
        if content.ends_with('\n') {
            content_out.push_str(newline);
        }

        debug!("Normalized script: {:?}", report);
        NormalizedScript { content: content_out, report }
    }

    /// Rendered replacement lines for one source dialogue line
    fn normalize_event(
        &self,
        line_number: usize,
        source: &str,
        event: &DialogueEvent,
        report: &mut NormalizeReport,
    ) -> Vec<String> {
        if symbol_count(&event.text) == 0 && !event.text.trim().is_empty() {
            report.zero_symbol_events += 1;
            return vec![source.to_string()];
        }

        let events = match self.retimer.retime(event) {
            Ok(events) => events,
            Err(e) => {
                report.degenerate_events += 1;
                warn!("Line {}: {} ({:?})", line_number, e, self.policy);
                match self.policy {
                    DegeneratePolicy::PassThrough => return vec![source.to_string()],
                    DegeneratePolicy::Skip => return Vec::new(),
                    DegeneratePolicy::Clamp => {
                        self.retimer.retime_at_rate(event, self.fallback_symbols_per_second)
                    }
                }
            }
        };

        if events.len() > 1 {
            report.events_split += 1;
        }
        events.iter().map(|e| e.render(self.precision)).collect()
    }
}
