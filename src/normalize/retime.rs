use tracing::debug;

use super::balancer::LineBalancer;
use super::metric::{symbol_count, LINE_BREAK};
use super::screen::ScreenBuilder;
use crate::error::{Result, SubnormError};
use crate::subtitle::DialogueEvent;

/// Splits one event into readable captions and shares its time between them
pub struct Retimer {
    balancer: LineBalancer,
}

impl Retimer {
    pub fn new(balancer: LineBalancer) -> Self {
        Self { balancer }
    }

    /// Caption texts for an event: every screen line split, then paired two by two
    pub fn chunks(&self, text: &str) -> Vec<String> {
        let mut builder = ScreenBuilder::new();
        for screen_line in text.split(LINE_BREAK).filter(|line| !line.is_empty()) {
            for line in self.balancer.split(screen_line) {
                builder.push(line);
            }
        }
        builder.build()
    }

    /// Retime an event at its own reading speed.
    ///
    /// Each caption ends where the cumulative symbol count says it should, so
    /// the last caption ends exactly at `event.end`. Events without readable
    /// symbols are returned unchanged.
    pub fn retime(&self, event: &DialogueEvent) -> Result<Vec<DialogueEvent>> {
        let duration = event.duration_millis().ok_or_else(|| SubnormError::DegenerateDuration {
            start: event.start.to_string(),
            end: event.end.to_string(),
        })?;

        let chunks = self.chunks(&event.text);
        let total = symbol_count(&event.text) as u64;
        if total == 0 {
            if chunks.is_empty() {
                return Ok(Vec::new());
            }
            return Ok(vec![event.clone()]);
        }

        debug!(
            "Retiming {} symbols over {} ms ({:.2} symbols/s) into {} captions",
            total,
            duration,
            total as f64 * 1000.0 / duration as f64,
            chunks.len()
        );

        let mut cumulative = 0u64;
        let mut running = event.start;
        let events = chunks
            .into_iter()
            .map(|chunk| {
                cumulative += symbol_count(&chunk) as u64;
                let offset = (cumulative as u128 * duration as u128 + total as u128 / 2) / total as u128;
                let end = event.start.add_millis(offset as u64);
                let retimed = DialogueEvent::new(running, end, chunk);
                running = end;
                retimed
            })
            .collect();

        Ok(events)
    }

    /// Retime an event at a fixed reading speed, ignoring its own end time
    pub fn retime_at_rate(&self, event: &DialogueEvent, symbols_per_second: f64) -> Vec<DialogueEvent> {
        let mut running = event.start;
        self.chunks(&event.text)
            .into_iter()
            .map(|chunk| {
                let millis = symbol_count(&chunk) as f64 * 1000.0 / symbols_per_second;
                let end = running.add_millis(millis.round() as u64);
                let retimed = DialogueEvent::new(running, end, chunk);
                running = end;
                retimed
            })
            .collect()
    }
}

/// Symbols per second of an event, `None` for degenerate durations
pub fn reading_speed(event: &DialogueEvent) -> Option<f64> {
    let duration = event.duration_millis()?;
    Some(symbol_count(&event.text) as f64 * 1000.0 / duration as f64)
}
