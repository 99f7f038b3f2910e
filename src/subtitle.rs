use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::TimePrecision;

// Dialogue line as written by the subtitle editors we normalize
static DIALOGUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Dialogue: 0,(\d+:\d+:\d+\.\d{2,3}),(\d+:\d+:\d+\.\d{2,3}),Default,,0,0,0,,(.+)$",
    )
    .expect("dialogue pattern is valid")
});

const DIALOGUE_MARKER: &str = "Dialogue";

/// Time offset with millisecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn add_millis(&self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Parse `H:M:S.cc` (centiseconds) or `H:M:S.mmm` (milliseconds)
    pub fn parse(value: &str) -> Option<Self> {
        let (clock, fraction) = value.split_once('.')?;
        let mut parts = clock.split(':');
        let hours: u64 = parts.next()?.parse().ok()?;
        let minutes: u64 = parts.next()?.parse().ok()?;
        let seconds: u64 = parts.next()?.parse().ok()?;
        if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
            return None;
        }

        let digits: u64 = fraction.parse().ok()?;
        let millis = match fraction.len() {
            2 => digits * 10,
            3 => digits,
            _ => return None,
        };

        hours
            .checked_mul(3_600_000)?
            .checked_add(minutes * 60_000 + seconds * 1_000 + millis)
            .map(Self)
    }

    /// Format as `H:MM:SS.mmm` or `H:MM:SS.cc`
    pub fn format(&self, precision: TimePrecision) -> String {
        let total = match precision {
            TimePrecision::Milliseconds => self.0,
            TimePrecision::Centiseconds => (self.0 + 5) / 10 * 10,
        };
        let hours = total / 3_600_000;
        let minutes = (total % 3_600_000) / 60_000;
        let seconds = (total % 60_000) / 1_000;
        let millis = total % 1_000;

        match precision {
            TimePrecision::Milliseconds => {
                format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
            }
            TimePrecision::Centiseconds => {
                format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, millis / 10)
            }
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(TimePrecision::Milliseconds))
    }
}

/// One caption: start, end and the raw `\N`-joined text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueEvent {
    pub start: Timestamp,
    pub end: Timestamp,
    pub text: String,
}

impl DialogueEvent {
    pub fn new(start: Timestamp, end: Timestamp, text: impl Into<String>) -> Self {
        Self { start, end, text: text.into() }
    }

    /// Parse a `Dialogue: 0,...` line, `None` when it does not match
    pub fn parse(line: &str) -> Option<Self> {
        let caps = DIALOGUE_REGEX.captures(line)?;
        let start = Timestamp::parse(caps.get(1)?.as_str())?;
        let end = Timestamp::parse(caps.get(2)?.as_str())?;
        let text = caps.get(3)?.as_str();
        Some(Self::new(start, end, text))
    }

    /// Duration in milliseconds, `None` when end is not after start
    pub fn duration_millis(&self) -> Option<u64> {
        self.end
            .as_millis()
            .checked_sub(self.start.as_millis())
            .filter(|ms| *ms > 0)
    }

    pub fn render(&self, precision: TimePrecision) -> String {
        format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}",
            self.start.format(precision),
            self.end.format(precision),
            self.text
        )
    }
}

/// A line of an ASS script, classified for normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLine {
    Dialogue(DialogueEvent),
    /// Starts like a dialogue line but does not match the dialogue pattern
    Malformed(String),
    Other(String),
}

impl ScriptLine {
    pub fn classify(line: &str) -> Self {
        if !line.starts_with(DIALOGUE_MARKER) {
            return Self::Other(line.to_string());
        }
        match DialogueEvent::parse(line) {
            Some(event) => Self::Dialogue(event),
            None => Self::Malformed(line.to_string()),
        }
    }
}
