use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, SubnormError};

// Default values for optional normalize settings
fn default_time_precision() -> TimePrecision {
    TimePrecision::Milliseconds
}

fn default_fallback_symbols_per_second() -> f64 {
    15.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub normalize: NormalizeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Maximum readable symbols (letters and digits) per displayed line
    pub max_symbols: usize,
    /// Which words count as a good place to end a line
    pub break_rule: BreakRuleMode,
    /// Precision used when writing retimed timestamps
    #[serde(default = "default_time_precision")]
    pub time_precision: TimePrecision,
    /// What to do with events whose end is not after their start
    pub degenerate_policy: DegeneratePolicy,
    /// Reading speed used by the `clamp` policy
    #[serde(default = "default_fallback_symbols_per_second")]
    pub fallback_symbols_per_second: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakRuleMode {
    /// Punctuation: any Unicode punctuation at the end of a word
    Punctuation,
    /// Sentence: only clause and sentence terminators
    Sentence,
    /// None: never prefer a break point
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePrecision {
    /// H:MM:SS.mmm
    Milliseconds,
    /// H:MM:SS.cc, the precision ASS players expect
    Centiseconds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Keep the source line untouched
    PassThrough,
    /// Drop the event from the output
    Skip,
    /// Retime with the fallback reading speed
    Clamp,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            normalize: NormalizeConfig::default(),
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_symbols: 40,
            break_rule: BreakRuleMode::Punctuation,
            time_precision: TimePrecision::Milliseconds,
            degenerate_policy: DegeneratePolicy::PassThrough,
            fallback_symbols_per_second: 15.0,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubnormError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| SubnormError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubnormError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubnormError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.normalize.max_symbols == 0 {
            return Err(SubnormError::Config("max_symbols must be greater than zero".to_string()));
        }
        let fallback = self.normalize.fallback_symbols_per_second;
        if !fallback.is_finite() || fallback <= 0.0 {
            return Err(SubnormError::Config(format!(
                "fallback_symbols_per_second must be a positive number, got {}",
                fallback
            )));
        }
        Ok(())
    }
}
