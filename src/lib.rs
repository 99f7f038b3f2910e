//! Subnorm - Readable Subtitle Line Normalization
//!
//! Splits long ASS/SSA dialogue captions into screen-sized lines and retimes
//! the pieces in proportion to their readable length.

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod normalize;
pub mod subtitle;
pub mod workflow;
