//! # promptbatch
//!
//! Batch submission of spreadsheet prompts to a ComfyUI-style image generation
//! endpoint.
//!
//! Each eligible row of a delimited input file is written into a private copy
//! of a JSON workflow template (prompt text, a fresh random seed and a
//! sanitized filename prefix) and posted as `{"prompt": <workflow>}`. Rows are
//! processed one at a time with a fixed pause in between; a failed submission
//! is logged and the batch continues.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use promptbatch::{Config, RunnerBuilder, reader};
//!
//! let config = Config::load("promptbatch.toml")?;
//! let runner = RunnerBuilder::new().config(config.clone()).build()?;
//! let records = reader::load_records(&config.input_file, &config.columns)?;
//! let report = runner.run(&records);
//! ```

mod builder;
mod config;
mod error;
mod model;
pub mod reader;
mod runner;
pub mod submitter;
pub mod template;
pub mod utils;

pub use builder::RunnerBuilder;
pub use config::*;
pub use error::PromptBatchError;
pub use model::*;
pub use runner::{BatchReport, BatchRunner};

/// Result type alias for promptbatch operations.
pub type Result<T> = std::result::Result<T, PromptBatchError>;
