//! Feescope CLI -- the end-to-end analysis pipeline and its file outputs.
//!
//! The `feescope` binary is a thin clap front end over [`pipeline::run`]
//! and [`output::write_report`].

pub mod output;
pub mod pipeline;

pub use output::{OutputFiles, write_report};
pub use pipeline::{AnalysisReport, PipelineError, analyze, run};
