pub mod command;
pub mod domain;
pub mod engine;
pub mod error;
pub mod host;
pub mod notes;
pub mod outcome;
pub mod patch;
pub mod release_config;
pub mod settings;
pub mod status;
pub mod telemetry;
pub mod ui;

pub use engine::ReleaseEngine;
pub use error::{ReleaseError, Result};
pub use outcome::{ReleaseFailure, ReleaseOutcome};
