use std::fmt;
use std::path::PathBuf;

use crate::quality::FieldScore;

#[derive(Debug)]
pub enum ResolveError {
    /// Input file does not exist. Raised by the I/O layer before the engine runs.
    InputNotFound { path: PathBuf },
    /// No field cleared the key threshold. Carries every field's score for diagnosis.
    NoKeyFieldsFound { threshold: f64, scores: Vec<FieldScore> },
    /// A column the merge cannot work without is absent.
    MissingRequiredColumn { column: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, reserved key field, etc.).
    ConfigValidation(String),
    /// IO error (file read/write, CSV framing).
    Io(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputNotFound { path } => {
                write!(f, "input file '{}' not found", path.display())
            }
            Self::NoKeyFieldsFound { threshold, scores } => {
                write!(
                    f,
                    "no key fields found: none of {} field(s) scored above {threshold}",
                    scores.len()
                )
            }
            Self::MissingRequiredColumn { column } => {
                write!(f, "missing required column '{column}'")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ResolveError {}
