//! Error types for the component value search.

use thiserror::Error;

/// Result type alias using [`SearchError`].
pub type Result<T> = std::result::Result<T, SearchError>;

/// Unified error type for configuration, pass ordering and evaluation
/// failures.
#[derive(Error, Debug)]
pub enum SearchError {
    // ============ Configuration ============
    /// A component declares none of value, value set or value scale.
    #[error("component '{id}' has no value, value set or value scale to expand")]
    NoValueSource { id: String },

    /// A component declares a scale list but its kind has no standard series.
    #[error("component '{id}' has a value scale but no standard series to expand against")]
    NoSeries { id: String },

    /// Two components share an identifier.
    #[error("duplicate component id '{id}'")]
    DuplicateComponent { id: String },

    /// Two target quantities share an identifier.
    #[error("duplicate target quantity '{id}'")]
    DuplicateTarget { id: String },

    /// The evaluator asked for a fixed parameter that was never configured.
    #[error("unknown fixed parameter '{id}'")]
    UnknownParameter { id: String },

    /// The evaluator asked for a component that was never configured.
    #[error("unknown component '{id}'")]
    UnknownComponent { id: String },

    /// The evaluator wrote a target quantity that was never configured.
    #[error("unknown target quantity '{id}'")]
    UnknownTarget { id: String },

    /// The evaluator returned without producing a configured target.
    #[error("evaluator produced no value for target '{id}'")]
    TargetNotProduced { id: String },

    // ============ Pass ordering ============
    /// Tolerance analysis was requested without a nominal value to expand.
    #[error("no nominal value for component '{id}'; run the value search before tolerance analysis")]
    MissingNominal { id: String },

    // ============ Evaluation ============
    /// The injected circuit evaluator failed on a combination.
    #[error("circuit evaluation failed: {message}")]
    Evaluator { message: String },
}

impl SearchError {
    /// Create an evaluator error.
    pub fn evaluator(message: impl Into<String>) -> Self {
        SearchError::Evaluator {
            message: message.into(),
        }
    }
}
