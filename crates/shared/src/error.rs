use thiserror::Error;

/// Errors raised while evaluating a part formula
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Parse error in '{formula}': {message}")]
    Parse { formula: String, message: String },
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("Evaluation error in '{formula}': {message}")]
    Evaluation { formula: String, message: String },
    #[error("Formula '{formula}' produced a non-numeric value: {value}")]
    NotANumber { formula: String, value: String },
    #[error("Formula '{0}' produced a non-finite result")]
    NonFinite(String),
}

/// Errors at the configuration and data-loading boundary
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate catalog entry '{0}'")]
    DuplicateComponent(String),
}
