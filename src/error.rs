use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("{operator} needs exactly one integer literal operand, got {found}")]
    ComparisonLiteral { operator: String, found: usize },

    #[error("{operator} compares a non-variable operand `{operand}`")]
    ComparisonOperand { operator: String, operand: String },

    #[error("equals needs two operands, got {found}")]
    EqualsArity { found: usize },
}

/// Failures while turning bracket notation into a formula. Every variant
/// names the text it choked on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("unbalanced brackets in `{fragment}`")]
    UnbalancedBrackets { fragment: String },

    #[error("unknown operator `{operator}` in `{fragment}`")]
    UnknownOperator { operator: String, fragment: String },

    #[error("NOT takes one operand, got {found} in `{fragment}`")]
    NotArity { found: usize, fragment: String },

    #[error("empty operand in `{fragment}`")]
    EmptyOperand { fragment: String },

    #[error("unexpected token `{token}`")]
    UnexpectedToken { token: String },

    #[error("malformed comparison `{fragment}`")]
    Comparison { fragment: String },

    #[error("expression does not reduce to one formula: `{fragment}`")]
    Incomplete { fragment: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("atom `{name}` is not a boolean")]
    NotBoolean { name: String },

    #[error("atom `{name}` has no integer domain")]
    NotInteger { name: String },

    #[error("unknown atom index {0}")]
    UnknownAtom(usize),

    #[error("solver backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read model {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot read exclusion table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("{grafcet}/{transition}: {source}")]
    Translate {
        grafcet: String,
        transition: String,
        #[source]
        source: TranslateError,
    },

    #[error("{grafcet}/{transition}: {source}")]
    Notation {
        grafcet: String,
        transition: String,
        #[source]
        source: NotationError,
    },
}
