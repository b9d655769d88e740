use thiserror::Error;

use crate::sql::rewrite::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Classification,
    Resolution,
    Consistency,
    Configuration,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "GRAPHLOAD_ERROR_PARSE",
            Self::Classification => "GRAPHLOAD_ERROR_CLASSIFICATION",
            Self::Resolution => "GRAPHLOAD_ERROR_RESOLUTION",
            Self::Consistency => "GRAPHLOAD_ERROR_CONSISTENCY",
            Self::Configuration => "GRAPHLOAD_ERROR_CONFIGURATION",
        }
    }

    pub const fn all() -> &'static [Self] {
        &[
            Self::Parse,
            Self::Classification,
            Self::Resolution,
            Self::Consistency,
            Self::Configuration,
        ]
    }
}

/// Every failure aborts the whole batch; there is no partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphloadError {
    #[error("failed to parse SQL: {message}")]
    Parse { message: String },

    #[error("unexpected statement type: {statement}")]
    UnsupportedStatement { statement: String },

    #[error("statement does not contain recognizable point or edge columns")]
    UnrecognizedStatement,

    #[error(
        "missing required edge columns: point1_id={point1_id} point2_id={point2_id} point1_type={point1_type} point2_type={point2_type}"
    )]
    MissingEdgeColumns {
        point1_id: bool,
        point2_id: bool,
        point1_type: bool,
        point2_type: bool,
    },

    #[error("missing required point columns: point_id={point_id} point_type={point_type}")]
    MissingPointColumns { point_id: bool, point_type: bool },

    #[error("union branches of one statement disagree: {detail}")]
    MixedStatementBranches { detail: String },

    #[error("unsupported projection item `{item}`: {reason}")]
    UnsupportedProjection { item: String, reason: String },

    #[error("cannot resolve group type from `{expression}`: {reason}")]
    UnresolvedGroupType {
        expression: String,
        reason: EvalError,
    },

    #[error(
        "statements of group `{group_key}` disagree on identity columns: expected [{}], found [{}]",
        .expected.join(", "),
        .found.join(", ")
    )]
    IdentityColumnMismatch {
        group_key: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error(
        "statements of group `{group_key}` disagree on output columns: expected [{}], found [{}]",
        .expected.join(", "),
        .found.join(", ")
    )]
    OutputColumnMismatch {
        group_key: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("invalid type `{type_name}` for column `{column}` of group `{group_key}`: {message}")]
    InvalidTypeMap {
        group_key: String,
        column: String,
        type_name: String,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl GraphloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::UnsupportedStatement { .. }
            | Self::UnrecognizedStatement
            | Self::MissingEdgeColumns { .. }
            | Self::MissingPointColumns { .. }
            | Self::MixedStatementBranches { .. }
            | Self::UnsupportedProjection { .. } => ErrorKind::Classification,
            Self::UnresolvedGroupType { .. } => ErrorKind::Resolution,
            Self::IdentityColumnMismatch { .. } | Self::OutputColumnMismatch { .. } => {
                ErrorKind::Consistency
            }
            Self::InvalidTypeMap { .. } | Self::InvalidConfig { .. } => ErrorKind::Configuration,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().as_str()
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

impl From<sqlparser::parser::ParserError> for GraphloadError {
    fn from(error: sqlparser::parser::ParserError) -> Self {
        Self::parse(error.to_string())
    }
}
