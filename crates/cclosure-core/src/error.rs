use std::fmt;

/// Machine-readable error codes for scripted consumers of the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    DatasetNotFound,
    InvalidArgument,
    MalformedEdgeList,
    SelfLoopRejected,
    CounterOverflow,
    MatrixTooLarge,
    DensifyNotConverged,
    ReportWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::DatasetNotFound => "E1002",
            Self::InvalidArgument => "E1003",
            Self::MalformedEdgeList => "E2001",
            Self::SelfLoopRejected => "E2002",
            Self::CounterOverflow => "E3001",
            Self::MatrixTooLarge => "E3002",
            Self::DensifyNotConverged => "E4001",
            Self::ReportWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::DatasetNotFound => "Dataset file not found",
            Self::InvalidArgument => "Invalid command-line argument",
            Self::MalformedEdgeList => "Malformed edge-list line",
            Self::SelfLoopRejected => "Self-loop edge rejected",
            Self::CounterOverflow => "Common-neighbor counter overflow",
            Self::MatrixTooLarge => "Common-neighbor matrix too large",
            Self::DensifyNotConverged => "Densification did not converge",
            Self::ReportWriteFailed => "Report write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in cclosure.toml and retry."),
            Self::DatasetNotFound => Some("Check `[data] dir` and the dataset file names."),
            Self::InvalidArgument => Some("Run with --help to see accepted values."),
            Self::MalformedEdgeList => {
                Some("Each non-comment line needs exactly two non-negative integer node ids.")
            }
            Self::SelfLoopRejected => None,
            Self::CounterOverflow => Some("The graph's maximum degree exceeds the counter width."),
            Self::MatrixTooLarge => {
                Some("Raise `[estimate] max_nodes` or run the exact analysis instead.")
            }
            Self::DensifyNotConverged => {
                Some("Raise `[densify] max_rounds` or choose a larger target c.")
            }
            Self::ReportWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
