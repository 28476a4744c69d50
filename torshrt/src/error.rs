use std::fmt;

use tch::TchError;

/// Error produced while evaluating a command. Every failure is recoverable
/// at the command boundary: the message becomes the command's result and the
/// registry is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtError {
    /// Malformed argument list: arity, unknown flag, coercion failure.
    Argument(String),
    /// A handle that does not resolve in the registry.
    Handle(String),
    /// The wrapped tensor library rejected the operation.
    Domain(String),
}

impl RtError {
    pub fn argument(msg: impl Into<String>) -> Self {
        RtError::Argument(msg.into())
    }

    pub fn handle(msg: impl Into<String>) -> Self {
        RtError::Handle(msg.into())
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        RtError::Domain(msg.into())
    }

    pub fn message(&self) -> &str {
        match self {
            RtError::Argument(msg) | RtError::Handle(msg) | RtError::Domain(msg) => msg,
        }
    }
}

impl fmt::Display for RtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for RtError {}

impl From<TchError> for RtError {
    fn from(err: TchError) -> Self {
        RtError::Domain(err.to_string())
    }
}
