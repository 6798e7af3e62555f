//! Error taxonomy shared by the decoder, the pattern constructors and the loaders.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RudimentError {
    /// A Pattern or bar table that cannot be built as requested
    /// (mismatched voice lengths, zero bars, zero loops).
    #[error("invalid pattern: {0}")]
    Validation(String),

    /// Malformed notation, exercise table block or hit-event line.
    #[error("cannot parse '{input}': {message}")]
    Parse { input: String, message: String },

    /// No exercise with the requested name.
    #[error("no exercise named '{0}'")]
    Lookup(String),
}

impl RudimentError {
    pub fn validation(reason: impl Into<String>) -> Self {
        RudimentError::Validation(reason.into())
    }

    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        RudimentError::Parse {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Prefix the message with where the error happened, keeping the variant.
    pub fn within(self, context: &str) -> Self {
        match self {
            RudimentError::Validation(reason) => {
                RudimentError::Validation(format!("{}: {}", context, reason))
            }
            RudimentError::Parse { input, message } => RudimentError::Parse {
                input,
                message: format!("{}: {}", context, message),
            },
            lookup @ RudimentError::Lookup(_) => lookup,
        }
    }
}

pub type Result<T> = std::result::Result<T, RudimentError>;
