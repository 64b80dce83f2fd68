//! Failure classes of the `annotkit` binary and the exit status each one maps to.

use std::fmt;
use std::process::ExitCode;

use annotkit_codec::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The command line cannot be acted on: unknown flags, a missing argument, a feature index
    /// past the end of the document, a non-positive zoom or a stroke without points.
    Usage = 1,
    /// The config or document could not be read, parsed, or decoded into items (unsupported
    /// geometry type, malformed coordinates, singular raster transform).
    Input = 2,
    /// The document loaded but the edit or its output failed: painting a feature that is not a
    /// region, re-encoding the edited scene, or writing the output file.
    Processing = 3,
}

impl From<ErrorCode> for ExitCode {
    fn from(code: ErrorCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Usage,
            message: message.into(),
        }
    }

    /// Keeps the whole context chain of `err` in the message.
    pub fn input(err: impl Into<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::Input,
            message: format!("{:#}", err.into()),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Processing,
            message: message.into(),
        }
    }
}

/// Decoding errors are reported through [`CliError::input`]; a format error that reaches this
/// conversion came from encoding an already loaded scene.
impl From<FormatError> for CliError {
    fn from(err: FormatError) -> Self {
        Self::processing(err.to_string())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn input_error_keeps_context_chain() {
        let err = Err::<(), _>(std::io::Error::other("permission denied"))
            .context("Could not read document doc.json")
            .unwrap_err();
        let err = CliError::input(err);
        assert_eq!(err.code, ErrorCode::Input);
        assert_eq!(
            err.to_string(),
            "Could not read document doc.json: permission denied"
        );
    }

    #[test]
    fn encode_failure_is_a_processing_error() {
        let err = CliError::from(FormatError::NonInvertibleTransform {
            path: "features[0].geometry".to_string(),
        });
        assert_eq!(err.code, ErrorCode::Processing);
        assert_eq!(err.code as u8, 3);
        assert!(err.message.contains("features[0].geometry"));
    }
}
