//! Pipeline Error Types

use thiserror::Error;

/// Errors that can occur in the audio pipeline
///
/// End of stream is deliberately NOT an error: the input line reports it as
/// a [`crate::line::ReadOutcome`] variant because it is a normal terminal
/// signal, not a failure.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No audio devices found")]
    NoDevicesFound,

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Frame format error: expected {expected} bytes, got {got}")]
    FormatError { expected: usize, got: usize },

    #[error("Short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    #[error("Short write: expected {expected} bytes, wrote {written}")]
    ShortWrite { expected: usize, written: usize },

    #[error("Pipeline configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to spawn audio thread: {0}")]
    ThreadSpawn(String),

    #[error("Analysis error: {0}")]
    Dsp(#[from] sonoscope_dsp::DspError),
}

/// Result type alias for pipeline operations
pub type CoreResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::NoDevicesFound;
        assert!(err.to_string().contains("No audio devices"));

        let err = PipelineError::DeviceNotFound("USB Audio Device".into());
        assert!(err.to_string().contains("USB Audio Device"));

        let err = PipelineError::ShortWrite {
            expected: 2048,
            written: 512,
        };
        assert!(err.to_string().contains("2048"));
        assert!(err.to_string().contains("512"));
    }

    #[test]
    fn test_error_from_dsp() {
        let dsp_err = sonoscope_dsp::DspError::NonPowerOfTwoLength(1000);
        let core_err: PipelineError = dsp_err.into();
        assert!(matches!(core_err, PipelineError::Dsp(_)));
    }
}
