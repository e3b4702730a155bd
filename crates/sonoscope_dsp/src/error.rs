//! DSP Error Types

use thiserror::Error;

/// Errors that can occur during signal analysis
#[derive(Error, Debug)]
pub enum DspError {
    #[error("frame length {0} is not a power of two")]
    NonPowerOfTwoLength(usize),

    #[error("cannot analyze an empty frame")]
    EmptyFrame,
}
