//! Sonoscope DSP - Signal Analysis Module
//!
//! This crate provides the analysis side of the Sonoscope pipeline:
//! - FFT spectral transform of captured frames (spectrogram source data)
//! - VU-style three-zone level classification
//!
//! Both are pure computations: they are driven from the analysis/UI tick,
//! never from the audio thread, so the capture/playback cycle rate and the
//! visualization refresh rate stay decoupled.

mod error;
mod meter;
mod spectrum;

pub use error::DspError;
pub use meter::{classify, LevelZone, MODERATE_CEILING_DB, QUIET_CEILING_DB};
pub use spectrum::{SpectralFrame, SpectrumAnalyzer};
