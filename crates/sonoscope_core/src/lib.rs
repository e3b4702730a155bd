//! Sonoscope Core - Audio Engine
//!
//! This crate provides the real-time audio pipeline for Sonoscope:
//! - Audio device enumeration and name resolution (via CPAL)
//! - Blocking device lines over the fixed PCM 16-bit stereo format
//! - The capture -> effect -> playback loop on a dedicated worker thread
//! - Lock-free snapshot handoff to the analysis/UI side
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       UI Thread                             │
//! │   start/stop ──▶ AudioPipeline ◀──events── poll/wait        │
//! └─────────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Audio Thread                            │
//! │   InputLine ──read──▶ Frame ──effect──▶ Frame ──write──▶    │
//! │                                            │     OutputLine │
//! │                                   snapshot ▼                │
//! └────────────────────────────────────────────│────────────────┘
//!                             SnapshotCell (atomic swap)
//!                                             │
//! ┌───────────────────────────────────────────▼─────────────────┐
//! │                   Analysis Thread                           │
//! │   AnalysisMonitor ──▶ level zone + spectrum ──▶ events      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod device;
mod error;
mod frame;
mod line;
mod message;
mod monitor;
mod pipeline;
mod snapshot;

pub use config::{PipelineConfig, BYTES_PER_SAMPLE, CHANNELS};
pub use device::{device_names, resolve, AudioDevice, DeviceType};
pub use error::{CoreResult, PipelineError};
pub use frame::{Frame, SILENCE_DB};
pub use line::{open_input, open_output, CaptureLine, InputLine, OutputLine, PlaybackLine, ReadOutcome};
pub use message::Event;
pub use monitor::{AnalysisMonitor, DEFAULT_TICK};
pub use pipeline::{AudioPipeline, FrameEffect, Identity, LineOpener};
pub use snapshot::SnapshotCell;

// Re-export analysis types for convenience
pub use sonoscope_dsp::{classify, DspError, LevelZone, SpectralFrame, SpectrumAnalyzer};
