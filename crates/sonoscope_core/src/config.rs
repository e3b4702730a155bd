//! Pipeline Configuration
//!
//! The device format itself is fixed (PCM signed 16-bit, stereo
//! interleaved); only the sample rate and the frame size are configurable.

use serde::{Deserialize, Serialize};

/// Channel count of every line the pipeline opens.
pub const CHANNELS: u16 = 2;

/// Bytes per encoded sample (16-bit PCM).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Audio pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sample rate in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,

    /// Samples per frame, both channels counted (lower = less latency).
    /// A power of two keeps the frame directly usable by the spectral
    /// analyzer without padding.
    pub frame_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            frame_size: 1024,
        }
    }
}

impl PipelineConfig {
    /// Byte length of one raw PCM frame
    pub fn frame_bytes(&self) -> usize {
        self.frame_size * BYTES_PER_SAMPLE
    }

    /// Number of stereo sample pairs in one frame
    pub fn stereo_frames(&self) -> usize {
        self.frame_size / CHANNELS as usize
    }

    /// Calculate latency in milliseconds for one frame
    pub fn latency_ms(&self) -> f32 {
        (self.stereo_frames() as f32 / self.sample_rate as f32) * 1000.0
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate < 8000 || self.sample_rate > 192000 {
            return Err(format!("Invalid sample rate: {}", self.sample_rate));
        }
        if self.frame_size < 32 || self.frame_size > 8192 {
            return Err(format!("Invalid frame size: {}", self.frame_size));
        }
        if self.frame_size % CHANNELS as usize != 0 {
            return Err(format!(
                "Frame size {} does not hold whole stereo pairs",
                self.frame_size
            ));
        }
        Ok(())
    }

    /// Create config optimized for low latency
    pub fn low_latency() -> Self {
        Self {
            sample_rate: 44100,
            frame_size: 256, // ~2.9ms latency
        }
    }

    /// Create config optimized for stability
    pub fn stable() -> Self {
        Self {
            sample_rate: 44100,
            frame_size: 4096, // ~46ms latency
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.frame_size, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_frame_bytes() {
        let config = PipelineConfig::default();
        assert_eq!(config.frame_bytes(), 2048);
        assert_eq!(config.stereo_frames(), 512);
    }

    #[test]
    fn test_latency_calculation() {
        let config = PipelineConfig {
            sample_rate: 44100,
            frame_size: 882, // 441 stereo pairs, exactly 10ms
        };
        let latency = config.latency_ms();
        assert!((latency - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_validation() {
        let valid = PipelineConfig::default();
        assert!(valid.validate().is_ok());

        let invalid_rate = PipelineConfig {
            sample_rate: 100,
            ..Default::default()
        };
        assert!(invalid_rate.validate().is_err());

        let invalid_size = PipelineConfig {
            frame_size: 10,
            ..Default::default()
        };
        assert!(invalid_size.validate().is_err());

        let odd_size = PipelineConfig {
            frame_size: 1023,
            ..Default::default()
        };
        assert!(odd_size.validate().is_err());
    }

    #[test]
    fn test_preset_configs() {
        let low_latency = PipelineConfig::low_latency();
        let stable = PipelineConfig::stable();

        assert!(low_latency.frame_size < stable.frame_size);
        assert!(low_latency.latency_ms() < stable.latency_ms());
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.sample_rate, deserialized.sample_rate);
        assert_eq!(config.frame_size, deserialized.frame_size);
    }
}
