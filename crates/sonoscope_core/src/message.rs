//! Event Stream to the Controller/UI
//!
//! Events flow one way, from the audio and analysis threads to whoever
//! holds the controller. Lifecycle commands travel the other way as direct
//! method calls on [`crate::pipeline::AudioPipeline`], so there is no
//! command enum mirroring these.

use serde::{Deserialize, Serialize};
use sonoscope_dsp::LevelZone;

/// Events emitted by the pipeline worker and the analysis monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    /// Pipeline entered the running state
    Started,

    /// Pipeline stopped (requested stop, end of stream, or after a fault)
    Stopped,

    /// Terminal pipeline fault; followed by `Stopped`, never retried
    Error { message: String },

    /// Signal level update for the VU meter
    LevelUpdate { db: f64, zone: LevelZone },

    /// Spectrum magnitudes for one spectrogram column
    /// (bins 0..=frame_size/2, the meaningful half for real input)
    SpectrumUpdate { magnitudes: Vec<f64> },
}

impl Event {
    /// Create an error event from any error type
    pub fn error<E: std::fmt::Display>(err: E) -> Self {
        Event::Error {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = Event::LevelUpdate {
            db: -12.5,
            zone: LevelZone::Loud,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("LevelUpdate"));

        let deserialized: Event = serde_json::from_str(&json).unwrap();
        if let Event::LevelUpdate { db, zone } = deserialized {
            assert_eq!(db, -12.5);
            assert_eq!(zone, LevelZone::Loud);
        } else {
            panic!("Deserialization produced wrong variant");
        }
    }

    #[test]
    fn test_error_event() {
        let event = Event::error("device went away");
        if let Event::Error { message } = event {
            assert_eq!(message, "device went away");
        } else {
            panic!("Should be Error variant");
        }
    }

    #[test]
    fn test_spectrum_update_serialization() {
        let event = Event::SpectrumUpdate {
            magnitudes: vec![0.0, 1.5, 0.25],
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        if let Event::SpectrumUpdate { magnitudes } = deserialized {
            assert_eq!(magnitudes.len(), 3);
            assert_eq!(magnitudes[1], 1.5);
        } else {
            panic!("Wrong variant");
        }
    }
}
