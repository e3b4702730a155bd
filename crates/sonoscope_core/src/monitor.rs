//! Analysis Tick
//!
//! An independent periodic task that consumes frame snapshots and turns
//! them into meter and spectrum events for the UI. It runs at its own
//! fixed interval (a display refresh rate, not the audio rate) and never
//! touches the device lines, so a slow or stalled visualization can never
//! stall capture or playback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use sonoscope_dsp::{classify, SpectrumAnalyzer};
use tracing::{debug, info};

use crate::error::{CoreResult, PipelineError};
use crate::message::Event;
use crate::snapshot::SnapshotCell;

/// Default tick interval, ~30 updates per second.
pub const DEFAULT_TICK: Duration = Duration::from_millis(33);

/// Periodic consumer of pipeline snapshots.
///
/// Emits `LevelUpdate` on every tick that finds a fresh snapshot, plus
/// `SpectrumUpdate` when the frame length allows the transform. Events are
/// sent with `try_send` and dropped if nobody listens; the tick never
/// blocks.
pub struct AnalysisMonitor {
    worker: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl AnalysisMonitor {
    /// Spawn the analysis tick against a pipeline's snapshot cell.
    pub fn spawn(
        snapshot: Arc<SnapshotCell>,
        sample_rate: u32,
        tick: Duration,
        events: Sender<Event>,
    ) -> CoreResult<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_shutdown = Arc::clone(&shutdown);

        let worker = thread::Builder::new()
            .name("sonoscope-analysis".into())
            .spawn(move || {
                info!("analysis tick started ({} ms interval)", tick.as_millis());
                let mut analyzer = SpectrumAnalyzer::new();

                while !worker_shutdown.load(Ordering::Acquire) {
                    if let Some(frame) = snapshot.take() {
                        let db = frame.level_db();
                        let _ = events.try_send(Event::LevelUpdate {
                            db,
                            zone: classify(db),
                        });

                        match analyzer.transform(frame.samples(), sample_rate) {
                            Ok(spectral) => {
                                let _ = events.try_send(Event::SpectrumUpdate {
                                    magnitudes: spectral.half_magnitudes(),
                                });
                            }
                            Err(e) => {
                                // Frame size not analyzable; meter still works
                                debug!("spectrum skipped: {e}");
                            }
                        }
                    }
                    thread::sleep(tick);
                }
                info!("analysis tick stopped");
            })
            .map_err(|e| PipelineError::ThreadSpawn(e.to_string()))?;

        Ok(Self {
            worker: Some(worker),
            shutdown,
        })
    }

    /// Request a shutdown. The tick finishes its current iteration.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }
}

impl Drop for AnalysisMonitor {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::message::Event;
    use sonoscope_dsp::LevelZone;
    use std::f64::consts::PI;

    fn sine_frame(freq: f64, frame_size: usize, sample_rate: f64) -> Frame {
        let mut frame = Frame::new(frame_size);
        for i in 0..frame_size {
            frame.set_sample(i, (2.0 * PI * freq * i as f64 / sample_rate).sin());
        }
        frame
    }

    #[test]
    fn test_monitor_emits_level_and_spectrum() {
        let cell = Arc::new(SnapshotCell::new());
        let (sender, receiver) = crossbeam_channel::unbounded();

        let monitor = AnalysisMonitor::spawn(
            Arc::clone(&cell),
            44100,
            Duration::from_millis(5),
            sender,
        )
        .unwrap();

        cell.publish(sine_frame(1000.0, 256, 44100.0));

        let mut got_level = false;
        let mut got_spectrum = false;
        for _ in 0..10 {
            match receiver.recv_timeout(Duration::from_secs(1)) {
                Ok(Event::LevelUpdate { db, zone }) => {
                    // The frame was built, not captured, so its level is
                    // still the silence floor
                    assert_eq!(zone, LevelZone::Quiet);
                    assert!(!db.is_nan());
                    got_level = true;
                }
                Ok(Event::SpectrumUpdate { magnitudes }) => {
                    assert_eq!(magnitudes.len(), 129);
                    got_spectrum = true;
                }
                Ok(_) => {}
                Err(_) => break,
            }
            if got_level && got_spectrum {
                break;
            }
        }

        assert!(got_level, "expected a LevelUpdate event");
        assert!(got_spectrum, "expected a SpectrumUpdate event");

        drop(monitor);
    }

    #[test]
    fn test_monitor_skips_unanalyzable_frames() {
        let cell = Arc::new(SnapshotCell::new());
        let (sender, receiver) = crossbeam_channel::unbounded();

        let monitor = AnalysisMonitor::spawn(
            Arc::clone(&cell),
            44100,
            Duration::from_millis(5),
            sender,
        )
        .unwrap();

        // 100 samples is not a power of two: meter only, no spectrum
        cell.publish(Frame::new(100));

        let mut got_level = false;
        for _ in 0..5 {
            match receiver.recv_timeout(Duration::from_millis(200)) {
                Ok(Event::LevelUpdate { .. }) => got_level = true,
                Ok(Event::SpectrumUpdate { .. }) => {
                    panic!("non-power-of-two frame must not produce a spectrum")
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
        assert!(got_level);

        drop(monitor);
    }

    #[test]
    fn test_shutdown_stops_the_tick() {
        let cell = Arc::new(SnapshotCell::new());
        let (sender, receiver) = crossbeam_channel::unbounded();

        let monitor =
            AnalysisMonitor::spawn(cell, 44100, Duration::from_millis(5), sender).unwrap();
        monitor.shutdown();
        drop(monitor); // joins

        // Sender side is gone once the thread exits
        assert!(receiver
            .recv_timeout(Duration::from_millis(500))
            .is_err());
    }
}
