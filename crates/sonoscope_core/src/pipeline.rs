//! Capture/Playback Loop
//!
//! One dedicated worker thread owns both device lines end to end: it
//! repeatedly reads a frame from the input line, applies the injected
//! effect, writes the result to the output line, and publishes a snapshot
//! for the analysis side. Nothing else ever touches the lines.
//!
//! The controller only exposes the lifecycle: `start` (spawns the worker
//! and waits for the lines to open), cooperative `stop`, `is_running`, the
//! snapshot cell, and the event stream. `stop` is observed at the top of
//! the next cycle, never mid-cycle, so stop latency is bounded by one
//! device I/O round-trip.
//!
//! Device errors mid-loop are terminal: the loop closes both lines, emits
//! one `Error` event followed by `Stopped`, and never retries. Reopening
//! is the owner's decision.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::error::{CoreResult, PipelineError};
use crate::frame::Frame;
use crate::line::{self, InputLine, OutputLine, ReadOutcome};
use crate::message::Event;
use crate::snapshot::SnapshotCell;

/// A pluggable transform applied to every captured frame.
///
/// Injected at [`AudioPipeline::start`]; the loop itself stays untouched
/// when effects change. Implementations run on the audio thread and should
/// avoid blocking.
pub trait FrameEffect: Send {
    fn apply(&mut self, input: &Frame, output: &mut Frame);
}

/// The default effect: copies the input frame unchanged.
pub struct Identity;

impl FrameEffect for Identity {
    fn apply(&mut self, input: &Frame, output: &mut Frame) {
        output.copy_from(input);
    }
}

/// Opens both lines on the worker thread.
///
/// CPAL streams must live on the thread that uses them, so the pipeline
/// takes an opener instead of the lines themselves and runs it after the
/// worker spawns. Open failures are handed back to `start` synchronously.
pub type LineOpener =
    Box<dyn FnOnce() -> CoreResult<(Box<dyn InputLine>, Box<dyn OutputLine>)> + Send>;

/// Controller for the capture/playback loop.
///
/// Lives on the caller's thread; the loop runs on its own named worker.
/// Dropping the controller requests a stop and joins the worker.
pub struct AudioPipeline {
    worker: Option<JoinHandle<()>>,
    stop_flag: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    snapshot: Arc<SnapshotCell>,
    event_sender: Sender<Event>,
    event_receiver: Receiver<Event>,
}

impl AudioPipeline {
    /// Start the pipeline on the named devices with the given effect.
    ///
    /// Resolution and open errors surface here, before the loop ever
    /// enters the running state.
    pub fn start_devices(
        input_name: &str,
        output_name: &str,
        config: PipelineConfig,
        effect: Box<dyn FrameEffect>,
    ) -> CoreResult<Self> {
        let opener_config = config.clone();
        let input_name = input_name.to_string();
        let output_name = output_name.to_string();

        Self::start(
            config,
            effect,
            Box::new(move || {
                let input = line::open_input(&input_name, &opener_config)?;
                let output = line::open_output(&output_name, &opener_config)?;
                Ok((
                    Box::new(input) as Box<dyn InputLine>,
                    Box::new(output) as Box<dyn OutputLine>,
                ))
            }),
        )
    }

    /// Start the pipeline with an explicit line opener.
    ///
    /// Blocks until the opener has run on the worker thread; an opener
    /// failure is returned here and no loop is started.
    pub fn start(
        config: PipelineConfig,
        effect: Box<dyn FrameEffect>,
        opener: LineOpener,
    ) -> CoreResult<Self> {
        config.validate().map_err(PipelineError::ConfigError)?;

        let (event_sender, event_receiver) = unbounded::<Event>();
        let (ready_sender, ready_receiver) = bounded::<CoreResult<()>>(1);

        let stop_flag = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(false));
        let snapshot = Arc::new(SnapshotCell::new());

        let worker_stop = Arc::clone(&stop_flag);
        let worker_running = Arc::clone(&running);
        let worker_snapshot = Arc::clone(&snapshot);
        let worker_events = event_sender.clone();

        let worker = thread::Builder::new()
            .name("sonoscope-audio".into())
            .spawn(move || {
                worker_main(
                    config,
                    effect,
                    opener,
                    worker_stop,
                    worker_running,
                    worker_snapshot,
                    worker_events,
                    ready_sender,
                );
            })
            .map_err(|e| PipelineError::ThreadSpawn(e.to_string()))?;

        // Wait for the open handshake so open-time errors surface to the
        // caller and a failed open never reports Running
        match ready_receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(PipelineError::ThreadSpawn(
                    "audio thread exited before opening lines".into(),
                ));
            }
        }

        Ok(Self {
            worker: Some(worker),
            stop_flag,
            running,
            snapshot,
            event_sender,
            event_receiver,
        })
    }

    /// Request a stop. Asynchronous: the worker observes the request at
    /// the top of its next cycle, so callers must not assume immediate
    /// cessation.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
    }

    /// Whether the loop is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Take the most recently published frame snapshot, if any
    pub fn take_snapshot(&self) -> Option<Arc<Frame>> {
        self.snapshot.take()
    }

    /// The snapshot cell, for wiring up an analysis consumer
    pub fn snapshot_cell(&self) -> Arc<SnapshotCell> {
        Arc::clone(&self.snapshot)
    }

    /// A sender feeding this pipeline's event stream (for the analysis
    /// monitor to publish on the same channel)
    pub fn event_sender(&self) -> Sender<Event> {
        self.event_sender.clone()
    }

    /// Get next event (non-blocking)
    pub fn poll_event(&self) -> Option<Event> {
        self.event_receiver.try_recv().ok()
    }

    /// Get next event (blocking)
    pub fn wait_event(&self) -> Option<Event> {
        self.event_receiver.recv().ok()
    }

    /// Request a stop and wait for the worker to finish.
    pub fn join(mut self) {
        self.stop();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for AudioPipeline {
    fn drop(&mut self) {
        self.stop();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Worker thread body: open lines, run the cycle until stopped, clean up.
#[allow(clippy::too_many_arguments)]
fn worker_main(
    config: PipelineConfig,
    mut effect: Box<dyn FrameEffect>,
    opener: LineOpener,
    stop_flag: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    snapshot: Arc<SnapshotCell>,
    events: Sender<Event>,
    ready: Sender<CoreResult<()>>,
) {
    let (mut input, mut output) = match opener() {
        Ok(lines) => {
            let _ = ready.send(Ok(()));
            lines
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    running.store(true, Ordering::Release);
    let _ = events.send(Event::Started);
    info!(
        "audio thread started ({} Hz, {} samples per frame)",
        config.sample_rate, config.frame_size
    );

    let mut input_frame = Frame::new(config.frame_size);
    let mut output_frame = Frame::new(config.frame_size);
    let mut raw = vec![0u8; config.frame_bytes()];

    loop {
        // Cooperative stop, observed at cycle boundaries only
        if stop_flag.load(Ordering::Acquire) {
            break;
        }

        match input.read(&mut raw) {
            Ok(ReadOutcome::Filled) => {}
            Ok(ReadOutcome::EndOfStream) => {
                info!("input line reached end of stream");
                break;
            }
            Err(e) => {
                error!("capture failed: {e}");
                let _ = events.send(Event::error(&e));
                break;
            }
        }

        if let Err(e) = input_frame.fill_from_capture(&raw) {
            error!("capture conversion failed: {e}");
            let _ = events.send(Event::error(&e));
            break;
        }

        effect.apply(&input_frame, &mut output_frame);

        if let Err(e) = output_frame.encode_playback(&mut raw) {
            error!("playback conversion failed: {e}");
            let _ = events.send(Event::error(&e));
            break;
        }

        match output.write(&raw) {
            Ok(written) if written == raw.len() => {}
            Ok(written) => {
                let e = PipelineError::ShortWrite {
                    expected: raw.len(),
                    written,
                };
                error!("playback failed: {e}");
                let _ = events.send(Event::error(&e));
                break;
            }
            Err(e) => {
                error!("playback failed: {e}");
                let _ = events.send(Event::error(&e));
                break;
            }
        }

        // Hand the completed frame to the analysis side; an unconsumed
        // previous snapshot is simply replaced
        snapshot.publish(output_frame.clone());
    }

    input.close();
    output.close();
    running.store(false, Ordering::Release);
    let _ = events.send(Event::Stopped);
    info!("audio thread stopped");
}
