//! Device Line Abstraction
//!
//! Blocking read/write over an open, format-locked device stream. CPAL
//! drives the hardware through callbacks; an SPSC byte ring bridges each
//! callback to the blocking line API the pipeline loop expects.
//!
//! Wire format at this boundary (fixed): PCM signed 16-bit, stereo
//! interleaved. The capture line delivers **big-endian** byte pairs; the
//! playback line consumes **little-endian** byte pairs. Frame conversion
//! (`crate::frame`) matches this asymmetry exactly.
//!
//! Lines are opened on the thread that uses them and are not `Send`: the
//! underlying CPAL streams must stay on their creating thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Stream, StreamConfig as CpalStreamConfig};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error, info};

use crate::config::{PipelineConfig, CHANNELS};
use crate::device::{self, DeviceType};
use crate::error::{CoreResult, PipelineError};

/// How long a blocked read/write sleeps between polls of the ring.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Ring capacity, in frames worth of bytes.
const RING_FRAMES: usize = 8;

/// Result of a blocking read against an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The buffer was completely filled
    Filled,
    /// The device reported closure before any byte of this frame
    EndOfStream,
}

/// Blocking source of raw capture bytes.
pub trait InputLine {
    /// Fill `buf` completely, blocking until enough bytes arrive.
    ///
    /// Returns [`ReadOutcome::EndOfStream`] if the line closed before the
    /// first byte; a closure mid-frame is a `ShortRead` error.
    fn read(&mut self, buf: &mut [u8]) -> CoreResult<ReadOutcome>;

    /// Stop and release the line. Safe to call more than once.
    fn close(&mut self);
}

/// Blocking sink for raw playback bytes.
pub trait OutputLine {
    /// Write `buf`, blocking while the device drains. Returns the number
    /// of bytes actually written; the caller decides whether a short
    /// write is fatal.
    fn write(&mut self, buf: &[u8]) -> CoreResult<usize>;

    /// Stop and release the line. Safe to call more than once.
    fn close(&mut self);
}

/// An open input line backed by a CPAL capture stream.
pub struct CaptureLine {
    // Held to keep the callback alive; dropped on close
    stream: Option<Stream>,
    bytes: Consumer<u8>,
    open: Arc<AtomicBool>,
}

/// An open output line backed by a CPAL playback stream.
pub struct PlaybackLine {
    stream: Option<Stream>,
    bytes: Producer<u8>,
    open: Arc<AtomicBool>,
}

/// Open an input line on the named device.
///
/// The name is resolved through the device directory (case-insensitive
/// exact match). Fails with `DeviceNotFound` if no device matches, or
/// `DeviceUnavailable` if the device cannot run the fixed
/// 16-bit/stereo format at the requested rate.
pub fn open_input(device_name: &str, config: &PipelineConfig) -> CoreResult<CaptureLine> {
    let device = device::resolve(device_name, DeviceType::Input)?;

    let cpal_config = CpalStreamConfig {
        channels: CHANNELS,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let (mut producer, consumer) = RingBuffer::<u8>::new(config.frame_bytes() * RING_FRAMES);
    let open = Arc::new(AtomicBool::new(true));
    let open_err = Arc::clone(&open);

    let stream = device
        .build_input_stream(
            &cpal_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                // Device callback: encode big-endian into the ring.
                // Whole samples only; a torn byte pair would shift the
                // stream by one byte for good.
                let take = (producer.slots() / 2).min(data.len());
                if take == 0 {
                    return;
                }
                if let Ok(mut chunk) = producer.write_chunk_uninit(take * 2) {
                    let (first, second) = chunk.as_mut_slices();
                    let mut encoded = data[..take].iter().flat_map(|s| s.to_be_bytes());
                    for slot in first.iter_mut() {
                        if let Some(b) = encoded.next() {
                            slot.write(b);
                        }
                    }
                    for slot in second.iter_mut() {
                        if let Some(b) = encoded.next() {
                            slot.write(b);
                        }
                    }
                    // Working with uninitialized slots requires the unsafe commit
                    unsafe { chunk.commit_all() };
                }
            },
            move |err| {
                error!("capture stream error: {err}");
                open_err.store(false, Ordering::Release);
            },
            None, // No timeout
        )
        .map_err(|e| PipelineError::DeviceUnavailable(e.to_string()))?;

    stream
        .play()
        .map_err(|e| PipelineError::DeviceUnavailable(e.to_string()))?;

    info!("opened capture line on '{device_name}' at {} Hz", config.sample_rate);

    Ok(CaptureLine {
        stream: Some(stream),
        bytes: consumer,
        open,
    })
}

/// Open an output line on the named device.
///
/// Same resolution and failure contract as [`open_input`].
pub fn open_output(device_name: &str, config: &PipelineConfig) -> CoreResult<PlaybackLine> {
    let device = device::resolve(device_name, DeviceType::Output)?;

    let cpal_config = CpalStreamConfig {
        channels: CHANNELS,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let (producer, mut consumer) = RingBuffer::<u8>::new(config.frame_bytes() * RING_FRAMES);
    let open = Arc::new(AtomicBool::new(true));
    let open_err = Arc::clone(&open);

    let stream = device
        .build_output_stream(
            &cpal_config,
            move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                // Device callback: decode little-endian out of the ring,
                // whole samples only
                let have = (consumer.slots() / 2).min(data.len());
                let mut idx = 0;
                if have > 0 {
                    if let Ok(chunk) = consumer.read_chunk(have * 2) {
                        let (first, second) = chunk.as_slices();
                        let mut decoded = first.iter().chain(second.iter()).copied();
                        while idx < have {
                            let lo = decoded.next().unwrap_or(0);
                            let hi = decoded.next().unwrap_or(0);
                            data[idx] = i16::from_le_bytes([lo, hi]);
                            idx += 1;
                        }
                        chunk.commit_all();
                    }
                }
                // Underrun: pad with silence
                if idx < data.len() {
                    debug!("playback underrun, padding {} samples", data.len() - idx);
                }
                for slot in &mut data[idx..] {
                    *slot = 0;
                }
            },
            move |err| {
                error!("playback stream error: {err}");
                open_err.store(false, Ordering::Release);
            },
            None,
        )
        .map_err(|e| PipelineError::DeviceUnavailable(e.to_string()))?;

    stream
        .play()
        .map_err(|e| PipelineError::DeviceUnavailable(e.to_string()))?;

    info!("opened playback line on '{device_name}' at {} Hz", config.sample_rate);

    Ok(PlaybackLine {
        stream: Some(stream),
        bytes: producer,
        open,
    })
}

impl CaptureLine {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.bytes.is_abandoned()
    }
}

impl InputLine for CaptureLine {
    fn read(&mut self, buf: &mut [u8]) -> CoreResult<ReadOutcome> {
        let mut filled = 0;
        while filled < buf.len() {
            let available = self.bytes.slots();
            if available == 0 {
                if !self.is_open() {
                    return if filled == 0 {
                        Ok(ReadOutcome::EndOfStream)
                    } else {
                        Err(PipelineError::ShortRead {
                            expected: buf.len(),
                            got: filled,
                        })
                    };
                }
                thread::sleep(POLL_INTERVAL);
                continue;
            }

            let take = available.min(buf.len() - filled);
            if let Ok(chunk) = self.bytes.read_chunk(take) {
                let (first, second) = chunk.as_slices();
                buf[filled..filled + first.len()].copy_from_slice(first);
                buf[filled + first.len()..filled + first.len() + second.len()]
                    .copy_from_slice(second);
                filled += first.len() + second.len();
                chunk.commit_all();
            }
        }
        Ok(ReadOutcome::Filled)
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            debug!("capture line closed");
        }
        self.open.store(false, Ordering::Release);
    }
}

impl Drop for CaptureLine {
    fn drop(&mut self) {
        self.close();
    }
}

impl OutputLine for PlaybackLine {
    fn write(&mut self, buf: &[u8]) -> CoreResult<usize> {
        let mut written = 0;
        while written < buf.len() {
            if !self.open.load(Ordering::Acquire) || self.bytes.is_abandoned() {
                // Line went away mid-write; report the short count
                return Ok(written);
            }

            let free = self.bytes.slots();
            if free == 0 {
                thread::sleep(POLL_INTERVAL);
                continue;
            }

            let put = free.min(buf.len() - written);
            if let Ok(mut chunk) = self.bytes.write_chunk_uninit(put) {
                let (first, second) = chunk.as_mut_slices();
                let first_len = first.len();
                for (slot, &b) in first.iter_mut().zip(&buf[written..]) {
                    slot.write(b);
                }
                for (slot, &b) in second.iter_mut().zip(&buf[written + first_len..]) {
                    slot.write(b);
                }
                unsafe { chunk.commit_all() };
                written += put;
            }
        }
        Ok(written)
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            debug!("playback line closed");
        }
        self.open.store(false, Ordering::Release);
    }
}

impl Drop for PlaybackLine {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    // Hardware-dependent tests; the line contract itself is exercised
    // against in-memory lines in the pipeline tests.

    #[test]
    #[ignore = "requires audio hardware"]
    fn test_open_default_devices() {
        let config = PipelineConfig::default();

        if let Ok(device) = crate::device::AudioDevice::default_input() {
            let line = open_input(&device.name, &config);
            if let Ok(mut line) = line {
                line.close();
                line.close(); // close is idempotent
            }
        }
    }

    #[test]
    #[ignore = "requires audio hardware"]
    fn test_open_unknown_device_fails() {
        let config = PipelineConfig::default();
        let result = open_input("no such device anywhere", &config);
        assert!(matches!(result, Err(PipelineError::DeviceNotFound(_))));
    }
}
