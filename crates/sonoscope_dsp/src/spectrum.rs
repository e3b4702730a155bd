//! FFT Spectral Transform
//!
//! Turns one captured frame into its frequency-domain view for the
//! spectrogram. The transform is re-run once per analysis tick on whatever
//! snapshot is current, not once per capture cycle, so the visualization
//! refresh rate never couples to the audio thread.
//!
//! Bin `k` of the output corresponds to frequency `k * sample_rate / len`;
//! for a real-valued input only bins `0..=len/2` carry independent
//! information (the upper half mirrors by conjugate symmetry).

use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::DspError;

/// Frequency-domain view of a single audio frame.
///
/// Holds one complex value per input sample. Meant to be consumed
/// immediately by rendering and dropped, not retained across ticks.
pub struct SpectralFrame {
    bins: Vec<Complex<f64>>,
    sample_rate: u32,
}

impl SpectralFrame {
    /// Number of bins (equals the length of the analyzed frame).
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Raw complex bin values.
    pub fn bins(&self) -> &[Complex<f64>] {
        &self.bins
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Magnitude of bin `k`.
    pub fn magnitude(&self, k: usize) -> f64 {
        self.bins[k].norm()
    }

    /// Magnitudes of all bins.
    pub fn magnitudes(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.norm()).collect()
    }

    /// Magnitudes of the meaningful lower half, bins `0..=len/2`.
    ///
    /// This is what the spectrogram actually draws; the upper half is the
    /// conjugate mirror image for real input.
    pub fn half_magnitudes(&self) -> Vec<f64> {
        let half = self.bins.len() / 2;
        self.bins[..=half].iter().map(|c| c.norm()).collect()
    }

    /// Center frequency of bin `k` in Hz.
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * self.sample_rate as f64 / self.bins.len() as f64
    }

    /// Index of the strongest bin in the meaningful lower half, skipping DC.
    pub fn peak_bin(&self) -> usize {
        let half = self.bins.len() / 2;
        (1..=half)
            .max_by(|&a, &b| {
                self.bins[a]
                    .norm()
                    .partial_cmp(&self.bins[b].norm())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(0)
    }
}

/// Computes the discrete Fourier transform of captured frames.
///
/// Owns an FFT planner so repeated transforms of the same length reuse the
/// cached plan. Input length must be a power of two; the analyzer never
/// resizes on the caller's behalf - pad or truncate before calling.
pub struct SpectrumAnalyzer {
    planner: FftPlanner<f64>,
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Transform one frame of normalized samples into a [`SpectralFrame`].
    ///
    /// The samples are treated as a real-valued signal and extended with
    /// zero imaginary parts before the forward transform.
    pub fn transform(
        &mut self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<SpectralFrame, DspError> {
        if samples.is_empty() {
            return Err(DspError::EmptyFrame);
        }
        if !samples.len().is_power_of_two() {
            return Err(DspError::NonPowerOfTwoLength(samples.len()));
        }

        let mut bins: Vec<Complex<f64>> =
            samples.iter().map(|&s| Complex::new(s, 0.0)).collect();

        let fft = self.planner.plan_fft_forward(bins.len());
        fft.process(&mut bins);

        Ok(SpectralFrame { bins, sample_rate })
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
