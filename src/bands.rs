use crate::common::BYTES_PER_FRAME;
use crate::error::ConfigError;
use std::cmp::min;

/// Spectrum index boundaries of the low/mid/high bands.
///
/// low = `[0, mid_start)`, mid = `[mid_start, high_start)`, high = `[high_start, ..)`.
/// Computed once for the nominal packet size; shorter packets are split
/// positionally with the same indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BandIndices {
    pub mid_start: usize,
    pub high_start: usize,
    /// Number of mono samples per nominal packet.
    pub transform_len: usize,
}

/// Frequency in Hz of spectrum bin `i` for a transform of `transform_len` samples.
pub fn bin_freq(i: usize, sample_rate: u32, transform_len: usize) -> f64 {
    i as f64 * sample_rate as f64 / transform_len as f64
}

/// Number of bins in the real FFT of `transform_len` samples.
pub fn spectrum_len(transform_len: usize) -> usize {
    transform_len / 2 + 1
}

impl BandIndices {
    /// Each boundary index is the last bin whose frequency lies strictly below
    /// the boundary, or 0 if no bin does.
    pub fn new(
        sample_rate: u32,
        packet_size: usize,
        mid_hz: f64,
        high_hz: f64,
    ) -> Result<BandIndices, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate(sample_rate));
        }
        let transform_len = packet_size / BYTES_PER_FRAME;
        if transform_len == 0 {
            return Err(ConfigError::InvalidPacketSize(packet_size));
        }
        if !(mid_hz.is_finite() && high_hz.is_finite() && mid_hz < high_hz) {
            return Err(ConfigError::InvalidBands {
                low: mid_hz,
                high: high_hz,
            });
        }

        let mut mid_start = 0;
        let mut high_start = 0;
        for i in 0..spectrum_len(transform_len) {
            let f = bin_freq(i, sample_rate, transform_len);
            if f < mid_hz {
                mid_start = i;
            }
            if f < high_hz {
                high_start = i;
            }
        }

        Ok(BandIndices {
            mid_start,
            high_start,
            transform_len,
        })
    }

    /// Splits a per-bin slice into (low, mid, high).
    /// Boundaries past the end of `bins` are clipped to its length.
    pub fn split<'a, T>(&self, bins: &'a [T]) -> (&'a [T], &'a [T], &'a [T]) {
        let mid = min(self.mid_start, bins.len());
        let high = min(self.high_start, bins.len());
        (&bins[..mid], &bins[mid..high], &bins[high..])
    }
}
