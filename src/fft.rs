use crate::bands::BandIndices;
use crate::common::*;
use realfft::num_traits::Zero;
use realfft::RealFftPlanner;

/// Turns one packet of interleaved S16LE stereo into per-band power.
pub struct SpectrumAnalyzer {
    // User parameters. Do not mutate.
    bands: BandIndices,

    // Caches one plan per transform length.
    planner: RealFftPlanner<f64>,

    // Mutable state, resized to each packet.
    mono: RealVec,
    scratch: RealVec,
    spectrum: FftVec,
    power: RealVec,
}

/// Decodes little-endian i16 pairs and averages each (left, right) frame.
///
/// A trailing partial frame (an unpaired sample or an odd byte) is dropped.
pub fn downmix(bytes: &[u8], out: &mut RealVec) {
    out.clear();
    out.extend(bytes.chunks_exact(BYTES_PER_FRAME).map(|frame| {
        let left = i16::from_le_bytes([frame[0], frame[1]]) as f64;
        let right = i16::from_le_bytes([frame[2], frame[3]]) as f64;
        (left + right) / 2.
    }));
}

impl SpectrumAnalyzer {
    pub fn new(bands: BandIndices) -> SpectrumAnalyzer {
        let n = bands.transform_len;
        SpectrumAnalyzer {
            bands,
            planner: RealFftPlanner::new(),
            mono: Vec::with_capacity(n),
            scratch: Vec::with_capacity(n),
            spectrum: Vec::with_capacity(n / 2 + 1),
            power: Vec::with_capacity(n / 2 + 1),
        }
    }

    /// Downmixed samples of the last analyzed packet.
    #[cfg(test)]
    pub fn mono(&self) -> &[f64] {
        &self.mono
    }

    /// Unnormalized spectrum of the last analyzed packet, `mono.len() / 2 + 1` bins.
    #[cfg(test)]
    pub fn spectrum(&self) -> &[FftSample] {
        &self.spectrum
    }

    /// Squared magnitude of each bin of `spectrum()`.
    #[cfg(test)]
    pub fn power(&self) -> &[f64] {
        &self.power
    }

    pub fn analyze(&mut self, packet: AudioPacket) -> BandPower {
        downmix(packet.bytes(), &mut self.mono);
        if self.mono.is_empty() {
            self.spectrum.clear();
            self.power.clear();
            return BandPower::default();
        }

        self.run_fft();

        self.power.clear();
        self.power.extend(self.spectrum.iter().map(|bin| bin.norm_sqr()));

        let (low, mid, high) = self.bands.split(&self.power);
        BandPower {
            low: low.iter().sum(),
            mid: mid.iter().sum(),
            high: high.iter().sum(),
        }
    }

    /// Preconditions:
    /// - self.mono is non-empty.
    /// - self.spectrum is resized here to the plan's output length (n/2 + 1),
    ///   so `process` cannot see mismatched buffers.
    ///
    /// Postconditions:
    /// - self.spectrum contains the unwindowed real FFT of self.mono.
    /// - self.mono is unchanged.
    fn run_fft(&mut self) {
        let n = self.mono.len();
        let fft = self.planner.plan_fft_forward(n);

        // The transform uses its input as scratch space.
        self.scratch.clear();
        self.scratch.extend_from_slice(&self.mono);
        self.spectrum.clear();
        self.spectrum.resize(n / 2 + 1, FftSample::zero());

        // Precondition: scratch has length n, spectrum has length n/2 + 1.
        fft.process(&mut self.scratch, &mut self.spectrum).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn default_bands() -> BandIndices {
        BandIndices::new(
            DEFAULT_SAMPLE_RATE,
            AUDIO_PACKET_SIZE,
            MID_BAND_START_HZ,
            HIGH_BAND_START_HZ,
        )
        .unwrap()
    }

    fn stereo_bytes(frames: &[(i16, i16)]) -> Vec<u8> {
        let mut out = Vec::with_capacity(frames.len() * BYTES_PER_FRAME);
        for &(l, r) in frames {
            out.extend_from_slice(&l.to_le_bytes());
            out.extend_from_slice(&r.to_le_bytes());
        }
        out
    }

    fn sine_packet(freq: f64, amplitude: f64, frames: usize) -> Vec<u8> {
        let frames: Vec<(i16, i16)> = (0..frames)
            .map(|k| {
                let t = k as f64 / DEFAULT_SAMPLE_RATE as f64;
                let v = (amplitude * (2. * PI * freq * t).sin()).round() as i16;
                (v, v)
            })
            .collect();
        stereo_bytes(&frames)
    }

    #[test]
    fn downmix_averages_channels() {
        let bytes = stereo_bytes(&[(100, 300), (-32768, 32767), (-3, 0)]);
        let mut mono = vec![];
        downmix(&bytes, &mut mono);
        assert_eq!(mono, vec![200., -0.5, -1.5]);
    }

    #[test]
    fn downmix_drops_unpaired_sample() {
        let mut bytes = stereo_bytes(&[(10, 20), (30, 40)]);
        bytes.extend_from_slice(&1234i16.to_le_bytes());
        let mut mono = vec![];
        downmix(&bytes, &mut mono);
        assert_eq!(mono, vec![15., 35.]);

        // odd byte count
        bytes.push(0xff);
        downmix(&bytes, &mut mono);
        assert_eq!(mono.len(), 2);
    }

    #[test]
    fn silence_has_no_power() {
        let mut analyzer = SpectrumAnalyzer::new(default_bands());
        for &len in &[0, 2, 4, 400, 8192] {
            let bytes = vec![0u8; len];
            assert_eq!(analyzer.analyze(AudioPacket(&bytes)), BandPower::default());
        }
    }

    #[test]
    fn odd_length_packet_is_absorbed() {
        let mut analyzer = SpectrumAnalyzer::new(default_bands());
        let mut bytes = stereo_bytes(&[(1000, 1000), (-1000, -1000), (500, 700)]);
        bytes.extend_from_slice(&77i16.to_le_bytes());

        let power = analyzer.analyze(AudioPacket(&bytes));
        assert_eq!(analyzer.mono().len(), 3);
        assert_eq!(analyzer.spectrum().len(), 2);
        assert!(power.total() > 0.);
    }

    #[test]
    fn power_is_squared_magnitude() {
        // An impulse has a flat spectrum of magnitude 1.
        let bands = BandIndices {
            mid_start: 1,
            high_start: 2,
            transform_len: 4,
        };
        let mut analyzer = SpectrumAnalyzer::new(bands);
        let bytes = stereo_bytes(&[(1, 1), (0, 0), (0, 0), (0, 0)]);

        let power = analyzer.analyze(AudioPacket(&bytes));
        assert_eq!(analyzer.spectrum().len(), 3);
        for &p in analyzer.power() {
            assert!((p - 1.).abs() < 1e-12);
        }
        assert!((power.low - 1.).abs() < 1e-12);
        assert!((power.mid - 1.).abs() < 1e-12);
        assert!((power.high - 1.).abs() < 1e-12);
    }

    #[test]
    fn dc_lands_in_low_band() {
        let mut analyzer = SpectrumAnalyzer::new(default_bands());
        let bytes = stereo_bytes(&vec![(5000, 3000); 2048]);

        let power = analyzer.analyze(AudioPacket(&bytes));
        assert!(power.low > 0.);
        assert!(power.mid < 1e-6 * power.low);
        assert!(power.high < 1e-6 * power.low);
    }

    #[test]
    fn tone_440hz_peaks_in_mid_band() {
        let mut analyzer = SpectrumAnalyzer::new(default_bands());
        let bytes = sine_packet(440., 10000., 2048);
        assert_eq!(bytes.len(), AUDIO_PACKET_SIZE);

        let power = analyzer.analyze(AudioPacket(&bytes));

        let peak = analyzer
            .power()
            .iter()
            .enumerate()
            .fold((0, 0.), |best, (i, &p)| if p > best.1 { (i, p) } else { best });
        let expected = (440. * 2048. / DEFAULT_SAMPLE_RATE as f64).round() as usize;
        assert_eq!(peak.0, expected);

        assert!(power.mid > 0.95 * power.total(), "{:?}", power);
    }

    #[test]
    fn short_packet_clips_bands() {
        let mut analyzer = SpectrumAnalyzer::new(default_bands());
        // 100 frames -> 51 bins, fewer than the high band's start index.
        let bytes = sine_packet(5000., 8000., 100);

        let power = analyzer.analyze(AudioPacket(&bytes));
        assert_eq!(analyzer.spectrum().len(), 51);
        assert_eq!(power.high, 0.);
        assert!(power.total() > 0.);
    }

    #[test]
    fn spectrum_tracks_each_packet_length() {
        let mut analyzer = SpectrumAnalyzer::new(default_bands());
        for &frames in &[2048, 1, 7, 100, 2048, 3, 2] {
            let bytes = sine_packet(1000., 9000., frames);
            analyzer.analyze(AudioPacket(&bytes));
            assert_eq!(analyzer.mono().len(), frames);
            assert_eq!(analyzer.spectrum().len(), frames / 2 + 1);
            assert_eq!(analyzer.power().len(), frames / 2 + 1);
        }
    }
}
