use realfft::num_complex::Complex;

pub type RealVec = Vec<f64>;

pub type FftSample = Complex<f64>;
pub type FftVec = Vec<FftSample>;

/// Largest datagram we read, in bytes.
pub const AUDIO_PACKET_SIZE: usize = 8 * 1024;

/// Interleaved S16LE stereo: 2 bytes per sample, 2 channels.
pub const BYTES_PER_SAMPLE: usize = 2;
pub const CHANNELS: usize = 2;
pub const BYTES_PER_FRAME: usize = BYTES_PER_SAMPLE * CHANNELS;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const MID_BAND_START_HZ: f64 = 250.;
pub const HIGH_BAND_START_HZ: f64 = 2000.;

/// Raw bytes of one received datagram.
/// Borrowed from the receiver's buffer, so it cannot outlive the next receive.
#[derive(Debug, Copy, Clone)]
pub struct AudioPacket<'a>(pub &'a [u8]);

impl<'a> AudioPacket<'a> {
    pub fn bytes(&self) -> &'a [u8] {
        self.0
    }
}

/// Summed squared magnitude of the spectrum within each band.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BandPower {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl BandPower {
    pub fn total(&self) -> f64 {
        self.low + self.mid + self.high
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const OFF: Color = Color { r: 0, g: 0, b: 0 };
}
