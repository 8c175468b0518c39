use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Invalid startup parameters. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(u32),

    #[error("packet size {0} holds no complete stereo frame")]
    InvalidPacketSize(usize),

    #[error("band boundaries must be finite and increasing, got {low} Hz and {high} Hz")]
    InvalidBands { low: f64, high: f64 },
}

/// Transport failures other than a read timeout.
#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to configure socket: {what}")]
    SocketOption {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("receive failed")]
    Recv(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("brightness {0} outside 0..=1")]
    InvalidBrightness(f32),
}
