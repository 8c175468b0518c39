mod bands;
mod color;
mod common;
mod display;
mod error;
mod fft;
mod receiver;
mod visualizer;

use anyhow::{Context, Error, Result};
use bands::BandIndices;
use common::*;
use display::HeadlessMatrix;
use fft::SpectrumAnalyzer;
use receiver::UdpReceiver;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use structopt::StructOpt;
use visualizer::Visualizer;

fn parse_sample_rate(src: &str) -> Result<u32> {
    let num: u32 = src
        .parse()
        .map_err(|_| Error::msg(format!("Sample rate {} must be an integer", src)))?;
    if num == 0 {
        return Err(Error::msg("Sample rate must be > 0"));
    }
    Ok(num)
}

fn parse_brightness(src: &str) -> Result<f32> {
    let num: f32 = src
        .parse()
        .map_err(|_| Error::msg(format!("Brightness {} must be a number", src)))?;
    if !(0. ..=1.).contains(&num) {
        return Err(Error::msg(format!(
            "Brightness {} must be between 0 and 1",
            num
        )));
    }
    Ok(num)
}

fn parse_millis(src: &str) -> Result<Duration> {
    let ms: u64 = src
        .parse()
        .map_err(|_| Error::msg(format!("Duration {} must be an integer (ms)", src)))?;
    Ok(Duration::from_millis(ms))
}

fn parse_timeout(src: &str) -> Result<Duration> {
    let timeout = parse_millis(src)?;
    // A zero read timeout would block forever.
    if timeout.is_zero() {
        return Err(Error::msg("Receive timeout must be > 0"));
    }
    Ok(timeout)
}

/// Drives an RGB LED matrix from a UDP stream of S16LE stereo audio.
/// Low, mid and high frequency power map to red, green and blue.
#[derive(StructOpt, Debug)]
#[structopt(name = "spectrolight")]
pub struct Opt {
    /// Address to receive audio packets on.
    #[structopt(short, long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// UDP port to receive audio packets on.
    #[structopt(short, long, default_value = "5555")]
    port: u16,

    /// Sample rate of the incoming stream, in Hz.
    #[structopt(short, long, default_value = "44100", parse(try_from_str = parse_sample_rate))]
    sample_rate: u32,

    /// LED brightness, from 0 to 1.
    #[structopt(long, default_value = "0.8", parse(try_from_str = parse_brightness))]
    brightness: f32,

    /// Pause between display updates, in milliseconds.
    #[structopt(short, long = "interval-ms", default_value = "50", parse(try_from_str = parse_millis))]
    interval: Duration,

    /// How long to wait for a packet before blanking the display, in milliseconds.
    #[structopt(short, long = "timeout-ms", default_value = "1000", parse(try_from_str = parse_timeout))]
    timeout: Duration,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::from_args();
    log::debug!("{:?}", opt);

    let bands = BandIndices::new(
        opt.sample_rate,
        AUDIO_PACKET_SIZE,
        MID_BAND_START_HZ,
        HIGH_BAND_START_HZ,
    )
    .context("invalid band configuration")?;
    log::info!(
        "{}-point FFT, mid band from bin {}, high band from bin {}",
        bands.transform_len,
        bands.mid_start,
        bands.high_start
    );

    let mut visualizer = Visualizer::new(
        SpectrumAnalyzer::new(bands),
        HeadlessMatrix::new(),
        opt.interval,
    );
    visualizer
        .init(opt.brightness)
        .context("failed to initialize LED matrix")?;

    let addr = SocketAddr::new(opt.bind, opt.port);
    let mut receiver = UdpReceiver::bind(addr, opt.timeout)?;
    log::info!("listening on {}", receiver.local_addr().unwrap_or(addr));

    visualizer.run(&mut receiver)
}
