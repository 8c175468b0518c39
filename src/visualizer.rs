use crate::color::{map_color, Frame};
use crate::common::{AudioPacket, Color};
use crate::display::LedMatrix;
use crate::error::MatrixError;
use crate::fft::SpectrumAnalyzer;
use crate::receiver::PacketSource;
use anyhow::{Context, Result};
use std::time::Duration;

/// Whether the matrix is known to be blank.
///
/// Starts false: nothing has been drawn yet, so the first blank frame
/// issues one (harmless) clear.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub cleared: bool,
}

impl DisplayState {
    /// Draws one frame and returns the resulting state.
    ///
    /// `None` (no packet) and `Some(Frame::Silent)` both blank the matrix,
    /// but only if it is not blank already.
    pub fn apply<M: LedMatrix + ?Sized>(
        self,
        frame: Option<Frame>,
        matrix: &mut M,
    ) -> Result<DisplayState, MatrixError> {
        match frame {
            Some(Frame::Lit(color)) => {
                matrix.set_all(color)?;
                matrix.show()?;
                Ok(DisplayState { cleared: false })
            }
            None | Some(Frame::Silent) => {
                if !self.cleared {
                    matrix.clear()?;
                    matrix.show()?;
                }
                Ok(DisplayState { cleared: true })
            }
        }
    }
}

/// What the last iteration saw. Only used to log transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Activity {
    Playing,
    Silence,
    NoData,
}

pub struct Visualizer<M: LedMatrix> {
    analyzer: SpectrumAnalyzer,
    matrix: M,
    state: DisplayState,
    interval: Duration,
    activity: Option<Activity>,
}

impl<M: LedMatrix> Visualizer<M> {
    pub fn new(analyzer: SpectrumAnalyzer, matrix: M, interval: Duration) -> Visualizer<M> {
        Visualizer {
            analyzer,
            matrix,
            state: DisplayState::default(),
            interval,
            activity: None,
        }
    }

    /// One-time matrix setup: blank on exit, fixed brightness.
    pub fn init(&mut self, brightness: f32) -> Result<(), MatrixError> {
        self.matrix.set_clear_on_exit(true)?;
        self.matrix.set_brightness(brightness)?;
        Ok(())
    }

    #[cfg(test)]
    pub fn state(&self) -> DisplayState {
        self.state
    }

    #[cfg(test)]
    pub fn matrix(&self) -> &M {
        &self.matrix
    }

    /// Analyzes and draws one packet, or blanks the matrix if there is none.
    pub fn step(&mut self, packet: Option<AudioPacket>) -> Result<Option<Frame>, MatrixError> {
        let frame = packet.map(|packet| map_color(self.analyzer.analyze(packet)));

        self.note_activity(match frame {
            Some(Frame::Lit(Color { r, g, b })) => {
                log::trace!("rgb {} {} {}", r, g, b);
                Activity::Playing
            }
            Some(Frame::Silent) => Activity::Silence,
            None => Activity::NoData,
        });

        self.state = self.state.apply(frame, &mut self.matrix)?;
        Ok(frame)
    }

    /// Receive, analyze, draw, then sleep for the refresh interval.
    pub fn iterate<S: PacketSource + ?Sized>(&mut self, source: &mut S) -> Result<Option<Frame>> {
        let packet = source.receive().context("audio stream failed")?;
        let frame = self.step(packet).context("display update failed")?;
        if !self.interval.is_zero() {
            spin_sleep::sleep(self.interval);
        }
        Ok(frame)
    }

    /// Runs until the source or matrix fails.
    pub fn run<S: PacketSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        loop {
            self.iterate(source)?;
        }
    }

    fn note_activity(&mut self, now: Activity) {
        if self.activity == Some(now) {
            return;
        }
        match now {
            Activity::Playing => log::info!("audio playing"),
            Activity::Silence => log::info!("audio silent"),
            Activity::NoData => log::info!("no audio received"),
        }
        self.activity = Some(now);
    }
}
