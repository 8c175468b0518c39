use crate::common::Color;
use crate::error::MatrixError;

/// What the visualizer needs from an RGB LED matrix driver.
///
/// Drawing calls (`clear`, `set_all`) only touch the driver's buffer;
/// nothing reaches the LEDs until `show`.
pub trait LedMatrix {
    fn clear(&mut self) -> Result<(), MatrixError>;

    /// Sets every pixel to one color.
    fn set_all(&mut self, color: Color) -> Result<(), MatrixError>;

    /// Flushes the buffer to the LEDs.
    fn show(&mut self) -> Result<(), MatrixError>;

    /// Global brightness scale in `0.0..=1.0`.
    fn set_brightness(&mut self, brightness: f32) -> Result<(), MatrixError>;

    /// Whether the driver blanks the LEDs when it is dropped.
    fn set_clear_on_exit(&mut self, enabled: bool) -> Result<(), MatrixError>;
}

pub const MATRIX_WIDTH: usize = 5;
pub const MATRIX_HEIGHT: usize = 5;

type Pixels = [[Color; MATRIX_WIDTH]; MATRIX_HEIGHT];

fn check_brightness(brightness: f32) -> Result<(), MatrixError> {
    if !(0. ..=1.).contains(&brightness) {
        return Err(MatrixError::InvalidBrightness(brightness));
    }
    Ok(())
}

/// A 5x5 matrix with no hardware behind it.
///
/// Keeps a draw buffer and the last flushed frame (brightness applied)
/// and logs each flush. Stands in for a hardware driver when none is attached.
pub struct HeadlessMatrix {
    buffer: Pixels,
    shown: Pixels,
    brightness: f32,
    clear_on_exit: bool,
    flushes: u64,
}

impl HeadlessMatrix {
    pub fn new() -> HeadlessMatrix {
        HeadlessMatrix {
            buffer: [[Color::OFF; MATRIX_WIDTH]; MATRIX_HEIGHT],
            shown: [[Color::OFF; MATRIX_WIDTH]; MATRIX_HEIGHT],
            brightness: 1.,
            clear_on_exit: false,
            flushes: 0,
        }
    }

    /// The frame as it was last flushed.
    #[cfg(test)]
    pub fn shown(&self) -> &Pixels {
        &self.shown
    }

    #[cfg(test)]
    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    fn scale(&self, c: Color) -> Color {
        let f = |v: u8| (v as f32 * self.brightness) as u8;
        Color {
            r: f(c.r),
            g: f(c.g),
            b: f(c.b),
        }
    }
}

impl Default for HeadlessMatrix {
    fn default() -> Self {
        HeadlessMatrix::new()
    }
}

impl LedMatrix for HeadlessMatrix {
    fn clear(&mut self) -> Result<(), MatrixError> {
        self.buffer = [[Color::OFF; MATRIX_WIDTH]; MATRIX_HEIGHT];
        Ok(())
    }

    fn set_all(&mut self, color: Color) -> Result<(), MatrixError> {
        for row in self.buffer.iter_mut() {
            for px in row.iter_mut() {
                *px = color;
            }
        }
        Ok(())
    }

    fn show(&mut self) -> Result<(), MatrixError> {
        for row in 0..MATRIX_HEIGHT {
            for col in 0..MATRIX_WIDTH {
                let px = self.scale(self.buffer[row][col]);
                self.shown[row][col] = px;
            }
        }
        self.flushes += 1;
        let corner = self.shown[0][0];
        log::debug!(
            "matrix flush #{}: #{:02x}{:02x}{:02x}",
            self.flushes,
            corner.r,
            corner.g,
            corner.b
        );
        Ok(())
    }

    fn set_brightness(&mut self, brightness: f32) -> Result<(), MatrixError> {
        check_brightness(brightness)?;
        self.brightness = brightness;
        Ok(())
    }

    fn set_clear_on_exit(&mut self, enabled: bool) -> Result<(), MatrixError> {
        self.clear_on_exit = enabled;
        Ok(())
    }
}

impl Drop for HeadlessMatrix {
    fn drop(&mut self) {
        if self.clear_on_exit {
            log::debug!("clearing matrix on exit");
            let _ = self.clear().and_then(|_| self.show());
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const ORANGE: Color = Color {
        r: 200,
        g: 100,
        b: 0,
    };

    #[test]
    fn nothing_visible_until_show() {
        let mut m = HeadlessMatrix::new();
        m.set_all(ORANGE).unwrap();
        assert_eq!(m.shown()[2][3], Color::OFF);

        m.show().unwrap();
        assert!(m.shown().iter().flatten().all(|&px| px == ORANGE));
        assert_eq!(m.flushes(), 1);

        m.clear().unwrap();
        assert_eq!(m.shown()[0][0], ORANGE);
        m.show().unwrap();
        assert!(m.shown().iter().flatten().all(|&px| px == Color::OFF));
    }

    #[test]
    fn brightness_scales_flushed_frame() {
        let mut m = HeadlessMatrix::new();
        m.set_brightness(0.5).unwrap();
        m.set_all(ORANGE).unwrap();
        m.show().unwrap();
        assert_eq!(m.shown()[4][4], Color { r: 100, g: 50, b: 0 });
    }

    #[test]
    fn brightness_out_of_range() {
        let mut m = HeadlessMatrix::new();
        assert!(matches!(
            m.set_brightness(1.5),
            Err(MatrixError::InvalidBrightness(_))
        ));
        assert!(m.set_brightness(-0.1).is_err());
        assert!(m.set_brightness(f32::NAN).is_err());
        assert!(m.set_brightness(0.).is_ok());
        assert!(m.set_brightness(1.).is_ok());
    }
}
