use crate::common::{BandPower, Color};

/// Result of mapping one packet's band power.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Low, mid and high power drive red, green and blue.
    Lit(Color),
    /// No power at all; the matrix should be blanked.
    Silent,
}

/// Each band's share of the total power, in the order (low, mid, high).
/// None if the total is exactly zero.
pub fn band_shares(power: BandPower) -> Option<(f64, f64, f64)> {
    let total = power.total();
    if total == 0. {
        return None;
    }
    Some((power.low / total, power.mid / total, power.high / total))
}

fn to_channel(share: f64) -> u8 {
    // `as` saturates, so rounding error past 1.0 cannot wrap.
    (share * 255.) as u8
}

pub fn map_color(power: BandPower) -> Frame {
    match band_shares(power) {
        Some((r, g, b)) => Frame::Lit(Color {
            r: to_channel(r),
            g: to_channel(g),
            b: to_channel(b),
        }),
        None => Frame::Silent,
    }
}
