//! Unit conversion utilities.
//!
//! DrawingML stores every length in English Metric Units (EMU). Layout rules
//! are expressed in EMU too; these helpers convert at the edges where font
//! sizes (points) and raster sizes (pixels) come in.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_CM: i64 = 360_000;
pub const EMUS_PER_PT: i64 = 12_700;

/// Font sizes in `a:rPr/@sz` are stored in hundredths of a point.
pub const CENTIPOINTS_PER_PT: f64 = 100.0;

#[inline]
pub fn pt_to_emu_f64(pt: f64) -> i64 {
    (pt * EMUS_PER_PT as f64) as i64
}

#[inline]
pub fn emu_to_pt_f64(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_PT as f64
}

#[inline]
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_INCH as f64
}

#[inline]
pub fn cm_to_emu(cm: f64) -> i64 {
    (cm * EMUS_PER_CM as f64).round() as i64
}

/// Convert an EMU length to pixels at `dpi`, multiplied by `oversample`.
///
/// Truncates toward zero and never returns less than one pixel.
#[inline]
pub fn emu_to_px(emu: i64, dpi: u32, oversample: u32) -> u32 {
    let px = emu_to_inches(emu) * dpi as f64 * oversample as f64;
    (px as u32).max(1)
}

/// Parse an `sz` attribute value into points.
#[inline]
pub fn centipoints_to_pt(sz: i64) -> f64 {
    sz as f64 / CENTIPOINTS_PER_PT
}

/// Convert points to the `sz` attribute representation.
#[inline]
pub fn pt_to_centipoints(pt: f64) -> i64 {
    (pt * CENTIPOINTS_PER_PT).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversions() {
        assert_eq!(pt_to_emu_f64(1.0), 12_700);
        assert_eq!(pt_to_emu_f64(40.0), 508_000);
        assert!((emu_to_pt_f64(25_400) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cm_conversion() {
        assert_eq!(cm_to_emu(0.13), 46_800);
        assert_eq!(cm_to_emu(0.3), 108_000);
    }

    #[test]
    fn test_emu_to_px_oversampled() {
        // one inch at 96 dpi, 3x oversampling
        assert_eq!(emu_to_px(914_400, 96, 3), 288);
        assert_eq!(emu_to_px(0, 96, 3), 1);
    }

    #[test]
    fn test_centipoints() {
        assert!((centipoints_to_pt(1100) - 11.0).abs() < f64::EPSILON);
        assert_eq!(pt_to_centipoints(10.5), 1050);
    }
}
