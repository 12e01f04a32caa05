use plotters::style::RGBColor;

/// Qualitative palette used to tell neighbourhood groups apart.
pub const SET3: [RGBColor; 12] = [
    RGBColor(0x8d, 0xd3, 0xc7),
    RGBColor(0xff, 0xff, 0xb3),
    RGBColor(0xbe, 0xba, 0xda),
    RGBColor(0xfb, 0x80, 0x72),
    RGBColor(0x80, 0xb1, 0xd3),
    RGBColor(0xfd, 0xb4, 0x62),
    RGBColor(0xb3, 0xde, 0x69),
    RGBColor(0xfc, 0xcd, 0xe5),
    RGBColor(0xd9, 0xd9, 0xd9),
    RGBColor(0xbc, 0x80, 0xbd),
    RGBColor(0xcc, 0xeb, 0xc5),
    RGBColor(0xff, 0xed, 0x6f),
];

/// Default series cycle.
pub const TAB10: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

/// Sequential yellow-orange-red ramp, low to high.
const YL_OR_RD: [RGBColor; 9] = [
    RGBColor(0xff, 0xff, 0xcc),
    RGBColor(0xff, 0xed, 0xa0),
    RGBColor(0xfe, 0xd9, 0x76),
    RGBColor(0xfe, 0xb2, 0x4c),
    RGBColor(0xfd, 0x8d, 0x3c),
    RGBColor(0xfc, 0x4e, 0x2a),
    RGBColor(0xe3, 0x1a, 0x1c),
    RGBColor(0xbd, 0x00, 0x26),
    RGBColor(0x80, 0x00, 0x26),
];

pub fn set3(index: usize) -> RGBColor {
    SET3[index % SET3.len()]
}

pub fn tab10(index: usize) -> RGBColor {
    TAB10[index % TAB10.len()]
}

/// Samples the yellow-orange-red ramp at `t` in `[0, 1]`; out-of-range values clamp.
pub fn yl_or_rd(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (YL_OR_RD.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(YL_OR_RD.len() - 1);
    let fraction = scaled - lower as f64;

    let lo = YL_OR_RD[lower];
    let hi = YL_OR_RD[upper];
    let channel = |a: u8, b: u8| -> u8 {
        (a as f64 + (b as f64 - a as f64) * fraction).round() as u8
    };
    RGBColor(channel(lo.0, hi.0), channel(lo.1, hi.1), channel(lo.2, hi.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_endpoints_and_clamping() {
        assert_eq!(yl_or_rd(0.0), RGBColor(0xff, 0xff, 0xcc));
        assert_eq!(yl_or_rd(1.0), RGBColor(0x80, 0x00, 0x26));
        assert_eq!(yl_or_rd(-3.0), yl_or_rd(0.0));
        assert_eq!(yl_or_rd(7.0), yl_or_rd(1.0));
        assert_eq!(yl_or_rd(f64::NAN), yl_or_rd(0.0));
    }

    #[test]
    fn palettes_cycle() {
        assert_eq!(set3(12), set3(0));
        assert_eq!(tab10(11), tab10(1));
    }
}
