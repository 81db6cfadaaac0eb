// src/strokes/curves.rs
//! Fitted expected-strokes curves, one per surface family.
//!
//! Each curve is a degree-6 polynomial in distance (yards) over a fitted
//! domain `[lower, upper]`. Below `lower` the value ramps linearly from the
//! holed-out baseline at 0 yards; above `upper` (fairway and rough only) it
//! ramps linearly to a fixed value at 600 yards.

/// Value every curve is anchored to at zero distance.
pub const HOLED_BASELINE: f64 = 1.0;
/// Longest distance the model covers.
pub const MAX_DISTANCE_YARDS: f64 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceCurve {
    /// Ascending powers of distance (c0 + c1·d + … + c6·d⁶).
    pub coeffs: [f64; 7],
    /// First fitted breakpoint (yards).
    pub lower: f64,
    /// Last fitted breakpoint (yards).
    pub upper: f64,
    /// Value reached at 600 yards by the upper linear ramp, if any.
    pub tail: Option<f64>,
}

impl SurfaceCurve {
    #[inline]
    pub fn polynomial(&self, d: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * d + c)
    }

    /// Slope of the ramp below `lower`.
    #[inline]
    pub fn lower_slope(&self) -> f64 {
        (self.polynomial(self.lower) - HOLED_BASELINE) / self.lower
    }

    /// Linear ramp from the baseline at 0 yd to the polynomial at `lower`.
    #[inline]
    pub fn lower_extrapolation(&self, d: f64) -> f64 { HOLED_BASELINE + self.lower_slope() * d }

    /// Slope of the ramp above `upper`; `None` for curves fitted to 600 yd.
    pub fn upper_slope(&self) -> Option<f64> {
        let tail = self.tail?;
        Some((tail - self.polynomial(self.upper)) / (MAX_DISTANCE_YARDS - self.upper))
    }

    /// Linear ramp from the polynomial at `upper` to `tail` at 600 yd.
    pub fn upper_extrapolation(&self, d: f64) -> Option<f64> {
        Some(self.polynomial(self.upper) + self.upper_slope()? * (d - self.upper))
    }

    pub fn evaluate(&self, d: f64) -> f64 {
        if d < self.lower {
            return self.lower_extrapolation(d);
        }
        if d > self.upper {
            if let Some(v) = self.upper_extrapolation(d) {
                return v;
            }
        }
        self.polynomial(d)
    }
}

// ---------- Fitted families ----------

/// Fairway and tee share this curve.
pub const FAIRWAY: SurfaceCurve = SurfaceCurve {
    coeffs: [
        1.968_922_175_612_920_3,
        0.026_404_478_330_209_532,
        -0.000_354_724_671_214_691_3,
        2.396_926_506_974_597_5e-6,
        -7.753_417_942_774_708e-9,
        1.196_027_782_532_998_2e-11,
        -7.099_643_005_747_956e-15,
    ],
    lower: 10.0,
    upper: 460.0,
    tail: Some(4.73),
};

pub const ROUGH: SurfaceCurve = SurfaceCurve {
    coeffs: [
        2.149_293_411_689_631,
        0.026_180_023_012_404_293,
        -0.000_343_756_271_045_067_9,
        2.374_706_260_334_627e-6,
        -8.071_614_913_149_956e-9,
        1.328_521_666_594_417_8e-11,
        -8.487_917_641_478_177e-15,
    ],
    lower: 10.0,
    upper: 460.0,
    tail: Some(4.85),
};

pub const SAND: SurfaceCurve = SurfaceCurve {
    coeffs: [
        2.273_040_835_786_221,
        0.018_830_850_672_847_205,
        -0.000_164_576_170_722_450_68,
        8.606_378_357_384_075e-7,
        -2.233_894_026_265_843e-9,
        2.769_706_668_299_857_3e-12,
        -1.309_895_324_225_168_5e-15,
    ],
    lower: 10.0,
    upper: MAX_DISTANCE_YARDS,
    tail: None,
};

pub const RECOVERY: SurfaceCurve = SurfaceCurve {
    coeffs: [
        2.657_895_798_660_140_6,
        0.028_011_140_872_699_833,
        -0.000_266_315_673_315_733_9,
        1.213_384_673_781_098_3e-6,
        -2.683_318_154_184_931e-9,
        2.865_431_830_755_863_7e-12,
        -1.189_990_517_093_960_8e-15,
    ],
    lower: 40.0,
    upper: MAX_DISTANCE_YARDS,
    tail: None,
};

/// Putting. Valid to 33.4 yd; longer "green" distances use the fairway curve.
pub const GREEN: SurfaceCurve = SurfaceCurve {
    coeffs: [
        0.705_888_593_672_559_4,
        0.410_303_288_162_705_2,
        -0.056_315_910_661_665_21,
        0.004_096_928_265_710_296,
        -0.000_157_508_340_423_983_7,
        3.048_001_529_832_510_4e-6,
        -2.337_665_709_762_677e-8,
    ],
    lower: 1.0,
    upper: 33.4,
    tail: None,
};

pub const ALL_FAMILIES: [(&str, SurfaceCurve); 5] = [
    ("fairway", FAIRWAY),
    ("rough", ROUGH),
    ("sand", SAND),
    ("recovery", RECOVERY),
    ("green", GREEN),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seams_are_continuous() {
        for (name, c) in ALL_FAMILIES {
            let poly = c.polynomial(c.lower);
            let lin = c.lower_extrapolation(c.lower);
            assert!((poly - lin).abs() < 1e-12, "{name} lower seam {poly} vs {lin}");
            if let Some(up) = c.upper_extrapolation(c.upper) {
                assert!((up - c.polynomial(c.upper)).abs() < 1e-12, "{name} upper seam");
            }
        }
    }

    #[test]
    fn tails_land_on_asymptote() {
        assert!((FAIRWAY.evaluate(MAX_DISTANCE_YARDS) - 4.73).abs() < 1e-12);
        assert!((ROUGH.evaluate(MAX_DISTANCE_YARDS) - 4.85).abs() < 1e-12);
    }

    #[test]
    fn fitted_values_are_plausible() {
        // tour-average style anchors
        assert!((FAIRWAY.evaluate(150.0) - 2.94).abs() < 0.05);
        assert!((ROUGH.evaluate(150.0) - 3.19).abs() < 0.06);
        assert!((GREEN.evaluate(10.0) - 1.98).abs() < 0.05);
        assert!(SAND.evaluate(100.0) > FAIRWAY.evaluate(100.0));
        assert!(RECOVERY.evaluate(200.0) > ROUGH.evaluate(200.0));
    }
}
