//! Expected-strokes model: floor, seams, water identity, green delegation.

use fairway_planner::strokes::curves::{self, ALL_FAMILIES, MAX_DISTANCE_YARDS};
use fairway_planner::strokes::{expected_strokes, Surface, MIN_EXPECTED_STROKES};

fn sweep() -> impl Iterator<Item = f64> {
    (0..=6000).map(|i| i as f64 * 0.1)
}

#[test]
fn floor_holds_everywhere() {
    for s in Surface::ALL {
        for d in sweep() {
            let v = expected_strokes(d, s).unwrap();
            assert!(v >= MIN_EXPECTED_STROKES, "{s} at {d}: {v}");
        }
    }
}

#[test]
fn lower_breakpoints_are_continuous() {
    for (name, c) in ALL_FAMILIES {
        let below = c.lower_extrapolation(c.lower - 1e-9);
        let at = c.polynomial(c.lower);
        assert!((below - at).abs() < 1e-6, "{name}: {below} vs {at}");
    }
    // through the public entry point too
    let left = expected_strokes(10.0 - 1e-9, Surface::Fairway).unwrap();
    let right = expected_strokes(10.0, Surface::Fairway).unwrap();
    assert!((left - right).abs() < 1e-6);
}

#[test]
fn water_is_rough_plus_one() {
    for d in sweep() {
        let water = expected_strokes(d, Surface::Water).unwrap();
        let rough = expected_strokes(d, Surface::Rough).unwrap();
        assert!((water - (rough + 1.0)).abs() < 1e-12, "at {d}: {water} vs {rough}");
    }
}

#[test]
fn scenario_green_delegation() {
    assert_eq!(expected_strokes(0.0, Surface::Green), Some(MIN_EXPECTED_STROKES));

    let putt = expected_strokes(33.39, Surface::Green).unwrap();
    assert!((putt - curves::GREEN.polynomial(33.39).max(MIN_EXPECTED_STROKES)).abs() < 1e-12);

    assert_eq!(expected_strokes(40.0, Surface::Green), expected_strokes(40.0, Surface::Fairway));
}

#[test]
fn domain_edges() {
    assert!(expected_strokes(MAX_DISTANCE_YARDS, Surface::Fairway).is_some());
    assert!(expected_strokes(MAX_DISTANCE_YARDS + 0.5, Surface::Fairway).is_none());
    assert!(expected_strokes(-1.0, Surface::Green).is_none());
}

#[test]
fn rough_never_beats_fairway_from_distance() {
    for d in (20..=450).map(f64::from) {
        let fw = expected_strokes(d, Surface::Fairway).unwrap();
        let rough = expected_strokes(d, Surface::Rough).unwrap();
        assert!(rough >= fw, "at {d}: rough {rough} < fairway {fw}");
    }
}

/// Every family, 0.5 yd steps: never cheaper from further out.
#[test]
fn strokes_never_decrease_with_distance() {
    let families = [Surface::Fairway, Surface::Rough, Surface::Sand, Surface::Recovery, Surface::Water, Surface::Green];
    for s in families {
        let mut prev = expected_strokes(0.0, s).unwrap();
        for i in 1..=1200 {
            let d = i as f64 * 0.5;
            let v = expected_strokes(d, s).unwrap();
            assert!(v >= prev - 1e-9, "{s}: {v} at {d} below {prev}");
            prev = v;
        }
    }
}

#[test]
fn seams_are_continuous_through_expected_strokes() {
    let eps = 1e-7;
    let seams = [
        (Surface::Fairway, curves::FAIRWAY),
        (Surface::Rough, curves::ROUGH),
        (Surface::Sand, curves::SAND),
        (Surface::Recovery, curves::RECOVERY),
    ];
    for (s, c) in seams {
        let lo = c.lower;
        let (left, right) = (expected_strokes(lo - eps, s).unwrap(), expected_strokes(lo, s).unwrap());
        assert!((left - right).abs() < 1e-6, "{s} at {lo}: {left} vs {right}");
        // the ramp below the breakpoint has the advertised slope
        let ramp = expected_strokes(lo - 1.0, s).unwrap() - expected_strokes(lo - 2.0, s).unwrap();
        assert!((ramp - c.lower_slope()).abs() < 1e-9, "{s}: ramp {ramp} vs {}", c.lower_slope());

        if let Some(slope) = c.upper_slope() {
            let up = c.upper;
            let (left, right) = (expected_strokes(up, s).unwrap(), expected_strokes(up + eps, s).unwrap());
            assert!((left - right).abs() < 1e-6, "{s} at {up}: {left} vs {right}");
            let tail = expected_strokes(up + 20.0, s).unwrap() - expected_strokes(up + 10.0, s).unwrap();
            assert!((tail - 10.0 * slope).abs() < 1e-9, "{s} tail step {tail}");
        }
    }

    // putting hands over to the fairway curve at 33.4 yd; the step is upward
    let putt = expected_strokes(curves::GREEN.upper, Surface::Green).unwrap();
    let beyond = expected_strokes(curves::GREEN.upper + eps, Surface::Green).unwrap();
    assert!(beyond >= putt, "green seam drops: {putt} -> {beyond}");
    let lo = curves::GREEN.lower;
    let (left, right) = (expected_strokes(lo - eps, Surface::Green).unwrap(), expected_strokes(lo, Surface::Green).unwrap());
    assert!((left - right).abs() < 1e-6);
}
