// src/dispersion/sampler.rs
//! Draw points from a shot pattern, cost each one and aggregate.

use bevy::log::{debug, warn};
use rand::Rng;

use super::{Sample, SampleBatch, ShotPattern, MAX_ATTEMPTS_PER_SAMPLE};
use crate::course::{CourseClassifier, Ring, UserConditions};
use crate::geo::ellipse::random_point_in_disc;
use crate::geo::GeoPoint;
use crate::shortgame::ShortGameModel;
use crate::terrain::ElevationProvider;

/// Advanced short-game evaluation inputs.
#[derive(Clone, Copy)]
pub struct ShortGameContext<'a> {
    pub model: &'a ShortGameModel,
    pub terrain: &'a dyn ElevationProvider,
    pub green: Option<&'a [GeoPoint]>,
}

/// Everything a pass reads besides the pattern itself.
pub struct SampleContext<'a> {
    pub classifier: &'a mut CourseClassifier,
    pub conditions: &'a UserConditions,
    /// `Some` when advanced short-game mode is on.
    pub short_game: Option<ShortGameContext<'a>>,
}

impl<'a> SampleContext<'a> {
    pub fn new(classifier: &'a mut CourseClassifier, conditions: &'a UserConditions) -> Self {
        Self { classifier, conditions, short_game: None }
    }

    pub fn with_short_game(mut self, short_game: ShortGameContext<'a>) -> Self {
        self.short_game = Some(short_game);
        self
    }
}

/// Raw draws in generation order. Without roll: `n` direct draws. With
/// roll: rejection over a disc covering both ovals, at most
/// `5 × n` attempts.
pub fn draw_points<R: Rng + ?Sized>(pattern: &ShotPattern, n: usize, rng: &mut R) -> Vec<GeoPoint> {
    let Some(roll) = pattern.roll else {
        return (0..n).map(|_| pattern.landing.random_point(rng)).collect();
    };

    let landing = &pattern.landing;
    let center = landing.center.lerp(roll.center, 0.5);
    let radius = landing.center.distance_m(roll.center) * 0.5 + landing.max_semi_axis().max(roll.max_semi_axis());

    let mut out = Vec::with_capacity(n);
    let max_attempts = n * MAX_ATTEMPTS_PER_SAMPLE;
    let mut attempts = 0;
    while out.len() < n && attempts < max_attempts {
        attempts += 1;
        let p = random_point_in_disc(center, radius, rng);
        if pattern.contains(p) {
            out.push(p);
        }
    }
    if out.len() < n {
        debug!("Sampler: rejection cap hit, {}/{} samples after {} attempts", out.len(), n, attempts);
    }
    out
}

/// One pass: draw, classify (with user overrides), cost and aggregate.
pub fn sample<R: Rng + ?Sized>(
    pattern: &ShotPattern,
    pin: GeoPoint,
    n: usize,
    ctx: &mut SampleContext<'_>,
    rng: &mut R,
) -> SampleBatch {
    let points = draw_points(pattern, n, rng);
    let green_ring: Option<Ring> = match ctx.short_game {
        Some(sg) if sg.green.is_none() => ctx.classifier.green_ring(),
        _ => None,
    };

    let mut batch = SampleBatch { requested: n, samples: Vec::with_capacity(points.len()), ..Default::default() };
    let (mut distance_sum, mut strokes_sum, mut costed) = (0.0, 0.0, 0usize);

    for point in points {
        let distance_yards = point.distance_yards(pin);
        let cost = ctx.conditions.evaluate(ctx.classifier, distance_yards, point);
        let mut strokes = cost.strokes;

        if let (Some(sg), Some(base)) = (ctx.short_game, strokes) {
            let green = sg.green.or(green_ring.as_deref());
            if let Some(out) = sg.model.advanced_expected_strokes(sg.terrain, base, distance_yards, point, pin, green) {
                if let Some(e) = &out.terrain_error {
                    if batch.terrain_fallbacks == 0 {
                        warn!("Sampler: short-game terrain unavailable ({}) - using flat conditions", e);
                    }
                    batch.terrain_fallbacks += 1;
                }
                strokes = Some(out.strokes);
            }
        }

        distance_sum += distance_yards;
        match strokes {
            Some(s) => {
                strokes_sum += s;
                costed += 1;
            }
            None => batch.skipped += 1,
        }
        *batch.surface_counts.entry(cost.label).or_insert(0) += 1;
        batch.samples.push(Sample { point, label: cost.label, distance_yards, strokes });
    }

    if !batch.samples.is_empty() {
        batch.mean_distance_yards = distance_sum / batch.samples.len() as f64;
    }
    batch.mean_expected_strokes = (costed > 0).then(|| strokes_sum / costed as f64);
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clubs::Firmness;
    use crate::geo::Ellipse;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn direct_draws_stay_inside() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let pattern = ShotPattern { landing: Ellipse::facing(GeoPoint::new(1.0, 50.0), 30.0, 10.0, 0.4), roll: None };
        let pts = draw_points(&pattern, 500, &mut rng);
        assert_eq!(pts.len(), 500);
        assert!(pts.iter().all(|p| pattern.landing.contains(*p)));
    }

    #[test]
    fn rejection_fills_the_union() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let landing = Ellipse::facing(GeoPoint::new(1.0, 50.0), 20.0, 12.0, 1.1);
        let pattern = ShotPattern { landing, roll: None }.with_roll(Firmness::Firm);
        let pts = draw_points(&pattern, 400, &mut rng);
        assert_eq!(pts.len(), 400);
        assert!(pts.iter().all(|p| pattern.contains(*p)));
        assert!(pts.iter().any(|p| !landing.contains(*p)), "roll oval never sampled");
    }

    #[test]
    fn degenerate_roll_terminates_with_partial_set() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let landing = Ellipse::facing(GeoPoint::new(0.0, 0.0), 0.0, 0.0, 0.0);
        let pattern = ShotPattern { landing, roll: Some(landing) };
        assert!(draw_points(&pattern, 50, &mut rng).is_empty());
    }
}
