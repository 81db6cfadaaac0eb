//! Surface classification priority, user overrides and cache reuse.

use fairway_planner::course::{
    ConditionCategory, Course, CourseClassifier, CourseFeatures, Hole, Ring, SurfaceLabel, UserConditions,
};
use fairway_planner::geo::{GeoPoint, LocalFrame};
use fairway_planner::strokes::{expected_strokes, Surface};

const ORIGIN: GeoPoint = GeoPoint::new(-2.80, 56.34);

/// Axis-aligned rectangle in meters around the origin.
fn rect(frame: &LocalFrame, e0: f64, n0: f64, e1: f64, n1: f64) -> Ring {
    use bevy::math::DVec2;
    [DVec2::new(e0, n0), DVec2::new(e1, n0), DVec2::new(e1, n1), DVec2::new(e0, n1)]
        .into_iter()
        .map(|v| frame.to_geo(v))
        .collect()
}

fn at(frame: &LocalFrame, e: f64, n: f64) -> GeoPoint { frame.to_geo(bevy::math::DVec2::new(e, n)) }

/// One 350 m hole running north: rough corridor, fairway strip, a bunker
/// cut into the rough and a green at the end.
fn course() -> (Course, LocalFrame) {
    let f = LocalFrame::at(ORIGIN);
    let course = Course {
        name: "test".into(),
        holes: vec![Hole { number: 1, par: 4, centerline: vec![at(&f, 0.0, 0.0), at(&f, 0.0, 350.0)], pin: None }],
        features: CourseFeatures {
            roughs: vec![rect(&f, -50.0, -10.0, 50.0, 370.0)],
            fairways: vec![rect(&f, -20.0, 150.0, 20.0, 330.0)],
            bunkers: vec![rect(&f, 25.0, 200.0, 40.0, 215.0)],
            greens: vec![rect(&f, -15.0, 335.0, 15.0, 365.0)],
            tees: vec![rect(&f, -5.0, -5.0, 5.0, 5.0)],
            ..Default::default()
        },
        association: None,
    };
    (course, f)
}

#[test]
fn bunker_inside_rough_is_sand() {
    let (course, f) = course();
    let mut c = CourseClassifier::for_course(course);
    c.set_active_hole(1);
    assert_eq!(c.classify(at(&f, 30.0, 205.0)), Surface::Sand);
    assert_eq!(c.classify(at(&f, 45.0, 205.0)), Surface::Rough);
    assert_eq!(c.classify(at(&f, 0.0, 250.0)), Surface::Fairway);
    assert_eq!(c.classify(at(&f, 0.0, 350.0)), Surface::Green);
    assert_eq!(c.classify(at(&f, 0.0, 0.0)), Surface::Tee);
    assert_eq!(c.classify(at(&f, 400.0, 0.0)), Surface::Rough);
}

#[test]
fn hazard_over_fairway_costs_rough_plus_one() {
    let (course, f) = course();
    let mut c = CourseClassifier::for_course(course);
    c.set_active_hole(1);
    let p = at(&f, 0.0, 250.0);

    let mut user = UserConditions::new();
    assert_eq!(user.classify_with_penalty(&mut c, 120.0, p), expected_strokes(120.0, Surface::Fairway));

    user.add_polygon(ConditionCategory::Hazards, rect(&f, -10.0, 240.0, 10.0, 260.0));
    let cost = user.evaluate(&mut c, 120.0, p);
    assert_eq!(cost.label, SurfaceLabel::User(ConditionCategory::Hazards));
    let rough = expected_strokes(120.0, Surface::Rough).unwrap();
    assert!((cost.strokes.unwrap() - (rough + 1.0)).abs() < 1e-12);

    user.clear_category(ConditionCategory::Hazards);
    user.add_polygon(ConditionCategory::Ob, rect(&f, -10.0, 240.0, 10.0, 260.0));
    assert!((user.classify_with_penalty(&mut c, 120.0, p).unwrap() - (rough + 2.0)).abs() < 1e-12);
}

#[test]
fn user_water_overrides_green() {
    let (course, f) = course();
    let mut c = CourseClassifier::for_course(course);
    c.set_active_hole(1);
    let mut user = UserConditions::new();
    user.add_polygon(ConditionCategory::Water, rect(&f, -5.0, 345.0, 5.0, 355.0));
    let cost = user.evaluate(&mut c, 2.0, at(&f, 0.0, 350.0));
    assert_eq!(cost.label.to_string(), "user_water");
    assert_eq!(cost.strokes, expected_strokes(2.0, Surface::Water));
}

#[test]
fn cache_is_reused_for_the_same_hole() {
    let (course, f) = course();
    let mut c = CourseClassifier::for_course(course);
    c.set_active_hole(1);
    c.classify(at(&f, 0.0, 250.0));
    c.classify(at(&f, 30.0, 205.0));
    c.set_active_hole(1);
    c.classify(at(&f, 0.0, 10.0));
    assert_eq!(c.rebuild_count(), 1);
}

#[test]
fn demo_course_asset_classifies() {
    let course = Course::load("assets/courses/demo.course.ron").unwrap();
    assert_eq!(course.holes.len(), 3);
    let hole = course.hole(1).unwrap().clone();
    let (tee, pin) = (hole.tee().unwrap(), hole.pin().unwrap());

    let mut c = CourseClassifier::for_course(course);
    c.set_active_hole(1);
    assert_eq!(c.classify(tee), Surface::Tee);
    assert_eq!(c.classify(pin), Surface::Green);
    assert_eq!(c.classify(tee.offset(0.0, 250.0)), Surface::Fairway);
    assert!(c.green_ring().is_some());
}
