// src/lib.rs
//! Expected-strokes shot planning: a polynomial cost model, course-feature
//! classification with user overrides, Monte-Carlo dispersion sampling,
//! short-game modifiers and a cancellable terrain/slope worker, wired into
//! a Bevy app by [`planner::ShotPlannerPlugin`].

pub mod clubs;
pub mod config;
pub mod course;
pub mod dispersion;
pub mod error;
pub mod geo;
pub mod jobs;
pub mod planner;
pub mod session;
pub mod shortgame;
pub mod strokes;
pub mod terrain;
