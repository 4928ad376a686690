#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that builds the pool of paths enemies walk along.
//!
//! Every path enters at the left edge of the playable field and leaves at the
//! right edge. The pool opens with five hand-shaped layouts followed by
//! randomly generated ones. Field dimensions are treated as whole world units
//! so layouts stay stable across resolutions that share the same field size.

use std::f32::consts::{PI, TAU};

use forest_protector_core::{FieldLayout, Path, FIXED_PATH_COUNT};
use glam::Vec2;
use rand::Rng;

const CIRCLE_POINTS: u32 = 20;
const SPIRAL_TURNS: u32 = 2;
const SPIRAL_POINTS_PER_TURN: u32 = 20;
const ZIGZAG_SEGMENTS: u32 = 6;
const WAVE_SEGMENTS: u32 = 8;
const RANDOM_MIN_WAYPOINTS: u32 = 3;
const RANDOM_MAX_WAYPOINTS: u32 = 7;

/// Generates enemy paths for a fixed field size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathGenerator {
    width: u32,
    height: u32,
    pool_size: usize,
}

impl PathGenerator {
    /// Creates a generator for the provided field that fills pools of `pool_size` paths.
    #[must_use]
    pub fn new(layout: &FieldLayout, pool_size: usize) -> Self {
        Self {
            width: layout.width.max(0.0) as u32,
            height: layout.height.max(0.0) as u32,
            pool_size: pool_size.max(FIXED_PATH_COUNT),
        }
    }

    /// Number of paths produced by [`PathGenerator::generate_all_paths`].
    #[must_use]
    pub const fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Builds a fresh pool: the five fixed shapes followed by random paths.
    pub fn generate_all_paths<R>(&self, rng: &mut R) -> Vec<Path>
    where
        R: Rng + ?Sized,
    {
        let mut paths = Vec::with_capacity(self.pool_size);
        paths.push(self.circular());
        paths.push(self.straight());
        paths.push(self.zigzag());
        paths.push(self.spiral());
        paths.push(self.wave());
        for _ in FIXED_PATH_COUNT..self.pool_size {
            paths.push(self.random(rng));
        }
        paths
    }

    /// Loop around the field centre, entering and leaving at mid height.
    #[must_use]
    pub fn circular(&self) -> Path {
        let center = self.center();
        let radius = self.width.min(self.height) / 3;
        let waypoints = (1..CIRCLE_POINTS).map(|index| {
            let angle = index as f32 / CIRCLE_POINTS as f32 * TAU;
            center + Vec2::new(angle.cos(), angle.sin()) * radius as f32
        });
        Path::through(self.left_mid(), waypoints, self.right_mid())
    }

    /// Mostly straight run with a raised middle section.
    #[must_use]
    pub fn straight(&self) -> Path {
        let (w, h) = (self.width, self.height);
        let waypoints = [
            point(w / 4, h / 2),
            point(w / 3, h / 3),
            point(w / 2, h / 3),
            point(2 * w / 3, h / 2),
            point(3 * w / 4, h / 2),
        ];
        Path::through(self.left_mid(), waypoints, self.right_mid())
    }

    /// Alternates between the upper and lower thirds of the field.
    #[must_use]
    pub fn zigzag(&self) -> Path {
        let (w, h) = (self.width, self.height);
        let waypoints = (0..ZIGZAG_SEGMENTS).map(|index| {
            let x = (index + 1) * w / ZIGZAG_SEGMENTS;
            let y = if index % 2 == 0 { h / 3 } else { 2 * h / 3 };
            point(x, y)
        });
        Path::through(self.left_mid(), waypoints, self.right_mid())
    }

    /// Spirals outwards from the field centre.
    #[must_use]
    pub fn spiral(&self) -> Path {
        let center = self.center();
        let max_radius = (self.width.min(self.height) / 3) as f32;
        let steps = SPIRAL_TURNS * SPIRAL_POINTS_PER_TURN;
        let waypoints = (0..=steps).map(|index| {
            let angle = index as f32 / SPIRAL_POINTS_PER_TURN as f32 * TAU;
            let radius = index as f32 / steps as f32 * max_radius;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        });
        Path::through(self.left_mid(), waypoints, self.right_mid())
    }

    /// Sine wave with an amplitude of a quarter of the field height.
    #[must_use]
    pub fn wave(&self) -> Path {
        let (w, h) = (self.width, self.height);
        let amplitude = (h / 4) as f32;
        let waypoints = (1..WAVE_SEGMENTS).map(|index| {
            let x = index * w / WAVE_SEGMENTS;
            let y = (h / 2) as f32 + amplitude * (index as f32 * PI / 2.0).sin();
            Vec2::new(x as f32, y)
        });
        Path::through(self.left_mid(), waypoints, self.right_mid())
    }

    /// Random walk across evenly spaced columns.
    pub fn random<R>(&self, rng: &mut R) -> Path
    where
        R: Rng + ?Sized,
    {
        let (w, h) = (self.width, self.height);
        let start_y = rng.gen_range(h / 4..=3 * h / 4);
        let waypoint_count = rng.gen_range(RANDOM_MIN_WAYPOINTS..=RANDOM_MAX_WAYPOINTS);
        let waypoints: Vec<Vec2> = (1..waypoint_count)
            .map(|index| {
                let x = index * w / (waypoint_count + 1);
                let y = rng.gen_range(h / 5..=4 * h / 5);
                point(x, y)
            })
            .collect();
        let end_y = rng.gen_range(h / 4..=3 * h / 4);
        Path::through(point(0, start_y), waypoints, point(w, end_y))
    }

    fn center(&self) -> Vec2 {
        point(self.width / 2, self.height / 2)
    }

    fn left_mid(&self) -> Vec2 {
        point(0, self.height / 2)
    }

    fn right_mid(&self) -> Vec2 {
        point(self.width, self.height / 2)
    }
}

fn point(x: u32, y: u32) -> Vec2 {
    Vec2::new(x as f32, y as f32)
}
