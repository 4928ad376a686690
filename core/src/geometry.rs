use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distance from `point` to the closest point of the segment `start..end`.
///
/// The projection of `point` onto the segment is clamped to the segment's
/// endpoints. A degenerate segment collapses to the distance to `start`.
#[must_use]
pub fn distance_point_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let segment = end - start;
    let length_squared = segment.length_squared();
    if length_squared == 0.0 {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_squared).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

/// Immutable polyline that enemies walk from its first to its last point.
///
/// Cloning is cheap: every clone shares the same point buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    points: Arc<[Vec2]>,
}

impl Path {
    /// Creates a path from an explicit point list.
    pub fn new(points: Vec<Vec2>) -> Result<Self, PathError> {
        if points.len() < 2 {
            return Err(PathError::TooFewPoints {
                count: points.len(),
            });
        }

        Ok(Self {
            points: points.into(),
        })
    }

    /// Creates a path that starts at `start`, visits `waypoints` in order and ends at `end`.
    #[must_use]
    pub fn through(start: Vec2, waypoints: impl IntoIterator<Item = Vec2>, end: Vec2) -> Self {
        let mut points = vec![start];
        points.extend(waypoints);
        points.push(end);
        Self {
            points: points.into(),
        }
    }

    /// Ordered points composing the path.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Number of points on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Paths always hold at least two points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Point where enemies enter the field.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.points[0]
    }

    /// Point where enemies leave the field.
    #[must_use]
    pub fn end(&self) -> Vec2 {
        self.points[self.points.len() - 1]
    }

    /// Point at `index`, if present.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Vec2> {
        self.points.get(index).copied()
    }

    /// Iterator over consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Minimum distance from `point` to any segment of the path.
    #[must_use]
    pub fn clearance(&self, point: Vec2) -> f32 {
        self.segments()
            .map(|(start, end)| distance_point_to_segment(point, start, end))
            .fold(f32::INFINITY, f32::min)
    }

    /// Total length of the polyline in world units.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.segments().map(|(start, end)| start.distance(end)).sum()
    }
}

/// Errors reported when constructing a [`Path`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// A path needs a start and an end.
    #[error("a path needs at least two points (received {count})")]
    TooFewPoints {
        /// Number of points supplied.
        count: usize,
    },
}

/// Grid cell addressed by zero-based column and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    column: u32,
    row: u32,
}

impl GridCell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Dimensions of the playable field and the side panel next to it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLayout {
    /// Width of the playable field in world units.
    pub width: f32,
    /// Height of the playable field in world units.
    pub height: f32,
    /// Side length of a placement grid cell.
    pub cell_size: f32,
    /// Visual width of the path.
    pub path_width: f32,
    /// Width of the information panel to the right of the field.
    pub panel_width: f32,
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self {
            width: 1620.0,
            height: 1080.0,
            cell_size: 20.0,
            path_width: 60.0,
            panel_width: 300.0,
        }
    }
}

impl FieldLayout {
    /// Width of the field plus the side panel.
    #[must_use]
    pub fn total_width(&self) -> f32 {
        self.width + self.panel_width
    }

    /// Returns `true` when `point` lies inside the playable field.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x < self.width && point.y < self.height
    }

    /// Grid cell under `point`, or `None` outside the playable field.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<GridCell> {
        if !self.contains(point) || self.cell_size <= 0.0 {
            return None;
        }

        let column = (point.x / self.cell_size).floor() as u32;
        let row = (point.y / self.cell_size).floor() as u32;
        Some(GridCell::new(column, row))
    }

    /// Centre of `cell` in world units.
    #[must_use]
    pub fn cell_center(&self, cell: GridCell) -> Vec2 {
        Vec2::new(
            (cell.column() as f32 + 0.5) * self.cell_size,
            (cell.row() as f32 + 0.5) * self.cell_size,
        )
    }

    /// Minimum clearance between a tower and the path centre line.
    #[must_use]
    pub fn placement_clearance(&self) -> f32 {
        self.path_width / 2.0 + self.cell_size
    }

    /// Returns `true` when a tower centred on `point` keeps clear of `path`.
    #[must_use]
    pub fn is_clear_of_path(&self, path: &Path, point: Vec2) -> bool {
        path.clearance(point) >= self.placement_clearance()
    }
}
