#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system responsible for emitting build, upgrade and session commands.

use forest_protector_core::{
    Command, Event, FieldLayout, GridCell, PlacementError, PlayerAction, TowerId, TowerKind,
};
use glam::Vec2;

/// Declarative placement preview describing a potential tower construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementPreview {
    /// Kind of tower proposed for placement.
    pub kind: TowerKind,
    /// Cell the tower would occupy.
    pub cell: GridCell,
    /// Centre of the proposed tower in world units.
    pub position: Vec2,
    /// Reason the placement would fail, if any.
    pub rejection: Option<PlacementError>,
}

impl PlacementPreview {
    /// Creates a new placement preview descriptor.
    #[must_use]
    pub const fn new(
        kind: TowerKind,
        cell: GridCell,
        position: Vec2,
        rejection: Option<PlacementError>,
    ) -> Self {
        Self {
            kind,
            cell,
            position,
            rejection,
        }
    }

    /// Indicates whether the preview represents a valid placement location.
    #[must_use]
    pub const fn placeable(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuilderInput {
    /// Cursor position in world units, if the cursor is inside the window.
    pub cursor: Option<Vec2>,
    /// Indicates whether the primary button was clicked this frame.
    pub click: bool,
    /// Discrete actions triggered by shortcuts or panel buttons this frame.
    pub actions: Vec<PlayerAction>,
}

/// Input system that translates clicks and shortcuts into world commands.
#[derive(Debug, Clone)]
pub struct Builder {
    layout: FieldLayout,
    selected: TowerKind,
}

impl Builder {
    /// Creates a new builder system for the provided field layout.
    #[must_use]
    pub const fn new(layout: FieldLayout) -> Self {
        Self {
            layout,
            selected: TowerKind::Archer,
        }
    }

    /// Tower kind placed by the next click on an empty cell.
    #[must_use]
    pub const fn selected(&self) -> TowerKind {
        self.selected
    }

    /// Consumes world events and adapter-derived input to emit commands.
    ///
    /// Clicking an existing tower requests an upgrade; clicking anywhere else
    /// on the field requests placement of the selected kind. The `tower_at`
    /// closure should mirror the semantics of the world's
    /// `query::tower_at_point` helper.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: &BuilderInput,
        mut tower_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(Vec2) -> Option<TowerId>,
    {
        for event in events {
            if let Event::SessionRestarted = event {
                self.selected = TowerKind::Archer;
            }
        }

        for action in &input.actions {
            let command = match *action {
                PlayerAction::SelectTower(kind) => {
                    self.selected = kind;
                    continue;
                }
                PlayerAction::TogglePause => Command::TogglePause,
                PlayerAction::ChangePath => Command::ChangePath,
                PlayerAction::SpeedUp => Command::AdjustGameSpeed { steps: 1 },
                PlayerAction::SlowDown => Command::AdjustGameSpeed { steps: -1 },
                PlayerAction::DifficultyUp => Command::AdjustDifficulty { delta: 1 },
                PlayerAction::DifficultyDown => Command::AdjustDifficulty { delta: -1 },
                PlayerAction::Restart => Command::Restart,
            };
            out.push(command);
        }

        if !input.click {
            return;
        }
        let Some(point) = input.cursor else {
            return;
        };

        if let Some(tower) = tower_at(point) {
            out.push(Command::UpgradeTower { tower });
        } else if let Some(cell) = self.layout.cell_at(point) {
            out.push(Command::PlaceTower {
                kind: self.selected,
                cell,
            });
        }
    }

    /// Computes the hover preview for the selected tower kind.
    ///
    /// The `check` closure should mirror the world's `query::placement_check`.
    pub fn preview<F>(&self, cursor: Option<Vec2>, check: F) -> Option<PlacementPreview>
    where
        F: FnOnce(TowerKind, GridCell) -> Result<Vec2, PlacementError>,
    {
        let cell = self.layout.cell_at(cursor?)?;
        let position = self.layout.cell_center(cell);
        Some(PlacementPreview::new(
            self.selected,
            cell,
            position,
            check(self.selected, cell).err(),
        ))
    }
}
