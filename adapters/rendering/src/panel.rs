//! Layout of the clickable side panel.

use forest_protector_core::{FieldLayout, PlayerAction, TowerKind};
use glam::Vec2;

const MARGIN: f32 = 20.0;
const SMALL_BUTTON: Vec2 = Vec2::new(40.0, 40.0);
const SPEED_ROW: f32 = 180.0;
const DIFFICULTY_ROW: f32 = 280.0;
const TOWER_ROW: f32 = 380.0;
const TOWER_STRIDE: f32 = 80.0;
const TOWER_BUTTON_HEIGHT: f32 = 70.0;
const PATH_ROW: f32 = 650.0;
const PAUSE_ROW: f32 = 720.0;
const WIDE_BUTTON_HEIGHT: f32 = 50.0;

/// Clickable button drawn in the side panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelButton {
    /// Action triggered by a click.
    pub action: PlayerAction,
    /// Caption drawn on the button.
    pub label: &'static str,
    /// Top-left corner in window coordinates.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl PanelButton {
    /// Returns `true` when `point` lies on the button.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let end = self.origin + self.size;
        point.x >= self.origin.x && point.y >= self.origin.y && point.x < end.x && point.y < end.y
    }
}

/// Buttons of the side panel placed to the right of the field.
#[must_use]
pub fn side_panel_buttons(layout: &FieldLayout) -> Vec<PanelButton> {
    let left = layout.width + MARGIN;
    let wide = (layout.panel_width - 2.0 * MARGIN).max(SMALL_BUTTON.x);
    let mut buttons = vec![
        PanelButton {
            action: PlayerAction::SpeedUp,
            label: "+",
            origin: Vec2::new(left, SPEED_ROW),
            size: SMALL_BUTTON,
        },
        PanelButton {
            action: PlayerAction::SlowDown,
            label: "-",
            origin: Vec2::new(left + 50.0, SPEED_ROW),
            size: SMALL_BUTTON,
        },
        PanelButton {
            action: PlayerAction::DifficultyUp,
            label: "+",
            origin: Vec2::new(left, DIFFICULTY_ROW),
            size: SMALL_BUTTON,
        },
        PanelButton {
            action: PlayerAction::DifficultyDown,
            label: "-",
            origin: Vec2::new(left + 50.0, DIFFICULTY_ROW),
            size: SMALL_BUTTON,
        },
    ];

    for (index, kind) in TowerKind::ALL.into_iter().enumerate() {
        buttons.push(PanelButton {
            action: PlayerAction::SelectTower(kind),
            label: kind.label(),
            origin: Vec2::new(left, TOWER_ROW + index as f32 * TOWER_STRIDE),
            size: Vec2::new(wide, TOWER_BUTTON_HEIGHT),
        });
    }

    buttons.push(PanelButton {
        action: PlayerAction::ChangePath,
        label: "Change Path",
        origin: Vec2::new(left, PATH_ROW),
        size: Vec2::new(wide, WIDE_BUTTON_HEIGHT),
    });
    buttons.push(PanelButton {
        action: PlayerAction::TogglePause,
        label: "Pause (P)",
        origin: Vec2::new(left, PAUSE_ROW),
        size: Vec2::new(wide, WIDE_BUTTON_HEIGHT),
    });
    buttons
}

/// Action of the side panel button under `point`, if any.
#[must_use]
pub fn button_at(layout: &FieldLayout, point: Vec2) -> Option<PlayerAction> {
    side_panel_buttons(layout)
        .into_iter()
        .find(|button| button.contains(point))
        .map(|button| button.action)
}
