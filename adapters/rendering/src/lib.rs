#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Forest Protector adapters.
//!
//! Backends implement [`Renderer`], [`InputSource`] and [`AssetLoader`] and
//! drive frames through [`RenderingBackend::run`]. The [`Scene`] descriptor is
//! populated from world snapshots each frame and turned into primitive draw
//! calls by [`draw_scene`], so every backend presents the same picture.

mod draw;
mod panel;

use anyhow::Result as AnyResult;
use forest_protector_core::{
    Difficulty, EnemyKind, FieldLayout, GameSpeed, GameState, PlacementError, PlayerAction,
    TowerId, TowerKind,
};
use glam::Vec2;
use std::time::Duration;
use thiserror::Error;

pub use draw::draw_scene;
pub use panel::{button_at, side_panel_buttons, PanelButton};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Opaque handle to an image resolved by an [`AssetLoader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageHandle(u32);

impl ImageHandle {
    /// Creates a handle wrapping a backend-specific identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Backend-specific identifier wrapped by the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Primitive drawing surface implemented by rendering backends.
///
/// Text positions refer to the left end of the baseline.
pub trait Renderer {
    /// Draws a straight line segment.
    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
    /// Draws a filled circle.
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// Draws the outline of a circle.
    fn draw_circle_outline(&mut self, center: Vec2, radius: f32, thickness: f32, color: Color);
    /// Draws a filled axis-aligned rectangle.
    fn draw_rect(&mut self, origin: Vec2, size: Vec2, color: Color);
    /// Draws a line of text.
    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color);
    /// Draws an image centred on `center`, scaled to `size`.
    fn draw_image(&mut self, image: ImageHandle, center: Vec2, size: Vec2);
}

/// Source of images referenced by name, such as `archer` or `grass`.
pub trait AssetLoader {
    /// Resolves the named image, or `None` when it is unavailable.
    fn resolve(&self, name: &str) -> Option<ImageHandle>;
}

/// Asset loader without any images; scenes fall back to primitive shapes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssets;

impl AssetLoader for NoAssets {
    fn resolve(&self, _name: &str) -> Option<ImageHandle> {
        None
    }
}

/// Mouse buttons reported by an [`InputSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Middle button or wheel press.
    Middle,
}

/// Keys that carry meaning in the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyPress {
    /// Selects the archer tower.
    Digit1,
    /// Selects the cannon tower.
    Digit2,
    /// Selects the magic tower.
    Digit3,
    /// Toggles pause.
    P,
    /// Changes the path.
    C,
    /// Raises the game speed.
    Up,
    /// Lowers the game speed.
    Down,
    /// Raises the difficulty.
    Plus,
    /// Lowers the difficulty.
    Minus,
    /// Restarts a finished session.
    Space,
    /// Leaves the game.
    Escape,
}

impl KeyPress {
    /// Player action bound to the key, if any.
    #[must_use]
    pub const fn action(self) -> Option<PlayerAction> {
        match self {
            KeyPress::Digit1 => Some(PlayerAction::SelectTower(TowerKind::Archer)),
            KeyPress::Digit2 => Some(PlayerAction::SelectTower(TowerKind::Cannon)),
            KeyPress::Digit3 => Some(PlayerAction::SelectTower(TowerKind::Magic)),
            KeyPress::P => Some(PlayerAction::TogglePause),
            KeyPress::C => Some(PlayerAction::ChangePath),
            KeyPress::Up => Some(PlayerAction::SpeedUp),
            KeyPress::Down => Some(PlayerAction::SlowDown),
            KeyPress::Plus => Some(PlayerAction::DifficultyUp),
            KeyPress::Minus => Some(PlayerAction::DifficultyDown),
            KeyPress::Space => Some(PlayerAction::Restart),
            KeyPress::Escape => None,
        }
    }
}

/// Per-frame input device polled by adapters.
pub trait InputSource {
    /// Cursor position in world units, or `None` when outside the window.
    fn poll_mouse_position(&mut self) -> Option<Vec2>;
    /// Mouse button pressed since the previous poll, if any.
    fn poll_mouse_click(&mut self) -> Option<MouseButton>;
    /// Next pending key press; called repeatedly until it returns `None`.
    fn poll_key_event(&mut self) -> Option<KeyPress>;
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor position expressed in world units.
    pub cursor: Option<Vec2>,
    /// Whether the primary button was clicked on the field this frame.
    pub click: bool,
    /// Actions triggered by keys or side panel buttons this frame.
    pub actions: Vec<PlayerAction>,
    /// Whether the player asked to leave the game.
    pub quit: bool,
}

impl FrameInput {
    /// Drains `source` and folds side panel clicks into actions.
    pub fn capture<S>(source: &mut S, layout: &FieldLayout) -> Self
    where
        S: InputSource + ?Sized,
    {
        let cursor = source.poll_mouse_position();
        let mut click = matches!(source.poll_mouse_click(), Some(MouseButton::Left));
        let mut actions = Vec::new();
        let mut quit = false;

        while let Some(key) = source.poll_key_event() {
            match key.action() {
                Some(action) => actions.push(action),
                None => quit = true,
            }
        }

        if click {
            if let Some(point) = cursor {
                if point.x >= layout.width {
                    click = false;
                    if let Some(action) = button_at(layout, point) {
                        actions.push(action);
                    }
                }
            }
        }

        Self {
            cursor,
            click,
            actions,
            quit,
        }
    }
}

/// Tower drawn on the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerPresentation {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Centre of the tower in world units.
    pub position: Vec2,
    /// Current level.
    pub level: u32,
    /// Highest reachable level.
    pub max_level: u32,
    /// Targeting range in world units.
    pub range: f32,
    /// Whether the cursor hovers the tower, revealing range and upgrade price.
    pub highlighted: bool,
}

impl TowerPresentation {
    /// Price of the next upgrade, or `None` at the maximum level.
    #[must_use]
    pub const fn upgrade_cost(&self) -> Option<u32> {
        if self.level < self.max_level {
            Some(self.kind.upgrade_cost())
        } else {
            None
        }
    }
}

/// Enemy drawn on the field with its health bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Position in world units.
    pub position: Vec2,
    /// Remaining health as a fraction of the spawn health.
    pub health_fraction: f32,
}

/// Projectile drawn on the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectilePresentation {
    /// Kind of the tower that launched the projectile.
    pub kind: TowerKind,
    /// Position in world units.
    pub position: Vec2,
}

/// Hover preview drawn under the cursor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewPresentation {
    /// Kind of tower proposed for placement.
    pub kind: TowerKind,
    /// Centre of the hovered cell.
    pub position: Vec2,
    /// Reason the placement would fail, if any.
    pub rejection: Option<PlacementError>,
}

/// Session figures shown in the top bar and side panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    /// Score accumulated in the session.
    pub score: u32,
    /// Money available to the player.
    pub money: u32,
    /// Lives left.
    pub lives: u32,
    /// Most recently started wave.
    pub wave: u32,
    /// Wave whose clearance wins the session.
    pub final_wave: u32,
    /// Play time left before the time limit.
    pub remaining: Duration,
    /// Index of the active path.
    pub path_index: usize,
    /// Number of paths in the rotation pool.
    pub path_count: usize,
    /// Size of the upcoming wave while the field is clear.
    pub next_wave_size: Option<u32>,
    /// Current game speed.
    pub game_speed: GameSpeed,
    /// Current difficulty.
    pub difficulty: Difficulty,
    /// Tower kind placed by the next click.
    pub selected_tower: TowerKind,
}

/// Scene description combining the field, its inhabitants and the interface.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Field and side panel dimensions.
    pub layout: FieldLayout,
    /// Waypoints of the active path.
    pub path: Vec<Vec2>,
    /// Towers on the field.
    pub towers: Vec<TowerPresentation>,
    /// Enemies on the field.
    pub enemies: Vec<EnemyPresentation>,
    /// Projectiles in flight.
    pub projectiles: Vec<ProjectilePresentation>,
    /// Optional placement preview under the cursor.
    pub preview: Option<PreviewPresentation>,
    /// Session figures.
    pub hud: Hud,
    /// Current game state, selecting the overlay.
    pub game_state: GameState,
}

impl Scene {
    /// Creates an empty scene for the provided layout.
    pub fn new(layout: FieldLayout) -> Result<Self, RenderingError> {
        if !(layout.width > 0.0 && layout.height > 0.0 && layout.panel_width >= 0.0) {
            return Err(RenderingError::InvalidLayout {
                width: layout.width,
                height: layout.height,
            });
        }

        Ok(Self {
            layout,
            path: Vec::new(),
            towers: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            preview: None,
            hud: Hud {
                score: 0,
                money: 0,
                lives: 0,
                wave: 0,
                final_wave: 0,
                remaining: Duration::ZERO,
                path_index: 0,
                path_count: 0,
                next_wave_size: None,
                game_speed: GameSpeed::NORMAL,
                difficulty: Difficulty::NORMAL,
                selected_tower: TowerKind::Archer,
            },
            game_state: GameState::Playing,
        })
    }

    /// Size of the window needed to show the field and the side panel.
    #[must_use]
    pub fn window_size(&self) -> Vec2 {
        Vec2::new(self.layout.total_width(), self.layout.height)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Forest Protector scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the wall-clock frame
    /// delta and the per-frame input captured by the adapter, and refreshes
    /// the scene before it is drawn. Returning `false` ends the loop.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum RenderingError {
    /// The field must have a positive area.
    #[error("field must have a positive size (received {width}x{height})")]
    InvalidLayout {
        /// Provided field width.
        width: f32,
        /// Provided field height.
        height: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedInput {
        cursor: Option<Vec2>,
        click: Option<MouseButton>,
        keys: Vec<KeyPress>,
    }

    impl InputSource for ScriptedInput {
        fn poll_mouse_position(&mut self) -> Option<Vec2> {
            self.cursor
        }

        fn poll_mouse_click(&mut self) -> Option<MouseButton> {
            self.click.take()
        }

        fn poll_key_event(&mut self) -> Option<KeyPress> {
            if self.keys.is_empty() {
                None
            } else {
                Some(self.keys.remove(0))
            }
        }
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 128, 255).lighten(0.5);

        assert!((color.red - 0.5).abs() < 1e-6);
        assert!((color.blue - 1.0).abs() < 1e-6);
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn scene_rejects_empty_fields() {
        let layout = FieldLayout {
            width: 0.0,
            ..FieldLayout::default()
        };

        assert_eq!(
            Scene::new(layout),
            Err(RenderingError::InvalidLayout {
                width: 0.0,
                height: 1080.0,
            })
        );
    }

    #[test]
    fn scene_window_includes_the_side_panel() {
        let scene = Scene::new(FieldLayout::default()).expect("default layout is valid");

        assert_eq!(scene.window_size(), Vec2::new(1920.0, 1080.0));
    }

    #[test]
    fn capture_collects_keys_and_field_clicks() {
        let mut source = ScriptedInput {
            cursor: Some(Vec2::new(200.0, 300.0)),
            click: Some(MouseButton::Left),
            keys: vec![KeyPress::Digit3, KeyPress::Up, KeyPress::Escape],
        };

        let input = FrameInput::capture(&mut source, &FieldLayout::default());

        assert!(input.click);
        assert!(input.quit);
        assert_eq!(
            input.actions,
            vec![
                PlayerAction::SelectTower(TowerKind::Magic),
                PlayerAction::SpeedUp,
            ]
        );
    }

    #[test]
    fn capture_turns_panel_clicks_into_actions() {
        let layout = FieldLayout::default();
        let pause = side_panel_buttons(&layout)
            .into_iter()
            .find(|button| button.action == PlayerAction::TogglePause)
            .expect("pause button");
        let mut source = ScriptedInput {
            cursor: Some(pause.origin + pause.size / 2.0),
            click: Some(MouseButton::Left),
            keys: Vec::new(),
        };

        let input = FrameInput::capture(&mut source, &layout);

        assert!(!input.click);
        assert_eq!(input.actions, vec![PlayerAction::TogglePause]);
    }

    #[test]
    fn secondary_clicks_are_not_field_clicks() {
        let mut source = ScriptedInput {
            cursor: Some(Vec2::new(10.0, 10.0)),
            click: Some(MouseButton::Right),
            keys: Vec::new(),
        };

        let input = FrameInput::capture(&mut source, &FieldLayout::default());

        assert!(!input.click);
        assert!(input.actions.is_empty());
    }

    #[test]
    fn upgrade_cost_disappears_at_max_level() {
        let mut tower = TowerPresentation {
            id: TowerId::new(1),
            kind: TowerKind::Cannon,
            position: Vec2::ZERO,
            level: 2,
            max_level: 3,
            range: 100.0,
            highlighted: false,
        };
        assert_eq!(tower.upgrade_cost(), Some(30));

        tower.level = 3;
        assert_eq!(tower.upgrade_cost(), None);
    }
}
