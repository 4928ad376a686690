#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Forest Protector.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the crate depends on macroquad without its default `audio`
//! feature.
//!
//! The scene is laid out in world units and scaled uniformly to fit the
//! window. Images are read from `assets/<name>.png`; any image that fails to
//! load is replaced by the primitive shapes drawn by the shared renderer.

mod textures;

use std::{collections::VecDeque, path::PathBuf, time::Duration};

use anyhow::Result;
use forest_protector_rendering::{
    draw_scene, Color, FrameInput, ImageHandle, InputSource, KeyPress, MouseButton, Presentation,
    Renderer, RenderingBackend, Scene,
};
use glam::Vec2;
use macroquad::{
    input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode},
    texture::{draw_texture_ex, DrawTextureParams},
};

pub use textures::{sprite_names, TextureCache};

const KEY_BINDINGS: [(KeyCode, KeyPress); 16] = [
    (KeyCode::Key1, KeyPress::Digit1),
    (KeyCode::Kp1, KeyPress::Digit1),
    (KeyCode::Key2, KeyPress::Digit2),
    (KeyCode::Kp2, KeyPress::Digit2),
    (KeyCode::Key3, KeyPress::Digit3),
    (KeyCode::Kp3, KeyPress::Digit3),
    (KeyCode::P, KeyPress::P),
    (KeyCode::C, KeyPress::C),
    (KeyCode::Up, KeyPress::Up),
    (KeyCode::Down, KeyPress::Down),
    (KeyCode::Equal, KeyPress::Plus),
    (KeyCode::KpAdd, KeyPress::Plus),
    (KeyCode::Minus, KeyPress::Minus),
    (KeyCode::KpSubtract, KeyPress::Minus),
    (KeyCode::Space, KeyPress::Space),
    (KeyCode::Escape, KeyPress::Escape),
];

/// Maps a macroquad key code to a game key, if the key is bound.
#[must_use]
pub fn key_press(code: KeyCode) -> Option<KeyPress> {
    KEY_BINDINGS
        .iter()
        .find(|(bound, _)| *bound == code)
        .map(|(_, key)| *key)
}

/// Uniform scale that fits `content` inside `screen`.
#[must_use]
pub fn fit_scale(screen: Vec2, content: Vec2) -> f32 {
    if content.x <= f32::EPSILON || content.y <= f32::EPSILON {
        return 1.0;
    }
    let scale = (screen.x / content.x).min(screen.y / content.y);
    if scale.is_finite() && scale > f32::EPSILON {
        scale
    } else {
        1.0
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    load_sprites: bool,
    asset_dir: PathBuf,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            load_sprites: true,
            asset_dir: PathBuf::from("assets"),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.swap_interval = Some(i32::from(enabled));
        self
    }

    /// Configures whether the backend should attempt to load sprite images.
    #[must_use]
    pub fn with_sprite_loading(mut self, enabled: bool) -> Self {
        self.load_sprites = enabled;
        self
    }

    /// Directory searched for `<name>.png` sprite images.
    #[must_use]
    pub fn with_asset_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.asset_dir = directory.into();
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool + 'static,
    {
        let Self {
            swap_interval,
            load_sprites,
            asset_dir,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let window = scene.window_size();
        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window.x.round() as i32,
            window_height: window.y.round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let textures = if load_sprites {
                TextureCache::load(&asset_dir)
            } else {
                TextureCache::default()
            };
            tracing::info!(
                textures = textures.len(),
                directory = %asset_dir.display(),
                "window opened"
            );
            let background = to_macroquad_color(clear_color);

            loop {
                macroquad::window::clear_background(background);

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let scale = fit_scale(screen, scene.window_size());
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let mut input = MacroquadInput::poll(scale, scene.window_size());
                let frame_input = FrameInput::capture(&mut input, &scene.layout);
                if frame_input.quit {
                    tracing::info!("quit requested");
                    break;
                }
                if !update_scene(frame_dt, frame_input, &mut scene) {
                    break;
                }

                let mut renderer = MacroquadRenderer {
                    scale,
                    textures: &textures,
                };
                draw_scene(&mut renderer, &textures, &scene);

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Input gathered from macroquad at the start of a frame.
#[derive(Debug)]
struct MacroquadInput {
    cursor: Option<Vec2>,
    click: Option<MouseButton>,
    keys: VecDeque<KeyPress>,
}

impl MacroquadInput {
    fn poll(scale: f32, window: Vec2) -> Self {
        let (x, y) = mouse_position();
        let world = Vec2::new(x, y) / scale;
        let cursor = (world.x >= 0.0 && world.y >= 0.0 && world.x < window.x && world.y < window.y)
            .then_some(world);

        let click = [
            (macroquad::input::MouseButton::Left, MouseButton::Left),
            (macroquad::input::MouseButton::Right, MouseButton::Right),
            (macroquad::input::MouseButton::Middle, MouseButton::Middle),
        ]
        .into_iter()
        .find(|(button, _)| is_mouse_button_pressed(*button))
        .map(|(_, button)| button);

        let keys = KEY_BINDINGS
            .iter()
            .filter(|(code, _)| is_key_pressed(*code))
            .map(|(_, key)| *key)
            .collect();

        Self {
            cursor,
            click,
            keys,
        }
    }
}

impl InputSource for MacroquadInput {
    fn poll_mouse_position(&mut self) -> Option<Vec2> {
        self.cursor
    }

    fn poll_mouse_click(&mut self) -> Option<MouseButton> {
        self.click.take()
    }

    fn poll_key_event(&mut self) -> Option<KeyPress> {
        self.keys.pop_front()
    }
}

/// Draws world-space primitives scaled onto the macroquad window.
struct MacroquadRenderer<'a> {
    scale: f32,
    textures: &'a TextureCache,
}

impl Renderer for MacroquadRenderer<'_> {
    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        let (from, to) = (from * self.scale, to * self.scale);
        macroquad::shapes::draw_line(
            from.x,
            from.y,
            to.x,
            to.y,
            width * self.scale,
            to_macroquad_color(color),
        );
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let center = center * self.scale;
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            radius * self.scale,
            to_macroquad_color(color),
        );
    }

    fn draw_circle_outline(&mut self, center: Vec2, radius: f32, thickness: f32, color: Color) {
        let center = center * self.scale;
        macroquad::shapes::draw_circle_lines(
            center.x,
            center.y,
            radius * self.scale,
            thickness * self.scale,
            to_macroquad_color(color),
        );
    }

    fn draw_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        let (origin, size) = (origin * self.scale, size * self.scale);
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            size.x,
            size.y,
            to_macroquad_color(color),
        );
    }

    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color) {
        let position = position * self.scale;
        let _ = macroquad::text::draw_text(
            text,
            position.x,
            position.y,
            font_size * self.scale,
            to_macroquad_color(color),
        );
    }

    fn draw_image(&mut self, image: ImageHandle, center: Vec2, size: Vec2) {
        let Some(texture) = self.textures.texture(image) else {
            return;
        };
        let size = size * self.scale;
        let origin = center * self.scale - size / 2.0;
        draw_texture_ex(
            texture,
            origin.x,
            origin.y,
            macroquad::color::WHITE,
            DrawTextureParams {
                dest_size: Some(macroquad::math::Vec2::new(size.x, size.y)),
                ..DrawTextureParams::default()
            },
        );
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
