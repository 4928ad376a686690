//! Translation of scenes into primitive draw calls.

use forest_protector_core::{EnemyKind, GameState, PlayerAction, TowerKind};
use glam::Vec2;

use crate::{
    panel::side_panel_buttons, AssetLoader, Color, EnemyPresentation, Hud, PreviewPresentation,
    Renderer, Scene, TowerPresentation,
};

const GRASS: Color = Color::from_rgb_u8(0, 160, 0);
const BROWN: Color = Color::from_rgb_u8(139, 69, 19);
const DARK_BROWN: Color = Color::from_rgb_u8(101, 67, 33);
const PURPLE: Color = Color::from_rgb_u8(128, 0, 128);
const RED: Color = Color::from_rgb_u8(255, 0, 0);
const HEALTH_GREEN: Color = Color::from_rgb_u8(0, 255, 0);
const YELLOW: Color = Color::from_rgb_u8(255, 255, 0);
const WHITE: Color = Color::from_rgb_u8(255, 255, 255);
const GOLD: Color = Color::from_rgb_u8(255, 215, 0);
const GRAY: Color = Color::from_rgb_u8(100, 100, 100);
const BLUE: Color = Color::from_rgb_u8(64, 164, 223);
const PANEL: Color = Color::from_rgb_u8(30, 30, 30);
const RANGE: Color = Color::new(0.4, 0.4, 1.0, 0.6);
const SHADE: Color = Color::new(0.0, 0.0, 0.0, 0.7);

const TOWER_RADIUS: f32 = 15.0;
const TOWER_SPRITE: Vec2 = Vec2::new(48.0, 72.0);
const PROJECTILE_RADIUS: f32 = 2.0;
const HEALTH_BAR: Vec2 = Vec2::new(30.0, 4.0);
const TOP_BAR_HEIGHT: f32 = 80.0;
const TITLE_FONT: f32 = 48.0;
const FONT: f32 = 32.0;
const SMALL_FONT: f32 = 22.0;

const INSTRUCTIONS: [&str; 8] = [
    "1/2/3: Select Tower",
    "Click: Place/Upgrade",
    "C: Change Path",
    "P: Pause",
    "Up/Down: Change Speed",
    "+/-: Change Difficulty",
    "Space: Restart",
    "ESC: Exit",
];

fn tower_color(kind: TowerKind) -> Color {
    match kind {
        TowerKind::Archer => Color::from_rgb_u8(0, 128, 0),
        TowerKind::Cannon => Color::from_rgb_u8(105, 105, 105),
        TowerKind::Magic => Color::from_rgb_u8(147, 0, 211),
    }
}

fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Goblin => Color::from_rgb_u8(200, 50, 50),
        EnemyKind::Orc => Color::from_rgb_u8(100, 50, 50),
        EnemyKind::Troll => Color::from_rgb_u8(50, 25, 25),
    }
}

fn difficulty_color(level: u8) -> Color {
    match level {
        1 => Color::from_rgb_u8(0, 255, 0),
        2 => Color::from_rgb_u8(100, 200, 100),
        3 => YELLOW,
        4 => Color::from_rgb_u8(255, 140, 0),
        _ => RED,
    }
}

/// Draws `scene` back to front: field, path, preview, towers, enemies,
/// projectiles, interface and the game state overlay.
///
/// Images missing from `assets` fall back to primitive shapes.
pub fn draw_scene<R, A>(renderer: &mut R, assets: &A, scene: &Scene)
where
    R: Renderer + ?Sized,
    A: AssetLoader + ?Sized,
{
    draw_field(renderer, assets, scene);
    draw_path(renderer, scene);
    if let Some(preview) = &scene.preview {
        draw_preview(renderer, scene, preview);
    }
    for tower in &scene.towers {
        draw_tower(renderer, assets, tower);
    }
    for enemy in &scene.enemies {
        draw_enemy(renderer, assets, enemy);
    }
    for projectile in &scene.projectiles {
        renderer.draw_circle(
            projectile.position,
            PROJECTILE_RADIUS,
            tower_color(projectile.kind),
        );
    }
    draw_top_bar(renderer, scene);
    draw_side_panel(renderer, scene);
    draw_overlay(renderer, scene);
}

fn draw_field<R, A>(renderer: &mut R, assets: &A, scene: &Scene)
where
    R: Renderer + ?Sized,
    A: AssetLoader + ?Sized,
{
    let size = Vec2::new(scene.layout.width, scene.layout.height);
    match assets.resolve("grass") {
        Some(image) => renderer.draw_image(image, size / 2.0, size),
        None => renderer.draw_rect(Vec2::ZERO, size, GRASS),
    }
}

fn draw_path<R>(renderer: &mut R, scene: &Scene)
where
    R: Renderer + ?Sized,
{
    let width = scene.layout.path_width;
    for pair in scene.path.windows(2) {
        renderer.draw_line(pair[0], pair[1], width + 4.0, DARK_BROWN);
    }
    for pair in scene.path.windows(2) {
        renderer.draw_line(pair[0], pair[1], width, BROWN);
    }
    for point in &scene.path {
        renderer.draw_circle(*point, width / 2.0, BROWN);
    }
}

fn draw_preview<R>(renderer: &mut R, scene: &Scene, preview: &PreviewPresentation)
where
    R: Renderer + ?Sized,
{
    renderer.draw_circle_outline(preview.position, scene.layout.cell_size / 2.0, 2.0, PURPLE);
    let color = if preview.rejection.is_some() {
        RED
    } else {
        tower_color(preview.kind)
    };
    renderer.draw_circle_outline(preview.position, TOWER_RADIUS, 2.0, color);
    if preview.rejection.is_none() {
        renderer.draw_circle_outline(preview.position, preview.kind.stats().range, 1.0, RANGE);
    }
}

fn draw_tower<R, A>(renderer: &mut R, assets: &A, tower: &TowerPresentation)
where
    R: Renderer + ?Sized,
    A: AssetLoader + ?Sized,
{
    match assets.resolve(tower.kind.name()) {
        Some(image) => renderer.draw_image(image, tower.position, TOWER_SPRITE),
        None => renderer.draw_circle(tower.position, TOWER_RADIUS, tower_color(tower.kind)),
    }

    renderer.draw_text(
        &format!("{}/{}", tower.level, tower.max_level),
        tower.position + Vec2::new(-10.0, 25.0),
        SMALL_FONT,
        WHITE,
    );

    if !tower.highlighted {
        return;
    }
    renderer.draw_circle_outline(tower.position, tower.range, 1.0, RANGE);
    let (label, color) = match tower.upgrade_cost() {
        Some(cost) => (format!("Upgrade: ${cost}"), YELLOW),
        None => ("MAX LEVEL".to_owned(), RED),
    };
    renderer.draw_text(&label, tower.position + Vec2::new(-40.0, 42.0), SMALL_FONT, color);
}

fn draw_enemy<R, A>(renderer: &mut R, assets: &A, enemy: &EnemyPresentation)
where
    R: Renderer + ?Sized,
    A: AssetLoader + ?Sized,
{
    let size = enemy.kind.stats().size;
    match assets.resolve(enemy.kind.name()) {
        Some(image) => renderer.draw_image(image, enemy.position, Vec2::splat(size)),
        None => renderer.draw_circle(enemy.position, size, enemy_color(enemy.kind)),
    }

    let origin = enemy.position - Vec2::new(HEALTH_BAR.x / 2.0, size + 10.0);
    renderer.draw_rect(origin, HEALTH_BAR, RED);
    let fraction = enemy.health_fraction.clamp(0.0, 1.0);
    if fraction > 0.0 {
        renderer.draw_rect(
            origin,
            Vec2::new(HEALTH_BAR.x * fraction, HEALTH_BAR.y),
            HEALTH_GREEN,
        );
    }
}

fn format_clock(hud: &Hud) -> String {
    let seconds = hud.remaining.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn draw_top_bar<R>(renderer: &mut R, scene: &Scene)
where
    R: Renderer + ?Sized,
{
    let hud = &scene.hud;
    let width = scene.layout.width;
    renderer.draw_rect(Vec2::ZERO, Vec2::new(width, TOP_BAR_HEIGHT), SHADE);
    renderer.draw_text(
        "Forest Protector",
        Vec2::new(width / 2.0 - 150.0, 38.0),
        TITLE_FONT,
        GOLD,
    );

    let baseline = 70.0;
    renderer.draw_text(&format!("Score: {}", hud.score), Vec2::new(20.0, baseline), FONT, WHITE);
    renderer.draw_circle(Vec2::new(220.0, baseline - 10.0), 10.0, GOLD);
    renderer.draw_text(&format!("${}", hud.money), Vec2::new(235.0, baseline), FONT, YELLOW);
    renderer.draw_circle(Vec2::new(370.0, baseline - 10.0), 8.0, RED);
    renderer.draw_text(&format!("Lives: {}", hud.lives), Vec2::new(385.0, baseline), FONT, RED);
    renderer.draw_text(
        &format!("Wave: {}/{}", hud.wave, hud.final_wave),
        Vec2::new(530.0, baseline),
        FONT,
        WHITE,
    );
    let clock_color = if hud.remaining.as_secs() < 60 { RED } else { WHITE };
    renderer.draw_text(&format_clock(hud), Vec2::new(680.0, baseline), FONT, clock_color);
    renderer.draw_text(
        &format!("Path: {}/{}", hud.path_index + 1, hud.path_count),
        Vec2::new(800.0, baseline),
        FONT,
        WHITE,
    );
    if let Some(size) = hud.next_wave_size {
        renderer.draw_text(
            &format!("Next: {size} enemies"),
            Vec2::new(1000.0, baseline),
            FONT,
            YELLOW,
        );
    }
}

fn draw_side_panel<R>(renderer: &mut R, scene: &Scene)
where
    R: Renderer + ?Sized,
{
    let hud = &scene.hud;
    let layout = &scene.layout;
    let left = layout.width + 20.0;
    renderer.draw_rect(
        Vec2::new(layout.width, 0.0),
        Vec2::new(layout.panel_width, layout.height),
        PANEL,
    );
    renderer.draw_text("Controls", Vec2::new(left + 60.0, 60.0), TITLE_FONT, GOLD);
    renderer.draw_text(
        &format!("Game Speed: {:.1}x", hud.game_speed.multiplier()),
        Vec2::new(left, 170.0),
        FONT,
        WHITE,
    );
    renderer.draw_text(
        &format!(
            "Difficulty: {} ({}/5)",
            hud.difficulty.name(),
            hud.difficulty.level()
        ),
        Vec2::new(left, 270.0),
        SMALL_FONT,
        difficulty_color(hud.difficulty.level()),
    );
    renderer.draw_text("Select Tower:", Vec2::new(left, 370.0), FONT, WHITE);

    for button in side_panel_buttons(layout) {
        let selected_kind = match button.action {
            PlayerAction::SelectTower(kind) => Some(kind),
            _ => None,
        };
        let fill = match (selected_kind, button.action) {
            (Some(kind), _) => tower_color(kind),
            (None, PlayerAction::ChangePath) => BLUE,
            (None, PlayerAction::TogglePause) => YELLOW,
            (None, _) => GRAY,
        };
        renderer.draw_rect(button.origin, button.size, fill);
        renderer.draw_text(button.label, button.origin + Vec2::new(10.0, 24.0), SMALL_FONT, WHITE);

        if let Some(kind) = selected_kind {
            let stats = kind.stats();
            renderer.draw_text(
                &format!("Cost: ${}", stats.cost),
                button.origin + Vec2::new(10.0, 44.0),
                SMALL_FONT,
                YELLOW,
            );
            renderer.draw_text(
                &format!("DMG: {} RNG: {}", stats.damage, stats.range),
                button.origin + Vec2::new(10.0, 62.0),
                SMALL_FONT,
                WHITE,
            );
            if kind == hud.selected_tower {
                draw_frame(renderer, button.origin, button.size, 3.0, YELLOW);
            }
        }
    }

    for (index, line) in INSTRUCTIONS.iter().enumerate() {
        renderer.draw_text(
            line,
            Vec2::new(left, 820.0 + index as f32 * 26.0),
            SMALL_FONT,
            WHITE,
        );
    }
}

fn draw_frame<R>(renderer: &mut R, origin: Vec2, size: Vec2, thickness: f32, color: Color)
where
    R: Renderer + ?Sized,
{
    let corners = [
        origin,
        origin + Vec2::new(size.x, 0.0),
        origin + size,
        origin + Vec2::new(0.0, size.y),
    ];
    for index in 0..corners.len() {
        renderer.draw_line(
            corners[index],
            corners[(index + 1) % corners.len()],
            thickness,
            color,
        );
    }
}

fn draw_overlay<R>(renderer: &mut R, scene: &Scene)
where
    R: Renderer + ?Sized,
{
    let (title, subtitle, color) = match scene.game_state {
        GameState::Playing => return,
        GameState::Paused => ("PAUSED", "Press P to resume".to_owned(), WHITE),
        GameState::GameOver => (
            "GAME OVER",
            format!("Final score: {}  -  Press Space to restart", scene.hud.score),
            RED,
        ),
        GameState::Victory => (
            "VICTORY!",
            format!("Final score: {}  -  Press Space to restart", scene.hud.score),
            GOLD,
        ),
    };

    let size = Vec2::new(scene.layout.width, scene.layout.height);
    let center = size / 2.0;
    renderer.draw_rect(Vec2::ZERO, size, SHADE);
    renderer.draw_text(title, center + Vec2::new(-110.0, -20.0), TITLE_FONT * 1.5, color);
    renderer.draw_text(&subtitle, center + Vec2::new(-220.0, 40.0), FONT, WHITE);
}
