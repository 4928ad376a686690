use forest_protector_core::{PlayerAction, TowerKind};
use forest_protector_rendering::KeyPress;
use forest_protector_rendering_macroquad::key_press;
use macroquad::input::KeyCode;

#[test]
fn every_game_key_has_a_binding() {
    let bound = [
        KeyCode::Key1,
        KeyCode::Key2,
        KeyCode::Key3,
        KeyCode::P,
        KeyCode::C,
        KeyCode::Up,
        KeyCode::Down,
        KeyCode::Equal,
        KeyCode::Minus,
        KeyCode::Space,
        KeyCode::Escape,
    ];

    let actions: Vec<Option<PlayerAction>> = bound
        .into_iter()
        .map(|code| key_press(code).expect("key is bound").action())
        .collect();

    assert_eq!(
        actions,
        vec![
            Some(PlayerAction::SelectTower(TowerKind::Archer)),
            Some(PlayerAction::SelectTower(TowerKind::Cannon)),
            Some(PlayerAction::SelectTower(TowerKind::Magic)),
            Some(PlayerAction::TogglePause),
            Some(PlayerAction::ChangePath),
            Some(PlayerAction::SpeedUp),
            Some(PlayerAction::SlowDown),
            Some(PlayerAction::DifficultyUp),
            Some(PlayerAction::DifficultyDown),
            Some(PlayerAction::Restart),
            None,
        ],
    );
}

#[test]
fn escape_is_the_only_key_without_an_action() {
    assert_eq!(key_press(KeyCode::Escape), Some(KeyPress::Escape));
    assert_eq!(KeyPress::Escape.action(), None);
}
