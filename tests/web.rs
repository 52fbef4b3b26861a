//! Browser smoke tests for the JS-facing engine. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use creature_battler::{default_config_json, GameEngine, GameState, Phase, RuleResolution};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn resolution(json: &str) -> RuleResolution {
    serde_json::from_str(json).expect("resolution json")
}

#[wasm_bindgen_test]
fn seeded_combat_opens_on_the_player_turn() {
    let mut engine = GameEngine::new(Some(7), None).expect("engine");
    let opened = resolution(&engine.start_combat().expect("start"));

    assert_eq!(opened.phase, Phase::Player);
    assert_eq!(opened.state.combat.hand.len(), 7);
    assert!(!opened.events.is_empty());

    let state: GameState = serde_json::from_str(&engine.state_json().unwrap()).unwrap();
    assert_eq!(state.combat.card_count(), 12);
}

#[wasm_bindgen_test]
fn end_turn_runs_the_enemy_phase() {
    let mut engine = GameEngine::new(Some(11), None).expect("engine");
    engine.start_combat().unwrap();
    let after = resolution(&engine.end_turn().expect("end turn"));

    assert_eq!(after.phase, Phase::Player);
    assert_eq!(after.state.combat.turn.number, 2);
    assert!(after.state.player.hp <= 50);
}

#[wasm_bindgen_test]
fn rule_failures_surface_as_errors() {
    let mut engine = GameEngine::new(Some(3), None).expect("engine");
    engine.start_combat().unwrap();

    assert!(engine.play_card(99, "effect").is_err());
    assert!(engine.play_card(0, "sideways").is_err());
    assert!(engine.perform_creature_action(0, "attack").is_err());
    assert!(engine.enemy_turn().is_err());
    assert!(engine.choose_reward(0).is_err());
}

#[wasm_bindgen_test]
fn config_round_trips_through_the_constructor() {
    let json = default_config_json().unwrap().replace("\"hand_size\":5", "\"hand_size\":3");
    let mut engine = GameEngine::new(Some(5), Some(json)).expect("engine");
    let opened = resolution(&engine.start_combat().unwrap());
    assert_eq!(opened.state.combat.hand.len(), 5);
    assert!(engine.card_preview_json(0).is_ok());
    assert!(engine.move_preview_json(0, "defend").is_ok());
}
