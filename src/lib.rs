pub mod ai;
pub mod game;

use std::str::FromStr;

use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

pub use game::{
    CardDefId, CardPreview, CombatConfig, CreatureId, GameEvent, GameState, MoveId, MovePreview,
    Phase, PlayMode, RuleEngine, RuleError, RuleResolution, SeededRng, TargetRef,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn make_resolution_json(state: &GameState, events: Vec<GameEvent>) -> Result<String, JsValue> {
    serde_json::to_string(&RuleResolution::new(state.clone(), events)).map_err(serde_to_js_error)
}

fn parse_target(kind: &str, index: Option<usize>) -> Result<TargetRef, JsValue> {
    match (kind, index) {
        ("player", _) => Ok(TargetRef::Player),
        ("creature", Some(index)) => Ok(TargetRef::Creature(index)),
        _ => Err(to_js_error(RuleError::InvalidTarget)),
    }
}

fn parse_move(move_id: &str) -> Result<MoveId, JsValue> {
    MoveId::from_str(move_id).map_err(|_| JsValue::from_str(&format!("unknown move: {move_id}")))
}

/// 浏览器侧的战斗会话：持有状态与带种子的随机源。
#[wasm_bindgen]
pub struct GameEngine {
    state: GameState,
    engine: RuleEngine<SeededRng>,
}

impl GameEngine {
    /// Runs a rules entry point against the session state and wraps the
    /// events it produced together with a state snapshot.
    fn execute<F>(&mut self, action: F) -> Result<String, JsValue>
    where
        F: FnOnce(&mut RuleEngine<SeededRng>, &mut GameState) -> Result<Vec<GameEvent>, RuleError>,
    {
        let events = action(&mut self.engine, &mut self.state).map_err(to_js_error)?;
        make_resolution_json(&self.state, events)
    }
}

#[wasm_bindgen]
impl GameEngine {
    /// Without a seed the session draws from system entropy.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u32>, config_json: Option<String>) -> Result<GameEngine, JsValue> {
        let config = match config_json {
            Some(json) => CombatConfig::from_json(&json).map_err(serde_to_js_error)?,
            None => CombatConfig::default(),
        };
        let rng = match seed {
            Some(seed) => SeededRng::seed_from_u64(u64::from(seed)),
            None => SeededRng::from_entropy(),
        };
        Ok(GameEngine {
            state: GameState::new(config),
            engine: RuleEngine::new(rng),
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_value(&self.state).map_err(JsValue::from)
    }

    /// Narration lines of the current combat.
    pub fn log_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.log).map_err(serde_to_js_error)
    }

    pub fn start_combat(&mut self) -> Result<String, JsValue> {
        self.execute(|engine, state| engine.start_combat(state))
    }

    pub fn start_next_combat(&mut self) -> Result<String, JsValue> {
        self.execute(|engine, state| engine.start_next_combat(state))
    }

    pub fn end_player_turn(&mut self) -> Result<String, JsValue> {
        self.execute(|engine, state| engine.end_player_turn(state))
    }

    pub fn enemy_turn(&mut self) -> Result<String, JsValue> {
        self.execute(|engine, state| engine.enemy_turn(state))
    }

    /// End turn button: the player's turn closes and the enemies act at once.
    pub fn end_turn(&mut self) -> Result<String, JsValue> {
        self.execute(|engine, state| {
            let mut events = engine.end_player_turn(state)?;
            events.extend(engine.enemy_turn(state)?);
            Ok(events)
        })
    }

    pub fn draw(&mut self, count: usize) -> Result<String, JsValue> {
        self.execute(|engine, state| engine.draw(state, count))
    }

    pub fn discard_hand(&mut self) -> Result<String, JsValue> {
        self.execute(|engine, state| engine.discard_hand(state))
    }

    /// `mode` is `"energy"` or `"effect"`.
    pub fn play_card(&mut self, hand_index: usize, mode: &str) -> Result<String, JsValue> {
        let mode = PlayMode::from_str(mode)
            .map_err(|_| JsValue::from_str(&format!("unknown play mode: {mode}")))?;
        self.execute(|engine, state| engine.play_card(state, hand_index, mode))
    }

    /// `move_id` is `"attack"` or `"defend"`.
    pub fn perform_creature_action(
        &mut self,
        creature_index: usize,
        move_id: &str,
    ) -> Result<String, JsValue> {
        let move_id = parse_move(move_id)?;
        self.execute(|engine, state| engine.perform_creature_action(state, creature_index, move_id))
    }

    /// `kind` is `"player"` or `"creature"`; creatures need an index.
    pub fn set_friendly_target(&mut self, kind: &str, index: Option<usize>) -> Result<(), JsValue> {
        let target = parse_target(kind, index)?;
        RuleEngine::<SeededRng>::set_friendly_target(&mut self.state, target).map_err(to_js_error)
    }

    pub fn set_enemy_target(&mut self, index: usize) -> Result<(), JsValue> {
        RuleEngine::<SeededRng>::set_enemy_target(&mut self.state, index).map_err(to_js_error)
    }

    pub fn summon_from_roster(&mut self, creature_index: usize) -> Result<String, JsValue> {
        self.execute(|engine, state| engine.summon_from_roster(state, creature_index))
    }

    pub fn choose_reward(&mut self, index: usize) -> Result<String, JsValue> {
        self.execute(|engine, state| engine.choose_reward(state, index))
    }

    pub fn skip_reward(&mut self) -> Result<String, JsValue> {
        self.execute(|engine, state| engine.skip_reward(state))
    }

    pub fn card_preview_json(&self, hand_index: usize) -> Result<String, JsValue> {
        let preview =
            RuleEngine::<SeededRng>::card_preview(&self.state, hand_index).map_err(to_js_error)?;
        serde_json::to_string(&preview).map_err(serde_to_js_error)
    }

    pub fn move_preview_json(&self, creature_index: usize, move_id: &str) -> Result<String, JsValue> {
        let move_id = parse_move(move_id)?;
        let preview = RuleEngine::<SeededRng>::move_preview(&self.state, creature_index, move_id)
            .map_err(to_js_error)?;
        serde_json::to_string(&preview).map_err(serde_to_js_error)
    }
}

/// 默认配置的 JSON，方便前端编辑后回传给构造函数。
#[wasm_bindgen(js_name = "defaultConfigJson")]
pub fn default_config_json() -> Result<String, JsValue> {
    serde_json::to_string(&CombatConfig::default()).map_err(serde_to_js_error)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
