use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::catalog::{
    CardDefId, CardEffect, CardTag, CardType, CreatureId, EnemyDefinition, EnemyId, MoveId,
};
use super::config::CombatConfig;

/// 卡牌实例的唯一标识（每局内递增）。
pub type CardInstanceId = u32;

/// Anything a card, move or attack can point at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "index", rename_all = "camelCase")]
pub enum TargetRef {
    Player,
    Creature(usize),
    Enemy(usize),
}

impl TargetRef {
    pub fn is_friendly(&self) -> bool {
        matches!(self, TargetRef::Player | TargetRef::Creature(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub max_hp: i32,
    pub hp: i32,
    pub energy: i32,
    /// Absorbs damage before hp; cleared when a new player turn begins.
    pub block: i32,
    pub gold: i32,
}

impl Player {
    pub fn new(max_hp: i32) -> Self {
        Self {
            max_hp,
            hp: max_hp,
            energy: 0,
            block: 0,
            gold: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatureMods {
    pub attack: i32,
    pub block: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    pub max_hp: i32,
    pub hp: i32,
    pub strength: i32,
    pub dexterity: i32,
    #[serde(default)]
    pub temporary_strength: i32,
    #[serde(default)]
    pub temporary_dexterity: i32,
    #[serde(default)]
    pub perm_mods: CreatureMods,
    #[serde(default)]
    pub block: i32,
    /// Summoned in the current combat. Always false when a combat starts.
    #[serde(default)]
    pub alive: bool,
    #[serde(default)]
    pub moved_this_turn: bool,
}

impl Creature {
    pub fn new(id: CreatureId) -> Self {
        let def = id.definition();
        Self {
            id,
            name: def.name.to_string(),
            max_hp: def.max_hp,
            hp: def.max_hp,
            strength: 0,
            dexterity: 0,
            temporary_strength: 0,
            temporary_dexterity: 0,
            perm_mods: CreatureMods::default(),
            block: 0,
            alive: false,
            moved_this_turn: false,
        }
    }

    /// Summoned and still standing: the only state in which it can be
    /// buffed, shielded or attacked.
    pub fn is_active(&self) -> bool {
        self.alive && self.hp > 0
    }

    pub fn total_strength(&self) -> i32 {
        self.strength + self.temporary_strength
    }

    pub fn total_dexterity(&self) -> i32 {
        self.dexterity + self.temporary_dexterity
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EnemyIntent {
    Attack { amount: i32, target: TargetRef },
    Block { amount: i32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enemy {
    pub id: EnemyId,
    pub name: String,
    pub max_hp: i32,
    pub hp: i32,
    pub attack_value: i32,
    pub block_value: i32,
    #[serde(default)]
    pub block: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<EnemyIntent>,
}

impl Enemy {
    pub fn from_definition(def: &EnemyDefinition) -> Self {
        Self {
            id: def.id,
            name: def.name.to_string(),
            max_hp: def.max_hp,
            hp: def.max_hp,
            attack_value: def.attack_value,
            block_value: def.block_value,
            block: 0,
            intent: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardMods {
    #[serde(default)]
    pub cost: i32,
    #[serde(default)]
    pub energy_gain: i32,
    #[serde(default)]
    pub damage: i32,
    #[serde(default)]
    pub block: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardInstance {
    pub id: CardInstanceId,
    pub def_id: CardDefId,
    pub name: String,
    pub card_type: CardType,
    pub base_cost: i32,
    pub base_energy_gain: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_damage: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_block: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summon: Option<CreatureId>,
    pub summon_turn: u32,
    pub tags: Vec<CardTag>,
    pub effect: CardEffect,
    #[serde(default)]
    pub perm_mods: CardMods,
    #[serde(default)]
    pub temp_mods: CardMods,
    #[serde(default)]
    pub used_this_combat: bool,
}

impl CardInstance {
    pub fn new(id: CardInstanceId, def_id: CardDefId) -> Self {
        let def = def_id.definition();
        Self {
            id,
            def_id,
            name: def.name.to_string(),
            card_type: def.card_type,
            base_cost: def.base_cost,
            base_energy_gain: def.base_energy_gain,
            base_damage: def.base_damage,
            base_block: def.base_block,
            summon: def.summon,
            summon_turn: def.summon_turn,
            tags: def.tags.to_vec(),
            effect: def.effect,
            perm_mods: CardMods::default(),
            temp_mods: CardMods::default(),
            used_this_combat: false,
        }
    }

    pub fn has_tag(&self, tag: CardTag) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Player,
    Enemy,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnState {
    pub number: u32,
    pub phase: Phase,
}

/// 单场战斗的牌区与回合。牌库顶在序列末尾。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombatState {
    pub deck: Vec<CardInstance>,
    pub hand: Vec<CardInstance>,
    pub discard: Vec<CardInstance>,
    pub turn: TurnState,
}

impl CombatState {
    pub fn new() -> Self {
        Self {
            deck: Vec::new(),
            hand: Vec::new(),
            discard: Vec::new(),
            turn: TurnState {
                number: 0,
                phase: Phase::Player,
            },
        }
    }

    pub fn card_count(&self) -> usize {
        self.deck.len() + self.hand.len() + self.discard.len()
    }
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot buffs, each consumed by the next qualifying action.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Modifiers {
    pub next_card_discount: i32,
    pub next_attack_extra_damage: i32,
    pub next_block_extra_block: i32,
    pub next_spell_casts_twice: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewardOffer {
    pub choices: Vec<CardDefId>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    Energy,
    Effect,
}

impl FromStr for PlayMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "energy" | "pitch" => Ok(PlayMode::Energy),
            "effect" | "play" => Ok(PlayMode::Effect),
            _ => Err(()),
        }
    }
}

/// 战斗事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    CombatStarted {
        enemies: usize,
    },
    CardsDrawn {
        count: usize,
    },
    HandDiscarded {
        count: usize,
    },
    DeckReshuffled {
        count: usize,
    },
    EnergyGained {
        amount: i32,
    },
    EnergySpent {
        amount: i32,
    },
    CardPlayed {
        card_id: CardInstanceId,
        def_id: CardDefId,
        mode: PlayMode,
    },
    CardExhausted {
        card_id: CardInstanceId,
    },
    DamageDealt {
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<TargetRef>,
        target: TargetRef,
        amount: i32,
        absorbed: i32,
        hp_lost: i32,
    },
    BlockGained {
        target: TargetRef,
        amount: i32,
    },
    StrengthGained {
        creature: usize,
        amount: i32,
    },
    DexterityGained {
        creature: usize,
        amount: i32,
    },
    PermanentBuffApplied {
        creature: CreatureId,
        attack_delta: i32,
        block_delta: i32,
    },
    CreatureSummoned {
        creature: CreatureId,
    },
    CreatureDismissed {
        creature: CreatureId,
    },
    CreatureFell {
        creature: CreatureId,
    },
    CreatureMoved {
        creature: usize,
        move_id: MoveId,
    },
    IntentPlanned {
        enemy: usize,
        intent: EnemyIntent,
    },
    EnemyRetargeted {
        enemy: usize,
        target: TargetRef,
    },
    PhaseChanged {
        phase: Phase,
        turn: u32,
    },
    RewardOffered {
        choices: Vec<CardDefId>,
    },
    RewardChosen {
        def_id: CardDefId,
    },
    RewardSkipped {
        gold: i32,
    },
}

/// 整个会话的状态：玩家、生物名册、当前战斗与目标缓存。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    #[serde(default)]
    pub config: CombatConfig,
    pub player: Player,
    pub creatures: Vec<Creature>,
    #[serde(default)]
    pub enemies: Vec<Enemy>,
    #[serde(default)]
    pub combat: CombatState,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Definitions every combat's deck is built from.
    pub run_deck: Vec<CardDefId>,
    pub friendly_target: TargetRef,
    pub enemy_target: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewards: Option<RewardOffer>,
    pub next_card_id: CardInstanceId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub log: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: CombatConfig) -> Self {
        let config = config.normalized();
        Self {
            player: Player::new(config.player_max_hp),
            creatures: CreatureId::ROSTER.iter().map(|id| Creature::new(*id)).collect(),
            enemies: Vec::new(),
            combat: CombatState::new(),
            modifiers: Modifiers::default(),
            run_deck: config.starting_run_deck(),
            friendly_target: TargetRef::Player,
            enemy_target: 0,
            rewards: None,
            next_card_id: 1,
            log: Vec::new(),
            event_log: Vec::new(),
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.combat.turn.phase
    }

    pub fn turn_number(&self) -> u32 {
        self.combat.turn.number
    }

    pub fn generate_card_id(&mut self) -> CardInstanceId {
        let id = self.next_card_id;
        self.next_card_id += 1;
        id
    }

    pub fn instantiate_card(&mut self, def_id: CardDefId) -> CardInstance {
        let id = self.generate_card_id();
        CardInstance::new(id, def_id)
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    /// User-visible narration. Mirrored to the browser console on wasm.
    pub fn narrate(&mut self, message: impl Into<String>) {
        let message = message.into();
        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(&message));
        self.log.push(message);
    }

    pub fn creature_index(&self, id: CreatureId) -> Option<usize> {
        self.creatures.iter().position(|creature| creature.id == id)
    }

    pub fn active_creature_indices(&self) -> Vec<usize> {
        self.creatures
            .iter()
            .enumerate()
            .filter(|(_, creature)| creature.is_active())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn any_active_creature(&self) -> bool {
        self.creatures.iter().any(Creature::is_active)
    }

    pub fn first_living_enemy(&self) -> Option<usize> {
        self.enemies.iter().position(Enemy::is_alive)
    }

    pub fn all_enemies_defeated(&self) -> bool {
        self.enemies.iter().all(|enemy| !enemy.is_alive())
    }

    pub fn target_label(&self, target: TargetRef) -> String {
        match target {
            TargetRef::Player => "Player".to_string(),
            TargetRef::Creature(index) => self
                .creatures
                .get(index)
                .map(|creature| creature.name.clone())
                .unwrap_or_else(|| format!("creature #{}", index + 1)),
            TargetRef::Enemy(index) => self
                .enemies
                .get(index)
                .map(|enemy| format!("{} #{}", enemy.name, index + 1))
                .unwrap_or_else(|| format!("enemy #{}", index + 1)),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}
