use serde::{Deserialize, Serialize};

use super::catalog::{CardDefId, EnemyId};

const DEFAULT_PLAYER_MAX_HP: i32 = 50;
const DEFAULT_HAND_SIZE: usize = 5;
const DEFAULT_REWARD_CHOICES: usize = 3;
const DEFAULT_SKIP_REWARD_GOLD: i32 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeckEntry {
    pub card: CardDefId,
    pub count: u32,
}

impl DeckEntry {
    pub const fn new(card: CardDefId, count: u32) -> Self {
        Self { card, count }
    }
}

/// 战斗参数。所有字段都有默认值，前端可以只传想覆盖的部分。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CombatConfig {
    pub player_max_hp: i32,
    pub hand_size: usize,
    pub min_enemies: usize,
    pub max_enemies: usize,
    pub encounter_enemy: EnemyId,
    pub starting_deck: Vec<DeckEntry>,
    pub reward_choices: usize,
    pub skip_reward_gold: i32,
    /// Clear one-shot modifiers whenever a combat starts.
    pub reset_modifiers_each_combat: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            player_max_hp: DEFAULT_PLAYER_MAX_HP,
            hand_size: DEFAULT_HAND_SIZE,
            min_enemies: 2,
            max_enemies: 3,
            encounter_enemy: EnemyId::Grunt,
            starting_deck: vec![
                DeckEntry::new(CardDefId::Deal4, 5),
                DeckEntry::new(CardDefId::Block4, 3),
                DeckEntry::new(CardDefId::Str2, 1),
                DeckEntry::new(CardDefId::Dex2, 1),
                DeckEntry::new(CardDefId::CreatureA, 1),
                DeckEntry::new(CardDefId::CreatureB, 1),
            ],
            reward_choices: DEFAULT_REWARD_CHOICES,
            skip_reward_gold: DEFAULT_SKIP_REWARD_GOLD,
            reset_modifiers_each_combat: true,
        }
    }
}

impl CombatConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: CombatConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// At least one enemy per encounter, and `max_enemies >= min_enemies`.
    pub fn normalized(mut self) -> Self {
        self.min_enemies = self.min_enemies.max(1);
        self.max_enemies = self.max_enemies.max(self.min_enemies);
        self.player_max_hp = self.player_max_hp.max(1);
        self
    }

    pub fn with_enemy_count(mut self, min: usize, max: usize) -> Self {
        self.min_enemies = min;
        self.max_enemies = max;
        self.normalized()
    }

    /// Expand the deck list into one definition id per card, in list order.
    pub fn starting_run_deck(&self) -> Vec<CardDefId> {
        self.starting_deck
            .iter()
            .flat_map(|entry| std::iter::repeat(entry.card).take(entry.count as usize))
            .collect()
    }
}
