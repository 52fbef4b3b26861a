//! 战斗核心逻辑模块（实体、数值计算、状态原语、回合引擎）。

pub mod catalog;
pub mod compute;
pub mod config;
pub mod primitives;
pub mod rng;
pub mod rules;
pub mod state;

pub use catalog::{
    CardDefId, CardDefinition, CardEffect, CardTag, CardType, CreatureDefinition, CreatureId,
    CreatureMove, EnemyDefinition, EnemyId, MoveId, REWARD_POOL,
};
pub use compute::{CardPreview, MovePreview};
pub use config::{CombatConfig, DeckEntry};
pub use primitives::DamageOutcome;
pub use rng::{RandomSource, SeededRng};
pub use rules::{RuleEngine, RuleError, RuleResolution};
pub use state::{
    CardInstance, CardInstanceId, CardMods, CombatState, Creature, CreatureMods, Enemy,
    EnemyIntent, GameEvent, GameState, Modifiers, Phase, PlayMode, Player, RewardOffer,
    TargetRef, TurnState,
};
