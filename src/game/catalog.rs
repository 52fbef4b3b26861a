//! 卡牌、生物与敌人的静态定义。
//!
//! Definitions are immutable; combat only ever copies them into instances.
//! Card behaviour is described by [`CardEffect`], a small declarative
//! descriptor interpreted by the rule engine, rather than stored code.

use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardDefId {
    #[serde(rename = "DEAL_4")]
    Deal4,
    #[serde(rename = "BLOCK_4")]
    Block4,
    #[serde(rename = "STR_2")]
    Str2,
    #[serde(rename = "DEX_2")]
    Dex2,
    #[serde(rename = "PERM_ATK_2")]
    PermAtk2,
    #[serde(rename = "CREATURE_A")]
    CreatureA,
    #[serde(rename = "CREATURE_B")]
    CreatureB,
}

impl CardDefId {
    pub const ALL: [CardDefId; 7] = [
        CardDefId::Deal4,
        CardDefId::Block4,
        CardDefId::Str2,
        CardDefId::Dex2,
        CardDefId::PermAtk2,
        CardDefId::CreatureA,
        CardDefId::CreatureB,
    ];

    pub fn definition(self) -> &'static CardDefinition {
        match self {
            CardDefId::Deal4 => &DEAL_4,
            CardDefId::Block4 => &BLOCK_4,
            CardDefId::Str2 => &STR_2,
            CardDefId::Dex2 => &DEX_2,
            CardDefId::PermAtk2 => &PERM_ATK_2,
            CardDefId::CreatureA => &CREATURE_A_CARD,
            CardDefId::CreatureB => &CREATURE_B_CARD,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CardType {
    Spell,
    SingleUse,
    Creature,
}

/// Capability flags used for targeting and previews.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CardTag {
    Damage,
    Block,
    GrantStrength,
    GrantDexterity,
    Buff,
    Summon,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CardEffect {
    /// Damage the default enemy target by the card's computed damage.
    DealDamage,
    /// Give the default friendly target the card's computed block.
    GainBlock,
    GrantStrength { amount: i32 },
    GrantDexterity { amount: i32 },
    /// Permanent attack/block deltas on the default friendly creature.
    PermanentBuff { attack_delta: i32, block_delta: i32 },
    Summon { creature: CreatureId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDefinition {
    pub id: CardDefId,
    pub name: &'static str,
    pub card_type: CardType,
    pub base_cost: i32,
    pub base_energy_gain: i32,
    pub base_damage: Option<i32>,
    pub base_block: Option<i32>,
    pub summon: Option<CreatureId>,
    pub summon_turn: u32,
    pub tags: &'static [CardTag],
    pub effect: CardEffect,
    /// Can show up as a post-combat reward.
    pub rewardable: bool,
}

static DEAL_4: CardDefinition = CardDefinition {
    id: CardDefId::Deal4,
    name: "Deal 4",
    card_type: CardType::Spell,
    base_cost: 1,
    base_energy_gain: 1,
    base_damage: Some(4),
    base_block: None,
    summon: None,
    summon_turn: 1,
    tags: &[CardTag::Damage],
    effect: CardEffect::DealDamage,
    rewardable: true,
};

static BLOCK_4: CardDefinition = CardDefinition {
    id: CardDefId::Block4,
    name: "Block 4",
    card_type: CardType::Spell,
    base_cost: 1,
    base_energy_gain: 1,
    base_damage: None,
    base_block: Some(4),
    summon: None,
    summon_turn: 1,
    tags: &[CardTag::Block],
    effect: CardEffect::GainBlock,
    rewardable: true,
};

static STR_2: CardDefinition = CardDefinition {
    id: CardDefId::Str2,
    name: "Strength +2",
    card_type: CardType::Spell,
    base_cost: 1,
    base_energy_gain: 1,
    base_damage: None,
    base_block: None,
    summon: None,
    summon_turn: 1,
    tags: &[CardTag::GrantStrength],
    effect: CardEffect::GrantStrength { amount: 2 },
    rewardable: true,
};

static DEX_2: CardDefinition = CardDefinition {
    id: CardDefId::Dex2,
    name: "Dexterity +2",
    card_type: CardType::Spell,
    base_cost: 1,
    base_energy_gain: 1,
    base_damage: None,
    base_block: None,
    summon: None,
    summon_turn: 1,
    tags: &[CardTag::GrantDexterity],
    effect: CardEffect::GrantDexterity { amount: 2 },
    rewardable: true,
};

static PERM_ATK_2: CardDefinition = CardDefinition {
    id: CardDefId::PermAtk2,
    name: "Permanent Attack +2",
    card_type: CardType::SingleUse,
    base_cost: 2,
    base_energy_gain: 1,
    base_damage: None,
    base_block: None,
    summon: None,
    summon_turn: 1,
    tags: &[CardTag::Buff],
    effect: CardEffect::PermanentBuff {
        attack_delta: 2,
        block_delta: 0,
    },
    rewardable: true,
};

static CREATURE_A_CARD: CardDefinition = CardDefinition {
    id: CardDefId::CreatureA,
    name: "Vanguard",
    card_type: CardType::Creature,
    base_cost: 0,
    base_energy_gain: 2,
    base_damage: None,
    base_block: None,
    summon: Some(CreatureId::CreatureA),
    summon_turn: 1,
    tags: &[CardTag::Summon],
    effect: CardEffect::Summon {
        creature: CreatureId::CreatureA,
    },
    rewardable: false,
};

static CREATURE_B_CARD: CardDefinition = CardDefinition {
    id: CardDefId::CreatureB,
    name: "Bulwark",
    card_type: CardType::Creature,
    base_cost: 0,
    base_energy_gain: 2,
    base_damage: None,
    base_block: None,
    summon: Some(CreatureId::CreatureB),
    summon_turn: 2,
    tags: &[CardTag::Summon],
    effect: CardEffect::Summon {
        creature: CreatureId::CreatureB,
    },
    rewardable: false,
};

/// Cards eligible for post-combat rewards, in catalog order.
pub static REWARD_POOL: Lazy<Vec<CardDefId>> = Lazy::new(|| {
    CardDefId::ALL
        .iter()
        .copied()
        .filter(|id| id.definition().rewardable)
        .collect()
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreatureId {
    CreatureA,
    CreatureB,
}

impl CreatureId {
    pub const ROSTER: [CreatureId; 2] = [CreatureId::CreatureA, CreatureId::CreatureB];

    pub fn definition(self) -> &'static CreatureDefinition {
        match self {
            CreatureId::CreatureA => &VANGUARD,
            CreatureId::CreatureB => &BULWARK,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MoveId {
    Attack,
    Defend,
}

impl FromStr for MoveId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attack" | "strike" => Ok(MoveId::Attack),
            "defend" | "block" => Ok(MoveId::Defend),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureMove {
    pub id: MoveId,
    pub name: &'static str,
    pub energy: i32,
    pub base_damage: i32,
    pub base_block: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureDefinition {
    pub id: CreatureId,
    pub name: &'static str,
    pub max_hp: i32,
    pub summon_turn: u32,
    pub moves: &'static [CreatureMove],
}

impl CreatureDefinition {
    pub fn find_move(&self, move_id: MoveId) -> Option<&'static CreatureMove> {
        self.moves.iter().find(|mv| mv.id == move_id)
    }
}

static VANGUARD: CreatureDefinition = CreatureDefinition {
    id: CreatureId::CreatureA,
    name: "Vanguard",
    max_hp: 20,
    summon_turn: 1,
    moves: &[
        CreatureMove {
            id: MoveId::Attack,
            name: "Attack",
            energy: 1,
            base_damage: 5,
            base_block: 0,
        },
        CreatureMove {
            id: MoveId::Defend,
            name: "Defend",
            energy: 1,
            base_damage: 0,
            base_block: 5,
        },
    ],
};

static BULWARK: CreatureDefinition = CreatureDefinition {
    id: CreatureId::CreatureB,
    name: "Bulwark",
    max_hp: 22,
    summon_turn: 2,
    moves: &[
        CreatureMove {
            id: MoveId::Defend,
            name: "Defend",
            energy: 1,
            base_damage: 0,
            base_block: 8,
        },
        CreatureMove {
            id: MoveId::Attack,
            name: "Heavy Strike",
            energy: 2,
            base_damage: 16,
            base_block: 0,
        },
    ],
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnemyId {
    Grunt,
}

impl EnemyId {
    pub fn definition(self) -> &'static EnemyDefinition {
        match self {
            EnemyId::Grunt => &GRUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemyDefinition {
    pub id: EnemyId,
    pub name: &'static str,
    pub max_hp: i32,
    pub attack_value: i32,
    pub block_value: i32,
}

static GRUNT: EnemyDefinition = EnemyDefinition {
    id: EnemyId::Grunt,
    name: "Grunt",
    max_hp: 12,
    attack_value: 4,
    block_value: 4,
};
