//! Derived numbers and rule queries. Nothing in here mutates state, so the UI
//! can call any of it freely to render previews and affordances.

use serde::Serialize;

use super::catalog::{CardTag, CardType, CreatureMove};
use super::state::{CardInstance, Creature, GameState, TargetRef};

pub fn card_cost(state: &GameState, card: &CardInstance) -> i32 {
    let base = card.base_cost + card.perm_mods.cost + card.temp_mods.cost;
    (base - state.modifiers.next_card_discount).max(0)
}

pub fn card_energy_gain(card: &CardInstance) -> i32 {
    (card.base_energy_gain + card.perm_mods.energy_gain + card.temp_mods.energy_gain).max(0)
}

/// Strength only ever comes from a creature source.
fn source_strength(state: &GameState, source: TargetRef) -> i32 {
    match source {
        TargetRef::Creature(index) => state
            .creatures
            .get(index)
            .map(Creature::total_strength)
            .unwrap_or(0),
        _ => 0,
    }
}

/// Dexterity only ever applies to a creature target.
fn target_dexterity(state: &GameState, target: TargetRef) -> i32 {
    match target {
        TargetRef::Creature(index) => state
            .creatures
            .get(index)
            .map(Creature::total_dexterity)
            .unwrap_or(0),
        _ => 0,
    }
}

pub fn card_damage(state: &GameState, card: &CardInstance, source: TargetRef) -> i32 {
    let base = card.base_damage.unwrap_or(0) + card.perm_mods.damage + card.temp_mods.damage;
    (base + source_strength(state, source) + state.modifiers.next_attack_extra_damage).max(0)
}

pub fn card_block(state: &GameState, card: &CardInstance, target: TargetRef) -> i32 {
    let base = card.base_block.unwrap_or(0) + card.perm_mods.block + card.temp_mods.block;
    (base + target_dexterity(state, target) + state.modifiers.next_block_extra_block).max(0)
}

pub fn move_cost(mv: &CreatureMove) -> i32 {
    mv.energy.max(0)
}

pub fn move_damage(state: &GameState, creature: &Creature, mv: &CreatureMove) -> i32 {
    let base = mv.base_damage + creature.perm_mods.attack;
    (base + creature.total_strength() + state.modifiers.next_attack_extra_damage).max(0)
}

pub fn move_block(state: &GameState, creature: &Creature, mv: &CreatureMove) -> i32 {
    let base = mv.base_block + creature.perm_mods.block;
    (base + creature.total_dexterity() + state.modifiers.next_block_extra_block).max(0)
}

pub fn is_summonable(state: &GameState, card: &CardInstance) -> bool {
    if card.card_type != CardType::Creature {
        return false;
    }
    if state.turn_number() < card.summon_turn {
        return false;
    }
    // The alive flag does not matter here, only that the creature still stands.
    card.summon
        .and_then(|id| state.creature_index(id))
        .map(|index| state.creatures[index].hp > 0)
        .unwrap_or(false)
}

/// Roster variant: the creature must also not be summoned already.
pub fn is_summonable_creature(state: &GameState, index: usize) -> bool {
    let Some(creature) = state.creatures.get(index) else {
        return false;
    };
    state.turn_number() >= creature.id.definition().summon_turn
        && !creature.alive
        && creature.hp > 0
}

pub fn is_playable(state: &GameState, card: &CardInstance) -> bool {
    if card.card_type == CardType::SingleUse && card.used_this_combat {
        return false;
    }
    let enough_energy = state.player.energy >= card_cost(state, card);
    if card.card_type == CardType::Creature {
        return enough_energy && is_summonable(state, card);
    }
    enough_energy
}

/// Tag-driven target check. Cards without a targeting tag accept anything.
pub fn is_valid_target(state: &GameState, card: &CardInstance, target: Option<TargetRef>) -> bool {
    let creature_ok = |target: Option<TargetRef>| match target {
        Some(TargetRef::Creature(index)) => state
            .creatures
            .get(index)
            .map(Creature::is_active)
            .unwrap_or(false),
        _ => false,
    };

    if card.has_tag(CardTag::GrantStrength) || card.has_tag(CardTag::GrantDexterity) {
        return creature_ok(target);
    }
    if card.has_tag(CardTag::Block) {
        return matches!(target, Some(TargetRef::Player)) || creature_ok(target);
    }
    if card.has_tag(CardTag::Damage) {
        return match target {
            Some(TargetRef::Enemy(index)) => state
                .enemies
                .get(index)
                .map(|enemy| enemy.is_alive())
                .unwrap_or(false),
            _ => false,
        };
    }
    true
}

/// The cached enemy target if it still lives, else the first living enemy.
pub fn default_enemy_target(state: &GameState) -> Option<TargetRef> {
    let cached = state
        .enemies
        .get(state.enemy_target)
        .filter(|enemy| enemy.is_alive())
        .map(|_| state.enemy_target);
    cached
        .or_else(|| state.first_living_enemy())
        .map(TargetRef::Enemy)
}

/// The cached friendly target if it is the player or an active creature,
/// otherwise the player.
pub fn default_friendly_target(state: &GameState) -> TargetRef {
    match state.friendly_target {
        TargetRef::Creature(index)
            if state
                .creatures
                .get(index)
                .map(Creature::is_active)
                .unwrap_or(false) =>
        {
            TargetRef::Creature(index)
        }
        _ => TargetRef::Player,
    }
}

/// Target a card in effect mode would be validated against, by tag.
pub fn validation_target(state: &GameState, card: &CardInstance) -> Option<TargetRef> {
    if card.has_tag(CardTag::Damage) {
        return default_enemy_target(state);
    }
    if card.has_tag(CardTag::Block)
        || card.has_tag(CardTag::GrantStrength)
        || card.has_tag(CardTag::GrantDexterity)
    {
        return Some(default_friendly_target(state));
    }
    None
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CardPreview {
    pub cost: i32,
    pub energy_gain: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<i32>,
    pub playable: bool,
    pub valid_target: bool,
}

pub fn card_preview(state: &GameState, card: &CardInstance) -> CardPreview {
    CardPreview {
        cost: card_cost(state, card),
        energy_gain: card_energy_gain(card),
        damage: card
            .base_damage
            .map(|_| card_damage(state, card, TargetRef::Player)),
        block: card
            .base_block
            .map(|_| card_block(state, card, default_friendly_target(state))),
        playable: is_playable(state, card),
        valid_target: is_valid_target(state, card, validation_target(state, card)),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MovePreview {
    pub cost: i32,
    pub damage: i32,
    pub block: i32,
}

pub fn move_preview(state: &GameState, creature: &Creature, mv: &CreatureMove) -> MovePreview {
    MovePreview {
        cost: move_cost(mv),
        damage: move_damage(state, creature, mv),
        block: move_block(state, creature, mv),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::{CardDefId, CreatureId, EnemyId, MoveId};
    use crate::game::state::Enemy;

    fn state_with_enemies(count: usize) -> GameState {
        let mut state = GameState::default();
        state.combat.turn.number = 1;
        state.enemies = (0..count)
            .map(|_| Enemy::from_definition(EnemyId::Grunt.definition()))
            .collect();
        state
    }

    #[test]
    fn discount_lowers_cost_but_never_below_zero() {
        let mut state = GameState::default();
        let card = state.instantiate_card(CardDefId::PermAtk2);
        assert_eq!(card_cost(&state, &card), 2);
        state.modifiers.next_card_discount = 1;
        assert_eq!(card_cost(&state, &card), 1);
        state.modifiers.next_card_discount = 5;
        assert_eq!(card_cost(&state, &card), 0);
    }

    #[test]
    fn calling_compute_twice_changes_nothing() {
        let mut state = state_with_enemies(2);
        state.modifiers.next_attack_extra_damage = 3;
        let card = state.instantiate_card(CardDefId::Deal4);
        let before = state.clone();
        let first = card_damage(&state, &card, TargetRef::Player);
        let second = card_damage(&state, &card, TargetRef::Player);
        assert_eq!(first, 7);
        assert_eq!(first, second);
        assert_eq!(state, before);
    }

    #[test]
    fn strength_counts_only_for_creature_sources() {
        let mut state = GameState::default();
        state.creatures[0].strength = 1;
        state.creatures[0].temporary_strength = 2;
        let card = state.instantiate_card(CardDefId::Deal4);
        assert_eq!(card_damage(&state, &card, TargetRef::Player), 4);
        assert_eq!(card_damage(&state, &card, TargetRef::Creature(0)), 7);
    }

    #[test]
    fn dexterity_counts_only_for_creature_targets() {
        let mut state = GameState::default();
        state.creatures[1].temporary_dexterity = 2;
        state.modifiers.next_block_extra_block = 1;
        let card = state.instantiate_card(CardDefId::Block4);
        assert_eq!(card_block(&state, &card, TargetRef::Player), 5);
        assert_eq!(card_block(&state, &card, TargetRef::Creature(1)), 7);
    }

    #[test]
    fn negative_mods_clamp_at_zero() {
        let mut state = GameState::default();
        let mut card = state.instantiate_card(CardDefId::Deal4);
        card.temp_mods.damage = -10;
        card.perm_mods.energy_gain = -3;
        assert_eq!(card_damage(&state, &card, TargetRef::Player), 0);
        assert_eq!(card_energy_gain(&card), 0);
    }

    #[test]
    fn move_numbers_include_creature_mods() {
        let mut state = GameState::default();
        let creature = &mut state.creatures[0];
        creature.perm_mods.attack = 2;
        creature.perm_mods.block = 1;
        creature.temporary_strength = 2;
        creature.temporary_dexterity = 3;
        let def = CreatureId::CreatureA.definition();
        let attack = def.find_move(MoveId::Attack).unwrap();
        let defend = def.find_move(MoveId::Defend).unwrap();
        let creature = state.creatures[0].clone();
        assert_eq!(move_damage(&state, &creature, attack), 9);
        assert_eq!(move_block(&state, &creature, defend), 9);
        assert_eq!(move_cost(attack), 1);
    }

    #[test]
    fn summon_gating_by_turn_and_hp() {
        let mut state = state_with_enemies(1);
        let vanguard = state.instantiate_card(CardDefId::CreatureA);
        let bulwark = state.instantiate_card(CardDefId::CreatureB);
        assert!(is_summonable(&state, &vanguard));
        assert!(!is_summonable(&state, &bulwark), "Bulwark waits for turn 2");

        state.combat.turn.number = 2;
        assert!(is_summonable(&state, &bulwark));

        state.creatures[1].hp = 0;
        state.combat.turn.number = 9;
        assert!(!is_summonable(&state, &bulwark));
        assert!(!is_playable(&state, &bulwark));
    }

    #[test]
    fn summonable_ignores_alive_flag_but_roster_check_does_not() {
        let mut state = state_with_enemies(1);
        let vanguard = state.instantiate_card(CardDefId::CreatureA);
        state.creatures[0].alive = true;
        assert!(is_summonable(&state, &vanguard));
        assert!(!is_summonable_creature(&state, 0));
        state.creatures[0].alive = false;
        assert!(is_summonable_creature(&state, 0));
        assert!(!is_summonable_creature(&state, 7));
    }

    #[test]
    fn non_creature_cards_are_never_summonable() {
        let mut state = state_with_enemies(1);
        let card = state.instantiate_card(CardDefId::Deal4);
        assert!(!is_summonable(&state, &card));
    }

    #[test]
    fn playable_needs_energy_and_unused_single_use() {
        let mut state = state_with_enemies(1);
        let mut card = state.instantiate_card(CardDefId::PermAtk2);
        state.player.energy = 1;
        assert!(!is_playable(&state, &card));
        state.player.energy = 2;
        assert!(is_playable(&state, &card));
        card.used_this_combat = true;
        assert!(!is_playable(&state, &card));
    }

    #[test]
    fn target_rules_by_tag() {
        let mut state = state_with_enemies(2);
        let deal = state.instantiate_card(CardDefId::Deal4);
        let block = state.instantiate_card(CardDefId::Block4);
        let strength = state.instantiate_card(CardDefId::Str2);
        let perm = state.instantiate_card(CardDefId::PermAtk2);

        assert!(is_valid_target(&state, &deal, Some(TargetRef::Enemy(1))));
        assert!(!is_valid_target(&state, &deal, Some(TargetRef::Player)));
        assert!(!is_valid_target(&state, &deal, None));
        state.enemies[1].hp = 0;
        assert!(!is_valid_target(&state, &deal, Some(TargetRef::Enemy(1))));

        assert!(is_valid_target(&state, &block, Some(TargetRef::Player)));
        assert!(!is_valid_target(&state, &block, Some(TargetRef::Creature(0))));
        assert!(!is_valid_target(&state, &strength, Some(TargetRef::Player)));
        state.creatures[0].alive = true;
        assert!(is_valid_target(&state, &block, Some(TargetRef::Creature(0))));
        assert!(is_valid_target(&state, &strength, Some(TargetRef::Creature(0))));

        assert!(is_valid_target(&state, &perm, Some(TargetRef::Player)));
        assert!(is_valid_target(&state, &perm, None));
    }

    #[test]
    fn default_targets_fall_back() {
        let mut state = state_with_enemies(3);
        state.enemy_target = 1;
        assert_eq!(default_enemy_target(&state), Some(TargetRef::Enemy(1)));
        state.enemies[1].hp = 0;
        assert_eq!(default_enemy_target(&state), Some(TargetRef::Enemy(0)));
        for enemy in &mut state.enemies {
            enemy.hp = 0;
        }
        assert_eq!(default_enemy_target(&state), None);

        state.friendly_target = TargetRef::Creature(0);
        assert_eq!(default_friendly_target(&state), TargetRef::Player);
        state.creatures[0].alive = true;
        assert_eq!(default_friendly_target(&state), TargetRef::Creature(0));
    }

    #[test]
    fn preview_reflects_modifiers() {
        let mut state = state_with_enemies(1);
        state.player.energy = 1;
        state.modifiers.next_attack_extra_damage = 2;
        let card = state.instantiate_card(CardDefId::Deal4);
        let preview = card_preview(&state, &card);
        assert_eq!(preview.cost, 1);
        assert_eq!(preview.energy_gain, 1);
        assert_eq!(preview.damage, Some(6));
        assert_eq!(preview.block, None);
        assert!(preview.playable && preview.valid_target);
    }
}
