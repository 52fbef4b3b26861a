use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    catalog::{CardDefId, CardEffect, CardTag, CardType, CreatureId, MoveId, REWARD_POOL},
    compute,
    rng::RandomSource,
    state::{
        CardInstance, CardInstanceId, CombatState, Enemy, EnemyIntent, GameEvent, GameState,
        Modifiers, Phase, PlayMode, RewardOffer, TargetRef,
    },
};
use crate::ai;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    RunOver,
    WrongPhase {
        expected: Phase,
        actual: Phase,
    },
    CardNotFound {
        hand_index: usize,
    },
    CreatureNotFound {
        index: usize,
    },
    UnknownCreature {
        creature: CreatureId,
    },
    EnemyNotFound {
        index: usize,
    },
    InsufficientEnergy {
        required: i32,
        available: i32,
    },
    InvalidTarget,
    NoEnemyTarget,
    NotSummonable {
        creature: CreatureId,
    },
    CreatureDefeated {
        creature: CreatureId,
    },
    CreatureNotSummoned {
        index: usize,
    },
    CreatureAlreadyMoved {
        index: usize,
    },
    MoveNotFound {
        move_id: MoveId,
    },
    AlreadyUsed {
        card_id: CardInstanceId,
    },
    NoRewardPending,
    RewardPending,
    RewardNotFound {
        index: usize,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::RunOver => write!(f, "The run is over."),
            RuleError::WrongPhase {
                expected: Phase::Player,
                ..
            } => write!(f, "Not your turn."),
            RuleError::WrongPhase { expected, actual } => {
                write!(f, "Needs the {expected:?} phase, currently {actual:?}.")
            }
            RuleError::CardNotFound { hand_index } => {
                write!(f, "No card at hand position {hand_index}.")
            }
            RuleError::CreatureNotFound { index } => {
                write!(f, "No creature at roster position {index}.")
            }
            RuleError::UnknownCreature { creature } => write!(f, "Unknown creature {creature:?}."),
            RuleError::EnemyNotFound { index } => write!(f, "No enemy at position {index}."),
            RuleError::InsufficientEnergy {
                required,
                available,
            } => write!(f, "Not enough energy (need {required}, have {available})."),
            RuleError::InvalidTarget => write!(f, "Invalid target."),
            RuleError::NoEnemyTarget => write!(f, "No valid enemy target."),
            RuleError::NotSummonable { .. } => write!(f, "Cannot summon yet."),
            RuleError::CreatureDefeated { .. } => write!(f, "Cannot summon (HP 0)."),
            RuleError::CreatureNotSummoned { .. } => {
                write!(f, "Creature must be summoned and alive.")
            }
            RuleError::CreatureAlreadyMoved { .. } => {
                write!(f, "That creature has already moved this turn.")
            }
            RuleError::MoveNotFound { move_id } => write!(f, "Unknown move {move_id:?}."),
            RuleError::AlreadyUsed { .. } => write!(f, "That card was already used this combat."),
            RuleError::NoRewardPending => write!(f, "No reward to claim."),
            RuleError::RewardPending => write!(f, "Choose or skip the reward first."),
            RuleError::RewardNotFound { index } => write!(f, "No reward at position {index}."),
        }
    }
}

impl std::error::Error for RuleError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    pub phase: Phase,
}

impl RuleResolution {
    pub fn new(state: GameState, events: Vec<GameEvent>) -> Self {
        let phase = state.phase();
        Self {
            state,
            events,
            phase,
        }
    }
}

/// What a resolved card effect or creature move actually did, so the
/// one-shot modifiers it qualifies for can be consumed in one place.
#[derive(Debug, Clone, Copy, Default)]
struct ModifierUse {
    discount: bool,
    attack: bool,
    block: bool,
    double_cast: bool,
}

impl ModifierUse {
    fn attack() -> Self {
        Self {
            attack: true,
            ..Self::default()
        }
    }

    fn block() -> Self {
        Self {
            block: true,
            ..Self::default()
        }
    }

    fn merge(&mut self, other: ModifierUse) {
        self.discount |= other.discount;
        self.attack |= other.attack;
        self.block |= other.block;
        self.double_cast |= other.double_cast;
    }
}

/// 回合引擎。持有会话随机源；所有战斗状态都由调用方传入。
pub struct RuleEngine<R: RandomSource> {
    rng: R,
}

impl<R: RandomSource> RuleEngine<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn ensure_phase(state: &GameState, expected: Phase) -> Result<(), RuleError> {
        if state.phase() != expected {
            return Err(RuleError::WrongPhase {
                expected,
                actual: state.phase(),
            });
        }
        Ok(())
    }

    /// Runs one entry point and returns the events it produced. A failed
    /// action keeps no events and narrates the reason.
    fn run<F>(&mut self, state: &mut GameState, action: F) -> Result<Vec<GameEvent>, RuleError>
    where
        F: FnOnce(&mut Self, &mut GameState) -> Result<(), RuleError>,
    {
        let mark = state.event_log.len();
        match action(self, state) {
            Ok(()) => Ok(state.event_log.get(mark..).unwrap_or_default().to_vec()),
            Err(error) => {
                state.event_log.truncate(mark);
                state.narrate(error.to_string());
                Err(error)
            }
        }
    }

    // ── Combat setup ────────────────────────────────────────────────────────

    /// Fresh combat from the run deck. Player hp, gold and creature hp carry
    /// over; everything else about the fight is rebuilt.
    pub fn start_combat(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        if state.player.hp <= 0 {
            let error = RuleError::RunOver;
            state.narrate(error.to_string());
            return Err(error);
        }
        state.event_log.clear();
        state.log.clear();
        self.run(state, |engine, state| {
            engine.setup_combat(state);
            Ok(())
        })
    }

    /// After a victory whose reward has been claimed or skipped.
    pub fn start_next_combat(
        &mut self,
        state: &mut GameState,
    ) -> Result<Vec<GameEvent>, RuleError> {
        if let Err(error) = Self::ensure_phase(state, Phase::Victory).and_then(|_| {
            if state.rewards.is_some() {
                Err(RuleError::RewardPending)
            } else {
                Ok(())
            }
        }) {
            state.narrate(error.to_string());
            return Err(error);
        }
        self.start_combat(state)
    }

    fn setup_combat(&mut self, state: &mut GameState) {
        state.combat = CombatState::new();
        state.rewards = None;
        if state.config.reset_modifiers_each_combat {
            state.modifiers = Modifiers::default();
        }
        state.player.energy = 0;

        let run_deck = state.run_deck.clone();
        let deck: Vec<CardInstance> = run_deck
            .into_iter()
            .map(|def_id| state.instantiate_card(def_id))
            .collect();
        state.combat.deck = deck;
        self.shuffle_deck(state);

        state.combat.turn.number = 1;
        state.set_phase(Phase::Player);

        self.seed_encounter(state);
        state.clear_all_blocks();
        Self::reset_creatures_for_combat(state);

        Self::bring_creatures_to_hand(state);
        let hand_size = state.config.hand_size;
        self.draw_cards(state, hand_size);

        state.friendly_target = TargetRef::Player;
        state.enemy_target = state.first_living_enemy().unwrap_or(0);
        ai::plan_enemy_intents(state, &mut self.rng);
        Self::reset_creature_moves(state);
        state.narrate("Combat started. Player turn 1.");
    }

    fn seed_encounter(&mut self, state: &mut GameState) {
        let min = state.config.min_enemies as i32;
        let max = state.config.max_enemies as i32;
        let count = self.rng.range(min, max).max(0) as usize;
        let def = state.config.encounter_enemy.definition();
        state.enemies = (0..count)
            .map(|_| Enemy::from_definition(def))
            .collect();
        state.record_event(GameEvent::CombatStarted { enemies: count });
    }

    fn reset_creatures_for_combat(state: &mut GameState) {
        for creature in &mut state.creatures {
            creature.block = 0;
            creature.alive = false;
            creature.temporary_strength = 0;
            creature.temporary_dexterity = 0;
            creature.moved_this_turn = false;
        }
    }

    /// Every creature card starts the combat in hand.
    fn bring_creatures_to_hand(state: &mut GameState) {
        let deck = &mut state.combat.deck;
        let mut index = deck.len();
        while index > 0 {
            index -= 1;
            if deck[index].card_type == CardType::Creature {
                let card = deck.remove(index);
                state.combat.hand.push(card);
            }
        }
    }

    fn reset_creature_moves(state: &mut GameState) {
        for creature in &mut state.creatures {
            creature.moved_this_turn = false;
        }
    }

    // ── Deck / hand / discard ───────────────────────────────────────────────

    fn shuffle_deck(&mut self, state: &mut GameState) {
        self.rng.shuffle(&mut state.combat.deck);
        state.narrate("Shuffled deck.");
    }

    fn shuffle_discard_into_deck(&mut self, state: &mut GameState) {
        let mut moved = 0;
        while let Some(card) = state.combat.discard.pop() {
            state.combat.deck.push(card);
            moved += 1;
        }
        if moved == 0 {
            return;
        }
        self.shuffle_deck(state);
        state.record_event(GameEvent::DeckReshuffled { count: moved });
        state.narrate("Reshuffled discard into deck.");
    }

    /// Draws up to `count`, reshuffling the discard pile when the deck runs
    /// dry. Stops quietly once both are empty.
    fn draw_cards(&mut self, state: &mut GameState, count: usize) -> usize {
        let mut drawn = 0;
        for _ in 0..count {
            if state.combat.deck.is_empty() {
                if state.combat.discard.is_empty() {
                    break;
                }
                self.shuffle_discard_into_deck(state);
            }
            let Some(card) = state.combat.deck.pop() else {
                break;
            };
            state.combat.hand.push(card);
            drawn += 1;
        }
        state.record_event(GameEvent::CardsDrawn { count: drawn });
        state.narrate(format!("Drew {drawn} card(s)."));
        drawn
    }

    fn discard_all(state: &mut GameState) {
        let mut count = 0;
        while let Some(card) = state.combat.hand.pop() {
            state.combat.discard.push(card);
            count += 1;
        }
        state.record_event(GameEvent::HandDiscarded { count });
        state.narrate(format!("Discarded {count} card(s) from hand."));
    }

    pub fn draw(&mut self, state: &mut GameState, count: usize) -> Result<Vec<GameEvent>, RuleError> {
        self.run(state, |engine, state| {
            engine.draw_cards(state, count);
            Ok(())
        })
    }

    pub fn discard_hand(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        self.run(state, |_, state| {
            Self::discard_all(state);
            Ok(())
        })
    }

    // ── Turn flow ───────────────────────────────────────────────────────────

    pub fn end_player_turn(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        self.run(state, |engine, state| {
            Self::ensure_phase(state, Phase::Player)?;
            Self::discard_all(state);
            let hand_size = state.config.hand_size;
            engine.draw_cards(state, hand_size);
            state.set_phase(Phase::Enemy);
            state.narrate("End turn → Enemy phase");
            Ok(())
        })
    }

    /// Resolves the planned intents, then either ends the combat or opens the
    /// next player turn with a fresh set of intents.
    pub fn enemy_turn(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        self.run(state, |engine, state| {
            Self::ensure_phase(state, Phase::Enemy)?;
            engine.resolve_planned_enemy_actions(state);
            Self::ensure_valid_targets(state);
            state.reset_enemy_block();
            if engine.check_victory_defeat(state) {
                return Ok(());
            }

            state.combat.turn.number += 1;
            state.reset_team_block();
            state.set_phase(Phase::Player);
            Self::reset_creature_moves(state);
            let turn = state.turn_number();
            state.narrate(format!("Player turn {turn}."));
            ai::plan_enemy_intents(state, &mut engine.rng);
            Ok(())
        })
    }

    /// Block intents land at once. Attacks are re-aimed if their target went
    /// stale, summed per target, and applied as one hit per target.
    fn resolve_planned_enemy_actions(&mut self, state: &mut GameState) {
        let mut attacks: Vec<(TargetRef, i32)> = Vec::new();

        for index in 0..state.enemies.len() {
            let enemy = &state.enemies[index];
            if !enemy.is_alive() {
                continue;
            }
            let Some(intent) = enemy.intent else {
                continue;
            };
            let name = enemy.name.clone();

            match intent {
                EnemyIntent::Block { amount } => {
                    state.gain_block(TargetRef::Enemy(index), amount);
                    state.narrate(format!("{name} blocks for {amount}."));
                }
                EnemyIntent::Attack { amount, target } => {
                    let mut target = target;
                    if ai::needs_retarget(state, target) {
                        target = ai::choose_enemy_target(state, &mut self.rng);
                        let label = state.target_label(target);
                        state.narrate(format!("{name} retargets → {label}."));
                        state.record_event(GameEvent::EnemyRetargeted {
                            enemy: index,
                            target,
                        });
                    }
                    match attacks.iter_mut().find(|(planned, _)| *planned == target) {
                        Some((_, total)) => *total += amount,
                        None => attacks.push((target, amount)),
                    }
                }
            }
        }

        for (target, total) in attacks {
            state.deal_damage(None, target, total);
            let label = state.target_label(target);
            state.narrate(format!("Enemies deal {total} to {label}."));
        }

        for enemy in &mut state.enemies {
            enemy.intent = None;
        }
    }

    /// Point the cached targets back at something that can be targeted.
    fn ensure_valid_targets(state: &mut GameState) {
        if let TargetRef::Creature(index) = state.friendly_target {
            let active = state
                .creatures
                .get(index)
                .map(|creature| creature.is_active())
                .unwrap_or(false);
            if !active {
                state.friendly_target = TargetRef::Player;
            }
        }

        let enemy_alive = state
            .enemies
            .get(state.enemy_target)
            .map(|enemy| enemy.is_alive())
            .unwrap_or(false);
        if !enemy_alive {
            if let Some(index) = state.first_living_enemy() {
                state.enemy_target = index;
            }
        }
    }

    /// Victory wins ties: a fight where the last enemy and the player fall
    /// together still counts as won.
    fn check_victory_defeat(&mut self, state: &mut GameState) -> bool {
        if state.all_enemies_defeated() {
            state.set_phase(Phase::Victory);
            state.narrate("Victory!");
            self.offer_rewards(state);
            return true;
        }
        if state.player.hp <= 0 {
            state.set_phase(Phase::Defeat);
            state.narrate("Defeat. Run ends.");
            return true;
        }
        false
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    fn offer_rewards(&mut self, state: &mut GameState) {
        let mut choices: Vec<CardDefId> = REWARD_POOL.clone();
        self.rng.shuffle(&mut choices);
        choices.truncate(state.config.reward_choices);
        if choices.is_empty() {
            return;
        }
        state.record_event(GameEvent::RewardOffered {
            choices: choices.clone(),
        });
        state.rewards = Some(RewardOffer { choices });
    }

    pub fn choose_reward(
        &mut self,
        state: &mut GameState,
        index: usize,
    ) -> Result<Vec<GameEvent>, RuleError> {
        self.run(state, |_, state| {
            Self::ensure_phase(state, Phase::Victory)?;
            let offer = state.rewards.as_ref().ok_or(RuleError::NoRewardPending)?;
            let def_id = *offer
                .choices
                .get(index)
                .ok_or(RuleError::RewardNotFound { index })?;
            state.run_deck.push(def_id);
            state.rewards = None;
            state.record_event(GameEvent::RewardChosen { def_id });
            state.narrate(format!("Added {} to the deck.", def_id.definition().name));
            Ok(())
        })
    }

    pub fn skip_reward(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        self.run(state, |_, state| {
            Self::ensure_phase(state, Phase::Victory)?;
            if state.rewards.take().is_none() {
                return Err(RuleError::NoRewardPending);
            }
            let gold = state.config.skip_reward_gold;
            state.player.gold += gold;
            state.record_event(GameEvent::RewardSkipped { gold });
            state.narrate(format!("Skipped the reward (+{gold} gold)."));
            Ok(())
        })
    }

    // ── Targeting and roster ────────────────────────────────────────────────

    /// The player, or a creature that is summoned and standing.
    pub fn set_friendly_target(state: &mut GameState, target: TargetRef) -> Result<(), RuleError> {
        let result = match target {
            TargetRef::Player => Ok(()),
            TargetRef::Creature(index) => match state.creatures.get(index) {
                Some(creature) if creature.is_active() => Ok(()),
                Some(_) => Err(RuleError::InvalidTarget),
                None => Err(RuleError::CreatureNotFound { index }),
            },
            TargetRef::Enemy(_) => Err(RuleError::InvalidTarget),
        };
        match result {
            Ok(()) => {
                state.friendly_target = target;
                let label = state.target_label(target);
                state.narrate(format!("Target: {label}"));
                Ok(())
            }
            Err(error) => {
                state.narrate(error.to_string());
                Err(error)
            }
        }
    }

    pub fn set_enemy_target(state: &mut GameState, index: usize) -> Result<(), RuleError> {
        let result = match state.enemies.get(index) {
            Some(enemy) if enemy.is_alive() => Ok(()),
            Some(_) => Err(RuleError::InvalidTarget),
            None => Err(RuleError::EnemyNotFound { index }),
        };
        match result {
            Ok(()) => {
                state.enemy_target = index;
                let label = state.target_label(TargetRef::Enemy(index));
                state.narrate(format!("Enemy target: {label}"));
                Ok(())
            }
            Err(error) => {
                state.narrate(error.to_string());
                Err(error)
            }
        }
    }

    /// Summon straight from the roster. Only one creature fights this way:
    /// any other summoned creature is dismissed first.
    pub fn summon_from_roster(
        &mut self,
        state: &mut GameState,
        index: usize,
    ) -> Result<Vec<GameEvent>, RuleError> {
        self.run(state, |_, state| {
            Self::ensure_phase(state, Phase::Player)?;
            let creature = state
                .creatures
                .get(index)
                .ok_or(RuleError::CreatureNotFound { index })?;
            let id = creature.id;
            if !compute::is_summonable_creature(state, index) {
                if creature.hp <= 0 {
                    return Err(RuleError::CreatureDefeated { creature: id });
                }
                return Err(RuleError::NotSummonable { creature: id });
            }
            for other in 0..state.creatures.len() {
                if other != index {
                    state.dismiss_creature(other);
                }
            }
            state.summon_creature(id)?;
            let name = state.creatures[index].name.clone();
            state.narrate(format!("Summoned {name}."));
            Ok(())
        })
    }

    // ── Card play ───────────────────────────────────────────────────────────

    pub fn play_card(
        &mut self,
        state: &mut GameState,
        hand_index: usize,
        mode: PlayMode,
    ) -> Result<Vec<GameEvent>, RuleError> {
        self.run(state, |_, state| {
            Self::ensure_phase(state, Phase::Player)?;
            let card = state
                .combat
                .hand
                .get(hand_index)
                .cloned()
                .ok_or(RuleError::CardNotFound { hand_index })?;
            match mode {
                PlayMode::Energy => Self::play_for_energy(state, hand_index, card),
                PlayMode::Effect => Self::play_for_effect(state, hand_index, card),
            }
        })
    }

    fn play_for_energy(
        state: &mut GameState,
        hand_index: usize,
        card: CardInstance,
    ) -> Result<(), RuleError> {
        let gain = compute::card_energy_gain(&card);
        state.add_energy(gain);
        state.record_event(GameEvent::CardPlayed {
            card_id: card.id,
            def_id: card.def_id,
            mode: PlayMode::Energy,
        });
        state.narrate(format!("{} → +{gain} energy", card.name));
        let played = state.combat.hand.remove(hand_index);
        state.combat.discard.push(played);
        Ok(())
    }

    fn play_for_effect(
        state: &mut GameState,
        hand_index: usize,
        card: CardInstance,
    ) -> Result<(), RuleError> {
        if card.card_type == CardType::SingleUse && card.used_this_combat {
            return Err(RuleError::AlreadyUsed { card_id: card.id });
        }

        let cost = compute::card_cost(state, &card);
        state.spend_energy(cost)?;

        let target = compute::validation_target(state, &card);
        if !compute::is_valid_target(state, &card, target) {
            state.add_energy(cost);
            if card.has_tag(CardTag::Damage) && target.is_none() {
                return Err(RuleError::NoEnemyTarget);
            }
            return Err(RuleError::InvalidTarget);
        }

        let double_cast =
            card.card_type == CardType::Spell && state.modifiers.next_spell_casts_twice > 0;
        let casts = if double_cast { 2 } else { 1 };

        let mut used = ModifierUse {
            discount: true,
            double_cast,
            ..ModifierUse::default()
        };
        let mut landed = 0;
        let mut first_error = None;
        for _ in 0..casts {
            match Self::apply_card_effect(state, &card) {
                Ok(effect_use) => {
                    used.merge(effect_use);
                    landed += 1;
                }
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }
        if landed == 0 {
            state.add_energy(cost);
            return Err(first_error.unwrap_or(RuleError::InvalidTarget));
        }

        Self::consume_modifiers(state, used);
        state.record_event(GameEvent::CardPlayed {
            card_id: card.id,
            def_id: card.def_id,
            mode: PlayMode::Effect,
        });

        let mut played = state.combat.hand.remove(hand_index);
        if played.card_type == CardType::SingleUse {
            // exhausted: leaves the combat entirely
            played.used_this_combat = true;
            state.record_event(GameEvent::CardExhausted { card_id: played.id });
            state.narrate(format!("{} is exhausted.", played.name));
        } else {
            state.combat.discard.push(played);
        }
        Ok(())
    }

    /// Interprets a card's effect descriptor once. Fails without mutating.
    fn apply_card_effect(state: &mut GameState, card: &CardInstance) -> Result<ModifierUse, RuleError> {
        match card.effect {
            CardEffect::DealDamage => {
                let target = compute::default_enemy_target(state).ok_or(RuleError::NoEnemyTarget)?;
                let amount = compute::card_damage(state, card, TargetRef::Player);
                state.deal_damage(Some(TargetRef::Player), target, amount);
                let label = state.target_label(target);
                state.narrate(format!("{} deals {amount} to {label}.", card.name));
                Ok(ModifierUse::attack())
            }
            CardEffect::GainBlock => {
                let target = compute::default_friendly_target(state);
                let amount = compute::card_block(state, card, target);
                state.gain_block(target, amount);
                let label = state.target_label(target);
                state.narrate(format!("{label} gains {amount} block."));
                Ok(ModifierUse::block())
            }
            CardEffect::GrantStrength { amount } => {
                let target = compute::default_friendly_target(state);
                state.gain_strength(target, amount)?;
                let label = state.target_label(target);
                state.narrate(format!("{label} gains {amount} strength."));
                Ok(ModifierUse::default())
            }
            CardEffect::GrantDexterity { amount } => {
                let target = compute::default_friendly_target(state);
                state.gain_dexterity(target, amount)?;
                let label = state.target_label(target);
                state.narrate(format!("{label} gains {amount} dexterity."));
                Ok(ModifierUse::default())
            }
            CardEffect::PermanentBuff {
                attack_delta,
                block_delta,
            } => {
                let TargetRef::Creature(index) = compute::default_friendly_target(state) else {
                    state.narrate("Choose a creature.");
                    return Err(RuleError::InvalidTarget);
                };
                let id = state
                    .creatures
                    .get(index)
                    .map(|creature| creature.id)
                    .ok_or(RuleError::CreatureNotFound { index })?;
                state.apply_permanent_buff(id, attack_delta, block_delta)?;
                let name = state.creatures[index].name.clone();
                state.narrate(format!("{name} is permanently empowered."));
                Ok(ModifierUse::default())
            }
            CardEffect::Summon { creature } => {
                if !compute::is_summonable(state, card) {
                    return Err(RuleError::NotSummonable { creature });
                }
                state.summon_creature(creature)?;
                state.narrate(format!("Summoned {}.", creature.definition().name));
                Ok(ModifierUse::default())
            }
        }
    }

    /// The single place one-shot modifiers are spent.
    fn consume_modifiers(state: &mut GameState, used: ModifierUse) {
        let modifiers = &mut state.modifiers;
        if used.discount {
            modifiers.next_card_discount = 0;
        }
        if used.attack {
            modifiers.next_attack_extra_damage = 0;
        }
        if used.block {
            modifiers.next_block_extra_block = 0;
        }
        if used.double_cast {
            modifiers.next_spell_casts_twice = (modifiers.next_spell_casts_twice - 1).max(0);
        }
    }

    // ── Creature moves ──────────────────────────────────────────────────────

    /// One move per creature per player turn, paid from the same energy pool
    /// as cards.
    pub fn perform_creature_action(
        &mut self,
        state: &mut GameState,
        creature_index: usize,
        move_id: MoveId,
    ) -> Result<Vec<GameEvent>, RuleError> {
        self.run(state, |_, state| {
            Self::ensure_phase(state, Phase::Player)?;
            let creature = state
                .creatures
                .get(creature_index)
                .cloned()
                .ok_or(RuleError::CreatureNotFound {
                    index: creature_index,
                })?;
            if !creature.is_active() {
                return Err(RuleError::CreatureNotSummoned {
                    index: creature_index,
                });
            }
            if creature.moved_this_turn {
                return Err(RuleError::CreatureAlreadyMoved {
                    index: creature_index,
                });
            }
            let mv = creature
                .id
                .definition()
                .find_move(move_id)
                .ok_or(RuleError::MoveNotFound { move_id })?;

            let enemy_target = match move_id {
                MoveId::Attack => {
                    Some(compute::default_enemy_target(state).ok_or(RuleError::NoEnemyTarget)?)
                }
                MoveId::Defend => None,
            };

            state.spend_energy(compute::move_cost(mv))?;

            let source = TargetRef::Creature(creature_index);
            let used = match enemy_target {
                Some(target) => {
                    let amount = compute::move_damage(state, &creature, mv);
                    state.deal_damage(Some(source), target, amount);
                    let label = state.target_label(target);
                    state.narrate(format!("{} attacks {label} for {amount}.", creature.name));
                    ModifierUse::attack()
                }
                None => {
                    let amount = compute::move_block(state, &creature, mv);
                    state.gain_block(source, amount);
                    state.narrate(format!("{} defends for {amount}.", creature.name));
                    ModifierUse::block()
                }
            };
            Self::consume_modifiers(state, used);

            state.creatures[creature_index].moved_this_turn = true;
            state.record_event(GameEvent::CreatureMoved {
                creature: creature_index,
                move_id,
            });
            Ok(())
        })
    }

    // ── Read-only queries for the UI ────────────────────────────────────────

    pub fn card_preview(state: &GameState, hand_index: usize) -> Result<compute::CardPreview, RuleError> {
        state
            .combat
            .hand
            .get(hand_index)
            .map(|card| compute::card_preview(state, card))
            .ok_or(RuleError::CardNotFound { hand_index })
    }

    pub fn move_preview(
        state: &GameState,
        creature_index: usize,
        move_id: MoveId,
    ) -> Result<compute::MovePreview, RuleError> {
        let creature = state
            .creatures
            .get(creature_index)
            .ok_or(RuleError::CreatureNotFound {
                index: creature_index,
            })?;
        let mv = creature
            .id
            .definition()
            .find_move(move_id)
            .ok_or(RuleError::MoveNotFound { move_id })?;
        Ok(compute::move_preview(state, creature, mv))
    }
}
