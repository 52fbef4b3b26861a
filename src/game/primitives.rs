//! 状态变更原语。规则层只通过这里修改实体数值。

use super::catalog::CreatureId;
use super::rules::RuleError;
use super::state::{GameEvent, GameState, Phase, TargetRef};

/// How a single damage application split between block and hp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    pub absorbed: i32,
    pub hp_lost: i32,
}

impl GameState {
    pub fn add_energy(&mut self, amount: i32) {
        let amount = amount.max(0);
        self.player.energy += amount;
        if amount > 0 {
            self.record_event(GameEvent::EnergyGained { amount });
        }
    }

    /// Leaves energy untouched when the player cannot pay.
    pub fn spend_energy(&mut self, amount: i32) -> Result<(), RuleError> {
        let cost = amount.max(0);
        if self.player.energy < cost {
            return Err(RuleError::InsufficientEnergy {
                required: cost,
                available: self.player.energy,
            });
        }
        self.player.energy -= cost;
        if cost > 0 {
            self.record_event(GameEvent::EnergySpent { amount: cost });
        }
        Ok(())
    }

    /// Block soaks first, the rest comes off hp (never below zero). A creature
    /// brought to zero hp is no longer summoned. Missing targets are ignored.
    pub fn deal_damage(
        &mut self,
        source: Option<TargetRef>,
        target: TargetRef,
        amount: i32,
    ) -> Option<DamageOutcome> {
        let amount = amount.max(0);
        let (block, hp) = match target {
            TargetRef::Player => (&mut self.player.block, &mut self.player.hp),
            TargetRef::Creature(index) => {
                let creature = self.creatures.get_mut(index)?;
                (&mut creature.block, &mut creature.hp)
            }
            TargetRef::Enemy(index) => {
                let enemy = self.enemies.get_mut(index)?;
                (&mut enemy.block, &mut enemy.hp)
            }
        };

        let absorbed = (*block).min(amount).max(0);
        *block -= absorbed;
        let remaining = amount - absorbed;
        let hp_before = *hp;
        *hp = (*hp - remaining).max(0);
        let outcome = DamageOutcome {
            absorbed,
            hp_lost: hp_before - *hp,
        };

        self.record_event(GameEvent::DamageDealt {
            source,
            target,
            amount,
            absorbed: outcome.absorbed,
            hp_lost: outcome.hp_lost,
        });

        if let TargetRef::Creature(index) = target {
            if let Some(creature) = self.creatures.get_mut(index) {
                if creature.hp == 0 && creature.alive {
                    creature.alive = false;
                    let id = creature.id;
                    let name = creature.name.clone();
                    self.record_event(GameEvent::CreatureFell { creature: id });
                    self.narrate(format!("{name} falls."));
                }
            }
        }

        Some(outcome)
    }

    pub fn gain_block(&mut self, target: TargetRef, amount: i32) {
        let amount = amount.max(0);
        let block = match target {
            TargetRef::Player => &mut self.player.block,
            TargetRef::Creature(index) => match self.creatures.get_mut(index) {
                Some(creature) => &mut creature.block,
                None => return,
            },
            TargetRef::Enemy(index) => match self.enemies.get_mut(index) {
                Some(enemy) => &mut enemy.block,
                None => return,
            },
        };
        *block += amount;
        self.record_event(GameEvent::BlockGained { target, amount });
    }

    /// Temporary strength, creatures only.
    pub fn gain_strength(&mut self, target: TargetRef, amount: i32) -> Result<(), RuleError> {
        let TargetRef::Creature(index) = target else {
            self.narrate("Strength can only target creatures.");
            return Err(RuleError::InvalidTarget);
        };
        let amount = amount.max(0);
        let creature = self
            .creatures
            .get_mut(index)
            .ok_or(RuleError::CreatureNotFound { index })?;
        creature.temporary_strength += amount;
        self.record_event(GameEvent::StrengthGained {
            creature: index,
            amount,
        });
        Ok(())
    }

    /// Temporary dexterity, creatures only.
    pub fn gain_dexterity(&mut self, target: TargetRef, amount: i32) -> Result<(), RuleError> {
        let TargetRef::Creature(index) = target else {
            self.narrate("Dexterity can only target creatures.");
            return Err(RuleError::InvalidTarget);
        };
        let amount = amount.max(0);
        let creature = self
            .creatures
            .get_mut(index)
            .ok_or(RuleError::CreatureNotFound { index })?;
        creature.temporary_dexterity += amount;
        self.record_event(GameEvent::DexterityGained {
            creature: index,
            amount,
        });
        Ok(())
    }

    /// Marks the creature summoned. Block and modifiers are left as they are.
    pub fn summon_creature(&mut self, id: CreatureId) -> Result<(), RuleError> {
        let index = self
            .creature_index(id)
            .ok_or(RuleError::UnknownCreature { creature: id })?;
        let creature = &mut self.creatures[index];
        if creature.hp <= 0 {
            return Err(RuleError::CreatureDefeated { creature: id });
        }
        creature.alive = true;
        self.record_event(GameEvent::CreatureSummoned { creature: id });
        Ok(())
    }

    pub fn dismiss_creature(&mut self, index: usize) {
        if let Some(creature) = self.creatures.get_mut(index) {
            if creature.alive {
                creature.alive = false;
                creature.block = 0;
                let id = creature.id;
                self.record_event(GameEvent::CreatureDismissed { creature: id });
            }
        }
    }

    pub fn apply_permanent_buff(
        &mut self,
        id: CreatureId,
        attack_delta: i32,
        block_delta: i32,
    ) -> Result<(), RuleError> {
        let index = self
            .creature_index(id)
            .ok_or(RuleError::UnknownCreature { creature: id })?;
        let mods = &mut self.creatures[index].perm_mods;
        mods.attack += attack_delta;
        mods.block += block_delta;
        self.record_event(GameEvent::PermanentBuffApplied {
            creature: id,
            attack_delta,
            block_delta,
        });
        Ok(())
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.combat.turn.phase = phase;
        let turn = self.combat.turn.number;
        self.record_event(GameEvent::PhaseChanged { phase, turn });
    }

    /// Player and creature block.
    pub fn reset_team_block(&mut self) {
        self.player.block = 0;
        for creature in &mut self.creatures {
            creature.block = 0;
        }
    }

    pub fn reset_enemy_block(&mut self) {
        for enemy in &mut self.enemies {
            enemy.block = 0;
        }
    }

    pub fn clear_all_blocks(&mut self) {
        self.reset_team_block();
        self.reset_enemy_block();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::EnemyId;
    use crate::game::state::Enemy;

    fn state_with_enemy() -> GameState {
        let mut state = GameState::default();
        state
            .enemies
            .push(Enemy::from_definition(EnemyId::Grunt.definition()));
        state
    }

    #[test]
    fn block_absorbs_before_hp_for_every_split() {
        for block in 0..=8 {
            for damage in 0..=16 {
                let mut state = state_with_enemy();
                state.enemies[0].block = block;
                let hp = state.enemies[0].hp;
                let outcome = state
                    .deal_damage(Some(TargetRef::Player), TargetRef::Enemy(0), damage)
                    .unwrap();
                let enemy = &state.enemies[0];
                if damage <= block {
                    assert_eq!(enemy.hp, hp);
                    assert_eq!(enemy.block, block - damage);
                } else {
                    assert_eq!(enemy.block, 0);
                    assert_eq!(enemy.hp, (hp - (damage - block)).max(0));
                }
                assert_eq!(outcome.absorbed, damage.min(block));
            }
        }
    }

    #[test]
    fn hp_never_goes_negative() {
        let mut state = GameState::default();
        state.player.hp = 3;
        let outcome = state.deal_damage(None, TargetRef::Player, 10).unwrap();
        assert_eq!(state.player.hp, 0);
        assert_eq!(outcome.hp_lost, 3);
    }

    #[test]
    fn creature_at_zero_hp_is_unsummoned() {
        let mut state = GameState::default();
        state.creatures[0].alive = true;
        state.creatures[0].hp = 4;
        state.deal_damage(None, TargetRef::Creature(0), 4);
        assert_eq!(state.creatures[0].hp, 0);
        assert!(!state.creatures[0].alive);
        assert!(state
            .event_log
            .iter()
            .any(|e| matches!(e, GameEvent::CreatureFell { .. })));
    }

    #[test]
    fn damage_to_missing_target_is_a_no_op() {
        let mut state = GameState::default();
        let before = state.clone();
        assert!(state.deal_damage(None, TargetRef::Enemy(3), 5).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn failed_spend_does_not_mutate() {
        let mut state = GameState::default();
        state.player.energy = 1;
        let err = state.spend_energy(2).unwrap_err();
        assert_eq!(
            err,
            RuleError::InsufficientEnergy {
                required: 2,
                available: 1
            }
        );
        assert_eq!(state.player.energy, 1);
        assert!(state.spend_energy(1).is_ok());
        assert_eq!(state.player.energy, 0);
    }

    #[test]
    fn block_stacks_without_cap() {
        let mut state = GameState::default();
        state.gain_block(TargetRef::Player, 4);
        state.gain_block(TargetRef::Player, 40);
        assert_eq!(state.player.block, 44);
    }

    #[test]
    fn stat_grants_are_creature_only_and_temporary() {
        let mut state = GameState::default();
        assert_eq!(
            state.gain_strength(TargetRef::Player, 2),
            Err(RuleError::InvalidTarget)
        );
        assert_eq!(state.log.last().map(String::as_str), Some("Strength can only target creatures."));
        assert!(state.gain_dexterity(TargetRef::Enemy(0), 2).is_err());

        state.gain_strength(TargetRef::Creature(1), 2).unwrap();
        state.gain_dexterity(TargetRef::Creature(1), 3).unwrap();
        assert_eq!(state.creatures[1].temporary_strength, 2);
        assert_eq!(state.creatures[1].temporary_dexterity, 3);
        assert_eq!(state.creatures[1].strength, 0);
        assert_eq!(state.creatures[1].dexterity, 0);
    }

    #[test]
    fn cannot_summon_a_fallen_creature() {
        let mut state = GameState::default();
        state.creatures[0].alive = true;
        state.creatures[0].hp = 0;
        assert_eq!(
            state.summon_creature(CreatureId::CreatureA),
            Err(RuleError::CreatureDefeated {
                creature: CreatureId::CreatureA
            })
        );

        state.creatures[1].block = 3;
        state.summon_creature(CreatureId::CreatureB).unwrap();
        assert!(state.creatures[1].alive);
        assert_eq!(state.creatures[1].block, 3);
    }

    #[test]
    fn permanent_buff_accumulates() {
        let mut state = GameState::default();
        state
            .apply_permanent_buff(CreatureId::CreatureA, 2, 0)
            .unwrap();
        state
            .apply_permanent_buff(CreatureId::CreatureA, 2, 1)
            .unwrap();
        assert_eq!(state.creatures[0].perm_mods.attack, 4);
        assert_eq!(state.creatures[0].perm_mods.block, 1);
    }
}
