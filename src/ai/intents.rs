//! 敌人意图规划：每个存活敌人在玩家回合开始时预先决定攻击或格挡。
//!
//! Intents are a plan, shown to the player before they resolve. The enemy
//! phase resolves the same intent; only its attack target may be corrected.

use crate::game::{EnemyIntent, GameEvent, GameState, RandomSource, TargetRef};

/// A random active creature if any exist, otherwise the player.
pub fn choose_enemy_target<R: RandomSource>(state: &GameState, rng: &mut R) -> TargetRef {
    let active = state.active_creature_indices();
    if active.is_empty() {
        return TargetRef::Player;
    }
    let pick = rng.range(0, active.len() as i32 - 1) as usize;
    TargetRef::Creature(active[pick.min(active.len() - 1)])
}

/// A planned attack target is stale if it names a creature that can no
/// longer be hit, or the player while any creature is standing: creatures
/// always draw fire first.
pub fn needs_retarget(state: &GameState, target: TargetRef) -> bool {
    if !target.is_friendly() {
        return true;
    }
    match target {
        TargetRef::Creature(index) => !state
            .creatures
            .get(index)
            .map(|creature| creature.is_active())
            .unwrap_or(false),
        _ => state.any_active_creature(),
    }
}

/// Coin-flip every living enemy between attacking and blocking. Dead enemies
/// lose their intent.
pub fn plan_enemy_intents<R: RandomSource>(state: &mut GameState, rng: &mut R) {
    for index in 0..state.enemies.len() {
        if !state.enemies[index].is_alive() {
            state.enemies[index].intent = None;
            continue;
        }

        let attacks = rng.range(0, 1) == 0;
        let intent = if attacks {
            EnemyIntent::Attack {
                amount: state.enemies[index].attack_value,
                target: choose_enemy_target(state, rng),
            }
        } else {
            EnemyIntent::Block {
                amount: state.enemies[index].block_value,
            }
        };
        state.enemies[index].intent = Some(intent);

        let name = state.enemies[index].name.clone();
        let line = match intent {
            EnemyIntent::Attack { amount, target } => {
                format!("{name} plans Attack {amount} → {}.", state.target_label(target))
            }
            EnemyIntent::Block { amount } => format!("{name} plans Block {amount}."),
        };
        state.narrate(line);
        state.record_event(GameEvent::IntentPlanned {
            enemy: index,
            intent,
        });
    }
}
