//! 战斗随机源：洗牌、敌人数量、意图掷骰与目标选择都从这里取数。

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Bounded integer source consumed by the rules core.
///
/// Only reproducibility matters: the same seed and the same call order must
/// produce the same combat.
pub trait RandomSource {
    /// Integer in `[min, max]`, inclusive on both ends.
    fn range(&mut self, min: i32, max: i32) -> i32;

    /// Fisher–Yates, walking from the back of the slice.
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range(0, i as i32) as usize;
            items.swap(i, j);
        }
    }
}

/// ChaCha8 gives the same stream for a seed on wasm32 and on native targets.
#[derive(Debug, Clone)]
pub struct SeededRng {
    rng: ChaCha8Rng,
}

impl SeededRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRng {
    fn range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

/// Replays a fixed list of rolls, clamped into the requested range.
/// Falls back to `min` once the script runs out.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedRng {
    rolls: std::collections::VecDeque<i32>,
}

#[cfg(test)]
impl ScriptedRng {
    pub(crate) fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    pub(crate) fn push(&mut self, roll: i32) {
        self.rolls.push_back(roll);
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRng {
    fn range(&mut self, min: i32, max: i32) -> i32 {
        match self.rolls.pop_front() {
            Some(roll) => roll.clamp(min, max.max(min)),
            None => min,
        }
    }
}
