//! 敌人 AI（意图规划、目标选择）。

pub mod intents;

pub use intents::{choose_enemy_target, needs_retarget, plan_enemy_intents};
