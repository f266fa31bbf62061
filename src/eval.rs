/// Evaluation score. +ve is side to move better and -ve is worse
pub type Eval = i32;
pub const EVAL_MAX: Eval = i32::MAX / 2;
pub const EVAL_MIN: Eval = -EVAL_MAX;
