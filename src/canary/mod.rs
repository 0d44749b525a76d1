pub mod evaluator;

pub use evaluator::{assess, CanaryEvaluator, CanarySpec};
