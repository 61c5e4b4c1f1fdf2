//! Predicate grammar, compiler, and evaluator for `upsertCondition` and
//! filtered reads.

pub mod compiler;
pub mod predicate;

pub use compiler::compile_predicate;
pub use predicate::{CompiledPredicate, Predicate, RelOp, eval, like_match};
