//! Compiles the public `Predicate` grammar into the adapter-native
//! `CompiledPredicate` form.
//!
//! Leaf paths are dotted field names into the stored `config` payload, so
//! `"a.b"` compiles to the document path `config.a.b`. Empty `And`/`Or`
//! groups are rejected outright rather than treated as vacuously
//! true/false, since a client submitting one almost certainly made a
//! mistake and silent pass-through would be worse than a loud error.

use crate::error::ConfigError;
use crate::filter::predicate::{CompiledPredicate, Predicate};

/// Compile a client-submitted predicate into its adapter-native form.
pub fn compile_predicate(predicate: &Predicate) -> Result<CompiledPredicate, ConfigError> {
    match predicate {
        Predicate::Relational { lhs, op, rhs } => {
            if lhs.trim().is_empty() {
                return Err(ConfigError::invalid_argument(
                    "predicate field path must not be empty",
                ));
            }
            let mut path = vec!["config".to_string()];
            path.extend(lhs.split('.').map(str::to_string));
            Ok(CompiledPredicate::Relational {
                path,
                op: *op,
                rhs: rhs.clone(),
            })
        }
        Predicate::And(children) => {
            if children.is_empty() {
                return Err(ConfigError::invalid_argument(
                    "AND predicate must have at least one child",
                ));
            }
            let compiled = children
                .iter()
                .map(compile_predicate)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CompiledPredicate::And(compiled))
        }
        Predicate::Or(children) => {
            if children.is_empty() {
                return Err(ConfigError::invalid_argument(
                    "OR predicate must have at least one child",
                ));
            }
            let compiled = children
                .iter()
                .map(compile_predicate)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CompiledPredicate::Or(compiled))
        }
        Predicate::Not(child) => Ok(CompiledPredicate::Not(Box::new(compile_predicate(child)?))),
    }
}
