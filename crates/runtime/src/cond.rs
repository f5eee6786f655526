//! Pure GATE condition evaluation: `(condition string, current state) ->
//! bool`. Kept context-free so it never needs to reach back into the VM
//! beyond the stack depth and bindings it's handed.

use indexmap::IndexMap;

use crate::error::RuntimeError;

/// Evaluates a pre-canonicalized condition string against `depth` and
/// `bindings`. Recognized forms: `depth OP N` (`OP` one of `<`, `>`, `==`),
/// `bound K`, `unbound K`. Anything else is a `RuntimeError::Condition`.
pub fn evaluate(
    condition: &str,
    depth: usize,
    bindings: &IndexMap<String, String>,
) -> Result<bool, RuntimeError> {
    let parts: Vec<&str> = condition.trim().split_whitespace().collect();

    match parts.as_slice() {
        ["depth", op, operand] => {
            let value: usize = operand.parse().map_err(|_| {
                RuntimeError::Condition(format!(
                    "invalid numeric value in condition: {condition}"
                ))
            })?;
            match *op {
                "<" => Ok(depth < value),
                ">" => Ok(depth > value),
                "==" => Ok(depth == value),
                _ => Err(RuntimeError::Condition(format!(
                    "invalid operator in condition: {op}"
                ))),
            }
        }
        ["bound", key] => Ok(bindings.contains_key(*key)),
        ["unbound", key] => Ok(!bindings.contains_key(*key)),
        _ => Err(RuntimeError::Condition(format!(
            "unknown condition type: {condition}"
        ))),
    }
}
