//! Condition evaluation — a pure verdict over the carried data.
//!
//! Always returns an outcome, never errors: an unknown operator evaluates
//! to `passed = false`.  This is deliberately different from the action
//! dispatcher's unknown-type policy (which acknowledges with success); the
//! two defaults are separate, documented behaviours.

use serde::Serialize;
use serde_json::{json, Value};

/// Result of evaluating one condition node.
///
/// Serialized as the node's output, so the field names are wire names
/// (`fieldValue`).  The traversal engine only inspects `passed`; the rest
/// is kept so a stored execution trace shows what was compared.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionOutcome {
    pub passed: bool,
    pub field: String,
    pub operator: String,
    pub value: Value,
    pub field_value: Value,
}

impl From<ConditionOutcome> for Value {
    fn from(outcome: ConditionOutcome) -> Self {
        json!({
            "passed": outcome.passed,
            "field": outcome.field,
            "operator": outcome.operator,
            "value": outcome.value,
            "fieldValue": outcome.field_value,
        })
    }
}

/// Evaluate `config` (`{field, operator, value}`) against `input`.
///
/// The field value is looked up by key when `input` is an object;
/// otherwise the whole input stands in for it.
pub fn evaluate(config: &Value, input: &Value) -> ConditionOutcome {
    let field = config.get("field").and_then(Value::as_str).unwrap_or("");
    let operator = config
        .get("operator")
        .and_then(Value::as_str)
        .unwrap_or("equals");
    let value = config.get("value").cloned().unwrap_or(Value::Null);

    let field_value = match input.as_object() {
        Some(map) => map.get(field).cloned().unwrap_or(Value::Null),
        None => input.clone(),
    };

    let passed = match operator {
        "equals" => loose_eq(&field_value, &value),
        "not_equals" => !loose_eq(&field_value, &value),
        "greater_than" => compare_numeric(&field_value, &value, |a, b| a > b),
        "less_than" => compare_numeric(&field_value, &value, |a, b| a < b),
        "contains" => as_text(&field_value).contains(&as_text(&value)),
        // Unknown operators fail closed.
        _ => false,
    };

    ConditionOutcome {
        passed,
        field: field.to_string(),
        operator: operator.to_string(),
        value,
        field_value,
    }
}

/// Loose equality: structural first, then numeric, then textual.
///
/// `150 == "150"` and `"done" == "done"` both hold; `{a: 1}` only equals a
/// structurally identical object.
fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x == y;
    }
    match (a, b) {
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => false,
        _ => as_text(a) == as_text(b),
    }
}

fn compare_numeric(a: &Value, b: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => cmp(x, y),
        // Either side failed to coerce — the comparison is false, full stop.
        _ => false,
    }
}

/// Numeric coercion: numbers pass through, numeric strings parse,
/// booleans map to 1/0.  Everything else has no numeric reading.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// String coercion: strings pass through unquoted, everything else uses
/// its JSON rendering.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
