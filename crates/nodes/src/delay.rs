//! Delay step — the only operation in the core allowed to suspend a run.

use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Hard ceiling on a single delay, so a mis-configured node cannot hold an
/// invocation hostage.  The returned `delayedMs` reflects this cap, not
/// the requested duration.
pub const MAX_DELAY_MS: u64 = 5_000;

/// Convert `duration` in `unit` to the capped number of milliseconds
/// actually waited.  Unrecognised units fall back to seconds.
pub fn delay_millis(duration: f64, unit: &str) -> u64 {
    let multiplier: f64 = match unit {
        "minutes" => 60_000.0,
        "hours" => 3_600_000.0,
        // "seconds" and anything else
        _ => 1_000.0,
    };

    let requested = (duration * multiplier).max(0.0);
    (requested as u64).min(MAX_DELAY_MS)
}

/// Suspend for the configured (capped) duration and return a timestamped
/// completion marker carrying the input through.
pub async fn wait(config: &Value, input: &Value) -> Value {
    // Durations arrive as numbers or numeric strings, same coercion the
    // condition evaluator applies to its operands.
    let duration = match config.get("duration") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(1.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(1.0),
        _ => 1.0,
    };
    let unit = config
        .get("unit")
        .and_then(Value::as_str)
        .unwrap_or("seconds");

    let millis = delay_millis(duration, unit);
    debug!("delaying for {millis}ms (requested {duration} {unit})");
    tokio::time::sleep(Duration::from_millis(millis)).await;

    json!({
        "delayedMs": millis,
        "completedAt": Utc::now().to_rfc3339(),
        "inputData": input,
    })
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seconds_convert_to_milliseconds() {
        assert_eq!(delay_millis(2.0, "seconds"), 2_000);
        assert_eq!(delay_millis(0.5, "seconds"), 500);
    }

    #[test]
    fn minutes_and_hours_hit_the_cap() {
        assert_eq!(delay_millis(1.0, "minutes"), MAX_DELAY_MS);
        assert_eq!(delay_millis(100.0, "hours"), MAX_DELAY_MS);
    }

    #[test]
    fn unknown_unit_falls_back_to_seconds() {
        assert_eq!(delay_millis(3.0, "fortnights"), 3_000);
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        assert_eq!(delay_millis(-10.0, "seconds"), 0);
    }

    // start_paused lets the runtime auto-advance the clock, so capping can
    // be asserted without really sleeping five seconds.
    #[tokio::test(start_paused = true)]
    async fn wait_reports_the_capped_delay() {
        let output = wait(
            &json!({ "duration": 100, "unit": "hours" }),
            &json!({ "x": 1 }),
        )
        .await;

        assert_eq!(output["delayedMs"], json!(MAX_DELAY_MS));
        assert_eq!(output["inputData"], json!({ "x": 1 }));
        assert!(output["completedAt"].is_string());
    }

    #[tokio::test(start_paused = true)]
    async fn wait_defaults_to_one_second() {
        let output = wait(&json!({}), &Value::Null).await;
        assert_eq!(output["delayedMs"], json!(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn string_durations_parse_numerically() {
        let output = wait(
            &json!({ "duration": "2", "unit": "seconds" }),
            &Value::Null,
        )
        .await;
        assert_eq!(output["delayedMs"], json!(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn non_numeric_string_duration_falls_back_to_the_default() {
        let output = wait(
            &json!({ "duration": "soon", "unit": "seconds" }),
            &Value::Null,
        )
        .await;
        assert_eq!(output["delayedMs"], json!(1_000));
    }
}
