//! JSON output on stdout.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

/// Print `value` as pretty JSON, stamped with the current UTC time when it
/// is an object without a timestamp of its own.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut json = serde_json::to_value(value)?;
    stamp(&mut json, Utc::now().to_rfc3339());
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn stamp(json: &mut Value, timestamp: String) {
    if let Value::Object(map) = json {
        map.entry("timestamp")
            .or_insert_with(|| Value::String(timestamp));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stamp_objects_only() {
        let mut object = json!({ "total": 3 });
        stamp(&mut object, "2024-06-01T00:00:00+00:00".to_string());
        assert_eq!(object["timestamp"], "2024-06-01T00:00:00+00:00");
        assert_eq!(object["total"], 3);

        let mut stamped = json!({ "timestamp": "2024-05-01T06:30:00Z" });
        stamp(&mut stamped, "2024-06-01T00:00:00+00:00".to_string());
        assert_eq!(stamped["timestamp"], "2024-05-01T06:30:00Z");

        let mut list = json!([1, 2]);
        stamp(&mut list, "2024-06-01T00:00:00+00:00".to_string());
        assert_eq!(list, json!([1, 2]));
    }
}
