//! Codec between plain JSON field maps and the typed value envelopes the
//! Firestore REST API speaks (`{"stringValue": ...}` and friends).
use serde_json::{Map, Value, json};

use engine::store::Fields;

/// Wraps a plain JSON value into its typed Firestore envelope.
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => match number.as_i64() {
            // integerValue travels as a string on the wire
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number.as_f64() }),
        },
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Wraps every field of a document for a write request body.
pub fn encode_fields(fields: &Fields) -> Value {
    let wrapped: Map<String, Value> = fields
        .iter()
        .map(|(name, value)| (name.clone(), encode(value)))
        .collect();
    Value::Object(wrapped)
}

/// Unwraps a typed Firestore value back into plain JSON.
pub fn decode(value: &Value) -> Result<Value, String> {
    let Some(envelope) = value.as_object() else {
        return Err(format!("expected a typed value, got {value}"));
    };
    let Some((kind, inner)) = envelope.iter().next() else {
        return Err("empty value envelope".to_string());
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" => Ok(inner.clone()),
        "integerValue" => {
            let text = inner
                .as_str()
                .ok_or_else(|| format!("integerValue is not a string: {inner}"))?;
            let integer: i64 = text
                .parse()
                .map_err(|_| format!("unparsable integerValue: {text}"))?;
            Ok(json!(integer))
        }
        "doubleValue" => Ok(inner.clone()),
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let decoded: Result<Vec<Value>, String> = items.iter().map(decode).collect();
            Ok(Value::Array(decoded?))
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            Ok(Value::Object(decode_fields(&fields)?))
        }
        other => Err(format!("unsupported value kind: {other}")),
    }
}

/// Unwraps the `fields` map of a fetched document.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, String> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode(value)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_a_budget_record() {
        let mut fields = Fields::new();
        fields.insert("category".to_string(), json!("Food"));
        fields.insert("total".to_string(), json!(1000));
        fields.insert("spent".to_string(), json!(12.5));

        let wrapped = encode_fields(&fields);
        assert_eq!(wrapped["category"], json!({ "stringValue": "Food" }));
        assert_eq!(wrapped["total"], json!({ "integerValue": "1000" }));
        assert_eq!(wrapped["spent"], json!({ "doubleValue": 12.5 }));
    }

    #[test]
    fn decodes_nested_values() {
        let wrapped = json!({
            "mapValue": { "fields": {
                "name": { "stringValue": "Lunch" },
                "amount": { "integerValue": "250" },
                "tags": { "arrayValue": { "values": [
                    { "stringValue": "work" },
                    { "booleanValue": true },
                ] } },
            } }
        });

        let plain = decode(&wrapped).unwrap();
        assert_eq!(
            plain,
            json!({ "name": "Lunch", "amount": 250, "tags": ["work", true] })
        );
    }

    #[test]
    fn timestamps_decode_to_strings() {
        let wrapped = json!({ "timestampValue": "2024-05-01T00:00:00Z" });
        assert_eq!(decode(&wrapped).unwrap(), json!("2024-05-01T00:00:00Z"));
    }

    #[test]
    fn rejects_garbage_envelopes() {
        assert!(decode(&json!("bare")).is_err());
        assert!(decode(&json!({ "geoPointValue": {} })).is_err());
        assert!(decode(&json!({ "integerValue": "ten" })).is_err());
    }
}
