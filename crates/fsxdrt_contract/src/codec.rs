use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to serialize value to JSON: {0}")]
    JsonSerialize(#[source] serde_json::Error),
}

/// Pretty JSON with object keys sorted at every depth, so logged requests
/// and printed responses diff cleanly between runs.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, CodecError> {
    let json = serde_json::to_value(value).map_err(CodecError::JsonSerialize)?;
    serde_json::to_string_pretty(&normalize_json(json)).map_err(CodecError::JsonSerialize)
}

fn normalize_json(value: Value) -> Value {
    match value {
        Value::Object(obj) => {
            let mut entries: Vec<(String, Value)> = obj.into_iter().collect();
            entries.sort_by(|left, right| left.0.cmp(&right.0));

            let mut normalized = Map::new();
            for (key, item) in entries {
                normalized.insert(key, normalize_json(item));
            }
            Value::Object(normalized)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_json).collect()),
        primitive => primitive,
    }
}

#[cfg(test)]
mod tests {
    use super::to_canonical_json;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Nested {
        beta: &'static str,
        alpha: &'static str,
    }

    #[derive(Serialize)]
    struct Sample {
        zulu: &'static str,
        nested: Vec<Nested>,
    }

    #[test]
    fn keys_are_sorted_at_every_depth() {
        let sample = Sample {
            zulu: "z",
            nested: vec![Nested {
                beta: "b",
                alpha: "a",
            }],
        };

        let rendered = to_canonical_json(&sample).expect("render");
        let nested_pos = rendered.find("\"nested\"").expect("nested key");
        let zulu_pos = rendered.find("\"zulu\"").expect("zulu key");
        let alpha_pos = rendered.find("\"alpha\"").expect("alpha key");
        let beta_pos = rendered.find("\"beta\"").expect("beta key");

        assert!(nested_pos < zulu_pos);
        assert!(alpha_pos < beta_pos);
    }
}
