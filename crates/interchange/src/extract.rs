//! Prioritized field extraction for a single feature.

use croptrail_core::{EntityRecord, FieldPriorities};
use serde_json::Value;

/// Build an [`EntityRecord`] from one feature object.
///
/// For each attribute the candidate property names are tried in order and
/// the first one holding a usable value wins. Ids are keyed by their text,
/// so `1`, `1.0` and `"1"` name the same parcel. A feature with no usable id
/// still yields a record (with `id: None`); dropping it is the trajectory
/// builder's job so the drop is counted.
pub fn extract_record(feature: &Value, fields: &FieldPriorities) -> EntityRecord {
    let props = feature.get("properties").filter(|p| p.is_object());

    let mut id = first_match(props, &fields.id, id_value);
    if id.is_none() && fields.use_feature_id {
        id = feature.get("id").and_then(id_value);
    }

    EntityRecord {
        id,
        crop_code: first_match(props, &fields.crop_code, code_value),
        name: first_match(props, &fields.name, name_value),
        area: first_match(props, &fields.area, area_value),
        geometry: feature.get("geometry").cloned().unwrap_or(Value::Null),
    }
}

fn first_match<T>(
    props: Option<&Value>,
    candidates: &[String],
    convert: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let props = props?;
    candidates
        .iter()
        .filter_map(|name| props.get(name))
        .find_map(convert)
}

fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| match integral(f) {
                    Some(i) => i.to_string(),
                    None => f.to_string(),
                })
            }
        }
        _ => None,
    }
}

fn code_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn name_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn area_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}
