//! JSON canónico: claves de objetos ordenadas y sin espacios, para que dos
//! valores iguales produzcan siempre el mismo texto (y el mismo hash).

use serde_json::Value;
use std::collections::BTreeMap;

pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let sorted: BTreeMap<&String, String> = map.iter().map(|(k, v)| (k, to_canonical_json(v))).collect();
            let items: Vec<String> = sorted.into_iter()
                                           .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), v))
                                           .collect();
            format!("{{{}}}", items.join(","))
        }
        // escalares: la serialización de serde_json ya es estable
        scalar => scalar.to_string(),
    }
}
