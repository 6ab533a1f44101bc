//! Hash helpers (blake3, salida hex).

use blake3::Hasher;
use serde_json::{json, Value};

use super::to_canonical_json;
use crate::constants::ENGINE_VERSION;
use crate::step::StepConfig;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hash de un valor JSON sobre su forma canónica.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

/// Hash de la definición de un pipeline: versión del motor + configuraciones
/// en orden de ejecución. Los ids de step no participan.
pub fn definition_hash(configs: &[&StepConfig]) -> String {
    hash_value(&json!({
        "engine_version": ENGINE_VERSION,
        "steps": configs,
    }))
}
