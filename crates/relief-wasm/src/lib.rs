use wasm_bindgen::prelude::*;
use relief_core::generator::{GenerationParams, TerrainGenerator};
use relief_core::heightfield::HeightField;

fn parse_params(params_json: &str) -> Result<GenerationParams, JsValue> {
    GenerationParams::from_json(params_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid params: {e}")))
}

fn run(params_json: &str) -> Result<HeightField, JsValue> {
    let params = parse_params(params_json)?;
    TerrainGenerator::new()
        .generate(&params)
        .map(|result| result.heightfield)
        .map_err(|e| JsValue::from_str(&format!("Generation failed: {e}")))
}

/// Generate a heightfield from the given parameters JSON.
/// Returns the row-major elevations as a Float64Array; its length is side².
#[wasm_bindgen]
pub fn generate(params_json: &str) -> Result<js_sys::Float64Array, JsValue> {
    let hf = run(params_json)?;
    let values: Vec<f64> = hf.data().iter().map(|&v| v as f64).collect();
    Ok(js_sys::Float64Array::from(values.as_slice()))
}

/// Generate a heightfield and return it as a `{ n, side, data }` object.
#[wasm_bindgen]
pub fn generate_json(params_json: &str) -> Result<JsValue, JsValue> {
    let hf = run(params_json)?;
    serde_wasm_bindgen::to_value(&hf).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Clip a serialized heightfield to `sea_level` and return it re-serialized.
#[wasm_bindgen]
pub fn clip_to_sea_level(heightfield_json: &str, sea_level: i32) -> Result<String, JsValue> {
    let mut hf: HeightField = serde_json::from_str(heightfield_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid heightfield: {e}")))?;
    hf.clip_to_sea_level(i64::from(sea_level));
    serde_json::to_string(&hf).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn generate_returns_side_squared_values() {
        let out = generate(r#"{"n": 3, "seed": 1}"#).unwrap();
        assert_eq!(out.length(), 81);
    }

    #[wasm_bindgen_test]
    fn malformed_heightfield_is_rejected() {
        assert!(clip_to_sea_level(r#"{"n":2,"side":5,"data":[0,0,0]}"#, 10).is_err());
    }

    #[wasm_bindgen_test]
    fn invalid_params_are_rejected() {
        assert!(generate(r#"{"n": 0}"#).is_err());
    }
}
