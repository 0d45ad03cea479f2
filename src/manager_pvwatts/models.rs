use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Array azimuth in degrees, south facing
pub const AZIMUTH: f64 = 180.0;
/// Array tilt in degrees from horizontal
pub const TILT: f64 = 25.0;
/// Standard module type
pub const MODULE_TYPE: u8 = 0;
/// System losses in percent
pub const LOSSES: f64 = 14.0;
/// Fixed roof mount
pub const ARRAY_TYPE: u8 = 1;

/// Physical array parameters sent along with every request
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ArraySetup {
    pub azimuth: f64,
    pub tilt: f64,
    pub module_type: u8,
    pub losses: f64,
    pub array_type: u8,
}

impl Default for ArraySetup {
    fn default() -> Self {
        Self {
            azimuth: AZIMUTH,
            tilt: TILT,
            module_type: MODULE_TYPE,
            losses: LOSSES,
            array_type: ARRAY_TYPE,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct PvWattsResponse {
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub warnings: Vec<Value>,
    pub outputs: Option<Outputs>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Outputs {
    pub ac_annual: Option<f64>,
}

/// Returns a message from the API as plain text, non string entries are given as json
pub fn message_text(message: &Value) -> String {
    match message {
        Value::String(s) => s.to_string(),
        other => other.to_string(),
    }
}
