use crate::id::EmulationId;
use chrono::Utc;
use emulator_generator::SyntheticRecord;
use serde::{Deserialize, Serialize};

/// Wrapper published for every generated record.
///
/// Serialized as `{"emulation_id": ..., "timestamp": <epoch seconds>, "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub emulation_id: EmulationId,
    #[serde(rename = "timestamp")]
    pub produced_at_epoch_seconds: f64,
    #[serde(rename = "data")]
    pub payload: SyntheticRecord,
}

impl MessageEnvelope {
    /// Wrap `payload`, stamping it with the current time.
    pub fn new(emulation_id: EmulationId, payload: SyntheticRecord) -> Self {
        let produced_at_epoch_seconds = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
        Self {
            emulation_id,
            produced_at_epoch_seconds,
            payload,
        }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_wire_format() {
        let id = EmulationId::generate();
        let mut fields = serde_json::Map::new();
        fields.insert("transaction_id".to_string(), json!("tx-1"));
        let envelope = MessageEnvelope::new(id, SyntheticRecord::new(fields));

        let value: Value = serde_json::from_slice(&envelope.to_bytes().unwrap()).unwrap();

        assert_eq!(value["emulation_id"], json!(id.to_string()));
        assert_eq!(value["data"]["transaction_id"], json!("tx-1"));
        let timestamp = value["timestamp"].as_f64().unwrap();
        assert!((timestamp - Utc::now().timestamp() as f64).abs() < 60.0);
    }
}
