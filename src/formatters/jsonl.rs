use crate::fields::Field;
use crate::formatters::RecordFormatter;
use crate::record::CompletionRecord;
use serde_json::{Map, Value};

/// One flat JSON object per record, keys in the selected order
#[derive(Debug, Clone)]
pub struct JsonlFormatter {
    keys: Vec<Field>,
}

impl JsonlFormatter {
    /// Every known field, in canonical order
    pub fn all_fields() -> Self {
        JsonlFormatter {
            keys: Field::ALL.to_vec(),
        }
    }

    pub fn with_keys(keys: Vec<Field>) -> Self {
        JsonlFormatter { keys }
    }
}

impl RecordFormatter for JsonlFormatter {
    fn format_record(&self, record: &CompletionRecord) -> String {
        // serde_json is built with preserve_order, so insertion order is kept
        let mut obj = Map::with_capacity(self.keys.len());
        for key in &self.keys {
            obj.insert(key.name().to_string(), Value::String(record.get(*key).to_string()));
        }
        Value::Object(obj).to_string()
    }
}
