use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::Serialize;

use crate::config::BroadcastConfig;
use crate::error::ProcessError;
use crate::pipeline::PayloadEncoder;
use crate::record::Record;

#[derive(Serialize)]
struct RecordDocument<'a> {
    name: &'a str,
    annotation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

/// Serializes records as JSON objects, optionally with base64 data.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder {
    include_data: bool,
}

impl JsonEncoder {
    pub fn new(include_data: bool) -> Self {
        Self { include_data }
    }

    pub fn from_config(config: &BroadcastConfig) -> Self {
        Self::new(config.include_data)
    }
}

impl PayloadEncoder for JsonEncoder {
    type Item = Record;

    fn encode(&self, item: &Record) -> Result<Bytes, ProcessError> {
        let document = RecordDocument {
            name: &item.name,
            annotation: item.annotation.as_deref(),
            data: self.include_data.then(|| STANDARD.encode(&item.data)),
        };
        Ok(Bytes::from(serde_json::to_vec(&document)?))
    }
}
