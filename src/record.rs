//! Data record flowing through a pipeline.

use std::collections::BTreeMap;

use bytes::Bytes;

/// A named chunk of data with an optional text annotation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// Record name, e.g. a generated file name.
    pub name: String,
    /// Raw content.
    pub data: Bytes,
    /// Annotation produced by an external responder.
    pub annotation: Option<String>,
    /// Free-form key/value metadata.
    pub metadata: BTreeMap<String, String>,
}

impl Record {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            annotation: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
