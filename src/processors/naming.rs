use bytes::Bytes;

use crate::config::ListenerConfig;
use crate::error::ProcessError;
use crate::pipeline::ListenProcessor;
use crate::record::Record;

/// Wraps each received payload in a `Record` with a sequential name.
///
/// Names look like `<prefix>-<n><extension>`, or `<n><extension>` without a
/// prefix. Numbering starts at 1.
#[derive(Debug, Clone, Default)]
pub struct SequenceNamer {
    prefix: String,
    extension: String,
    counter: u64,
}

impl SequenceNamer {
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
            counter: 0,
        }
    }

    pub fn from_config(config: &ListenerConfig) -> Self {
        Self::new(config.prefix.clone(), config.extension.clone())
    }

    fn next_name(&mut self) -> String {
        self.counter += 1;
        if self.prefix.is_empty() {
            format!("{}{}", self.counter, self.extension)
        } else {
            format!("{}-{}{}", self.prefix, self.counter, self.extension)
        }
    }
}

impl ListenProcessor for SequenceNamer {
    type Output = Record;

    fn process(&mut self, payload: Bytes) -> Result<Vec<Record>, ProcessError> {
        Ok(vec![Record::new(self.next_name(), payload)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_without_prefix() {
        let mut namer = SequenceNamer::new("", ".wav");

        let first = namer.process(Bytes::from_static(b"a")).unwrap();
        let second = namer.process(Bytes::from_static(b"b")).unwrap();

        assert_eq!(first[0].name, "1.wav");
        assert_eq!(first[0].data, Bytes::from_static(b"a"));
        assert_eq!(second[0].name, "2.wav");
    }

    #[test]
    fn test_names_with_prefix() {
        let config = ListenerConfig {
            prefix: "mic".to_string(),
            ..ListenerConfig::default()
        };
        let mut namer = SequenceNamer::from_config(&config);

        let records = namer.process(Bytes::new()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "mic-1");
        assert!(records[0].annotation.is_none());
    }
}
