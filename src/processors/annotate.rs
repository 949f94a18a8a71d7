use bytes::Bytes;

use crate::error::ProcessError;
use crate::pipeline::CallProcessor;
use crate::record::Record;

/// Sends a record's data out and stores the UTF-8 reply as its annotation.
///
/// Name, data and metadata are carried over unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextAnnotator;

impl CallProcessor for TextAnnotator {
    type Item = Record;

    fn encode(&self, item: &Record) -> Result<Bytes, ProcessError> {
        Ok(item.data.clone())
    }

    fn process(&mut self, item: Record, payload: Bytes) -> Result<Vec<Record>, ProcessError> {
        let annotation = String::from_utf8(payload.to_vec())?;
        Ok(vec![Record {
            annotation: Some(annotation),
            ..item
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_sends_data() {
        let record = Record::new("1.wav", Bytes::from_static(b"RIFF"));

        assert_eq!(
            TextAnnotator.encode(&record).unwrap(),
            Bytes::from_static(b"RIFF")
        );
    }

    #[test]
    fn test_reply_becomes_annotation() {
        let record = Record::new("1.wav", Bytes::from_static(b"RIFF")).with_metadata("lang", "en");

        let output = TextAnnotator
            .process(record, Bytes::from_static("hallo welt".as_bytes()))
            .unwrap();

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].name, "1.wav");
        assert_eq!(output[0].data, Bytes::from_static(b"RIFF"));
        assert_eq!(output[0].annotation.as_deref(), Some("hallo welt"));
        assert_eq!(output[0].metadata.get("lang").map(String::as_str), Some("en"));
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let record = Record::new("1.wav", Bytes::new());

        let result = TextAnnotator.process(record, Bytes::from_static(&[0xc3, 0x28]));

        assert!(result.is_err());
    }
}
