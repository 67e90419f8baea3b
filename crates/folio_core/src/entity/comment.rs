//! Discussion comments.

use folio_codec::{CodecResult, RecordReader, RecordWriter, Ticks};

/// One comment in an article's discussion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Commenting account's name.
    pub sender: String,
    /// Comment text.
    pub content: String,
    /// True when an editor flagged the comment as a revision request.
    pub revision_requested: bool,
    /// When the comment was made.
    pub created: Ticks,
}

impl Comment {
    /// Builds a comment made now.
    pub fn new(sender: String, content: String, revision_requested: bool, created: Ticks) -> Self {
        Self {
            sender,
            content,
            revision_requested,
            created,
        }
    }

    pub(crate) fn encode(&self, writer: &mut RecordWriter) {
        writer.put_string(&self.sender);
        writer.put_string(&self.content);
        writer.put_bool(self.revision_requested);
        writer.put_ticks(self.created);
    }

    pub(crate) fn decode(reader: &mut RecordReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            sender: reader.get_string()?,
            content: reader.get_string()?,
            revision_requested: reader.get_bool()?,
            created: reader.get_ticks()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let comment = Comment::new(
            "bob5678aa".into(),
            "Needs a second pass.".into(),
            true,
            Ticks::from_unix_seconds(1_700_000_000),
        );

        let mut writer = RecordWriter::new();
        comment.encode(&mut writer);
        let bytes = writer.into_bytes();

        let mut reader = RecordReader::new(&bytes);
        assert_eq!(Comment::decode(&mut reader).unwrap(), comment);
        assert!(reader.is_empty());
    }
}
