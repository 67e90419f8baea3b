//! Articles and the publication workflow.

use crate::error::{CoreError, CoreResult};
use folio_codec::{CodecError, CodecResult, RecordReader, RecordWriter, Ticks};
use uuid::Uuid;

/// On-disk layout without the revision-chain fields.
pub const ARTICLE_FORMAT_LEGACY: u8 = 1;
/// Current on-disk layout.
pub const ARTICLE_FORMAT_CURRENT: u8 = 2;

const SNIPPET_CHARS: usize = 150;

/// Where an article stands in the review workflow.
///
/// `UnderReview` is the only non-terminal state for a given record:
/// publishing and rejecting end its life, and requesting a revision
/// freezes it as `Revised` with a pointer to the replacement article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    /// Approved and publicly listed.
    Published,
    /// Submitted, awaiting an editor's decision.
    UnderReview,
    /// Declined by an editor.
    Rejected,
    /// Superseded by a newer revision.
    Revised,
}

impl PublishStatus {
    /// Decodes the wire byte.
    pub fn from_byte(byte: u8) -> CodecResult<Self> {
        match byte {
            0 => Ok(Self::Published),
            1 => Ok(Self::UnderReview),
            2 => Ok(Self::Rejected),
            3 => Ok(Self::Revised),
            value => Err(CodecError::InvalidTag {
                field: "publish status",
                value,
            }),
        }
    }

    /// Encodes the wire byte.
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Published => 0,
            Self::UnderReview => 1,
            Self::Rejected => 2,
            Self::Revised => 3,
        }
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::UnderReview => "under review",
            Self::Rejected => "rejected",
            Self::Revised => "revised",
        }
    }
}

/// One submitted article. Stored one file per article, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Identifier; also the file name.
    pub id: Uuid,
    /// Headline.
    pub title: String,
    /// Full text.
    pub body: String,
    /// Author's account name.
    pub author: String,
    /// Workflow state.
    pub status: PublishStatus,
    /// When the article was published; [`Ticks::MAX`] until then.
    pub publish_time: Ticks,
    /// When the article was submitted.
    pub upload_time: Ticks,
    /// The article this one revises, if any.
    pub previous_revision: Option<Uuid>,
    /// The revision superseding this one, if any.
    pub next_revision: Option<Uuid>,
}

impl Article {
    /// A fresh submission awaiting review.
    pub fn new_submission(
        id: Uuid,
        title: String,
        body: String,
        author: String,
        uploaded: Ticks,
    ) -> Self {
        Self {
            id,
            title,
            body,
            author,
            status: PublishStatus::UnderReview,
            publish_time: Ticks::MAX,
            upload_time: uploaded,
            previous_revision: None,
            next_revision: None,
        }
    }

    /// First characters of the body, for listings. Respects char
    /// boundaries.
    pub fn snippet(&self) -> &str {
        match self.body.char_indices().nth(SNIPPET_CHARS) {
            Some((index, _)) => &self.body[..index],
            None => &self.body,
        }
    }

    /// Marks the article published now.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidOperation`] unless the article is under review.
    pub fn publish(&mut self, now: Ticks) -> CoreResult<()> {
        self.require_under_review("publish")?;
        self.status = PublishStatus::Published;
        self.publish_time = now;
        Ok(())
    }

    /// Marks the article rejected.
    pub fn reject(&mut self) -> CoreResult<()> {
        self.require_under_review("reject")?;
        self.status = PublishStatus::Rejected;
        Ok(())
    }

    /// Freezes this article as revised, pointing at its replacement.
    pub fn supersede(&mut self, next: Uuid) -> CoreResult<()> {
        self.require_under_review("revise")?;
        self.status = PublishStatus::Revised;
        self.next_revision = Some(next);
        Ok(())
    }

    fn require_under_review(&self, action: &str) -> CoreResult<()> {
        if self.status != PublishStatus::UnderReview {
            return Err(CoreError::invalid_operation(format!(
                "cannot {action} an article that is {}",
                self.status.name()
            )));
        }
        Ok(())
    }

    /// Writes the article in the current format. The id is not part of
    /// the record; it names the file.
    pub fn encode(&self, writer: &mut RecordWriter) {
        writer.put_u8(ARTICLE_FORMAT_CURRENT);
        writer.put_string(&self.title);
        writer.put_string(&self.body);
        writer.put_string(&self.author);
        writer.put_u8(self.status.to_byte());
        writer.put_ticks(self.publish_time);
        writer.put_ticks(self.upload_time);
        writer.put_id(encode_link(self.previous_revision).as_bytes());
        writer.put_id(encode_link(self.next_revision).as_bytes());
    }

    /// Reads an article in any supported format version.
    pub fn decode(id: Uuid, reader: &mut RecordReader<'_>) -> CodecResult<Self> {
        let version = reader.get_u8()?;
        if version != ARTICLE_FORMAT_LEGACY && version != ARTICLE_FORMAT_CURRENT {
            return Err(CodecError::UnsupportedVersion {
                entity: "article",
                version,
            });
        }

        let title = reader.get_string()?;
        let body = reader.get_string()?;
        let author = reader.get_string()?;
        let status = PublishStatus::from_byte(reader.get_u8()?)?;
        let publish_time = reader.get_ticks()?;
        let upload_time = reader.get_ticks()?;

        let (previous_revision, next_revision) = if version >= ARTICLE_FORMAT_CURRENT {
            (
                decode_link(reader.get_id()?),
                decode_link(reader.get_id()?),
            )
        } else {
            (None, None)
        };

        Ok(Self {
            id,
            title,
            body,
            author,
            status,
            publish_time,
            upload_time,
            previous_revision,
            next_revision,
        })
    }
}

/// The nil id marks an absent revision link on the wire.
fn encode_link(link: Option<Uuid>) -> Uuid {
    link.unwrap_or(Uuid::nil())
}

fn decode_link(bytes: [u8; 16]) -> Option<Uuid> {
    let id = Uuid::from_bytes(bytes);
    (!id.is_nil()).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Article {
        Article::new_submission(
            Uuid::new_v4(),
            "Headline".into(),
            "Body text.".into(),
            "alice1234".into(),
            Ticks::from_unix_seconds(1_700_000_000),
        )
    }

    #[test]
    fn roundtrip_current_format() {
        let mut article = sample();
        article.previous_revision = Some(Uuid::new_v4());

        let mut writer = RecordWriter::new();
        article.encode(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes[0], ARTICLE_FORMAT_CURRENT);

        let mut reader = RecordReader::new(&bytes);
        let decoded = Article::decode(article.id, &mut reader).unwrap();
        assert_eq!(decoded, article);
        assert!(reader.is_empty());
    }

    #[test]
    fn decodes_legacy_format_without_revision_links() {
        let article = sample();
        let mut writer = RecordWriter::new();
        writer.put_u8(ARTICLE_FORMAT_LEGACY);
        writer.put_string(&article.title);
        writer.put_string(&article.body);
        writer.put_string(&article.author);
        writer.put_u8(article.status.to_byte());
        writer.put_ticks(article.publish_time);
        writer.put_ticks(article.upload_time);
        let bytes = writer.into_bytes();

        let mut reader = RecordReader::new(&bytes);
        let decoded = Article::decode(article.id, &mut reader).unwrap();
        assert_eq!(decoded.title, article.title);
        assert_eq!(decoded.previous_revision, None);
        assert_eq!(decoded.next_revision, None);
        assert!(reader.is_empty());
    }

    #[test]
    fn unknown_version_rejected() {
        let mut reader = RecordReader::new(&[9]);
        assert!(matches!(
            Article::decode(Uuid::new_v4(), &mut reader),
            Err(CodecError::UnsupportedVersion { version: 9, .. })
        ));
    }

    #[test]
    fn workflow_transitions() {
        let now = Ticks::from_unix_seconds(1_700_000_100);

        let mut article = sample();
        article.publish(now).unwrap();
        assert_eq!(article.status, PublishStatus::Published);
        assert_eq!(article.publish_time, now);
        assert!(article.reject().is_err());

        let mut article = sample();
        article.reject().unwrap();
        assert!(article.publish(now).is_err());

        let mut article = sample();
        let next = Uuid::new_v4();
        article.supersede(next).unwrap();
        assert_eq!(article.status, PublishStatus::Revised);
        assert_eq!(article.next_revision, Some(next));
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let mut article = sample();
        article.body = "é".repeat(200);
        assert_eq!(article.snippet().chars().count(), 150);

        article.body = "short".into();
        assert_eq!(article.snippet(), "short");
    }
}
