//! Per-account notifications.

use folio_codec::{CodecError, CodecResult, RecordReader, RecordWriter, Ticks};
use uuid::Uuid;

/// How urgently a notification wants attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotificationSeverity {
    /// Informational; dismissing it is fine.
    CanIgnore,
    /// Worth acting on.
    ShouldResolve,
    /// Blocks something until acted on.
    MustResolve,
}

impl NotificationSeverity {
    /// Decodes the wire byte.
    pub fn from_byte(byte: u8) -> CodecResult<Self> {
        match byte {
            0 => Ok(Self::CanIgnore),
            1 => Ok(Self::ShouldResolve),
            2 => Ok(Self::MustResolve),
            value => Err(CodecError::InvalidTag {
                field: "notification severity",
                value,
            }),
        }
    }

    /// Encodes the wire byte.
    pub fn to_byte(self) -> u8 {
        match self {
            Self::CanIgnore => 0,
            Self::ShouldResolve => 1,
            Self::MustResolve => 2,
        }
    }
}

/// One notification, stored one file per notification under the
/// receiving account's directory. The id names the file and the receiver
/// names the directory; neither is part of the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Identifier; also the file name.
    pub id: Uuid,
    /// When the notification was raised.
    pub time: Ticks,
    /// Short headline.
    pub subject: String,
    /// Full message.
    pub body: String,
    /// Optional follow-up: `(button label, redirect target)`.
    pub resolve_action: Option<(String, String)>,
    /// Whether the receiver has seen it.
    pub read: bool,
    /// Urgency.
    pub severity: NotificationSeverity,
    /// Whether resolving deletes the notification file.
    pub delete_on_resolve: bool,
}

impl Notification {
    /// A fresh unread notification.
    pub fn new(
        id: Uuid,
        time: Ticks,
        subject: String,
        body: String,
        severity: NotificationSeverity,
        resolve_action: Option<(String, String)>,
        delete_on_resolve: bool,
    ) -> Self {
        Self {
            id,
            time,
            subject,
            body,
            resolve_action,
            read: false,
            severity,
            delete_on_resolve,
        }
    }

    pub(crate) fn encode(&self, writer: &mut RecordWriter) {
        writer.put_ticks(self.time);
        writer.put_string(&self.subject);
        writer.put_string(&self.body);
        match &self.resolve_action {
            Some((label, target)) => {
                writer.put_bool(true);
                writer.put_string(label);
                writer.put_string(target);
            }
            None => writer.put_bool(false),
        }
        writer.put_bool(self.read);
        writer.put_u8(self.severity.to_byte());
        writer.put_bool(self.delete_on_resolve);
    }

    pub(crate) fn decode(id: Uuid, reader: &mut RecordReader<'_>) -> CodecResult<Self> {
        let time = reader.get_ticks()?;
        let subject = reader.get_string()?;
        let body = reader.get_string()?;
        let resolve_action = if reader.get_bool()? {
            Some((reader.get_string()?, reader.get_string()?))
        } else {
            None
        };
        Ok(Self {
            id,
            time,
            subject,
            body,
            resolve_action,
            read: reader.get_bool()?,
            severity: NotificationSeverity::from_byte(reader.get_u8()?)?,
            delete_on_resolve: reader.get_bool()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(notification: &Notification) -> Notification {
        let mut writer = RecordWriter::new();
        notification.encode(&mut writer);
        let bytes = writer.into_bytes();
        let mut reader = RecordReader::new(&bytes);
        let decoded = Notification::decode(notification.id, &mut reader).unwrap();
        assert!(reader.is_empty());
        decoded
    }

    #[test]
    fn roundtrip_with_action() {
        let notification = Notification::new(
            Uuid::new_v4(),
            Ticks::from_unix_seconds(1_700_000_000),
            "Article rejected".into(),
            "See the editor's comments.".into(),
            NotificationSeverity::ShouldResolve,
            Some(("View".into(), "/article?id=abc".into())),
            true,
        );
        assert_eq!(roundtrip(&notification), notification);
    }

    #[test]
    fn roundtrip_without_action() {
        let mut notification = Notification::new(
            Uuid::new_v4(),
            Ticks::from_unix_seconds(1_700_000_000),
            "Welcome".into(),
            "Thanks for signing up.".into(),
            NotificationSeverity::CanIgnore,
            None,
            false,
        );
        notification.read = true;
        assert_eq!(roundtrip(&notification), notification);
    }

    #[test]
    fn severity_bytes() {
        for byte in 0..=2u8 {
            assert_eq!(
                NotificationSeverity::from_byte(byte).unwrap().to_byte(),
                byte
            );
        }
        assert!(NotificationSeverity::from_byte(3).is_err());
        assert!(NotificationSeverity::CanIgnore < NotificationSeverity::MustResolve);
    }
}
