//! User accounts.

use super::Permission;
use crate::store::Record;
use folio_codec::{CodecResult, RecordReader, RecordWriter, Ticks};

/// One registered user.
///
/// Plain data: mutating a field changes nothing on disk until the account
/// is passed back to [`crate::AccountRegistry::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique login name; the store key.
    pub name: String,
    /// Stored as entered. See DESIGN.md on password handling.
    pub password: String,
    /// Contact address, unique across accounts.
    pub email: String,
    /// Authorization level.
    pub permission: Permission,
    /// When the account was registered.
    pub created: Ticks,
    /// Whether the email address has been confirmed.
    pub verified: bool,
}

impl Account {
    /// A freshly signed-up account: contributor, unverified.
    pub fn new(name: String, password: String, email: String, created: Ticks) -> Self {
        Self {
            name,
            password,
            email,
            permission: Permission::Contributor,
            created,
            verified: false,
        }
    }
}

impl Record for Account {
    // Files written before the verified flag existed lack the trailing
    // byte; decode_legacy reads that older layout.
    const HAS_LEGACY: bool = true;

    fn key(&self) -> &str {
        &self.name
    }

    fn encode(&self, writer: &mut RecordWriter) {
        writer.put_string(&self.name);
        writer.put_string(&self.password);
        writer.put_string(&self.email);
        writer.put_u8(self.permission.to_byte());
        writer.put_ticks(self.created);
        writer.put_bool(self.verified);
    }

    fn decode(reader: &mut RecordReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            name: reader.get_string()?,
            password: reader.get_string()?,
            email: reader.get_string()?,
            permission: Permission::from_byte(reader.get_u8()?)?,
            created: reader.get_ticks()?,
            verified: reader.get_bool()?,
        })
    }

    fn decode_legacy(reader: &mut RecordReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            name: reader.get_string()?,
            password: reader.get_string()?,
            email: reader.get_string()?,
            permission: Permission::from_byte(reader.get_u8()?)?,
            created: reader.get_ticks()?,
            verified: false,
        })
    }
}
