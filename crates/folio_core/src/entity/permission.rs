//! Account permission levels.

use folio_codec::{CodecError, CodecResult};
use std::fmt;

/// What an account is allowed to do.
///
/// Declaration order gives the privilege order: every contributor
/// capability is available to editors, every editor capability to admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    /// May author and revise their own articles.
    Contributor,
    /// May additionally review, publish and reject submissions.
    Editor,
    /// May additionally manage accounts and read the event logs.
    Admin,
}

impl Permission {
    /// Decodes the wire byte. The wire order is the reverse of the
    /// privilege order: admin is 0.
    pub fn from_byte(byte: u8) -> CodecResult<Self> {
        match byte {
            0 => Ok(Self::Admin),
            1 => Ok(Self::Editor),
            2 => Ok(Self::Contributor),
            value => Err(CodecError::InvalidTag {
                field: "permission",
                value,
            }),
        }
    }

    /// Encodes the wire byte.
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Admin => 0,
            Self::Editor => 1,
            Self::Contributor => 2,
        }
    }

    /// Parses a human-entered permission token, as accepted by the admin
    /// CLI and the permission-change endpoint.
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "a" | "admin" => Some(Self::Admin),
            "e" | "editor" => Some(Self::Editor),
            "c" | "s" | "contributor" => Some(Self::Contributor),
            _ => None,
        }
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Contributor => "contributor",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privilege_order() {
        assert!(Permission::Contributor < Permission::Editor);
        assert!(Permission::Editor < Permission::Admin);
    }

    #[test]
    fn wire_bytes_invert_privilege() {
        assert_eq!(Permission::Admin.to_byte(), 0);
        assert_eq!(Permission::Contributor.to_byte(), 2);
        for byte in 0..=2u8 {
            assert_eq!(Permission::from_byte(byte).unwrap().to_byte(), byte);
        }
        assert!(Permission::from_byte(3).is_err());
    }

    #[test]
    fn tokens() {
        assert_eq!(Permission::parse_token("A"), Some(Permission::Admin));
        assert_eq!(Permission::parse_token("editor"), Some(Permission::Editor));
        assert_eq!(Permission::parse_token("s"), Some(Permission::Contributor));
        assert_eq!(Permission::parse_token("root"), None);
    }
}
