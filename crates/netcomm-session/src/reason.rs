//! The reason byte carried by the server's disconnect reply.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why the server closed (or refused) the session.
///
/// Codes 6 and 9 are not assigned; they and anything above 13 decode as
/// [`Unknown`](Self::Unknown) so the raw byte is never lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
    OldClient,
    AlreadyLoggedIn,
    WrongPassword,
    ServerShutdown,
    Kicked,
    NoPlace,
    NotFound,
    Unstable,
    NoAccount,
    NoSkillPackage,
    CorruptInventory,
    Unknown(u8),
}

impl DisconnectReason {
    /// Decodes the reason byte.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => Self::OldClient,
            0x02 => Self::AlreadyLoggedIn,
            0x03 => Self::WrongPassword,
            0x04 => Self::ServerShutdown,
            0x05 => Self::Kicked,
            0x07 => Self::NoPlace,
            0x08 => Self::NotFound,
            0x0A => Self::Unstable,
            0x0B => Self::NoAccount,
            0x0C => Self::NoSkillPackage,
            0x0D => Self::CorruptInventory,
            other => Self::Unknown(other),
        }
    }

    /// The byte the server sent.
    pub fn code(self) -> u8 {
        match self {
            Self::OldClient => 0x01,
            Self::AlreadyLoggedIn => 0x02,
            Self::WrongPassword => 0x03,
            Self::ServerShutdown => 0x04,
            Self::Kicked => 0x05,
            Self::NoPlace => 0x07,
            Self::NotFound => 0x08,
            Self::Unstable => 0x0A,
            Self::NoAccount => 0x0B,
            Self::NoSkillPackage => 0x0C,
            Self::CorruptInventory => 0x0D,
            Self::Unknown(code) => code,
        }
    }
}

impl From<u8> for DisconnectReason {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::OldClient => "client version is too old",
            Self::AlreadyLoggedIn => "account is already logged in",
            Self::WrongPassword => "wrong password",
            Self::ServerShutdown => "server is shutting down",
            Self::Kicked => "kicked by the server",
            Self::NoPlace => "no free place to log in",
            Self::NotFound => "character not found",
            Self::Unstable => "connection is unstable",
            Self::NoAccount => "no such account",
            Self::NoSkillPackage => "no skill package chosen",
            Self::CorruptInventory => "inventory is corrupt",
            Self::Unknown(code) => {
                return write!(f, "unknown reason 0x{code:02X}");
            }
        };
        f.write_str(text)
    }
}
