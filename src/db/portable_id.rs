//! Portable 128-bit identifier column.
//!
//! Application code always works with [`Uuid`]. At the storage boundary the
//! value is either bound as a native `uuid` (Postgres) or as a `char(32)`
//! of lowercase hex digits (every other backend).

use std::fmt;

use sea_orm::sea_query::{ColumnDef, IntoIden};
use sea_orm::{DbBackend, QueryResult, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::db::error::StoreError;

/// Length of the hex text encoding.
pub const HEX_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdFormatError {
    #[error("expected 32 hex digits, got {0} characters")]
    Length(usize),

    #[error("invalid hex digit {c:?} at position {index}")]
    Digit { c: char, index: usize },

    #[error("invalid uuid: {0}")]
    Uuid(#[from] uuid::Error),
}

/// Input accepted by [`IdBackend::encode`].
#[derive(Debug, Clone, Copy)]
pub enum IdValue<'a> {
    Uuid(Uuid),
    /// Already-encoded text, hex or hyphenated.
    Text(&'a str),
}

impl From<Uuid> for IdValue<'_> {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl<'a> From<&'a str> for IdValue<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl IdValue<'_> {
    fn to_uuid(self) -> Result<Uuid, IdFormatError> {
        match self {
            Self::Uuid(id) => Ok(id),
            Self::Text(text) => Ok(Uuid::parse_str(text)?),
        }
    }
}

/// An identifier as it is handed to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredId {
    Native(Uuid),
    Hex(String),
}

impl fmt::Display for StoredId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(id) => write!(f, "{}", id.hyphenated()),
            Self::Hex(text) => f.write_str(text),
        }
    }
}

impl From<StoredId> for Value {
    fn from(id: StoredId) -> Self {
        match id {
            StoredId::Native(id) => id.into(),
            StoredId::Hex(text) => text.into(),
        }
    }
}

/// How identifiers are laid out in a given database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdBackend {
    NativeUuid,
    HexText,
}

impl IdBackend {
    #[must_use]
    pub const fn for_backend(backend: DbBackend) -> Self {
        match backend {
            DbBackend::Postgres => Self::NativeUuid,
            _ => Self::HexText,
        }
    }

    /// Encodes a value for binding. `None` stays `None`.
    pub fn encode(&self, value: Option<IdValue<'_>>) -> Result<Option<StoredId>, IdFormatError> {
        let Some(value) = value else {
            return Ok(None);
        };
        Ok(Some(self.encode_uuid(value.to_uuid()?)))
    }

    /// Encodes a uuid that is already known to be valid.
    #[must_use]
    pub fn encode_uuid(&self, id: Uuid) -> StoredId {
        match self {
            Self::NativeUuid => StoredId::Native(id),
            Self::HexText => StoredId::Hex(hex::encode(id.as_bytes())),
        }
    }

    /// Decodes a stored textual value. `None` stays `None`.
    pub fn decode(&self, stored: Option<&str>) -> Result<Option<Uuid>, IdFormatError> {
        let Some(stored) = stored else {
            return Ok(None);
        };

        match self {
            Self::NativeUuid => Ok(Some(Uuid::parse_str(stored)?)),
            Self::HexText => decode_hex(stored).map(Some),
        }
    }

    /// Reads and decodes an identifier column from a result row.
    pub fn read(&self, row: &QueryResult, column: &str) -> Result<Option<Uuid>, StoreError> {
        match self {
            Self::NativeUuid => Ok(row.try_get::<Option<Uuid>>("", column)?),
            Self::HexText => {
                let text: Option<String> = row.try_get("", column)?;
                Ok(self.decode(text.as_deref())?)
            }
        }
    }

    /// Column definition used when creating the schema.
    pub fn column_def<C: IntoIden>(&self, column: C) -> ColumnDef {
        let mut def = ColumnDef::new(column);
        match self {
            Self::NativeUuid => def.uuid(),
            Self::HexText => def.char_len(HEX_LEN as u32),
        };
        def
    }
}

fn decode_hex(text: &str) -> Result<Uuid, IdFormatError> {
    if text.len() != HEX_LEN {
        return Err(IdFormatError::Length(text.chars().count()));
    }

    let mut bytes = [0u8; 16];
    hex::decode_to_slice(text, &mut bytes).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => IdFormatError::Digit { c, index },
        _ => IdFormatError::Length(text.chars().count()),
    })?;
    Ok(Uuid::from_bytes(bytes))
}
