//! Schema log record types
//!
//! Each record on disk:
//! - Record Length (u32 LE), total including this field and the checksum
//! - Mutation Kind (u8)
//! - Sequence Number (u64 LE)
//! - Payload (JSON-encoded [`MutationEnvelope`])
//! - Checksum (u32 LE) over everything before it

use std::io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::checksum::{compute_checksum, verify_checksum};
use crate::schema::PropertyType;

/// Smallest valid record: length + kind + sequence + checksum
pub const MIN_RECORD_SIZE: usize = 4 + 1 + 8 + 4;

/// Kind byte of a record, mirrored by the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MutationKind {
    CreateClass = 0,
    DropClass = 1,
    SetSuperclasses = 2,
    SetAbstract = 3,
    AddProperty = 4,
    DropProperty = 5,
}

impl MutationKind {
    /// Convert from u8, returns None for invalid values
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MutationKind::CreateClass),
            1 => Some(MutationKind::DropClass),
            2 => Some(MutationKind::SetSuperclasses),
            3 => Some(MutationKind::SetAbstract),
            4 => Some(MutationKind::AddProperty),
            5 => Some(MutationKind::DropProperty),
            _ => None,
        }
    }

    /// Convert to u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A durable change to the schema.
///
/// Class references are by name; the store never sees arena ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SchemaMutation {
    CreateClass {
        name: String,
        is_abstract: bool,
        superclasses: Vec<String>,
    },
    DropClass {
        name: String,
    },
    SetSuperclasses {
        name: String,
        superclasses: Vec<String>,
    },
    SetAbstract {
        name: String,
        is_abstract: bool,
    },
    AddProperty {
        class_name: String,
        name: String,
        property_type: PropertyType,
    },
    DropProperty {
        class_name: String,
        name: String,
    },
}

impl SchemaMutation {
    /// Kind byte for this mutation
    pub fn kind(&self) -> MutationKind {
        match self {
            SchemaMutation::CreateClass { .. } => MutationKind::CreateClass,
            SchemaMutation::DropClass { .. } => MutationKind::DropClass,
            SchemaMutation::SetSuperclasses { .. } => MutationKind::SetSuperclasses,
            SchemaMutation::SetAbstract { .. } => MutationKind::SetAbstract,
            SchemaMutation::AddProperty { .. } => MutationKind::AddProperty,
            SchemaMutation::DropProperty { .. } => MutationKind::DropProperty,
        }
    }

    /// Name of the class the mutation targets
    pub fn class_name(&self) -> &str {
        match self {
            SchemaMutation::CreateClass { name, .. }
            | SchemaMutation::DropClass { name }
            | SchemaMutation::SetSuperclasses { name, .. }
            | SchemaMutation::SetAbstract { name, .. } => name,
            SchemaMutation::AddProperty { class_name, .. }
            | SchemaMutation::DropProperty { class_name, .. } => class_name,
        }
    }
}

/// Payload of a log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationEnvelope {
    /// Wall-clock time the mutation was appended
    pub recorded_at: DateTime<Utc>,
    /// The mutation itself
    pub mutation: SchemaMutation,
}

/// One framed record of the schema log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Monotonic sequence number, starting at 1
    pub sequence_number: u64,
    /// Payload
    pub envelope: MutationEnvelope,
}

impl LogRecord {
    /// Create a record stamped with the current time
    pub fn new(sequence_number: u64, mutation: SchemaMutation) -> Self {
        Self {
            sequence_number,
            envelope: MutationEnvelope {
                recorded_at: Utc::now(),
                mutation,
            },
        }
    }

    /// The mutation carried by this record
    pub fn mutation(&self) -> &SchemaMutation {
        &self.envelope.mutation
    }

    /// Serialize the complete framed record
    pub fn serialize(&self) -> io::Result<Vec<u8>> {
        let payload = serde_json::to_vec(&self.envelope)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let record_length = (MIN_RECORD_SIZE + payload.len()) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.push(self.envelope.mutation.kind().as_u8());
        record.extend_from_slice(&self.sequence_number.to_le_bytes());
        record.extend_from_slice(&payload);

        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        Ok(record)
    }

    /// Deserialize a framed record, verifying checksum and kind byte.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "Record too short"));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        if !verify_checksum(&data[..checksum_offset], stored_checksum) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    compute_checksum(&data[..checksum_offset]),
                    stored_checksum
                ),
            ));
        }

        let kind_byte = data[4];
        let kind = MutationKind::from_u8(kind_byte).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid mutation kind: {}", kind_byte),
            )
        })?;

        let mut seq_buf = [0u8; 8];
        seq_buf.copy_from_slice(&data[5..13]);
        let sequence_number = u64::from_le_bytes(seq_buf);

        let envelope: MutationEnvelope = serde_json::from_slice(&data[13..checksum_offset])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid payload: {}", e)))?;

        if envelope.mutation.kind() != kind {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Mutation kind byte {:?} does not match payload {:?}",
                    kind,
                    envelope.mutation.kind()
                ),
            ));
        }

        Ok((
            Self {
                sequence_number,
                envelope,
            },
            record_length,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LogRecord {
        LogRecord::new(
            7,
            SchemaMutation::CreateClass {
                name: "javaC".into(),
                is_abstract: false,
                superclasses: vec!["javaA".into(), "javaB".into()],
            },
        )
    }

    #[test]
    fn test_serialize_deserialize() {
        let record = sample();
        let bytes = record.serialize().unwrap();

        let (decoded, consumed) = LogRecord::deserialize(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_kind_byte_position() {
        let bytes = sample().serialize().unwrap();
        assert_eq!(bytes[4], MutationKind::CreateClass.as_u8());
    }

    #[test]
    fn test_corrupted_payload_detected() {
        let mut bytes = sample().serialize().unwrap();
        bytes[20] ^= 0x40;

        let err = LogRecord::deserialize(&bytes).unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_truncated_record_detected() {
        let bytes = sample().serialize().unwrap();
        let err = LogRecord::deserialize(&bytes[..bytes.len() - 3]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_mutation_json_shape() {
        let json = serde_json::to_value(SchemaMutation::AddProperty {
            class_name: "javaA".into(),
            name: "property".into(),
            property_type: PropertyType::Integer,
        })
        .unwrap();

        assert_eq!(json["op"], "add_property");
        assert_eq!(json["property_type"], "INTEGER");
    }

    #[test]
    fn test_class_name() {
        let m = SchemaMutation::DropProperty {
            class_name: "A".into(),
            name: "p".into(),
        };
        assert_eq!(m.class_name(), "A");
        assert_eq!(MutationKind::from_u8(m.kind().as_u8()), Some(MutationKind::DropProperty));
    }
}
