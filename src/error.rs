//! The `error` module defines the [`UniversalHexError`] enum that describes the
//! errors that can occur when parsing Intel HEX records or creating and
//! separating Universal Hex files.
//!
//! Each variant carries the offending record or byte string (or the relevant
//! numeric value) so that error messages can point at the exact input that
//! failed. All operations are transactional: on failure no partial output is
//! produced.

use crate::record::sizes;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniversalHexError {
    /// Hex string has an odd number of characters or non-hex characters
    InvalidHexCharacter(String),
    /// Record is shorter than 11 or longer than 75 characters
    RecordLengthOutOfRange(String),
    /// Record does not begin with a ':'
    RecordStartInvalid(String),
    /// Record type is outside the valid set
    RecordTypeInvalid(u8),
    /// Declared byte count implies a shorter record than the one provided
    RecordByteCountInconsistent(String),
    /// Address does not fit in 16 bits when creating a record
    RecordAddressOutOfRange(u32),
    /// Record data is longer than 32 bytes
    RecordDataTooLarge(usize),
    /// Address does not fit in 32 bits for an Extended Linear Address record
    ExtLinearAddressOutOfRange(u64),
    /// Extended Segment Address data is not 2 bytes aligned to 0x1000
    ExtSegmentRecordInvalid(String),
    /// Input to create a Universal Hex is already a Universal Hex
    AlreadyUniversalHex(u16),
    /// Records found after an End Of File record
    TrailingRecordsAfterEof {
        board_id: u16,
        record_index: usize,
        total_records: usize,
        makecode: bool,
    },
    /// Universal Hex to separate contained no records
    UniversalHexEmpty,
    /// Universal Hex to separate does not have the expected record layout
    UniversalHexShapeInvalid,
    /// Block Start record data is not 4 bytes
    BlockStartDataInvalid(String),
    /// A record declared a data field larger than 32 bytes
    DataFieldLengthTooLarge(usize),
}

impl fmt::Display for UniversalHexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHexCharacter(s) => {
                if s.len() % 2 == 0 {
                    write!(f, "Could not parse hex string, found non-hex characters: \"{s}\"")
                } else {
                    write!(f, "Could not parse hex string, length is not divisible by 2: \"{s}\"")
                }
            }
            Self::RecordLengthOutOfRange(record) => {
                if record.len() < sizes::MIN_RECORD_LEN {
                    write!(f, "Record length too small ({} chars): {record}", record.len())
                } else {
                    write!(f, "Record length is too large ({} chars): {record}", record.len())
                }
            }
            Self::RecordStartInvalid(record) => {
                write!(f, "Record does not start with a \":\": {record}")
            }
            Self::RecordTypeInvalid(value) => {
                write!(f, "Record type 0x{value:02X} is not valid")
            }
            Self::RecordByteCountInconsistent(record) => {
                write!(f, "Record byte count does not match the record length: {record}")
            }
            Self::RecordAddressOutOfRange(address) => {
                write!(f, "Record address out of range: 0x{address:X}")
            }
            Self::RecordDataTooLarge(length) => {
                write!(
                    f,
                    "Record data has too many bytes: {length} (max {})",
                    sizes::RECORD_DATA_MAX_BYTES
                )
            }
            Self::ExtLinearAddressOutOfRange(address) => {
                write!(f, "Address record is out of range: 0x{address:X}")
            }
            Self::ExtSegmentRecordInvalid(record) => {
                write!(f, "Invalid Extended Segment Address record: {record}")
            }
            Self::AlreadyUniversalHex(board_id) => {
                write!(f, "Board ID 0x{board_id:04X} hex is already a Universal Hex")
            }
            Self::TrailingRecordsAfterEof {
                board_id,
                record_index,
                total_records,
                makecode,
            } => {
                write!(
                    f,
                    "EoF record found at record {record_index} of {total_records} \
                     in Board ID 0x{board_id:04X} hex"
                )?;
                if *makecode {
                    write!(
                        f,
                        " (this might be a MakeCode hex file for micro:bit V1, \
                         in that case download the Universal Hex from MakeCode)"
                    )?;
                }
                Ok(())
            }
            Self::UniversalHexEmpty => {
                write!(f, "Empty Universal Hex")
            }
            Self::UniversalHexShapeInvalid => {
                write!(f, "Universal Hex format invalid")
            }
            Self::BlockStartDataInvalid(record) => {
                write!(f, "Block Start record invalid: {record}")
            }
            Self::DataFieldLengthTooLarge(length) => {
                write!(f, "Intel Hex record data size is too large: {length}")
            }
        }
    }
}

impl Error for UniversalHexError {}
