//! The `stream` module provides helpers that operate on whole Intel HEX
//! strings and record lists: splitting into records, detecting the Universal
//! Hex shape and detecting MakeCode for micro:bit V1 hex files.

use crate::error::UniversalHexError;
use crate::record::{RecordType, end_of_file_record, get_record_type, sizes};

/// Extended Linear Address record for 0x2000_0000, found in MakeCode for
/// micro:bit V1 hex files around the EoF record.
const MAKECODE_V1_ELA_RECORD: &str = ":020000042000DA";

/// Split an Intel HEX string into individual record strings.
///
/// Carriage returns are removed, records are split on newlines and blank
/// lines are dropped. Record order is preserved.
///
/// # Example
/// ```
/// use universalhexlib::split_records;
///
/// let records = split_records(":020000040000FA\r\n:00000001FF\n");
/// assert_eq!(records, vec![":020000040000FA", ":00000001FF"]);
/// ```
#[must_use]
pub fn split_records(hex_str: &str) -> Vec<String> {
    hex_str
        .split('\n')
        .map(|line| line.replace('\r', ""))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Find the data field length the padding records should use for this stream.
///
/// Tracks the largest data field seen; once the same size has been observed
/// more than 12 times without being surpassed it is taken as the answer.
///
/// # Errors
/// Returns an error if a record declares a data field larger than 32 bytes.
pub fn find_data_field_length(records: &[String]) -> Result<usize, UniversalHexError> {
    let mut max_data_bytes: usize = 16;
    let mut max_data_bytes_count: usize = 0;
    for record in records {
        let data_bytes = record.len().saturating_sub(sizes::MIN_RECORD_LEN) / sizes::BYTE_CHAR_LEN;
        if data_bytes > max_data_bytes {
            max_data_bytes = data_bytes;
            max_data_bytes_count = 0;
        } else if data_bytes == max_data_bytes {
            max_data_bytes_count += 1;
        }
        if max_data_bytes_count > 12 {
            break;
        }
    }
    if max_data_bytes > sizes::RECORD_DATA_MAX_BYTES {
        return Err(UniversalHexError::DataFieldLengthTooLarge(max_data_bytes));
    }
    Ok(max_data_bytes)
}

/// Check if a record list has the Universal Hex shape: an Extended Linear
/// Address record, a Block Start record, and an End Of File record last.
#[must_use]
pub fn is_universal_hex_records(records: &[String]) -> bool {
    let Some(last) = records.last() else {
        return false;
    };
    records.len() >= 2
        && matches!(
            get_record_type(&records[0]),
            Ok(RecordType::ExtendedLinearAddress)
        )
        && matches!(get_record_type(&records[1]), Ok(RecordType::BlockStart))
        && matches!(get_record_type(last), Ok(RecordType::EndOfFile))
}

/// Check if a record list comes from MakeCode for micro:bit V1.
///
/// These hex files either carry the 0x2000_0000 Extended Linear Address
/// record before a final EoF record, or continue after the first EoF record
/// with Other Data records or further copies of that address record.
#[must_use]
pub fn is_makecode_for_v1_records(records: &[String]) -> bool {
    let first_eof = records
        .iter()
        .position(|r| matches!(get_record_type(r), Ok(RecordType::EndOfFile)));
    match first_eof {
        None => false,
        Some(i) if i == records.len() - 1 => {
            records[..i].iter().any(|r| r == MAKECODE_V1_ELA_RECORD)
        }
        Some(i) => records[i + 1..].iter().any(|r| {
            r == MAKECODE_V1_ELA_RECORD
                || matches!(get_record_type(r), Ok(RecordType::OtherData))
        }),
    }
}

/// Check if a hex string is a MakeCode for micro:bit V1 Intel Hex file.
#[must_use]
pub fn is_makecode_for_v1_hex(hex_str: &str) -> bool {
    is_makecode_for_v1_records(&split_records(hex_str))
}

/// Check if a hex string is a Universal Hex.
///
/// This is an inexpensive check of the first two records: an Extended Linear
/// Address record signature followed by a Block Start record signature. The
/// scan for the second record is bounded, so arbitrarily long first lines are
/// rejected rather than walked.
///
/// # Example
/// ```
/// use universalhexlib::is_universal_hex;
///
/// assert!(is_universal_hex(":020000040000FA\n:0400000A9903C0DEB8\n:00000001FF\n"));
/// assert!(!is_universal_hex(":020000040000FA\n:00000001FF\n"));
/// ```
#[must_use]
pub fn is_universal_hex(hex_str: &str) -> bool {
    const ELA_SIGNATURE: &[u8] = b":02000004";
    const BLOCK_START_SIGNATURE: &[u8] = b":0400000A";

    let bytes = hex_str.as_bytes();
    if !bytes.starts_with(ELA_SIGNATURE) {
        return false;
    }
    let scan_start = ELA_SIGNATURE.len();
    let scan_end = (scan_start + sizes::MAX_RECORD_LEN + 3).min(bytes.len());
    match bytes[scan_start..scan_end].iter().position(|&b| b == b':') {
        Some(offset) => bytes[scan_start + offset..].starts_with(BLOCK_START_SIGNATURE),
        None => false,
    }
}

/// Check if the last record of the list is an End Of File record.
pub(crate) fn ends_with_eof(records: &[String]) -> bool {
    records.last().map(String::as_str) == Some(end_of_file_record())
}
