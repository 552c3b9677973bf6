//! The `universal` module creates and separates Universal Hex files.
//!
//! A Universal Hex concatenates the Intel Hex images for several board
//! revisions into one file. Each image is framed by Block Start records
//! carrying the board ID and aligned to 512-character boundaries, so the
//! bootloader of one board can skip the data meant for another while reading
//! the file in USB-sized chunks.
//!
//! Two physical layouts are produced: self-contained 512-character *blocks*,
//! each repeating the current Extended Linear Address and Block Start
//! records, and contiguous *sections* padded once at the end. The sections
//! format is the recommended one; the blocks format is kept for future use.

use crate::error::UniversalHexError;
use crate::record::{
    RecordType, block_end_record, block_start_record, convert_ext_seg_to_ext_lin,
    convert_record_to, end_of_file_record, ext_lin_address_record, get_record_data,
    get_record_type, padded_data_record,
};
use crate::stream::{
    ends_with_eof, find_data_field_length, is_makecode_for_v1_records, is_universal_hex_records,
    split_records,
};

/// USB block size the output is aligned to, in characters including newlines.
const BLOCK_SIZE: usize = 512;

/// Board IDs whose bootloader reads standard Data records. Data for any other
/// board is carried as Custom Data records so a V1 bootloader skips them.
pub const V1_BOARD_IDS: [u16; 2] = [0x9900, 0x9901];

/// The two main micro:bit board revisions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum BoardId {
    V1 = 0x9900,
    V2 = 0x9903,
}

impl From<BoardId> for u16 {
    fn from(board_id: BoardId) -> Self {
        board_id as Self
    }
}

/// An Intel Hex string together with the board ID it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndividualHex {
    pub hex: String,
    pub board_id: u16,
}

impl IndividualHex {
    #[must_use]
    pub fn new(hex: String, board_id: u16) -> Self {
        Self { hex, board_id }
    }
}

/// Outcome of translating one input record for inclusion in a Universal Hex.
enum TranslatedRecord {
    /// Emit the record, possibly retyped
    Keep(String),
    /// Emit the record and track it as the current Extended Linear Address
    ExtendedAddress(String),
    EndOfFile,
}

/// Apply the record translation rules shared by both layouts.
fn translate_record(
    record: &str,
    replace_data: bool,
) -> Result<TranslatedRecord, UniversalHexError> {
    match get_record_type(record)? {
        RecordType::Data if replace_data => Ok(TranslatedRecord::Keep(convert_record_to(
            record,
            RecordType::CustomData,
        )?)),
        RecordType::ExtendedLinearAddress => {
            Ok(TranslatedRecord::ExtendedAddress(record.to_string()))
        }
        RecordType::ExtendedSegmentAddress => Ok(TranslatedRecord::ExtendedAddress(
            convert_ext_seg_to_ext_lin(record)?,
        )),
        RecordType::EndOfFile => Ok(TranslatedRecord::EndOfFile),
        _ => Ok(TranslatedRecord::Keep(record.to_string())),
    }
}

fn trailing_records_error(
    board_id: u16,
    record_index: usize,
    records: &[String],
) -> UniversalHexError {
    UniversalHexError::TrailingRecordsAfterEof {
        board_id,
        record_index,
        total_records: records.len(),
        makecode: is_makecode_for_v1_records(records),
    }
}

/// Convert an Intel Hex string into the Universal Hex blocks format.
///
/// Every block is 512 characters and opens with the Extended Linear Address
/// in effect and a Block Start record, so each one can be processed on its
/// own. The closing Block End record absorbs the alignment remainder.
fn ihex_to_uhex_blocks(ihex_str: &str, board_id: u16) -> Result<String, UniversalHexError> {
    let records = split_records(ihex_str);
    if records.is_empty() {
        return Ok(String::new());
    }
    if is_universal_hex_records(&records) {
        return Err(UniversalHexError::AlreadyUniversalHex(board_id));
    }

    let replace_data = !V1_BOARD_IDS.contains(&board_id);
    let record_pad_capacity = find_data_field_length(&records)?;
    let start_record = block_start_record(board_id)?;
    let mut current_ext_addr = ext_lin_address_record(0)?;
    let end_record_base_len = block_end_record(0)?.len();
    let pad_record_base_len = padded_data_record(0)?.len();

    let mut output = String::with_capacity(ihex_str.len() * 2);
    let mut ih = 0;
    while ih < records.len() {
        // Adopt a leading extended address record instead of repeating the
        // current one after the Block Start
        match get_record_type(&records[ih])? {
            RecordType::ExtendedLinearAddress => {
                current_ext_addr = records[ih].clone();
                ih += 1;
            }
            RecordType::ExtendedSegmentAddress => {
                current_ext_addr = convert_ext_seg_to_ext_lin(&records[ih])?;
                ih += 1;
            }
            _ => {}
        }

        let mut block_len = 0;
        output.push_str(&current_ext_addr);
        output.push('\n');
        block_len += current_ext_addr.len() + 1;
        output.push_str(&start_record);
        output.push('\n');
        block_len += start_record.len() + 1;
        // Reserve space for the closing Block End record
        block_len += end_record_base_len + 1;

        let mut end_of_file = false;
        while ih < records.len() && block_len + records[ih].len() + 1 <= BLOCK_SIZE {
            let record = &records[ih];
            ih += 1;
            match translate_record(record, replace_data)? {
                TranslatedRecord::Keep(r) => {
                    block_len += r.len() + 1;
                    output.push_str(&r);
                    output.push('\n');
                }
                TranslatedRecord::ExtendedAddress(r) => {
                    block_len += r.len() + 1;
                    current_ext_addr = r.clone();
                    output.push_str(&r);
                    output.push('\n');
                }
                TranslatedRecord::EndOfFile => {
                    end_of_file = true;
                    break;
                }
            }
        }

        if end_of_file {
            if ih != records.len() {
                return Err(trailing_records_error(board_id, ih, &records));
            }
            // The EoF record goes after the Block End record so it does not
            // break the 512-character alignment of the preceding blocks
            output.push_str(&block_end_record(0)?);
            output.push('\n');
            output.push_str(end_of_file_record());
            output.push('\n');
            break;
        }

        let mut padding_capacity = BLOCK_SIZE - block_len;
        while padding_capacity > record_pad_capacity * 2 {
            let byte_len =
                ((padding_capacity - (pad_record_base_len + 1)) / 2).min(record_pad_capacity);
            let padded_record = padded_data_record(byte_len)?;
            padding_capacity -= padded_record.len() + 1;
            output.push_str(&padded_record);
            output.push('\n');
        }
        output.push_str(&block_end_record(padding_capacity / 2)?);
        output.push('\n');
    }
    Ok(output)
}

/// Convert an Intel Hex string into the Universal Hex sections format.
///
/// The records are emitted contiguously after the Extended Linear Address
/// and Block Start records, then padded so the section (and the EoF record,
/// when the input has one) completes a multiple of 512 characters.
fn ihex_to_uhex_section(ihex_str: &str, board_id: u16) -> Result<String, UniversalHexError> {
    let records = split_records(ihex_str);
    if records.is_empty() {
        return Ok(String::new());
    }
    if is_universal_hex_records(&records) {
        return Err(UniversalHexError::AlreadyUniversalHex(board_id));
    }

    let replace_data = !V1_BOARD_IDS.contains(&board_id);
    let record_pad_capacity = find_data_field_length(&records)?;

    let mut output = String::with_capacity(ihex_str.len() * 2);
    let mut section_len = 0;
    let mut ih = 0;

    // Use the input's opening extended address record when there is one
    let ext_addr_record = match get_record_type(&records[0])? {
        RecordType::ExtendedLinearAddress => {
            ih += 1;
            records[0].clone()
        }
        RecordType::ExtendedSegmentAddress => {
            ih += 1;
            convert_ext_seg_to_ext_lin(&records[0])?
        }
        _ => ext_lin_address_record(0)?,
    };
    section_len += ext_addr_record.len() + 1;
    output.push_str(&ext_addr_record);
    output.push('\n');

    let start_record = block_start_record(board_id)?;
    section_len += start_record.len() + 1;
    output.push_str(&start_record);
    output.push('\n');

    let mut end_of_file = false;
    while ih < records.len() {
        let record = &records[ih];
        ih += 1;
        match translate_record(record, replace_data)? {
            TranslatedRecord::Keep(r) | TranslatedRecord::ExtendedAddress(r) => {
                section_len += r.len() + 1;
                output.push_str(&r);
                output.push('\n');
            }
            TranslatedRecord::EndOfFile => {
                end_of_file = true;
                break;
            }
        }
    }
    if end_of_file && ih != records.len() {
        return Err(trailing_records_error(board_id, ih, &records));
    }

    // Pad the section to complete a multiple of 512 characters, counting the
    // closing Block End record and the EoF record when the input had one
    let end_record_base_len = block_end_record(0)?.len();
    let pad_record_base_len = padded_data_record(0)?.len();
    let eof_len = if end_of_file {
        end_of_file_record().len() + 1
    } else {
        0
    };
    let section_end_len = section_len + end_record_base_len + 1 + eof_len;
    let mut chars_needed = (BLOCK_SIZE - (section_end_len % BLOCK_SIZE)) % BLOCK_SIZE;
    while chars_needed > record_pad_capacity * 2 {
        let byte_len =
            ((chars_needed - (pad_record_base_len + 1)) / 2).min(record_pad_capacity);
        let padded_record = padded_data_record(byte_len)?;
        chars_needed -= padded_record.len() + 1;
        output.push_str(&padded_record);
        output.push('\n');
    }
    output.push_str(&block_end_record(chars_needed / 2)?);
    output.push('\n');

    if end_of_file {
        output.push_str(end_of_file_record());
        output.push('\n');
    }
    Ok(output)
}

/// Create a Universal Hex from one or more Intel Hex files.
///
/// The sections format is produced by default; pass `blocks = true` for the
/// 512-character blocks format. Every input but the last has its EoF record
/// moved to the end of the combined file.
///
/// # Errors
/// Returns an error if any input is already a Universal Hex, contains records
/// after its EoF record, or contains a malformed record.
///
/// # Example
/// ```
/// use universalhexlib::{IndividualHex, create_universal_hex, is_universal_hex};
///
/// let hex = ":020000040000FA\n\
///            :1000000000400020218E01005D8E01005F8E010006\n\
///            :00000001FF\n";
/// let universal_hex = create_universal_hex(
///     &[
///         IndividualHex::new(hex.to_string(), 0x9900),
///         IndividualHex::new(hex.to_string(), 0x9903),
///     ],
///     false,
/// )
/// .unwrap();
///
/// assert!(is_universal_hex(&universal_hex));
/// assert!(universal_hex.ends_with(":00000001FF\n"));
/// ```
pub fn create_universal_hex(
    hexes: &[IndividualHex],
    blocks: bool,
) -> Result<String, UniversalHexError> {
    let Some((last, rest)) = hexes.split_last() else {
        return Ok(String::new());
    };
    let ihex_to_uhex = if blocks {
        ihex_to_uhex_blocks
    } else {
        ihex_to_uhex_section
    };
    let eof_suffix = format!("{}\n", end_of_file_record());

    let mut output = String::new();
    // Move the EoF record of every hex but the last to the end of the file
    for individual in rest {
        let mut custom_hex = ihex_to_uhex(&individual.hex, individual.board_id)?;
        if custom_hex.ends_with(&eof_suffix) {
            custom_hex.truncate(custom_hex.len() - eof_suffix.len());
        }
        output.push_str(&custom_hex);
    }
    let last_custom_hex = ihex_to_uhex(&last.hex, last.board_id)?;
    output.push_str(&last_custom_hex);
    if !last_custom_hex.ends_with(&eof_suffix) {
        output.push_str(&eof_suffix);
    }
    Ok(output)
}

/// Create a Universal Hex in the sections format, the recommended layout.
///
/// Equivalent to [`create_universal_hex`] with `blocks` set to `false`.
///
/// # Errors
/// Returns the same errors as [`create_universal_hex`].
pub fn create_universal_hex_sections(
    hexes: &[IndividualHex],
) -> Result<String, UniversalHexError> {
    create_universal_hex(hexes, false)
}

/// State of one board's Intel Hex being rebuilt from a Universal Hex.
struct BoardHex {
    board_id: u16,
    last_ext_addr: String,
    records: Vec<String>,
}

/// Separate a Universal Hex into the Intel Hex file of each board.
///
/// Boards are returned in the order they first appear. Custom Data records
/// are converted back to Data records, framing and padding records are
/// dropped, and every returned hex ends with an EoF record.
///
/// # Errors
/// Returns an error if the input is empty, does not have the Universal Hex
/// record layout, or contains a malformed record.
///
/// # Example
/// ```
/// use universalhexlib::separate_universal_hex;
///
/// let universal_hex = ":020000040000FA\n\
///                      :0400000A9903C0DEB8\n\
///                      :1000000D00400020218E01005D8E01005F8E0100F9\n\
///                      :0000000BF5\n\
///                      :00000001FF\n";
/// let separated = separate_universal_hex(universal_hex).unwrap();
///
/// assert_eq!(separated.len(), 1);
/// assert_eq!(separated[0].board_id, 0x9903);
/// assert!(separated[0].hex.ends_with(":00000001FF\n"));
/// ```
pub fn separate_universal_hex(
    universal_hex_str: &str,
) -> Result<Vec<IndividualHex>, UniversalHexError> {
    let records = split_records(universal_hex_str);
    if records.is_empty() {
        return Err(UniversalHexError::UniversalHexEmpty);
    }
    if !is_universal_hex_records(&records) {
        return Err(UniversalHexError::UniversalHexShapeInvalid);
    }

    let mut boards: Vec<BoardHex> = Vec::new();
    // The shape check above guarantees the first two records open a board
    // before any pass-through record is reached
    let mut current = 0;
    let mut i = 0;
    while i < records.len() {
        let record = &records[i];
        match get_record_type(record)? {
            RecordType::Data
            | RecordType::EndOfFile
            | RecordType::ExtendedSegmentAddress
            | RecordType::StartSegmentAddress => {
                boards[current].records.push(record.clone());
            }
            RecordType::CustomData => {
                boards[current]
                    .records
                    .push(convert_record_to(record, RecordType::Data)?);
            }
            RecordType::ExtendedLinearAddress => {
                // Followed by a Block Start record it opens a board's block
                if let Some(next) = records.get(i + 1) {
                    if matches!(get_record_type(next), Ok(RecordType::BlockStart)) {
                        let block_start_data = get_record_data(next)?;
                        if block_start_data.len() != 4 {
                            return Err(UniversalHexError::BlockStartDataInvalid(next.clone()));
                        }
                        let board_id =
                            u16::from(block_start_data[0]) << 8 | u16::from(block_start_data[1]);
                        current = match boards.iter().position(|b| b.board_id == board_id) {
                            Some(index) => index,
                            None => {
                                boards.push(BoardHex {
                                    board_id,
                                    last_ext_addr: record.clone(),
                                    records: vec![record.clone()],
                                });
                                boards.len() - 1
                            }
                        };
                        i += 1; // skip the Block Start record
                    }
                }
                // Blocks repeat the address record, only keep changes
                if boards[current].last_ext_addr != *record {
                    boards[current].last_ext_addr = record.clone();
                    boards[current].records.push(record.clone());
                }
            }
            // Framing, padding and foreign data records carry nothing for
            // the individual hexes
            RecordType::BlockStart
            | RecordType::BlockEnd
            | RecordType::PaddedData
            | RecordType::OtherData
            | RecordType::StartLinearAddress => {}
        }
        i += 1;
    }

    let mut separated = Vec::with_capacity(boards.len());
    for board in boards {
        let mut board_records = board.records;
        if !ends_with_eof(&board_records) {
            board_records.push(end_of_file_record().to_string());
        }
        let mut hex = board_records.join("\n");
        hex.push('\n');
        separated.push(IndividualHex {
            hex,
            board_id: board.board_id,
        });
    }
    Ok(separated)
}
