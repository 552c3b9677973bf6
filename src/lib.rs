//! # `universalhexlib`
//!
//! `universalhexlib` is a Rust library for creating and separating micro:bit
//! Universal Hex files.
//!
//! A Universal Hex combines the Intel Hex firmware images for multiple board
//! revisions (e.g. micro:bit V1 and V2) into a single file that can be
//! flashed to any of them. The library provides:
//! - Creation of Universal Hex files from Intel Hex strings (via
//!   [`create_universal_hex`]).
//! - Separation of Universal Hex files back into Intel Hex strings (via
//!   [`separate_universal_hex`]).
//! - Detection of Universal Hex and MakeCode for V1 files.
//! - An Intel HEX record codec in the [`record`] module.
//! - Error handling with [`UniversalHexError`].
//!
//! ## Example
//!
//! ```
//! use universalhexlib::{BoardId, IndividualHex, create_universal_hex, separate_universal_hex};
//!
//! let v1_hex = ":020000040000FA\n\
//!               :10000000C0070000D1060000D1000000B1060000CA\n\
//!               :00000001FF\n";
//! let v2_hex = ":020000040000FA\n\
//!               :1000000000400020218E01005D8E01005F8E010006\n\
//!               :00000001FF\n";
//!
//! let universal_hex = create_universal_hex(
//!     &[
//!         IndividualHex::new(v1_hex.to_string(), BoardId::V1.into()),
//!         IndividualHex::new(v2_hex.to_string(), BoardId::V2.into()),
//!     ],
//!     false,
//! )
//! .unwrap();
//!
//! let separated = separate_universal_hex(&universal_hex).unwrap();
//! assert_eq!(separated[0].hex, v1_hex);
//! assert_eq!(separated[1].hex, v2_hex);
//! ```

mod error;
pub mod record;
mod stream;
mod universal;
mod utils;

// Public APIs
pub use error::UniversalHexError;
pub use stream::{
    find_data_field_length, is_makecode_for_v1_hex, is_makecode_for_v1_records, is_universal_hex,
    is_universal_hex_records, split_records,
};
pub use universal::{
    BoardId, IndividualHex, V1_BOARD_IDS, create_universal_hex, create_universal_hex_sections,
    separate_universal_hex,
};
pub use utils::{byte_to_hex, bytes_to_hex, concat_bytes, hex_str_to_bytes};
