//! XPT header record parsing and building.
//!
//! A V5 transport file is a sequence of 80-byte records:
//!
//! 1. Library header, real header, modified header
//! 2. Member header, DSCRPTR header, member data, member second
//! 3. NAMESTR header followed by one 140-byte NAMESTR per variable
//! 4. OBS header followed by packed observations
//!
//! # NAMESTR Structure (140 bytes)
//!
//! | Offset | Field   | Type     | Description                    |
//! |--------|---------|----------|--------------------------------|
//! | 0-1    | ntype   | short    | 1=NUMERIC, 2=CHAR              |
//! | 4-5    | nlng    | short    | Variable length in observation |
//! | 6-7    | nvar0   | short    | Variable number                |
//! | 8-15   | nname   | char[8]  | Variable name                  |
//! | 16-55  | nlabel  | char[40] | Variable label                 |
//! | 84-87  | npos    | long     | Position in observation        |

use crate::error::{Result, XptError};
use crate::types::{XptColumn, XptDataset, XptType, XptWriterOptions};

/// Record length in bytes.
pub const RECORD_LEN: usize = 80;

/// Standard NAMESTR length.
pub const NAMESTR_LEN: usize = 140;

/// VAX/VMS NAMESTR length (shorter reserved section).
pub const NAMESTR_LEN_VAX: usize = 136;

pub const LIBRARY_HEADER_PREFIX: &str = "HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!";
pub const MEMBER_HEADER_PREFIX: &str = "HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!";
pub const DSCRPTR_HEADER_PREFIX: &str = "HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!";
pub const NAMESTR_HEADER_PREFIX: &str = "HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!";
pub const OBS_HEADER_PREFIX: &str = "HEADER RECORD*******OBS     HEADER RECORD!!!!!!!";

fn validate_prefix(record: &[u8], prefix: &str, expected: &'static str) -> Result<()> {
    if record.len() < RECORD_LEN {
        return Err(XptError::invalid_format(format!(
            "{} too short",
            expected.to_lowercase()
        )));
    }
    if !record.starts_with(prefix.as_bytes()) {
        return Err(XptError::missing_header(expected));
    }
    Ok(())
}

pub fn validate_library_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, LIBRARY_HEADER_PREFIX, "LIBRARY HEADER")
}

pub fn validate_member_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, MEMBER_HEADER_PREFIX, "MEMBER HEADER")
}

pub fn validate_dscrptr_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, DSCRPTR_HEADER_PREFIX, "DSCRPTR HEADER")
}

pub fn validate_namestr_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, NAMESTR_HEADER_PREFIX, "NAMESTR HEADER")
}

pub fn validate_obs_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, OBS_HEADER_PREFIX, "OBS HEADER")
}

/// Parse NAMESTR length from member header record (offset 74-77).
///
/// Returns 140 (standard) or 136 (VAX/VMS).
pub fn parse_namestr_len(record: &[u8]) -> Result<usize> {
    parse_ascii_number(record, 74, 4, "NAMESTR length")
}

/// Parse variable count from NAMESTR header record (offset 54-57).
pub fn parse_variable_count(record: &[u8]) -> Result<usize> {
    parse_ascii_number(record, 54, 4, "variable count")
}

fn parse_ascii_number(record: &[u8], offset: usize, len: usize, field: &str) -> Result<usize> {
    if record.len() < offset + len {
        return Err(XptError::invalid_format(format!("record too short for {field}")));
    }
    read_string(record, offset, len)
        .trim()
        .parse::<usize>()
        .map_err(|_| XptError::NumericParse {
            field: field.to_string(),
        })
}

/// Parse dataset name from member data record (offset 8-15).
pub fn parse_dataset_name(record: &[u8]) -> Result<String> {
    let name = read_string(record, 8, 8);
    if name.is_empty() {
        return Err(XptError::invalid_format("empty dataset name"));
    }
    Ok(name)
}

/// Parse dataset label from member second record (offset 32-71).
pub fn parse_dataset_label(record: &[u8]) -> Option<String> {
    let label = read_string(record, 32, 40);
    if label.is_empty() { None } else { Some(label) }
}

/// Parse a single NAMESTR record into an [`XptColumn`].
pub fn parse_namestr(data: &[u8], index: usize) -> Result<XptColumn> {
    if data.len() < 88 {
        return Err(XptError::InvalidNamestr {
            index,
            message: format!("data too short: {} bytes", data.len()),
        });
    }

    let ntype = read_i16(data, 0);
    let data_type = XptType::from_ntype(ntype).ok_or_else(|| XptError::InvalidNamestr {
        index,
        message: format!("invalid ntype: {ntype}"),
    })?;

    let length = u16::try_from(read_i16(data, 4)).unwrap_or(0);
    if length == 0 {
        return Err(XptError::InvalidNamestr {
            index,
            message: "variable length is zero".to_string(),
        });
    }

    let name = read_string(data, 8, 8);
    if name.is_empty() {
        return Err(XptError::InvalidNamestr {
            index,
            message: "empty variable name".to_string(),
        });
    }

    let label = read_string(data, 16, 40);
    Ok(XptColumn {
        name,
        label: if label.is_empty() { None } else { Some(label) },
        data_type,
        length,
    })
}

/// Parse `var_count` consecutive NAMESTR records.
pub fn parse_namestr_records(
    data: &[u8],
    var_count: usize,
    namestr_len: usize,
) -> Result<Vec<XptColumn>> {
    (0..var_count)
        .map(|index| {
            let start = index * namestr_len;
            let slice = data
                .get(start..start + namestr_len)
                .ok_or(XptError::RecordOutOfBounds { offset: start })?;
            parse_namestr(slice, index)
        })
        .collect()
}

/// Build a NAMESTR record for `column` at byte `position` of an observation.
#[must_use]
pub fn build_namestr(column: &XptColumn, varnum: u16, position: u32) -> [u8; NAMESTR_LEN] {
    let mut buf = [0u8; NAMESTR_LEN];
    write_i16(&mut buf, 0, column.data_type.to_ntype());
    write_i16(&mut buf, 4, column.length as i16);
    write_i16(&mut buf, 6, varnum as i16);
    buf[8..56].fill(b' ');
    write_string(&mut buf, 8, &column.name, 8);
    write_string(&mut buf, 16, column.label.as_deref().unwrap_or(""), 40);
    buf[56..64].fill(b' ');
    buf[72..80].fill(b' ');
    buf[84..88].copy_from_slice(&(position as i32).to_be_bytes());
    buf
}

#[must_use]
pub fn build_library_header() -> [u8; RECORD_LEN] {
    build_fixed_header(LIBRARY_HEADER_PREFIX)
}

/// Build the real header record that follows the library header.
#[must_use]
pub fn build_real_header(options: &XptWriterOptions) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, "SAS", 8);
    write_string(&mut record, 8, "SAS", 8);
    write_string(&mut record, 16, "SASLIB", 8);
    write_string(&mut record, 24, &options.sas_version, 8);
    write_string(&mut record, 32, &options.os_name, 8);
    write_string(&mut record, 64, &options.format_created(), 16);
    record
}

/// Build the modified-datetime record (also used as member second prefix).
#[must_use]
pub fn build_second_header(options: &XptWriterOptions) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, &options.format_created(), 16);
    record
}

/// Build member header record with NAMESTR length.
#[must_use]
pub fn build_member_header() -> [u8; RECORD_LEN] {
    let mut record = build_fixed_header(MEMBER_HEADER_PREFIX);
    write_string(&mut record, 64, "0160", 4);
    write_string(&mut record, 74, &format!("{NAMESTR_LEN:04}"), 4);
    record
}

#[must_use]
pub fn build_dscrptr_header() -> [u8; RECORD_LEN] {
    build_fixed_header(DSCRPTR_HEADER_PREFIX)
}

#[must_use]
pub fn build_member_data(dataset: &XptDataset, options: &XptWriterOptions) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, "SAS", 8);
    write_string(&mut record, 8, &dataset.name, 8);
    write_string(&mut record, 16, "SASDATA", 8);
    write_string(&mut record, 24, &options.sas_version, 8);
    write_string(&mut record, 32, &options.os_name, 8);
    write_string(&mut record, 64, &options.format_created(), 16);
    record
}

#[must_use]
pub fn build_member_second(dataset: &XptDataset, options: &XptWriterOptions) -> [u8; RECORD_LEN] {
    let mut record = build_second_header(options);
    write_string(&mut record, 32, dataset.label.as_deref().unwrap_or(""), 40);
    record
}

#[must_use]
pub fn build_namestr_header(var_count: usize) -> [u8; RECORD_LEN] {
    let mut record = build_fixed_header(NAMESTR_HEADER_PREFIX);
    write_string(&mut record, 54, &format!("{var_count:04}"), 4);
    record
}

#[must_use]
pub fn build_obs_header() -> [u8; RECORD_LEN] {
    build_fixed_header(OBS_HEADER_PREFIX)
}

/// Prefix, then '0' fill up to offset 78, then two spaces.
fn build_fixed_header(prefix: &str) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    let prefix_bytes = prefix.as_bytes();
    let copy_len = prefix_bytes.len().min(48);
    record[..copy_len].copy_from_slice(&prefix_bytes[..copy_len]);
    record[48..78].fill(b'0');
    record
}

/// Align a size to the next record boundary (80 bytes).
#[must_use]
pub fn align_to_record(size: usize) -> usize {
    size.div_ceil(RECORD_LEN) * RECORD_LEN
}

/// Read a string from bytes, trimming trailing spaces and NULs.
pub(crate) fn read_string(data: &[u8], offset: usize, len: usize) -> String {
    data.get(offset..offset + len)
        .map(|slice| {
            String::from_utf8_lossy(slice)
                .trim_end_matches([' ', '\0'])
                .to_string()
        })
        .unwrap_or_default()
}

/// Write a string into a buffer field, truncated to `len`.
pub(crate) fn write_string(buf: &mut [u8], offset: usize, value: &str, len: usize) {
    let bytes = value.as_bytes();
    let copy_len = bytes.len().min(len);
    buf[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
}

fn read_i16(data: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([data[offset], data[offset + 1]])
}

fn write_i16(buf: &mut [u8], offset: usize, value: i16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}
