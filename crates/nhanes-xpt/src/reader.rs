//! XPT file reader.
//!
//! Reads the first member of a SAS Transport V5 file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Result, XptError};
use crate::float::{ibm_to_ieee, is_missing};
use crate::header::{
    MEMBER_HEADER_PREFIX, RECORD_LEN, align_to_record, parse_dataset_label, parse_dataset_name,
    parse_namestr_len, parse_namestr_records, parse_variable_count, validate_dscrptr_header,
    validate_library_header, validate_member_header, validate_namestr_header, validate_obs_header,
};
use crate::types::{XptColumn, XptDataset, XptReaderOptions, XptType, XptValue};

/// XPT file reader.
pub struct XptReader<R: Read> {
    reader: BufReader<R>,
    options: XptReaderOptions,
}

impl<R: Read> XptReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, XptReaderOptions::default())
    }

    pub fn with_options(reader: R, options: XptReaderOptions) -> Self {
        Self {
            reader: BufReader::new(reader),
            options,
        }
    }

    /// Read the whole stream and parse its first dataset.
    pub fn read_dataset(mut self) -> Result<XptDataset> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_xpt_data(&data, &self.options)
    }
}

impl XptReader<File> {
    /// Open an XPT file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                XptError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                XptError::Io(e)
            }
        })?;
        Ok(Self::new(file))
    }
}

/// Read an XPT file from a path.
pub fn read_xpt(path: &Path) -> Result<XptDataset> {
    XptReader::open(path)?.read_dataset()
}

/// Parse an in-memory transport file (e.g. an HTTP response body).
pub fn read_xpt_bytes(data: &[u8]) -> Result<XptDataset> {
    parse_xpt_data(data, &XptReaderOptions::default())
}

fn parse_xpt_data(data: &[u8], options: &XptReaderOptions) -> Result<XptDataset> {
    if data.len() < RECORD_LEN * 8 {
        return Err(XptError::invalid_format("file too small"));
    }
    if !data.len().is_multiple_of(RECORD_LEN) {
        return Err(XptError::invalid_format(
            "file length is not a multiple of 80",
        ));
    }

    let mut offset = 0usize;

    validate_library_header(read_record(data, offset)?)?;
    // real header and modified header carry nothing we need
    offset += RECORD_LEN * 3;

    let member_header = read_record(data, offset)?;
    validate_member_header(member_header)?;
    let namestr_len = parse_namestr_len(member_header)?;
    offset += RECORD_LEN;

    validate_dscrptr_header(read_record(data, offset)?)?;
    offset += RECORD_LEN;

    let name = parse_dataset_name(read_record(data, offset)?)?;
    offset += RECORD_LEN;

    let label = parse_dataset_label(read_record(data, offset)?);
    offset += RECORD_LEN;

    let namestr_header = read_record(data, offset)?;
    validate_namestr_header(namestr_header)?;
    let var_count = parse_variable_count(namestr_header)?;
    offset += RECORD_LEN;

    let namestr_total = var_count
        .checked_mul(namestr_len)
        .ok_or(XptError::ObservationOverflow)?;
    let namestr_data = data
        .get(offset..offset + namestr_total)
        .ok_or(XptError::RecordOutOfBounds { offset })?;
    let columns = parse_namestr_records(namestr_data, var_count, namestr_len)?;
    offset = align_to_record(offset + namestr_total);

    validate_obs_header(read_record(data, offset)?)?;
    offset += RECORD_LEN;

    let end = member_end(data, offset);
    let obs_len = observation_length(&columns)?;
    let rows = parse_observations(&data[offset..end], obs_len, &columns, options)?;

    Ok(XptDataset {
        name,
        label,
        columns,
        rows,
    })
}

fn read_record(data: &[u8], offset: usize) -> Result<&[u8]> {
    data.get(offset..offset + RECORD_LEN)
        .ok_or(XptError::RecordOutOfBounds { offset })
}

/// Offset where the observations of the current member stop: the next
/// member header, or end of file.
fn member_end(data: &[u8], start: usize) -> usize {
    let prefix = MEMBER_HEADER_PREFIX.as_bytes();
    (start..data.len())
        .step_by(RECORD_LEN)
        .find(|&pos| data[pos..].starts_with(prefix))
        .unwrap_or(data.len())
}

fn observation_length(columns: &[XptColumn]) -> Result<usize> {
    columns.iter().try_fold(0usize, |total, column| {
        total
            .checked_add(column.length as usize)
            .ok_or(XptError::ObservationOverflow)
    })
}

fn parse_observations(
    data: &[u8],
    obs_len: usize,
    columns: &[XptColumn],
    options: &XptReaderOptions,
) -> Result<Vec<Vec<XptValue>>> {
    if obs_len == 0 {
        return Ok(Vec::new());
    }

    let mut rows_total = data.len() / obs_len;
    let remainder = &data[rows_total * obs_len..];
    if remainder.iter().any(|&b| b != b' ') {
        return Err(XptError::TrailingBytes);
    }

    // Record padding can look like whole rows of blanks, but only rows that
    // start inside the last record can be padding.
    let padding_start = data.len().saturating_sub(RECORD_LEN);
    while rows_total > 0 {
        let start = (rows_total - 1) * obs_len;
        if start > padding_start && data[start..start + obs_len].iter().all(|&b| b == b' ') {
            rows_total -= 1;
        } else {
            break;
        }
    }

    Ok(data[..rows_total * obs_len]
        .chunks_exact(obs_len)
        .map(|row| parse_row(row, columns, options))
        .collect())
}

fn parse_row(row: &[u8], columns: &[XptColumn], options: &XptReaderOptions) -> Vec<XptValue> {
    let mut pos = 0usize;
    columns
        .iter()
        .map(|column| {
            let len = column.length as usize;
            let slice = &row[pos..pos + len];
            pos += len;
            match column.data_type {
                XptType::Char => XptValue::Char(decode_char(slice, options.trim_strings)),
                XptType::Num => XptValue::Num(decode_numeric(slice)),
            }
        })
        .collect()
}

fn decode_char(bytes: &[u8], trim: bool) -> String {
    let text = String::from_utf8_lossy(bytes);
    if trim {
        text.trim_end().to_string()
    } else {
        text.into_owned()
    }
}

fn decode_numeric(bytes: &[u8]) -> Option<f64> {
    if is_missing(bytes) {
        return None;
    }
    // short numerics are truncated on the right
    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);
    Some(ibm_to_ieee(buf))
}
