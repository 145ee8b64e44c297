//! XPT file writer.
//!
//! Writes a single-member SAS Transport V5 file.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, XptError};
use crate::float::{MISSING_STANDARD, ieee_to_ibm};
use crate::header::{
    RECORD_LEN, build_dscrptr_header, build_library_header, build_member_data,
    build_member_header, build_member_second, build_namestr, build_namestr_header,
    build_obs_header, build_real_header, build_second_header,
};
use crate::types::{XptColumn, XptDataset, XptType, XptValue, XptWriterOptions};

/// V5 limit for dataset and variable names.
pub const MAX_NAME_LEN: usize = 8;

/// XPT file writer.
pub struct XptWriter<W: Write> {
    writer: BufWriter<W>,
    options: XptWriterOptions,
}

impl<W: Write> XptWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XptWriterOptions::default())
    }

    pub fn with_options(writer: W, mut options: XptWriterOptions) -> Self {
        // one timestamp for every header record
        if options.created.is_none() {
            options.created = Some(chrono::Local::now().naive_local());
        }
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Write a dataset as the only member of the file.
    pub fn write_dataset(mut self, dataset: &XptDataset) -> Result<()> {
        validate_dataset(dataset)?;

        self.writer.write_all(&build_library_header())?;
        self.writer.write_all(&build_real_header(&self.options))?;
        self.writer.write_all(&build_second_header(&self.options))?;

        self.writer.write_all(&build_member_header())?;
        self.writer.write_all(&build_dscrptr_header())?;
        self.writer
            .write_all(&build_member_data(dataset, &self.options))?;
        self.writer
            .write_all(&build_member_second(dataset, &self.options))?;

        self.writer
            .write_all(&build_namestr_header(dataset.columns.len()))?;
        self.write_namestr_records(&dataset.columns)?;

        self.writer.write_all(&build_obs_header())?;
        self.write_observations(dataset)?;

        self.writer.flush()?;
        Ok(())
    }

    fn write_namestr_records(&mut self, columns: &[XptColumn]) -> Result<()> {
        let mut record_writer = RecordWriter::new(&mut self.writer);
        let mut position = 0u32;
        for (idx, column) in columns.iter().enumerate() {
            let namestr = build_namestr(column, (idx + 1) as u16, position);
            record_writer.write_bytes(&namestr)?;
            position = position.saturating_add(u32::from(column.length));
        }
        record_writer.finish()
    }

    fn write_observations(&mut self, dataset: &XptDataset) -> Result<()> {
        let obs_len: usize = dataset.columns.iter().map(|c| c.length as usize).sum();
        let mut record_writer = RecordWriter::new(&mut self.writer);

        for row in &dataset.rows {
            let mut obs = Vec::with_capacity(obs_len);
            for (value, column) in row.iter().zip(&dataset.columns) {
                obs.extend(encode_value(value, column));
            }
            record_writer.write_bytes(&obs)?;
        }

        record_writer.finish()
    }
}

impl XptWriter<File> {
    pub fn create(path: &Path, options: XptWriterOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_options(file, options))
    }
}

/// Write a dataset to an XPT file.
pub fn write_xpt(path: &Path, dataset: &XptDataset, options: &XptWriterOptions) -> Result<()> {
    XptWriter::create(path, options.clone())?.write_dataset(dataset)
}

/// Serialize a dataset into an in-memory transport file.
pub fn to_bytes(dataset: &XptDataset, options: &XptWriterOptions) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    XptWriter::with_options(&mut buffer, options.clone()).write_dataset(dataset)?;
    Ok(buffer)
}

fn validate_dataset(dataset: &XptDataset) -> Result<()> {
    let name = dataset.name.trim();
    if name.is_empty() {
        return Err(XptError::invalid_format("empty dataset name"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(XptError::NameTooLong {
            name: dataset.name.clone(),
        });
    }

    let mut seen = BTreeSet::new();
    for column in &dataset.columns {
        let col_name = column.name.trim().to_uppercase();
        if col_name.is_empty() {
            return Err(XptError::invalid_format("empty variable name"));
        }
        if col_name.len() > MAX_NAME_LEN {
            return Err(XptError::NameTooLong {
                name: column.name.clone(),
            });
        }
        if !seen.insert(col_name) {
            return Err(XptError::invalid_format(format!(
                "duplicate variable name: {}",
                column.name
            )));
        }
        if column.length == 0 {
            return Err(XptError::invalid_format(format!(
                "variable {} has zero length",
                column.name
            )));
        }
    }

    for row in &dataset.rows {
        if row.len() != dataset.columns.len() {
            return Err(XptError::RowLengthMismatch {
                expected: dataset.columns.len(),
                actual: row.len(),
            });
        }
    }

    Ok(())
}

fn encode_value(value: &XptValue, column: &XptColumn) -> Vec<u8> {
    match (value, column.data_type) {
        (XptValue::Char(s), XptType::Char) => encode_char(s, column.length),
        (XptValue::Num(n), XptType::Num) => encode_numeric(*n, column.length),
        (XptValue::Char(s), XptType::Num) => {
            encode_numeric(s.trim().parse::<f64>().ok(), column.length)
        }
        (XptValue::Num(n), XptType::Char) => encode_char(
            &n.map(|v| v.to_string()).unwrap_or_default(),
            column.length,
        ),
    }
}

fn encode_char(value: &str, length: u16) -> Vec<u8> {
    let len = length as usize;
    let mut out: Vec<u8> = value
        .chars()
        .take(len)
        .map(|ch| if ch.is_ascii() { ch as u8 } else { b'?' })
        .collect();
    out.resize(len, b' ');
    out
}

fn encode_numeric(value: Option<f64>, length: u16) -> Vec<u8> {
    let bytes = match value {
        Some(v) if v.is_finite() => ieee_to_ibm(v),
        _ => MISSING_STANDARD,
    };
    let mut out = bytes.to_vec();
    out.resize(length as usize, 0);
    out
}

/// Packs byte runs into 80-byte records, space padding the last one.
struct RecordWriter<'a, W: Write> {
    writer: &'a mut W,
    record: [u8; RECORD_LEN],
    pos: usize,
}

impl<'a, W: Write> RecordWriter<'a, W> {
    fn new(writer: &'a mut W) -> Self {
        Self {
            writer,
            record: [b' '; RECORD_LEN],
            pos: 0,
        }
    }

    fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<()> {
        while !bytes.is_empty() {
            let take = (RECORD_LEN - self.pos).min(bytes.len());
            self.record[self.pos..self.pos + take].copy_from_slice(&bytes[..take]);
            self.pos += take;
            bytes = &bytes[take..];

            if self.pos == RECORD_LEN {
                self.writer.write_all(&self.record)?;
                self.record = [b' '; RECORD_LEN];
                self.pos = 0;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.pos > 0 {
            self.record[self.pos..].fill(b' ');
            self.writer.write_all(&self.record)?;
            self.pos = 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_char() {
        assert_eq!(encode_char("hello", 10), b"hello     ");
        assert_eq!(encode_char("verylongstring", 5), b"veryl");
        assert_eq!(encode_char("naïve", 5), b"na?ve");
    }

    #[test]
    fn test_encode_numeric() {
        let encoded = encode_numeric(Some(1.0), 8);
        assert_eq!(encoded[0], 0x41);
        assert_eq!(encode_numeric(None, 8), MISSING_STANDARD.to_vec());
        assert_eq!(encode_numeric(Some(f64::NAN), 8), MISSING_STANDARD.to_vec());
    }

    #[test]
    fn test_validate_dataset() {
        let valid = XptDataset::with_columns(
            "DEMO",
            vec![XptColumn::numeric("SEQN"), XptColumn::character("Cycle", 9)],
        );
        assert!(validate_dataset(&valid).is_ok());

        assert!(validate_dataset(&XptDataset::new("")).is_err());
        assert!(matches!(
            validate_dataset(&XptDataset::new("VERYLONGNAME")),
            Err(XptError::NameTooLong { .. })
        ));

        let duplicate = XptDataset::with_columns(
            "DEMO",
            vec![XptColumn::numeric("SEQN"), XptColumn::numeric("seqn")],
        );
        assert!(validate_dataset(&duplicate).is_err());

        let mut ragged = valid.clone();
        ragged.add_row(vec![XptValue::numeric(1.0)]);
        assert!(matches!(
            validate_dataset(&ragged),
            Err(XptError::RowLengthMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_record_writer() {
        let mut output = Vec::new();
        {
            let mut writer = RecordWriter::new(&mut output);
            writer.write_bytes(&[b'A'; 50]).unwrap();
            writer.write_bytes(&[b'B'; 50]).unwrap();
            writer.finish().unwrap();
        }
        assert_eq!(output.len(), 160);
        assert_eq!(&output[0..50], &[b'A'; 50]);
        assert_eq!(&output[50..100], &[b'B'; 50]);
        assert!(output[100..].iter().all(|&b| b == b' '));
    }
}
