use std::{collections::BTreeMap, io::Read};

use serde::Serialize;
use tracing::{debug, warn};

use crate::Error;

/// How the first record of a delimited file is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// The first record holds column names.
    Present,
    /// Every record is data; columns are named by position.
    Absent,
    /// The first record is a header if any of its fields is not a number.
    Auto,
}

/// A table of named numeric columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

/// The dataset split on its group flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Groups {
    pub lean: Vec<f64>,
    pub obese: Vec<f64>,
}

/// One row of [`Frame::group_by_mean`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: f64,
    pub count: usize,
    /// `(column, mean)` for every column other than the grouping one.
    pub means: Vec<(String, f64)>,
}

impl Frame {
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self, Error> {
        if names.len() != columns.len() {
            return Err(Error::ColumnCountMismatch {
                expected: names.len(),
                got: columns.len(),
            });
        }
        if let Some(first) = columns.first() {
            if let Some(i) = columns.iter().position(|c| c.len() != first.len()) {
                return Err(Error::UnequalColumnLengths(i + 1));
            }
        }
        Ok(Self { names, columns })
    }

    pub fn from_columns<'a>(
        cols: impl IntoIterator<Item = (&'a str, Vec<f64>)>,
    ) -> Result<Self, Error> {
        let (names, columns): (Vec<String>, Vec<Vec<f64>>) = cols
            .into_iter()
            .map(|(n, c)| (n.to_string(), c))
            .unzip();
        Self::new(names, columns)
    }

    /// Parse comma-delimited numeric text. Fields are trimmed and blank lines
    /// are skipped.
    #[tracing::instrument(skip(reader))]
    pub fn from_csv_reader(reader: impl Read, header: Header) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut names: Option<Vec<String>> = None;
        let mut columns: Vec<Vec<f64>> = Vec::new();
        let mut first = true;
        for record in rdr.records() {
            let record = record?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or_default();
            if record.iter().all(|f| f.is_empty()) {
                continue;
            }
            if first {
                first = false;
                let is_header = match header {
                    Header::Present => true,
                    Header::Absent => false,
                    Header::Auto => record.iter().any(|f| f.parse::<f64>().is_err()),
                };
                if is_header {
                    debug!("Treating line {} as header", line);
                    names = Some(record.iter().map(|f| f.to_string()).collect());
                    columns = vec![Vec::new(); record.len()];
                    continue;
                }
                columns = vec![Vec::new(); record.len()];
            }
            if record.len() != columns.len() {
                return Err(Error::UnequalColumnLengths(line));
            }
            for (col, field) in columns.iter_mut().zip(record.iter()) {
                let v = field
                    .parse::<f64>()
                    .map_err(|source| Error::ParseFloat { line, source })?;
                col.push(v);
            }
        }
        let names =
            names.unwrap_or_else(|| (0..columns.len()).map(|i| i.to_string()).collect());
        if columns.first().is_none_or(|c| c.is_empty()) {
            warn!("Parsed a data set with no rows");
        }
        Self::new(names, columns)
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn colnames(&self) -> &[String] {
        &self.names
    }

    pub fn column_index(&self, name: &str) -> Result<usize, Error> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::ColumnNameNotFound(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<&[f64], Error> {
        Ok(&self.columns[self.column_index(name)?])
    }

    pub fn column_at(&self, i: usize) -> Result<&[f64], Error> {
        self.columns
            .get(i)
            .map(Vec::as_slice)
            .ok_or(Error::ColumnIndexOutOfBounds(i))
    }

    pub fn set_colnames(&mut self, names: Vec<String>) -> Result<&mut Self, Error> {
        if names.len() != self.ncols() {
            return Err(Error::ColumnCountMismatch {
                expected: names.len(),
                got: self.ncols(),
            });
        }
        self.names = names;
        Ok(self)
    }


    /// Mean of every other column for each distinct value of `by`, ordered by
    /// that value.
    pub fn group_by_mean(&self, by: &str) -> Result<Vec<GroupMean>, Error> {
        let by_idx = self.column_index(by)?;
        // f64 keys are ordered through their total-order bit pattern
        let mut groups: BTreeMap<OrdKey, Vec<usize>> = BTreeMap::new();
        for (row, key) in self.columns[by_idx].iter().enumerate() {
            groups.entry(OrdKey(*key)).or_default().push(row);
        }
        Ok(groups
            .into_iter()
            .map(|(key, rows)| GroupMean {
                key: key.0,
                count: rows.len(),
                means: self
                    .names
                    .iter()
                    .zip(self.columns.iter())
                    .enumerate()
                    .filter(|(i, _)| *i != by_idx)
                    .map(|(_, (name, col))| {
                        let sum = rows.iter().map(|r| col[*r]).sum::<f64>();
                        (name.clone(), sum / rows.len() as f64)
                    })
                    .collect(),
            })
            .collect())
    }

    /// Split `value` on the 0/1 flag in `flag`: 0 is lean, 1 is obese. A
    /// group with no rows comes back empty.
    pub fn partition_by_flag(&self, value: &str, flag: &str) -> Result<Groups, Error> {
        let values = self.column(value)?;
        let flags = self.column(flag)?;
        let mut groups = Groups {
            lean: Vec::new(),
            obese: Vec::new(),
        };
        for (i, (v, f)) in values.iter().zip(flags.iter()).enumerate() {
            if *f == 0.0 {
                groups.lean.push(*v);
            } else if *f == 1.0 {
                groups.obese.push(*v);
            } else {
                return Err(Error::InvalidFlag {
                    value: *f,
                    row: i + 1,
                });
            }
        }
        debug!(
            "Partitioned {} lean and {} obese rows",
            groups.lean.len(),
            groups.obese.len()
        );
        Ok(groups)
    }
}

#[derive(Debug, Clone, Copy)]
struct OrdKey(f64);

impl PartialEq for OrdKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0).is_eq()
    }
}

impl Eq for OrdKey {}

impl PartialOrd for OrdKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}
