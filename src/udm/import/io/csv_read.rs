use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use tracing::{debug, instrument, warn};

use crate::udm::import::error::{ImportError, Result};
use crate::udm::import::io::dialect::{self, Dialect};
use crate::udm::import::io::encoding::{self, TextEncoding};
use crate::udm::import::model::Row;

/// CSV file opened with its detected encoding and dialect.
///
/// The header row has been consumed; data rows are produced by [`rows`](Self::rows)
/// or collected with [`read_all`](Self::read_all).
pub struct CsvReader {
    path: PathBuf,
    encoding: TextEncoding,
    dialect: Dialect,
    headers: Vec<String>,
    reader: csv::Reader<Cursor<String>>,
}

impl CsvReader {
    /// Detects encoding and dialect of the file at `path` and reads its header.
    #[instrument(level = "debug", fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let encoding = encoding::detect(&bytes);
        let text = encoding.decode(&bytes).into_owned();
        drop(bytes);

        let dialect = dialect::sniff(&text)?;
        let text = if dialect.skip_initial_space {
            dialect::strip_initial_spaces(&text, dialect)
        } else {
            text
        };
        debug!(
            encoding = encoding.label(),
            delimiter = %char::from(dialect.delimiter),
            quote = %char::from(dialect.quote),
            "detected CSV format"
        );

        let mut reader = ReaderBuilder::new()
            .delimiter(dialect.delimiter)
            .quote(dialect.quote)
            .has_headers(true)
            .flexible(true)
            .from_reader(Cursor::new(text));
        let headers = reader
            .headers()?
            .iter()
            .map(|name| name.trim().to_string())
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            encoding,
            dialect,
            headers,
            reader,
        })
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Trimmed header names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Streams the data rows in file order.
    pub fn rows(self) -> CsvRows {
        CsvRows {
            headers: self.headers,
            records: self.reader.into_records(),
            line: 1,
        }
    }

    /// Collects all data rows, failing when there are none.
    pub fn read_all(self) -> Result<Vec<Row>> {
        let path = self.path.clone();
        let rows = self.rows().collect::<Result<Vec<_>>>()?;
        if rows.is_empty() {
            return Err(ImportError::EmptyInput(path));
        }
        Ok(rows)
    }
}

/// Iterator over the data rows of a [`CsvReader`].
pub struct CsvRows {
    headers: Vec<String>,
    records: StringRecordsIntoIter<Cursor<String>>,
    line: usize,
}

impl CsvRows {
    fn to_row(&self, record: &StringRecord) -> Row {
        if record.len() > self.headers.len() {
            warn!(
                record = self.line,
                extra = record.len() - self.headers.len(),
                "ignoring cells beyond the header"
            );
        }
        self.headers
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let value = record.get(index).map(str::trim).unwrap_or_default();
                (name.clone(), value.to_string())
            })
            .collect()
    }
}

impl Iterator for CsvRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        self.line += 1;
        Some(
            record
                .map(|record| self.to_row(&record))
                .map_err(ImportError::from),
        )
    }
}
