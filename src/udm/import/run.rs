use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::udm::import::directory::Directory;
use crate::udm::import::error::{ImportError, Result};
use crate::udm::import::executor::{RowExecutor, RowFailure};
use crate::udm::import::io::CsvReader;
use crate::udm::import::model::{Action, Row, RunResult};
use crate::udm::import::preconditions::check_preconditions;
use crate::udm::import::report::{Level, Reporter};

/// Phases of an import run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loading,
    Validating,
    Processing,
    Summarizing,
    Done,
}

/// Drives one import of a CSV file into one UDM module.
pub struct Importer<'a, D: Directory + ?Sized, R: Reporter + ?Sized> {
    directory: &'a mut D,
    reporter: &'a mut R,
    module: String,
    action: Action,
    state: RunState,
}

impl<'a, D: Directory + ?Sized, R: Reporter + ?Sized> Importer<'a, D, R> {
    /// Binds the importer to `module`, which must be known to the directory.
    pub fn new(directory: &'a mut D, reporter: &'a mut R, module: &str, action: Action) -> Result<Self> {
        directory.module(module)?;
        reporter.good(&format!("Loaded UDM module {module:?}."));
        Ok(Self {
            directory,
            reporter,
            module: module.to_string(),
            action,
            state: RunState::Idle,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn enter(&mut self, state: RunState) {
        debug!(from = ?self.state, to = ?state, "run state transition");
        self.state = state;
    }

    /// Imports every row of the file at `path`.
    ///
    /// Returns the tally when all rows were attempted. Loading, validation
    /// and fatal row failures end the run with an error instead.
    #[instrument(
        level = "info",
        skip_all,
        fields(module = %self.module, action = %self.action, path = %path.display())
    )]
    pub fn run(&mut self, path: &Path) -> Result<RunResult> {
        self.enter(RunState::Loading);
        let rows = self.load(path)?;

        self.enter(RunState::Validating);
        check_preconditions(&*self.directory, &self.module, self.action, &rows)?;

        self.enter(RunState::Processing);
        let result = self.process(&rows)?;

        self.enter(RunState::Summarizing);
        self.summarize(&result);

        self.enter(RunState::Done);
        Ok(result)
    }

    fn load(&mut self, path: &Path) -> Result<Vec<Row>> {
        let reader = CsvReader::open(path)?;
        self.reporter.info(&format!(
            "Reading {} with encoding {:?}.",
            path.display(),
            reader.encoding().label()
        ));
        let dialect = reader.dialect();
        self.reporter.report(
            Level::Debug,
            &format!(
                "Delimiter {:?}, quote character {:?}.",
                char::from(dialect.delimiter),
                char::from(dialect.quote)
            ),
        );

        let rows = reader.read_all()?;
        self.reporter
            .info(&format!("Found {} rows in {:?}.", rows.len(), path.display().to_string()));
        info!(rows = rows.len(), "loaded CSV rows");
        Ok(rows)
    }

    fn process(&mut self, rows: &[Row]) -> Result<RunResult> {
        let (progressive, _) = self.action.labels();
        self.reporter
            .info(&format!("{progressive} {} objects", self.module));

        let mut executor = RowExecutor::new(&mut *self.directory, &self.module, self.action)?;
        let mut result = RunResult::default();
        let total = rows.len();

        for (index, row) in rows.iter().enumerate() {
            let number = index + 1;
            result.attempted += 1;
            match executor.execute(row) {
                Ok(dn) => {
                    self.reporter.good(&format!("[{number}/{total}] -> {dn:?}"));
                    result.dns.push(dn);
                }
                Err(RowFailure::Recoverable(error)) => {
                    warn!(row = number, %error, "row failed");
                    result.failed += 1;
                    self.reporter.error(&format!("[{number}/{total}] {error}"));
                }
                Err(RowFailure::Fatal(error)) => {
                    warn!(row = number, %error, "aborting run");
                    return Err(ImportError::Aborted {
                        row: number,
                        fields: row.to_string(),
                        source: error,
                    });
                }
            }
        }

        Ok(result)
    }

    fn summarize(&mut self, result: &RunResult) {
        let (_, past) = self.action.labels();
        let message = format!(
            "{past} {} {} objects. {} errors. {} rows processed.",
            result.succeeded(),
            self.module,
            result.failed,
            result.attempted
        );
        let level = if result.failed > 0 { Level::Error } else { Level::Good };
        self.reporter.report(level, &message);
        info!(
            attempted = result.attempted,
            succeeded = result.succeeded(),
            failed = result.failed,
            "import finished"
        );
    }
}
