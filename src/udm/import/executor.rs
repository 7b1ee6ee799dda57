use thiserror::Error;
use tracing::{debug, instrument};

use crate::udm::import::directory::{Directory, DirectoryError, UdmObject};
use crate::udm::import::model::{Action, DN_COLUMN, Row, StructuralField};

/// Failure of a single row, classified by its effect on the run.
#[derive(Debug, Error)]
pub enum RowFailure {
    /// Only this row is affected; the run continues.
    #[error(transparent)]
    Recoverable(DirectoryError),
    /// The remaining rows would fail the same way; the run stops.
    #[error(transparent)]
    Fatal(DirectoryError),
}

impl RowFailure {
    pub fn is_fatal(&self) -> bool {
        matches!(self, RowFailure::Fatal(_))
    }

    pub fn into_inner(self) -> DirectoryError {
        match self {
            RowFailure::Recoverable(error) | RowFailure::Fatal(error) => error,
        }
    }
}

impl From<DirectoryError> for RowFailure {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::Create { .. }
            | DirectoryError::Modify { .. }
            | DirectoryError::NoObject { .. } => RowFailure::Recoverable(error),
            other => RowFailure::Fatal(other),
        }
    }
}

/// Applies one action to rows of one module, one directory call sequence per row.
pub struct RowExecutor<'d, D: Directory + ?Sized> {
    directory: &'d mut D,
    module: String,
    identifying_property: String,
    action: Action,
}

impl<'d, D: Directory + ?Sized> RowExecutor<'d, D> {
    pub fn new(directory: &'d mut D, module: &str, action: Action) -> Result<Self, DirectoryError> {
        let identifying_property = directory.module(module)?.identifying_property;
        Ok(Self {
            directory,
            module: module.to_string(),
            identifying_property,
            action,
        })
    }

    /// Runs the action for `row` and returns the object's locator.
    #[instrument(level = "debug", skip_all, fields(module = %self.module, action = %self.action))]
    pub fn execute(&mut self, row: &Row) -> Result<String, RowFailure> {
        let dn = match self.action {
            Action::Create => self.create(row)?,
            Action::Modify => self.modify(row)?,
            Action::Remove => self.remove(row)?,
        };
        debug!(%dn, "row applied");
        Ok(dn)
    }

    fn create(&mut self, row: &Row) -> Result<String, DirectoryError> {
        let mut object = self.directory.new_object(&self.module)?;
        self.assign(&mut object, row)?;
        self.directory.save(&mut object)
    }

    fn modify(&mut self, row: &Row) -> Result<String, DirectoryError> {
        let mut object = self.resolve(row)?;
        self.assign(&mut object, row)?;
        self.directory.save(&mut object)
    }

    fn remove(&mut self, row: &Row) -> Result<String, DirectoryError> {
        let object = self.resolve(row)?;
        self.directory.delete(object)
    }

    fn resolve(&self, row: &Row) -> Result<UdmObject, DirectoryError> {
        match row.get(DN_COLUMN) {
            Some(dn) => self.directory.get(&self.module, dn),
            None => {
                let id = row.get(&self.identifying_property).unwrap_or_default();
                self.directory.get_by_id(&self.module, id)
            }
        }
    }

    /// Structural columns go onto the object, all others onto its property
    /// bag under the exact column name.
    fn assign(&self, object: &mut UdmObject, row: &Row) -> Result<(), DirectoryError> {
        for (column, value) in row.iter() {
            match StructuralField::from_column(column) {
                Some(field) => object.set_structural(field, value),
                None => self.directory.set_property(object, column, value)?,
            }
        }
        Ok(())
    }
}
