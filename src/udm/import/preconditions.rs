use tracing::{debug, instrument};

use crate::udm::import::directory::{Directory, DirectoryError};
use crate::udm::import::error::{ImportError, Result};
use crate::udm::import::model::{Action, DN_COLUMN, Row, StructuralField};

/// Verifies that the header of `rows` fits `action` on `module` before any
/// object is written.
///
/// Only the first row is inspected; all rows of a file share its columns.
/// The unknown-column check is skipped when the module cannot describe its
/// properties without a superordinate. Such columns fail later, while rows
/// are executed.
#[instrument(level = "debug", skip(directory, rows), fields(%action))]
pub fn check_preconditions<D: Directory + ?Sized>(
    directory: &D,
    module: &str,
    action: Action,
    rows: &[Row],
) -> Result<()> {
    let Some(header) = rows.first() else {
        return Ok(());
    };

    if action == Action::Create && header.contains(DN_COLUMN) {
        return Err(ImportError::InvalidColumn {
            column: DN_COLUMN.to_string(),
            action,
        });
    }

    if action.targets_existing() {
        let identifying_property = directory.module(module)?.identifying_property;
        if !header.contains(&identifying_property) && !header.contains(DN_COLUMN) {
            return Err(ImportError::MissingIdentifier {
                identifying_property,
                action,
            });
        }
    }

    if action.assigns_columns() {
        match directory.property_names(module) {
            Ok(known) => {
                let unknown: Vec<String> = header
                    .columns()
                    .filter(|column| StructuralField::from_column(column).is_none())
                    .filter(|column| !known.contains(*column))
                    .map(str::to_string)
                    .collect();
                if !unknown.is_empty() {
                    return Err(ImportError::UnknownColumns {
                        module: module.to_string(),
                        columns: unknown,
                    });
                }
            }
            Err(DirectoryError::NoSuperordinate(_)) => {
                debug!("module needs a superordinate; deferring column check to execution");
            }
            Err(error) => return Err(error.into()),
        }
    }

    Ok(())
}
