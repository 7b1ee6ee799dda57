use std::fmt;

/// Column carrying the record locator (distinguished name).
pub const DN_COLUMN: &str = "dn";

/// Operation requested for every row of one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Modify,
    Remove,
}

impl Action {
    /// Progressive and past-tense labels used in status lines.
    pub fn labels(self) -> (&'static str, &'static str) {
        match self {
            Action::Create => ("Creating", "Created"),
            Action::Modify => ("Modifying", "Modified"),
            Action::Remove => ("Removing", "Removed"),
        }
    }

    /// Whether rows must locate an existing object.
    pub fn targets_existing(self) -> bool {
        matches!(self, Action::Modify | Action::Remove)
    }

    /// Whether row columns are written onto the object.
    pub fn assigns_columns(self) -> bool {
        matches!(self, Action::Create | Action::Modify)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Modify => write!(f, "modify"),
            Action::Remove => write!(f, "remove"),
        }
    }
}

/// Columns that address the object itself rather than its property bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralField {
    Dn,
    Options,
    Policies,
    Position,
    Superordinate,
}

impl StructuralField {
    pub const ALL: [StructuralField; 5] = [
        StructuralField::Dn,
        StructuralField::Options,
        StructuralField::Policies,
        StructuralField::Position,
        StructuralField::Superordinate,
    ];

    /// Column name as it appears in the CSV header.
    pub fn column(self) -> &'static str {
        match self {
            StructuralField::Dn => DN_COLUMN,
            StructuralField::Options => "options",
            StructuralField::Policies => "policies",
            StructuralField::Position => "position",
            StructuralField::Superordinate => "superordinate",
        }
    }

    /// Matches a column name exactly; no case folding.
    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == column)
    }
}

/// One CSV data row: trimmed column names mapped to trimmed text values.
///
/// Columns keep header order. Every header column is present; cells missing
/// from a short record hold the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value. A repeated column keeps its first position
    /// but takes the latest value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (name, value)) in self.fields.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name:?}: {value:?}")?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// Outcome of one import run. Lives only until the summary is printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Rows handed to the executor.
    pub attempted: usize,
    /// Rows that failed with a recoverable error.
    pub failed: usize,
    /// Locators returned for successfully processed rows, in file order.
    pub dns: Vec<String>,
}

impl RunResult {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed
    }

    /// Process exit status for a run that reached the summary.
    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 { 0 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_column_keeps_position_and_takes_last_value() {
        let row: Row = [("username", "a"), ("lastname", "b"), ("username", "c")]
            .into_iter()
            .collect();
        assert_eq!(row.columns().collect::<Vec<_>>(), ["username", "lastname"]);
        assert_eq!(row.get("username"), Some("c"));
    }

    #[test]
    fn structural_columns_match_exactly() {
        assert_eq!(StructuralField::from_column("position"), Some(StructuralField::Position));
        assert_eq!(StructuralField::from_column("Position"), None);
        assert_eq!(StructuralField::from_column("username"), None);
    }
}
