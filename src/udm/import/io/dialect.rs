use std::collections::BTreeMap;

use crate::udm::import::error::{ImportError, Result};

/// Delimiters tried in order when several characters could split the line.
const PREFERRED_DELIMITERS: [u8; 5] = [b',', b'\t', b';', b' ', b':'];
const QUOTE_CHARS: [u8; 2] = [b'"', b'\''];

/// Delimiter and quoting convention of a CSV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
    /// Every delimiter is followed by a space.
    pub skip_initial_space: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            skip_initial_space: false,
        }
    }
}

/// Derives the dialect from the first non-empty line of `text`.
pub fn sniff(text: &str) -> Result<Dialect> {
    let line = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| ImportError::DialectDetection("no non-empty line to sniff".into()))?;
    let bytes = line.as_bytes();

    if let Some((quote, delimiter)) = guess_quote_and_delimiter(bytes) {
        return Ok(Dialect {
            delimiter,
            quote,
            skip_initial_space: skips_initial_space(bytes, delimiter),
        });
    }

    let delimiter = guess_delimiter(bytes).ok_or_else(|| {
        ImportError::DialectDetection(format!("Could not determine delimiter in {line:?}"))
    })?;
    Ok(Dialect {
        delimiter,
        skip_initial_space: skips_initial_space(bytes, delimiter),
        ..Dialect::default()
    })
}

/// Drops the spaces that follow a delimiter outside quoted fields, so a
/// quoted field after `", "` is still recognised as quoted.
pub fn strip_initial_spaces(text: &str, dialect: Dialect) -> String {
    let delimiter = char::from(dialect.delimiter);
    let quote = char::from(dialect.quote);
    let mut stripped = String::with_capacity(text.len());
    let mut in_quotes = false;
    let mut after_delimiter = false;

    for ch in text.chars() {
        if after_delimiter && ch == ' ' {
            continue;
        }
        after_delimiter = false;
        if ch == quote {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            after_delimiter = true;
        }
        stripped.push(ch);
    }
    stripped
}

fn is_candidate(byte: u8) -> bool {
    byte.is_ascii()
        && !byte.is_ascii_alphanumeric()
        && byte != b'_'
        && byte != b'\n'
        && byte != b'\r'
        && !QUOTE_CHARS.contains(&byte)
}

/// Looks for quoted fields bordered by a delimiter, e.g. `"a b";"c"`.
fn guess_quote_and_delimiter(line: &[u8]) -> Option<(u8, u8)> {
    let mut quote_votes: BTreeMap<u8, usize> = BTreeMap::new();
    let mut delimiter_votes: BTreeMap<u8, usize> = BTreeMap::new();

    for &quote in &QUOTE_CHARS {
        let mut index = 0;
        while index < line.len() {
            if line[index] != quote || !opens_field(line, index) {
                index += 1;
                continue;
            }
            let Some(offset) = line[index + 1..].iter().position(|&byte| byte == quote) else {
                break;
            };
            let close = index + 1 + offset;
            let before = preceding_delimiter(line, index);
            let after = line.get(close + 1).copied().filter(|&byte| is_candidate(byte));
            if let Some(delimiter) = after.or(before) {
                *quote_votes.entry(quote).or_default() += 1;
                *delimiter_votes.entry(delimiter).or_default() += 1;
            }
            index = close + 1;
        }
    }

    let quote = most_voted(&quote_votes)?;
    let delimiter = most_voted(&delimiter_votes)?;
    Some((quote, delimiter))
}

fn opens_field(line: &[u8], index: usize) -> bool {
    index == 0 || preceding_delimiter(line, index).is_some()
}

fn preceding_delimiter(line: &[u8], index: usize) -> Option<u8> {
    let mut cursor = index;
    // allow a single space between delimiter and quote
    if cursor > 0 && line[cursor - 1] == b' ' && cursor > 1 && is_candidate(line[cursor - 2]) {
        cursor -= 1;
    }
    cursor
        .checked_sub(1)
        .map(|prev| line[prev])
        .filter(|&byte| is_candidate(byte))
}

fn most_voted(votes: &BTreeMap<u8, usize>) -> Option<u8> {
    votes
        .iter()
        .max_by_key(|(byte, count)| (**count, **byte))
        .map(|(byte, _)| *byte)
}

fn guess_delimiter(line: &[u8]) -> Option<u8> {
    let mut frequencies: BTreeMap<u8, usize> = BTreeMap::new();
    for &byte in line.iter().filter(|&&byte| is_candidate(byte)) {
        *frequencies.entry(byte).or_default() += 1;
    }
    if frequencies.is_empty() {
        return None;
    }
    if let Some(preferred) = PREFERRED_DELIMITERS
        .iter()
        .find(|delimiter| frequencies.contains_key(delimiter))
    {
        return Some(*preferred);
    }
    most_voted(&frequencies)
}

fn skips_initial_space(line: &[u8], delimiter: u8) -> bool {
    if delimiter == b' ' {
        return false;
    }
    let total = line.iter().filter(|&&byte| byte == delimiter).count();
    let followed = line
        .windows(2)
        .filter(|pair| pair[0] == delimiter && pair[1] == b' ')
        .count();
    total > 0 && total == followed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated_header() {
        let dialect = sniff("username,firstname,lastname\njdoe,John,Doe\n").unwrap();
        assert_eq!(dialect.delimiter, b',');
        assert_eq!(dialect.quote, b'"');
    }

    #[test]
    fn semicolon_wins_over_embedded_space() {
        let dialect = sniff("username;display name\n").unwrap();
        assert_eq!(dialect.delimiter, b';');
    }

    #[test]
    fn tab_separated_header() {
        assert_eq!(sniff("username\tlastname\n").unwrap().delimiter, b'\t');
    }

    #[test]
    fn leading_blank_lines_are_skipped() {
        assert_eq!(sniff("\n  \nusername|lastname\n").unwrap().delimiter, b'|');
    }

    #[test]
    fn quoted_fields_reveal_quote_and_delimiter() {
        let dialect = sniff("'user name';'last, name'\n").unwrap();
        assert_eq!(dialect.quote, b'\'');
        assert_eq!(dialect.delimiter, b';');
    }

    #[test]
    fn space_after_delimiter_is_detected() {
        let dialect = sniff("username, lastname, firstname\n").unwrap();
        assert_eq!(dialect.delimiter, b',');
        assert!(dialect.skip_initial_space);
    }

    #[test]
    fn initial_spaces_are_dropped_outside_quotes_only() {
        let text = "username, description\nasmith, \"Room 4,  floor 2\"\n";
        let dialect = sniff(text).unwrap();
        assert_eq!(
            strip_initial_spaces(text, dialect),
            "username,description\nasmith,\"Room 4,  floor 2\"\n"
        );
    }

    #[test]
    fn single_bare_column_cannot_be_sniffed() {
        let error = sniff("username\njdoe\n").unwrap_err();
        assert!(matches!(error, ImportError::DialectDetection(_)));
    }

    #[test]
    fn empty_text_cannot_be_sniffed() {
        assert!(matches!(
            sniff("\n\n").unwrap_err(),
            ImportError::DialectDetection(_)
        ));
    }
}
