//! Translation of backend error diagnostics into row-level batch faults.
//!
//! Some backends report which row of a multi-row statement violated a
//! constraint only inside the error text (MySQL-style
//! `Out of range value for column 'close' at row 485`). That scraping is
//! confined to this module; a backend with structured row diagnostics can
//! implement [`RowFaultDiagnostics`] directly instead.

/// Offending position a backend reported for one failed batch statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFault {
    /// 1-based row position within the failed statement.
    pub row: usize,
    /// Column the backend blamed, when identifiable.
    pub column: Option<String>,
}

/// Backend-specific extraction of a row fault from a database error.
pub trait RowFaultDiagnostics: Send + Sync {
    fn locate(&self, error: &sqlx::Error) -> Option<RowFault>;
}

/// Scrapes `... for column 'x' at row N` style error text.
#[derive(Debug, Default)]
pub struct TextRowFaultDiagnostics;

impl RowFaultDiagnostics for TextRowFaultDiagnostics {
    fn locate(&self, error: &sqlx::Error) -> Option<RowFault> {
        parse_fault_text(&error.to_string())
    }
}

const ROW_MARKER: &str = "at row ";
const COLUMN_MARKER: &str = "for column '";

pub(crate) fn parse_fault_text(text: &str) -> Option<RowFault> {
    let pos = text.find(ROW_MARKER)?;
    let digits: String = text[pos + ROW_MARKER.len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }

    let column = text.find(COLUMN_MARKER).and_then(|p| {
        let rest = &text[p + COLUMN_MARKER.len()..];
        rest.find('\'').map(|end| rest[..end].to_string())
    });

    Some(RowFault { row, column })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_row_and_column() {
        let fault =
            parse_fault_text("error 1264: Out of range value for column 'close' at row 485")
                .unwrap();
        assert_eq!(fault.row, 485);
        assert_eq!(fault.column.as_deref(), Some("close"));
    }

    #[test]
    fn parses_row_without_column() {
        let fault = parse_fault_text("Incorrect value at row 3").unwrap();
        assert_eq!(fault.row, 3);
        assert_eq!(fault.column, None);
    }

    #[test]
    fn rejects_text_without_row() {
        assert_eq!(parse_fault_text("numeric field overflow"), None);
        assert_eq!(parse_fault_text("at row zero"), None);
        assert_eq!(parse_fault_text("at row 0"), None);
    }
}
