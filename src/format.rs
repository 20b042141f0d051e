use std::io::Write;

use crate::error::SqlScriptError;
use crate::results::ResultSet;

/// Width of the dashed rule printed under a header row.
pub const RULE_WIDTH: usize = 79;

/// Render result sets as tab-separated text on the sink.
///
/// For each set in order: the column names joined by tabs and a dashed rule
/// (when a schema is present), then one line per row, then a blank line.
/// After all sets, a `N row(s) affected` line is written only when at least
/// one set carried an applicable count; the total is returned. This is a
/// human-readable report; cell values are not escaped.
///
/// # Errors
///
/// Any write failure is fatal and propagates as `SqlScriptError::Io`; partial
/// or garbled output is worse than aborting.
pub fn write_result_sets(
    result_sets: &[ResultSet],
    sink: &mut dyn Write,
) -> Result<usize, SqlScriptError> {
    let mut total_affected: Option<usize> = None;

    for set in result_sets {
        if let Some(columns) = set.column_names() {
            writeln!(sink, "{}", columns.join("\t"))?;
            writeln!(sink, "{}", "-".repeat(RULE_WIDTH))?;
            for row in &set.rows {
                let line = row
                    .values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\t");
                writeln!(sink, "{line}")?;
            }
            writeln!(sink)?;
        }
        if let Some(affected) = set.rows_affected {
            total_affected = Some(total_affected.unwrap_or(0) + affected);
        }
    }

    if let Some(total) = total_affected {
        writeln!(sink, "{total} row(s) affected")?;
    }

    Ok(total_affected.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowValues;

    fn render(sets: &[ResultSet]) -> (String, usize) {
        let mut sink = Vec::new();
        let affected = write_result_sets(sets, &mut sink).unwrap();
        (String::from_utf8(sink).unwrap(), affected)
    }

    #[test]
    fn select_renders_header_rule_row_and_blank_line() {
        let mut set = ResultSet::with_columns(vec!["id".to_string()]);
        set.add_row_values(vec![RowValues::Int(42)]);

        let (text, affected) = render(&[set]);
        let expected = format!("id\n{}\n42\n\n", "-".repeat(RULE_WIDTH));
        assert_eq!(text, expected);
        assert_eq!(affected, 0);
    }

    #[test]
    fn multiple_columns_are_tab_separated() {
        let mut set = ResultSet::with_columns(vec!["id".to_string(), "name".to_string()]);
        set.add_row_values(vec![RowValues::Int(1), RowValues::Text("alice".into())]);
        set.add_row_values(vec![RowValues::Int(2), RowValues::Null]);

        let (text, _) = render(&[set]);
        assert!(text.starts_with("id\tname\n"));
        assert!(text.contains("1\talice\n"));
        assert!(text.contains("2\tNULL\n"));
    }

    #[test]
    fn dml_reports_total_affected_rows() {
        let sets = vec![ResultSet::from_dml(2), ResultSet::from_dml(3)];
        let (text, affected) = render(&sets);
        assert_eq!(text, "5 row(s) affected\n");
        assert_eq!(affected, 5);
    }

    #[test]
    fn select_alone_emits_no_affected_line() {
        let set = ResultSet::with_columns(vec!["id".to_string()]);
        let (text, affected) = render(&[set]);
        assert!(!text.contains("affected"));
        assert_eq!(affected, 0);
    }
}
