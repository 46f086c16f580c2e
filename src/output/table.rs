//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// Format rows as a rounded table with a centred header
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryRow;

    #[test]
    fn test_format_table_empty() {
        let rows: Vec<SummaryRow> = vec![];
        assert_eq!(format_table(&rows), "No results found.");
    }

    #[test]
    fn test_format_table_rows() {
        let rows = vec![
            SummaryRow::new("Total", "42"),
            SummaryRow::new("Longest streak", "7 days"),
        ];
        let result = format_table(&rows);

        assert!(result.contains("METRIC"));
        assert!(result.contains("VALUE"));
        assert!(result.contains("Longest streak"));
        assert!(result.contains("7 days"));
        // Rounded style corners
        assert!(result.contains("╭"));
        assert!(result.contains("╰"));
    }
}
