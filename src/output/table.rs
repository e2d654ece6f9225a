//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// Shown in place of an empty table
pub const EMPTY: &str = "No results found.";

/// Plain table, one row per record
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return EMPTY.to_string();
    }

    let mut table = Table::new(data);
    table.with(Style::psql());
    table.to_string()
}

/// Rounded table with centered headers
pub fn format_pretty<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return EMPTY.to_string();
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

    #[derive(Debug, Tabled)]
    struct TestRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "DESTINATION")]
        name: String,
    }

    #[test]
    fn test_format_table_empty() {
        let items: Vec<TestRow> = vec![];
        assert_eq!(format_table(&items), "No results found.");
        assert_eq!(format_pretty(&items), "No results found.");
    }

    #[test]
    fn test_format_table_single_row() {
        let items = vec![TestRow {
            id: "s-123".to_string(),
            name: "Barcelona".to_string(),
        }];

        let result = format_table(&items);

        assert!(result.contains("ID"));
        assert!(result.contains("DESTINATION"));
        assert!(result.contains("s-123"));
        assert!(result.contains("Barcelona"));
        assert!(!result.contains("╭"));
    }

    #[test]
    fn test_format_table_multiple_rows() {
        let items = vec![
            TestRow {
                id: "1".to_string(),
                name: "Lisbon".to_string(),
            },
            TestRow {
                id: "2".to_string(),
                name: "Porto".to_string(),
            },
        ];

        let result = format_table(&items);

        assert!(result.contains("Lisbon"));
        assert!(result.contains("Porto"));
    }

    #[test]
    fn test_format_pretty_uses_rounded_style() {
        let items = vec![TestRow {
            id: "1".to_string(),
            name: "Rome".to_string(),
        }];

        let result = format_pretty(&items);

        // Rounded style uses ╭ for top-left corner
        assert!(result.contains("╭"));
        assert!(result.contains("╰"));
    }
}
