//! Textual table summary prefixed to prompts.

use std::fmt;

use super::Table;
use super::stats::ColumnStats;

/// Shape, column names and descriptive statistics of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    /// Number of data rows.
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// Column names in file order.
    pub column_names: Vec<String>,
    /// Per-column statistics.
    pub stats: Vec<ColumnStats>,
}

impl TableSummary {
    /// Summarize a parsed table.
    #[must_use]
    pub fn from_table(table: &Table) -> Self {
        Self {
            row_count: table.row_count(),
            column_count: table.column_count(),
            column_names: table.column_names().to_vec(),
            stats: table.describe(),
        }
    }

    /// Render the summary as plain text.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The uploaded table has {} rows and {} columns.", self.row_count, self.column_count)?;
        writeln!(f, "Columns: {}", self.column_names.join(", "))?;
        write!(f, "Descriptive statistics:")?;
        for stats in &self.stats {
            write!(f, "\n- {stats}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::prompt::build_prompt;

    #[test]
    fn test_render_summary() {
        let table = Table::parse(b"name,score\nann,1\nben,3\ncid,2\n");
        let summary = table.map(|t| TableSummary::from_table(&t).render());

        assert_eq!(
            summary.ok().as_deref(),
            Some(
                "The uploaded table has 3 rows and 2 columns.\n\
                 Columns: name, score\n\
                 Descriptive statistics:\n\
                 - name: count=3, unique=3, top=ann, freq=1\n\
                 - score: count=3, mean=2, std=1, min=1, 25%=1.5, 50%=2, 75%=2.5, max=3"
            )
        );
    }

    #[test]
    fn test_summary_prefixes_prompt() {
        let summary = Table::parse(b"a\n1\n2\n")
            .map(|t| TableSummary::from_table(&t).render())
            .unwrap_or_default();
        let prompt = build_prompt("What is the average of a?", Some(&summary));

        assert!(prompt.starts_with("The uploaded table has 2 rows and 1 columns."));
        assert!(prompt.ends_with("\n\nWhat is the average of a?"));
    }
}
