use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Rows")]
    pub rows: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            table: label.to_string(),
            rows: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

/// Row counts per table, rendered as a rounded two-column table
pub fn stats_table(stats: &crate::storage::DbStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("items", &stats.items.to_string());
    builder.add_row("item_statistics", &stats.statistics.to_string());
    builder.add_row("item_subtypes", &stats.subtypes.to_string());
    builder.add_row("item_mod_ranks", &stats.mod_ranks.to_string());
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbStats;

    #[test]
    fn test_empty_builder_renders_nothing() {
        assert!(TableBuilder::new().build().is_empty());
    }

    #[test]
    fn test_stats_table_lists_every_table() {
        let stats = DbStats { items: 2, statistics: 40, subtypes: 3, mod_ranks: 11 };
        let rendered = stats_table(&stats);
        for name in ["items", "item_statistics", "item_subtypes", "item_mod_ranks"] {
            assert!(rendered.contains(name), "{}", rendered);
        }
        assert!(rendered.contains("40"));
    }
}
