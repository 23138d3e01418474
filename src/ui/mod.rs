pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{banner, header, info, success, summary_row, warn};
pub use table::{TableBuilder, stats_table};
pub use theme::{stderr_theme, theme, Theme};
