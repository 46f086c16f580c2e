//! Common CLI types shared across commands

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - colored heatmap and summary (default)
    #[default]
    Pretty,
    /// Table format - summary statistics as a table
    Table,
    /// JSON format - structured for scripts and widgets
    Json,
}
