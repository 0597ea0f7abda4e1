/*!
 * CLI styling: themed text and application tables
 */

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use console::{style, StyledObject};

use crate::app::AppPhase;

/// Brand colors for consistent styling
pub struct Theme;

impl Theme {
    pub fn success<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).green()
    }

    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red()
    }

    pub fn muted<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).dim()
    }
}

/// Create a styled data table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

fn phase_cell(phase: AppPhase) -> Cell {
    let color = match phase {
        AppPhase::Created => Color::Yellow,
        AppPhase::Launched => Color::Green,
        AppPhase::Killed => Color::DarkGrey,
    };
    Cell::new(phase).fg(color)
}

/// One row per application: name, phase, app id ("-" before launch)
pub fn app_table(rows: &[(String, AppPhase, Option<String>)]) -> Table {
    let mut table = create_table();
    table.set_header(vec![
        header_cell("Name"),
        header_cell("Phase"),
        header_cell("App ID"),
    ]);

    for (name, phase, app_id) in rows {
        table.add_row(vec![
            Cell::new(name),
            phase_cell(*phase),
            Cell::new(app_id.as_deref().unwrap_or("-")),
        ]);
    }

    table
}
