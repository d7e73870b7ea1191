//! Saved event listing.

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table};
use smartcity_core::config::Config;
use smartcity_core::event::Event;
use smartcity_core::persistence::read_jsonl;
use smartcity_core::store::Mode;

pub fn list(config: &Config, mode: Option<&str>) -> Result<()> {
    let path = config.persistence.effective_jsonl_path();
    let events = read_jsonl(&path, Some(&config.persistence.collection))
        .with_context(|| format!("read events from {}", path.display()))?;

    let mode = mode.map_or(Mode::All, Mode::parse);
    let shown: Vec<&Event> = events.iter().filter(|e| mode.matches(e)).collect();

    if shown.is_empty() {
        println!("No events found.");
        return Ok(());
    }

    println!("{}", render_table(&shown));
    Ok(())
}

fn render_table(events: &[&Event]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Id",
            "Type",
            "Description",
            "Position",
            "Radius",
            "Emergency",
        ]);
    for event in events {
        table.add_row(vec![
            event.id.to_string(),
            event.category.label().to_string(),
            event.description.clone(),
            event.position.to_string(),
            format!("{} m", event.radius),
            if event.emergency { "yes" } else { "" }.to_string(),
        ]);
    }
    table
}
