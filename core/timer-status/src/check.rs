//! One-shot diagnostic: read the state file once and show what would be published.

use std::path::Path;

use timer_core::{classify, read_state, Result};

use crate::terminal::render_line;

pub fn run(target: &Path) -> Result<()> {
    println!("State file: {}", target.display());

    let state = read_state(target)?;
    let presentation = classify(&state);
    println!("Tier: {}", presentation.tier.as_str());
    if let Some(color) = presentation.tier.background_color() {
        println!("Background: {}", color);
    }
    println!("Status: {}", render_line(&presentation, false));
    Ok(())
}
