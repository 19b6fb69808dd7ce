use std::fs;
use std::path::Path;

use crate::io::vault::{self, VAULT_DIR};

const CONFIG_TOML_TEMPLATE: &str = r##"# scribe vault settings

[completion]
# Typing this after a space (or at line start) opens the date picker
date-trigger = "@"
# Typing this opens the time list
time-trigger = "@@"
# chrono strftime formats for inserted dates and times
date-format = "%Y-%m-%d"
time-format = "%H:%M"
# Close [[ with ]] when inserting links
auto-pair-brackets = true
# "sunday" or "monday"
first-day-of-week = "sunday"
# Insert dates as @[[date]] instead of @{date}
link-date-to-daily-note = false

# --- UI Customization ---
# Uncomment and edit to override defaults.
#
# [ui.colors]
# background = "#0C001B"
# text = "#B0AAFF"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#7D78BF"
# cyan = "#44DDFF"
# purple = "#CC66FF"
# selection_bg = "#3D1438"
# popup_border = "#7D78BF"
"##;

/// Create `.scribe/` with a commented config in `dir`.
pub fn cmd_init(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Check for parent vault and warn
    if let Some(parent) = dir.parent()
        && let Ok(parent_root) = vault::discover_vault(parent)
    {
        eprintln!("Note: parent vault found at {}/", parent_root.display());
    }

    if !vault::init_vault(dir)? {
        return Err(format!(
            "scribe vault already exists in {}/{}/",
            dir.display(),
            VAULT_DIR
        )
        .into());
    }
    fs::write(dir.join(VAULT_DIR).join("config.toml"), CONFIG_TOML_TEMPLATE)?;
    tracing::info!(dir = %dir.display(), "vault initialized");

    println!("Initialized scribe vault in {}/{}/", dir.display(), VAULT_DIR);
    Ok(())
}
