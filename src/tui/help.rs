//! Help text content for the help modal

/// Keybinding help text
pub fn get_help_text() -> Vec<String> {
    vec![
        "Filters:",
        "  Tab / S-Tab  Move focus between controls",
        "  Left/Right   Cycle driver or receiver",
        "  Enter        Edit date (on the date field)",
        "  Esc          Cancel date edit",
        "  c            Clear all filters",
        "",
        "Table:",
        "  Up/Down      Scroll one row",
        "  PageUp/Down  Scroll by page",
        "  Home/End     First/last row",
        "",
        "Data:",
        "  r            Reload from the source",
        "  x            Export the current view to .xlsx",
        "  d            Download the source workbook",
        "",
        "Other:",
        "  ?            Toggle this help",
        "  q / Ctrl+c   Quit",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

pub fn get_about_help() -> Vec<String> {
    vec![
        "About Destajo".to_string(),
        "".to_string(),
        format!("  Version {}", env!("CARGO_PKG_VERSION")),
        "  Browse, filter and export delivery records.".to_string(),
        "".to_string(),
        "Dates:".to_string(),
        "  The date field accepts 15/01/2024, 15-01-2024, 2024-01-15".to_string(),
        "  and most written-out dates.".to_string(),
    ]
}
