//! Terminal styling for `modkit` output.

use colored::Colorize;

/// Width of the load-order table rule.
const RULE_WIDTH: usize = 60;

/// Styling helpers shared by every subcommand.
pub(crate) struct Theme;

impl Theme {
    /// Section title, e.g. "Mod bundles".
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Something the host would skip or reject at startup.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    pub(crate) fn info(text: &str) -> String {
        format!("{} {}", "i".blue(), text)
    }

    /// Secondary detail such as bundle paths and totals.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Rule under the load-order table header.
    pub(crate) fn rule() -> String {
        "━".repeat(RULE_WIDTH).dimmed().to_string()
    }

    /// One load-order row: class, effective priority, then the already
    /// styled bundle column.
    pub(crate) fn load_order_row(class: &str, priority: i32, bundle: &str) -> String {
        format!("  {class:<40} {priority:>8}  {bundle}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_order_rows_line_up() {
        let early = Theme::load_order_row("ext.Early", -5, "mods/a");
        let late = Theme::load_order_row("ext.SomewhatLongerName", 1000, "mods/b");

        assert!(early.starts_with("  ext.Early "));
        assert!(early.ends_with("      -5  mods/a"));
        assert_eq!(early.find("mods/a"), late.find("mods/b"));
    }
}
