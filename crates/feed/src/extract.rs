use crate::html::{table_rows, visible_lines};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

/// Label searched for by every strategy, compared case-insensitively.
pub const SUPPLY_APR_LABEL: &str = "supply apr";

/// Lines scanned on each side of a label line.
const WINDOW: usize = 2;

/// # Summary
/// One independent way of locating the supply APR in a page.
///
/// # Invariants
/// - A strategy only reads the page; a layout change breaks at most that strategy.
pub trait ExtractionStrategy: Send + Sync {
    /// Strategy name, used for logging.
    fn name(&self) -> &'static str;

    /// Returns the percentage if this strategy recognizes it.
    fn extract(&self, html: &str) -> Option<Decimal>;
}

/// # Summary
/// Scans visible text for a label line and takes the first parseable
/// percentage within two lines of it.
pub struct TextWindowStrategy;

impl ExtractionStrategy for TextWindowStrategy {
    fn name(&self) -> &'static str {
        "text-window"
    }

    fn extract(&self, html: &str) -> Option<Decimal> {
        let lines = visible_lines(html);
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| contains_label(line))
            .find_map(|(i, _)| {
                let lo = i.saturating_sub(WINDOW);
                let hi = (i + WINDOW + 1).min(lines.len());
                lines[lo..hi]
                    .iter()
                    .filter(|line| line.contains('%'))
                    .find_map(|line| parse_percent(line))
            })
    }
}

/// # Summary
/// Scans table rows for a label cell and parses the cell right after it.
pub struct TableRowStrategy;

impl ExtractionStrategy for TableRowStrategy {
    fn name(&self) -> &'static str {
        "table-row"
    }

    fn extract(&self, html: &str) -> Option<Decimal> {
        table_rows(html).iter().find_map(|cells| {
            cells
                .iter()
                .zip(cells.iter().skip(1))
                .filter(|(cell, _)| contains_label(cell))
                .find_map(|(_, next)| parse_percent(next))
        })
    }
}

/// Strategies in the order they are tried.
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![Box::new(TextWindowStrategy), Box::new(TableRowStrategy)]
}

/// # Summary
/// Runs the strategies in order; the first one that yields a value wins.
///
/// # Returns
/// The value and the name of the strategy that found it.
pub fn extract_apr(
    html: &str,
    strategies: &[Box<dyn ExtractionStrategy>],
) -> Option<(Decimal, &'static str)> {
    strategies.iter().find_map(|strategy| {
        let found = strategy.extract(html);
        if found.is_none() {
            debug!(strategy = strategy.name(), "no supply APR match");
        }
        found.map(|value| (value, strategy.name()))
    })
}

fn contains_label(text: &str) -> bool {
    text.to_lowercase().contains(SUPPLY_APR_LABEL)
}

/// # Summary
/// Parses the numeric prefix of a percentage text such as `4.52%` or `-0.3 %`.
///
/// # Logic
/// 1. Drops every `%` and trims.
/// 2. Takes an optional sign, digits and an optional fraction from the start.
/// 3. Requires at least one digit.
/// 4. Rejects the text when the number continues past the prefix
///    (`4,52`, `1,234.5`, `4 52`), since the prefix alone would be a wrong value.
pub fn parse_percent(text: &str) -> Option<Decimal> {
    let cleaned = text.replace('%', "");
    let cleaned = cleaned.trim();

    let mut end = 0;
    let mut digits = 0;
    let mut seen_dot = false;
    for (i, ch) in cleaned.char_indices() {
        match ch {
            '+' | '-' if i == 0 => {}
            '0'..='9' => digits += 1,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + ch.len_utf8();
    }
    if digits == 0 {
        return None;
    }

    let tail = &cleaned[end..];
    if tail.starts_with(|c: char| matches!(c, ',' | '\'' | '_' | '.'))
        || tail.trim_start().starts_with(|c: char| c.is_ascii_digit())
    {
        return None;
    }

    let number = cleaned[..end].trim_end_matches('.');
    let number = number.strip_prefix('+').unwrap_or(number);
    Decimal::from_str(number).ok()
}
