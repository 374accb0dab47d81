//! Structural extraction of label/value pairs from the summary table.

use cehz_core::{PortalConfig, Record};
use scraper::{Html, Selector};

use crate::error::ScrapeError;

/// Walk the summary table and collect one [`Record`] per row that carries
/// both a label and a value. Rows missing either side are skipped silently;
/// a page without the table yields an empty vec, not an error. Records come
/// out in document order and all carry the given run timestamp.
///
/// # Errors
///
/// Returns [`ScrapeError::Selector`] if one of the configured selectors is
/// not valid CSS, which is a configuration mistake rather than a property
/// of the page.
pub fn extract_records(
    html: &str,
    timestamp: &str,
    portal: &PortalConfig,
) -> Result<Vec<Record>, ScrapeError> {
    let row_selector = parse_selector(&portal.table_row_selector)?;
    let label_selector = parse_selector(&portal.label_selector)?;
    let value_selector = parse_selector(&portal.value_selector)?;

    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for row in document.select(&row_selector) {
        let label = first_text(&row, &label_selector);
        let value = first_text(&row, &value_selector);
        if label.is_empty() || value.is_empty() {
            continue;
        }
        records.push(Record {
            timestamp: timestamp.to_string(),
            label,
            value,
        });
    }

    Ok(records)
}

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|_| ScrapeError::Selector {
        selector: selector.to_string(),
    })
}

/// Trimmed text content of the first element under `row` matching the
/// selector, or the empty string when nothing matches.
fn first_text(row: &scraper::ElementRef<'_>, selector: &Selector) -> String {
    row.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
