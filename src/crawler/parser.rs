//! Document parser for finder API responses
//!
//! The finder endpoints answer with a small markup document. The crawler
//! only reads a handful of fields from it:
//!
//! - listing: `<row>` elements, the first one a header, each carrying a `<key>`
//! - search: `<link_target>` fields plus the `<amount>` and `<amount_total>`
//!   pagination counters
//!
//! Everything else in the document is ignored.

use crate::crawler::BranchId;
use scraper::{ElementRef, Html, Selector};

/// Length of an instrument code (ISIN) at the end of a link text
pub const ITEM_CODE_LEN: usize = 12;

/// Parsed search response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    /// The URL that was requested
    pub source_url: String,

    /// Raw `link_target` texts in document order
    pub link_texts: Vec<String>,

    /// Number of items on this page
    pub amount: Option<u32>,

    /// Number of items across all pages
    pub amount_total: Option<u32>,
}

impl ResultPage {
    /// Returns the instrument codes of this page in document order
    pub fn item_codes(&self) -> Vec<String> {
        self.link_texts
            .iter()
            .filter_map(|text| item_code(text))
            .collect()
    }
}

/// Extracts the instrument code from a link text
///
/// The code is the last [`ITEM_CODE_LEN`] characters of the trimmed text.
/// Shorter texts are returned whole; blank texts yield `None`.
pub fn item_code(link_text: &str) -> Option<String> {
    let text = link_text.trim();
    if text.is_empty() {
        return None;
    }

    let char_count = text.chars().count();
    let skip = char_count.saturating_sub(ITEM_CODE_LEN);
    Some(text.chars().skip(skip).collect())
}

/// Parses a search response into a [`ResultPage`]
///
/// Missing or non-numeric counters are left as `None` and a blank body
/// yields a page with no items. Neither makes the page invalid.
pub fn parse_result_page(body: &str, source_url: &str) -> ResultPage {
    if body.trim().is_empty() {
        tracing::debug!("Empty response body from {}", source_url);
        return ResultPage {
            source_url: source_url.to_string(),
            ..ResultPage::default()
        };
    }

    let document = Html::parse_document(body);

    let link_texts = match Selector::parse("link_target") {
        Ok(selector) => document.select(&selector).map(element_text).collect(),
        Err(_) => Vec::new(),
    };

    ResultPage {
        source_url: source_url.to_string(),
        link_texts,
        amount: counter(&document, "amount"),
        amount_total: counter(&document, "amount_total"),
    }
}

/// Parses the branch listing into branch ids in document order
///
/// The first `<row>` is a header and is skipped. Rows without a numeric
/// `<key>` are skipped with a warning.
pub fn parse_branch_listing(body: &str) -> Vec<BranchId> {
    let document = Html::parse_document(body);

    let (Ok(row_selector), Ok(key_selector)) = (Selector::parse("row"), Selector::parse("key"))
    else {
        return Vec::new();
    };

    document
        .select(&row_selector)
        .skip(1)
        .filter_map(|row| {
            let key = row.select(&key_selector).next().map(element_text);
            match key.as_deref().map(str::parse::<BranchId>) {
                Some(Ok(id)) => Some(id),
                Some(Err(_)) => {
                    tracing::warn!("Skipping listing row with non-numeric key {:?}", key);
                    None
                }
                None => {
                    tracing::warn!("Skipping listing row without a key");
                    None
                }
            }
        })
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Reads the first element named `name` as an unsigned integer
fn counter(document: &Html, name: &str) -> Option<u32> {
    let selector = Selector::parse(name).ok()?;
    document
        .select(&selector)
        .next()
        .map(element_text)
        .and_then(|text| text.parse().ok())
}
