//! Structural selection of article text.
//!
//! Only paragraphs that are direct children of the article body are read.
//! Infoboxes, navigation, reference lists and headings are skipped.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.mw-parser-output > p").expect("valid paragraph selector")
});

/// Text found in the main content region, split by origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFragments {
    /// Text nodes that sit directly inside a paragraph.
    pub prose: Vec<String>,
    /// Direct text nodes of hyperlinks that sit directly inside a paragraph.
    /// Markup nested inside a link is not read.
    pub link_labels: Vec<String>,
}

impl ContentFragments {
    /// Prose followed by link labels.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.prose
            .iter()
            .chain(self.link_labels.iter())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.prose.is_empty() && self.link_labels.is_empty()
    }
}

/// Collects prose and link-label fragments from `content`.
///
/// Malformed markup is tolerated; whatever the parser recovers is used.
pub fn content_fragments(content: &str) -> ContentFragments {
    let document = Html::parse_document(content);
    let mut fragments = ContentFragments::default();

    for paragraph in document.select(&PARAGRAPH_SELECTOR) {
        fragments.prose.extend(direct_text(paragraph));
        for link in child_links(paragraph) {
            fragments.link_labels.extend(direct_text(link));
        }
    }

    fragments
}

fn direct_text(element: ElementRef<'_>) -> impl Iterator<Item = String> + '_ {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| String::from(&**text))
        .filter(|text| !text.trim().is_empty())
}

fn child_links(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "a")
}
