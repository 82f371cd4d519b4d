//! Splits the HTML shop list into per-city sections.
//!
//! The page is a flat run of `h3` city headings, each followed by sibling
//! elements holding `pre.wp-block-verse` blocks with shop names in `strong`.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::extraction::html_block::{HtmlSection, VerseBlock};

static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static VERSE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("pre.wp-block-verse").unwrap());
static STRONG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong").unwrap());

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn verse_block(pre: ElementRef<'_>) -> VerseBlock {
    VerseBlock {
        text: element_text(&pre),
        names: pre
            .select(&STRONG)
            .map(|strong| element_text(&strong).trim().to_string())
            .collect(),
    }
}

pub fn sections_from_html(html: &str) -> Vec<HtmlSection> {
    let document = Html::parse_document(html);
    let mut sections = Vec::new();

    for heading in document.select(&HEADING) {
        let city = element_text(&heading).trim().to_lowercase();
        let mut blocks = Vec::new();

        for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
            // the next city starts here
            if sibling.value().name() == "h3" || sibling.select(&HEADING).next().is_some() {
                break;
            }

            if VERSE.matches(&sibling) {
                blocks.push(verse_block(sibling));
            }
            blocks.extend(
                sibling
                    .select(&VERSE)
                    .filter(|pre| pre.id() != sibling.id())
                    .map(verse_block),
            );
        }

        sections.push(HtmlSection { city, blocks });
    }

    tracing::debug!(sections = sections.len(), "parsed city sections");
    sections
}
