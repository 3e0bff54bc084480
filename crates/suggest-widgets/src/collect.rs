#![forbid(unsafe_code)]

//! Term collection from page content.
//!
//! Collection never fails: missing source elements yield no terms, and
//! sources without usable text are skipped. The result is raw trimmed text
//! in document order; deduplication and sorting belong to
//! [`TermIndex`](suggest_text::TermIndex).

use suggest_core::host::{Host, NodeId};
use suggest_core::selector::Selector;

use crate::config::SourceConfig;

/// Scrape candidate term texts from the page.
pub fn collect_terms(host: &dyn Host, source: &SourceConfig) -> Vec<String> {
    collect_sources(host, source).0
}

/// Term texts plus every element handle looked at while collecting them.
pub(crate) fn collect_sources(
    host: &dyn Host,
    source: &SourceConfig,
) -> (Vec<String>, Vec<NodeId>) {
    let mut sink = Sink::default();
    match source {
        SourceConfig::Selector { selector, fields } => {
            for element in host.select_all(None, selector) {
                sink.element(host, element, fields);
            }
        }
        SourceConfig::NumberedLists {
            id_prefix,
            ceiling,
            max_consecutive_misses,
            fields,
        } => {
            let mut misses = 0u32;
            for n in 1..=*ceiling {
                let id = format!("{id_prefix}{n}");
                let Some(list) = host.element_by_id(&id) else {
                    misses += 1;
                    if misses >= *max_consecutive_misses {
                        tracing::trace!(last_probed = n, misses, "numbered list probe stopped");
                        break;
                    }
                    continue;
                };
                misses = 0;
                sink.element(host, list, fields);
            }
        }
    }
    sink.finish()
}

#[derive(Default)]
struct Sink {
    terms: Vec<String>,
    visited: Vec<NodeId>,
    blank: usize,
}

impl Sink {
    /// The element's own text, or the union of its field elements' text.
    fn element(&mut self, host: &dyn Host, element: NodeId, fields: &[Selector]) {
        if fields.is_empty() {
            self.text(host, element);
            return;
        }
        self.visited.push(element);
        for field in fields {
            for node in host.select_all(Some(element), field) {
                self.text(host, node);
            }
        }
    }

    fn text(&mut self, host: &dyn Host, node: NodeId) {
        self.visited.push(node);
        let text = host.text_content(node);
        let text = text.trim();
        if text.is_empty() {
            self.blank += 1;
        } else {
            self.terms.push(text.to_string());
        }
    }

    fn finish(self) -> (Vec<String>, Vec<NodeId>) {
        if self.blank > 0 {
            tracing::trace!(blank = self.blank, "term sources without text skipped");
        }
        (self.terms, self.visited)
    }
}
