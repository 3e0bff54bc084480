#![forbid(unsafe_code)]

//! Property tests for keyboard/pointer navigation.
//!
//! Whatever sequence of keys and hovers arrives, the highlighted row is
//! either absent or a valid index into the visible results, and the input's
//! `aria-activedescendant` names exactly that row.

use std::time::Duration;

use proptest::prelude::*;
use suggest_core::event::{Event, KeyCode, KeyEvent, PointerEvent, PointerKind};
use suggest_core::host::{Host, NodeId};
use suggest_web::{ElementSpec, MemoryPage};
use suggest_widgets::{Autocomplete, AutocompleteConfig};

#[derive(Debug, Clone)]
enum Step {
    Key(KeyCode),
    Hover(usize),
    Type(String),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => prop_oneof![
            Just(KeyCode::Down),
            Just(KeyCode::Up),
            Just(KeyCode::Home),
            Just(KeyCode::End),
            Just(KeyCode::Escape),
        ]
        .prop_map(Step::Key),
        2 => (0usize..12).prop_map(Step::Hover),
        1 => prop::sample::select(vec!["", "a", "al", "b", "e", "ta"])
            .prop_map(|q| Step::Type(q.to_string())),
    ]
}

fn mounted(terms: &[String]) -> (MemoryPage, Autocomplete, NodeId) {
    let mut page = MemoryPage::new();
    let root = page.root();
    let input = page.append(root, ElementSpec::new("input").with_id("q"));
    let wrapper = page.append(root, ElementSpec::new("div").with_id("w"));
    page.append(wrapper, ElementSpec::new("ul").with_id("l"));
    for term in terms {
        page.append(
            root,
            ElementSpec::new("span")
                .with_class("suggest-term")
                .with_text(term),
        );
    }
    let mut config = AutocompleteConfig::new("q", "l", "w");
    config.debounce_delay = Duration::ZERO;
    let ac = Autocomplete::mount(&mut page, config).expect("elements exist");
    (page, ac, input)
}

proptest! {
    #[test]
    fn highlight_always_in_bounds(
        terms in prop::collection::vec("[a-e]{1,4}", 0..10),
        steps in prop::collection::vec(step(), 1..40),
    ) {
        let (mut page, mut ac, input) = mounted(&terms);
        page.set_input_value(input, "a");
        ac.handle_event(&mut page, &Event::Input, Duration::ZERO);

        for step in steps {
            let event = match step {
                Step::Key(code) => Event::Key(KeyEvent::new(code)),
                Step::Hover(i) => {
                    let target = ac.option_nodes().get(i).copied();
                    Event::Pointer(PointerEvent::new(PointerKind::Move, target))
                }
                Step::Type(query) => {
                    page.set_input_value(input, &query);
                    Event::Input
                }
            };
            ac.handle_event(&mut page, &event, Duration::ZERO);

            let len = ac.results().len();
            prop_assert_eq!(ac.option_nodes().len(), len);
            if !ac.is_visible() {
                prop_assert_eq!(len, 0);
            }
            match ac.active_index() {
                Some(i) => {
                    prop_assert!(i < len, "active {} out of {}", i, len);
                    let expected = format!("l-option-{i}");
                    prop_assert_eq!(
                        page.attribute(input, "aria-activedescendant"),
                        Some(expected)
                    );
                }
                None => prop_assert_eq!(page.attribute(input, "aria-activedescendant"), None),
            }
        }
    }

    #[test]
    fn visible_results_all_contain_query(
        terms in prop::collection::vec("[a-cA-C ]{1,6}", 0..12),
        query in "[a-cA-C]{1,2}",
    ) {
        let (mut page, mut ac, input) = mounted(&terms);
        page.set_input_value(input, &query);
        ac.handle_event(&mut page, &Event::Input, Duration::ZERO);
        let folded = query.to_lowercase();
        for result in ac.results() {
            prop_assert!(result.term().to_lowercase().contains(&folded));
        }
        prop_assert_eq!(ac.is_visible(), !ac.results().is_empty());
    }
}
