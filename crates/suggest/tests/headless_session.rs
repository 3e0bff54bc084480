#![forbid(unsafe_code)]

//! A full headless session through the facade: JSON configuration, a page
//! that renders late, a host clock driving debounce and retry deadlines.

use pretty_assertions::assert_eq;
use suggest::prelude::*;

const CONFIG: &str = r#"{
    "inputId": "search",
    "listId": "search-list",
    "wrapperId": "search-panel",
    "clearId": "search-clear",
    "source": { "kind": "numberedLists", "fields": [".name"] },
    "mountRetry": { "maxAttempts": 4, "initialDelayMs": 50 }
}"#;

/// Drive the handle until `until`, firing every deadline on the way.
fn run_until(
    handle: &mut AutocompleteHandle,
    page: &mut MemoryPage,
    clock: &mut DeterministicClock,
    until_ms: u64,
) {
    let until = std::time::Duration::from_millis(until_ms);
    while let Some(deadline) = handle.next_deadline() {
        if deadline > until {
            break;
        }
        clock.set(deadline);
        handle.tick(page, clock.now());
    }
    clock.set(until);
}

#[test]
fn late_page_then_typing_and_commit() {
    let config = AutocompleteConfig::from_json(CONFIG).expect("valid config");
    let mut page = MemoryPage::new();
    let mut clock = DeterministicClock::new();
    let mut handle = AutocompleteHandle::start(&mut page, config, clock.now());
    assert_eq!(handle.status(), HandleStatus::Pending);

    // The page renders its form and lists after the script ran.
    let root = page.root();
    let input = page.append(root, ElementSpec::new("input").with_id("search"));
    page.append(root, ElementSpec::new("button").with_id("search-clear"));
    let panel = page.append(root, ElementSpec::new("div").with_id("search-panel"));
    let list = page.append(panel, ElementSpec::new("ul").with_id("search-list"));
    for (id, names) in [("list-1", ["Item 10", "Item 2"]), ("list-3", ["Item 1", "Other"])] {
        let group = page.append(root, ElementSpec::new("ul").with_id(id));
        for name in names {
            let row = page.append(group, ElementSpec::new("li"));
            page.append(row, ElementSpec::new("span").with_class("name").with_text(name));
        }
    }

    run_until(&mut handle, &mut page, &mut clock, 50);
    assert_eq!(handle.status(), HandleStatus::Active);
    assert_eq!(handle.terms(), ["Item 1", "Item 2", "Item 10", "Other"]);

    page.set_input_value(input, "item");
    handle.handle_event(&mut page, &Event::Input, clock.now());
    run_until(&mut handle, &mut page, &mut clock, 1_000);
    assert_eq!(page.children(list).len(), 3);

    let end = Event::Key(KeyEvent::new(KeyCode::End));
    let action = handle.handle_event(&mut page, &end, clock.now());
    assert_eq!(action, Some(AutocompleteAction::Navigated(2)));
    let enter = Event::Key(KeyEvent::new(KeyCode::Enter));
    let action = handle.handle_event(&mut page, &enter, clock.now());
    assert_eq!(action, Some(AutocompleteAction::Committed("Item 10".into())));
    assert_eq!(page.input_value(input), "Item 10");
    assert_eq!(page.events_on(input), ["input", "change", "keyup"]);

    handle.destroy(&mut page);
    assert_eq!(handle.status(), HandleStatus::Destroyed);
    assert_eq!(page.active_watches(), 0);
}

#[test]
fn invalid_configuration_is_reported_to_the_embedder() {
    let err = AutocompleteConfig::from_json(r#"{ "inputId": "q", "listId": "l" }"#).unwrap_err();
    assert!(err.to_string().contains("wrapperId"), "{err}");
}
