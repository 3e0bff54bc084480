#![forbid(unsafe_code)]

//! Content watching against the in-memory page: subscriptions are
//! registered and released on the host, and page edits settle into a single
//! signal per quiet period.

use std::time::Duration;

use pretty_assertions::assert_eq;
use suggest_core::content_watch::ContentWatcher;
use suggest_web::{ElementSpec, MemoryPage};

const QUIET: Duration = Duration::from_millis(500);

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[test]
fn start_and_stop_manage_host_subscription() {
    let mut page = MemoryPage::new();
    let mut watcher = ContentWatcher::new(QUIET);
    watcher.start(&mut page, None);
    assert!(watcher.is_active());
    assert_eq!(page.active_watches(), 1);

    // Restarting replaces the subscription instead of adding one.
    watcher.start(&mut page, None);
    assert_eq!(page.active_watches(), 1);

    watcher.stop(&mut page);
    assert!(!watcher.is_active());
    assert_eq!(page.active_watches(), 0);
}

#[test]
fn burst_of_edits_settles_once() {
    let mut page = MemoryPage::new();
    let root = page.root();
    let mut watcher = ContentWatcher::new(QUIET);
    watcher.start(&mut page, None);

    for (i, at) in [0u64, 100, 250].into_iter().enumerate() {
        page.append(root, ElementSpec::new("li").with_text(&format!("row {i}")));
        for _ in page.take_mutations() {
            watcher.notify(ms(at));
        }
    }
    assert_eq!(watcher.notification_count(), 3);
    assert_eq!(watcher.deadline(), Some(ms(750)));

    assert!(!watcher.poll(ms(749)));
    assert!(watcher.poll(ms(750)));
    assert!(!watcher.poll(ms(2000)));
}

#[test]
fn scoped_watch_ignores_edits_elsewhere() {
    let mut page = MemoryPage::new();
    let root = page.root();
    let list = page.append(root, ElementSpec::new("ul"));
    let aside = page.append(root, ElementSpec::new("aside"));
    let mut watcher = ContentWatcher::new(QUIET);
    watcher.start(&mut page, Some(list));

    page.append(aside, ElementSpec::new("p"));
    assert!(page.take_mutations().is_empty());

    page.append(list, ElementSpec::new("li"));
    assert_eq!(page.take_mutations().len(), 1);
}

#[test]
fn stop_discards_pending_signal() {
    let mut page = MemoryPage::new();
    let root = page.root();
    let mut watcher = ContentWatcher::new(QUIET);
    watcher.start(&mut page, None);
    page.append(root, ElementSpec::new("li"));
    for _ in page.take_mutations() {
        watcher.notify(ms(0));
    }
    watcher.stop(&mut page);
    assert_eq!(watcher.deadline(), None);
    assert!(!watcher.poll(ms(1000)));

    // Notifications after stop are ignored.
    watcher.notify(ms(1000));
    assert_eq!(watcher.deadline(), None);
}
