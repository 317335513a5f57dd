use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::scene::{KeyboardEventMask, KeyboardObservable, ObserverId, SourceId};

use super::action_map::{ActionMap, UnknownAction};
use super::types::{KeyboardEventKind, KeyboardInfo};

/// Held state per key code. Absent codes are not held.
#[derive(Debug, Default)]
struct KeyTable {
    held: HashMap<u32, bool>,
}

impl KeyTable {
    fn apply(&mut self, info: &KeyboardInfo) {
        let ev = &info.event;

        // Host auto-repeat never changes state, not even the first transition.
        if ev.repeat {
            return;
        }

        match info.kind {
            KeyboardEventKind::KeyDown => {
                self.held.insert(ev.key_code, true);
                log::debug!("key down: {:?} ({})", ev.key, ev.key_code);
            }
            KeyboardEventKind::KeyUp => {
                self.held.insert(ev.key_code, false);
                log::debug!("key up: {:?} ({})", ev.key, ev.key_code);
            }
        }
    }

    fn is_held(&self, code: u32) -> bool {
        self.held.get(&code).copied().unwrap_or(false)
    }
}

#[derive(Debug, Copy, Clone)]
struct Subscription {
    source: SourceId,
    observer: ObserverId,
}

/// Tracks which keys are currently held for one scene.
///
/// The tracker registers a single observer on a scene's [`KeyboardObservable`].
/// The table is shared with that observer through `Rc<RefCell<_>>`, so all access
/// must stay on the thread that drives the scene.
///
/// Call [`detach`](Self::detach) before dropping an attached tracker. The observer
/// only holds a weak reference to the table, so a tracker dropped while attached
/// leaves an inert observer on the source until the source itself is dropped.
#[derive(Debug, Default)]
pub struct KeyTracker {
    table: Rc<RefCell<KeyTable>>,
    subscription: Option<Subscription>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to key down and key up events of `source`.
    ///
    /// A tracker listens to at most one source; attaching again is ignored.
    pub fn attach(&mut self, source: &mut KeyboardObservable) {
        if let Some(sub) = self.subscription {
            log::warn!(
                "key tracker already attached to {:?}; ignoring attach to {:?}",
                sub.source,
                source.id()
            );
            return;
        }

        let table = Rc::downgrade(&self.table);
        let observer = source.add(
            move |info: &KeyboardInfo| {
                if let Some(table) = table.upgrade() {
                    table.borrow_mut().apply(info);
                }
            },
            KeyboardEventMask::ALL,
        );

        self.subscription = Some(Subscription {
            source: source.id(),
            observer,
        });
        log::debug!("key tracker attached to {:?}", source.id());
    }

    /// Unsubscribes from `source`. No-op when not attached.
    ///
    /// Once this returns, events notified on `source` no longer reach the tracker.
    pub fn detach(&mut self, source: &mut KeyboardObservable) {
        let Some(sub) = self.subscription else { return };

        if sub.source != source.id() {
            log::warn!(
                "key tracker is attached to {:?}, not {:?}; detach ignored",
                sub.source,
                source.id()
            );
            return;
        }

        source.remove(sub.observer);
        self.subscription = None;
        log::debug!("key tracker detached from {:?}", sub.source);
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Applies a single event. Called by the observer registered in [`attach`](Self::attach).
    pub fn on_event(&self, info: &KeyboardInfo) {
        self.table.borrow_mut().apply(info);
    }

    /// Whether `code` is currently held. Codes never seen report `false`.
    pub fn is_held(&self, code: u32) -> bool {
        self.table.borrow().is_held(code)
    }

    /// Resolves `action` through `actions` and reports whether its key is held.
    pub fn is_action_held(&self, actions: &ActionMap, action: &str) -> Result<bool, UnknownAction> {
        Ok(self.is_held(actions.resolve(action)?))
    }

    /// Codes currently held, ascending.
    pub fn held_codes(&self) -> Vec<u32> {
        let table = self.table.borrow();
        let mut codes: Vec<u32> = table
            .held
            .iter()
            .filter_map(|(code, held)| held.then_some(*code))
            .collect();
        codes.sort_unstable();
        codes
    }
}

impl Drop for KeyTracker {
    fn drop(&mut self) {
        if let Some(sub) = self.subscription {
            log::warn!("key tracker dropped while attached to {:?}", sub.source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(key: &str, code: u32) -> KeyboardInfo {
        KeyboardInfo::key_down(key, code)
    }

    fn up(key: &str, code: u32) -> KeyboardInfo {
        KeyboardInfo::key_up(key, code)
    }

    fn attached() -> (KeyTracker, KeyboardObservable) {
        let mut source = KeyboardObservable::new();
        let mut tracker = KeyTracker::new();
        tracker.attach(&mut source);
        (tracker, source)
    }

    #[test]
    fn unseen_codes_are_not_held() {
        let (tracker, _source) = attached();
        for code in [0, 32, 65, 87, 255, u32::MAX] {
            assert!(!tracker.is_held(code));
        }
        assert!(tracker.held_codes().is_empty());
    }

    #[test]
    fn press_is_held() {
        let (tracker, mut source) = attached();
        source.notify(&down("w", 87));
        assert!(tracker.is_held(87));
    }

    #[test]
    fn press_then_release() {
        let (tracker, mut source) = attached();
        source.notify(&down("w", 87));
        source.notify(&up("w", 87));
        assert!(!tracker.is_held(87));
    }

    #[test]
    fn repeats_keep_single_press() {
        let (tracker, mut source) = attached();
        source.notify(&down(" ", 32));
        source.notify(&down(" ", 32).repeated());
        source.notify(&down(" ", 32).repeated());
        assert!(tracker.is_held(32));
        assert_eq!(tracker.held_codes(), [32]);
    }

    #[test]
    fn repeat_without_press_does_not_hold() {
        let (tracker, mut source) = attached();
        source.notify(&down(" ", 32).repeated());
        assert!(!tracker.is_held(32));
    }

    #[test]
    fn repeated_release_is_ignored() {
        let (tracker, mut source) = attached();
        source.notify(&down("w", 87));
        source.notify(&up("w", 87).repeated());
        assert!(tracker.is_held(87));
    }

    #[test]
    fn keys_are_tracked_independently() {
        let (tracker, mut source) = attached();
        source.notify(&down("a", 65));
        source.notify(&down("d", 68));
        source.notify(&up("a", 65));
        assert!(!tracker.is_held(65));
        assert!(tracker.is_held(68));
        assert_eq!(tracker.held_codes(), [68]);
    }

    #[test]
    fn release_without_press_is_legal() {
        let (tracker, mut source) = attached();
        source.notify(&up("q", 81));
        assert!(!tracker.is_held(81));
    }

    #[test]
    fn double_press_is_idempotent() {
        let (tracker, mut source) = attached();
        source.notify(&down("w", 87));
        source.notify(&down("w", 87));
        assert!(tracker.is_held(87));
        source.notify(&up("w", 87));
        assert!(!tracker.is_held(87));
    }

    #[test]
    fn detach_stops_delivery_and_is_idempotent() {
        let (mut tracker, mut source) = attached();
        source.notify(&down("w", 87));

        tracker.detach(&mut source);
        tracker.detach(&mut source);
        assert!(!tracker.is_attached());
        assert_eq!(source.observer_count(), 0);

        source.notify(&up("w", 87));
        source.notify(&down(" ", 32));
        assert!(tracker.is_held(87));
        assert!(!tracker.is_held(32));
    }

    #[test]
    fn double_attach_registers_once() {
        let (mut tracker, mut source) = attached();
        tracker.attach(&mut source);
        assert_eq!(source.observer_count(), 1);

        let mut other = KeyboardObservable::new();
        tracker.attach(&mut other);
        assert_eq!(other.observer_count(), 0);
    }

    #[test]
    fn detach_from_foreign_source_keeps_subscription() {
        let (mut tracker, mut source) = attached();
        let mut other = KeyboardObservable::new();

        tracker.detach(&mut other);
        assert!(tracker.is_attached());

        source.notify(&down("d", 68));
        assert!(tracker.is_held(68));
    }

    #[test]
    fn reattach_after_detach() {
        let (mut tracker, mut source) = attached();
        tracker.detach(&mut source);
        tracker.attach(&mut source);
        source.notify(&down("s", 83));
        assert!(tracker.is_held(83));
    }

    #[test]
    fn on_event_applies_without_source() {
        let tracker = KeyTracker::new();
        tracker.on_event(&down("w", 87));
        assert!(tracker.is_held(87));
        assert!(!tracker.is_attached());
    }

    #[test]
    fn actions_resolve_through_map() {
        let (tracker, mut source) = attached();
        let actions = ActionMap::default();

        assert_eq!(tracker.is_action_held(&actions, "jump"), Ok(false));
        source.notify(&down(" ", actions.resolve("jump").unwrap()));
        assert_eq!(tracker.is_action_held(&actions, "jump"), Ok(true));
        assert_eq!(
            tracker.is_action_held(&actions, "fly"),
            Err(UnknownAction("fly".to_string()))
        );
    }

    #[test]
    fn dropping_attached_tracker_releases_table() {
        let (tracker, mut source) = attached();
        let table = Rc::downgrade(&tracker.table);

        drop(tracker);
        assert!(table.upgrade().is_none());

        // The leftover observer is inert.
        source.notify(&down(" ", 32));

        let mut fresh = KeyTracker::new();
        fresh.attach(&mut source);
        source.notify(&down("w", 87));
        assert_eq!(fresh.held_codes(), vec![87]);
        fresh.detach(&mut source);
    }
}
