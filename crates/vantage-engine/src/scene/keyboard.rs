use std::ops::BitOr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::input::{KeyboardEventKind, KeyboardInfo};

/// Set of keyboard event kinds an observer is interested in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct KeyboardEventMask(u8);

impl KeyboardEventMask {
    pub const KEY_DOWN: Self = Self(1);
    pub const KEY_UP: Self = Self(2);
    pub const ALL: Self = Self(1 | 2);

    pub fn contains(self, kind: KeyboardEventKind) -> bool {
        let bit = match kind {
            KeyboardEventKind::KeyDown => Self::KEY_DOWN.0,
            KeyboardEventKind::KeyUp => Self::KEY_UP.0,
        };
        self.0 & bit != 0
    }
}

impl BitOr for KeyboardEventMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Handle returned by [`KeyboardObservable::add`], used to remove the observer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ObserverId(u64);

/// Identity of a keyboard observable instance.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SourceId(u64);

static NEXT_SOURCE: AtomicU64 = AtomicU64::new(1);

struct Observer {
    id: ObserverId,
    mask: KeyboardEventMask,
    callback: Box<dyn FnMut(&KeyboardInfo)>,
}

/// Keyboard event source owned by a [`Scene`](super::Scene).
///
/// Observers are called synchronously from [`notify`](Self::notify), in
/// registration order. Removal takes effect immediately.
pub struct KeyboardObservable {
    source: SourceId,
    next_observer: u64,
    observers: Vec<Observer>,
}

impl KeyboardObservable {
    pub fn new() -> Self {
        Self {
            source: SourceId(NEXT_SOURCE.fetch_add(1, Ordering::Relaxed)),
            next_observer: 0,
            observers: Vec::new(),
        }
    }

    pub fn id(&self) -> SourceId {
        self.source
    }

    /// Registers `callback` for the event kinds in `mask`.
    pub fn add<F>(&mut self, callback: F, mask: KeyboardEventMask) -> ObserverId
    where
        F: FnMut(&KeyboardInfo) + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(Observer {
            id,
            mask,
            callback: Box::new(callback),
        });
        id
    }

    /// Removes an observer. Returns `false` if `id` was not registered.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        self.observers.len() != before
    }

    /// Delivers `info` to every observer whose mask matches.
    pub fn notify(&mut self, info: &KeyboardInfo) {
        for observer in &mut self.observers {
            if observer.mask.contains(info.kind) {
                (observer.callback)(info);
            }
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl Default for KeyboardObservable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<u32>>>, impl FnMut(&KeyboardInfo) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |info: &KeyboardInfo| sink.borrow_mut().push(info.event.key_code))
    }

    #[test]
    fn mask_combines_kinds() {
        let mask = KeyboardEventMask::KEY_DOWN | KeyboardEventMask::KEY_UP;
        assert_eq!(mask, KeyboardEventMask::ALL);
        assert!(mask.contains(KeyboardEventKind::KeyDown));
        assert!(mask.contains(KeyboardEventKind::KeyUp));
        assert!(!KeyboardEventMask::KEY_UP.contains(KeyboardEventKind::KeyDown));
    }

    #[test]
    fn notify_filters_by_mask() {
        let mut source = KeyboardObservable::new();
        let (downs, on_down) = recorder();
        let (all, on_any) = recorder();
        source.add(on_down, KeyboardEventMask::KEY_DOWN);
        source.add(on_any, KeyboardEventMask::ALL);

        source.notify(&KeyboardInfo::key_down("w", 87));
        source.notify(&KeyboardInfo::key_up("w", 87));

        assert_eq!(*downs.borrow(), [87]);
        assert_eq!(*all.borrow(), [87, 87]);
    }

    #[test]
    fn removed_observer_receives_nothing() {
        let mut source = KeyboardObservable::new();
        let (seen, callback) = recorder();
        let id = source.add(callback, KeyboardEventMask::ALL);
        assert_eq!(source.observer_count(), 1);

        assert!(source.remove(id));
        assert!(!source.remove(id));
        assert_eq!(source.observer_count(), 0);

        source.notify(&KeyboardInfo::key_down(" ", 32));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn sources_have_distinct_ids() {
        let a = KeyboardObservable::new();
        let b = KeyboardObservable::new();
        assert_ne!(a.id(), b.id());
    }
}
