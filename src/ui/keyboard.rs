use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dioxus::prelude::Key;

/// Navigation keys the grid and the record selector understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Tab,
    Escape,
}

impl KeyPress {
    pub fn from_key(key: &Key) -> Option<KeyPress> {
        match key {
            Key::ArrowUp => Some(KeyPress::ArrowUp),
            Key::ArrowDown => Some(KeyPress::ArrowDown),
            Key::ArrowLeft => Some(KeyPress::ArrowLeft),
            Key::ArrowRight => Some(KeyPress::ArrowRight),
            Key::Enter => Some(KeyPress::Enter),
            Key::Tab => Some(KeyPress::Tab),
            Key::Escape => Some(KeyPress::Escape),
            _ => None,
        }
    }
}

type ScopeHandler = Rc<dyn Fn(KeyPress) -> bool>;

struct RegistryInner {
    scopes: RefCell<Vec<(u64, ScopeHandler)>>,
    next_id: Cell<u64>,
}

/// Global keydown surface. Components acquire a scope while mounted; the
/// returned guard releases the registration when dropped, so no listener
/// outlives its owner. Dispatch asks the most recently acquired scope
/// first.
#[derive(Clone)]
pub struct KeyRegistry {
    inner: Rc<RegistryInner>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                scopes: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    pub fn acquire(&self, handler: impl Fn(KeyPress) -> bool + 'static) -> KeyScope {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .scopes
            .borrow_mut()
            .push((id, Rc::new(handler)));
        KeyScope {
            registry: self.clone(),
            id,
        }
    }

    /// Returns true when a scope consumed the key; the caller is expected
    /// to suppress default handling and propagation in that case.
    pub fn dispatch(&self, key: KeyPress) -> bool {
        let scopes: Vec<ScopeHandler> = self
            .inner
            .scopes
            .borrow()
            .iter()
            .rev()
            .map(|(_, handler)| handler.clone())
            .collect();
        scopes.into_iter().any(|handler| handler(key))
    }

    fn release(&self, id: u64) {
        self.inner
            .scopes
            .borrow_mut()
            .retain(|(scope_id, _)| *scope_id != id);
    }
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for KeyRegistry {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

pub struct KeyScope {
    registry: KeyRegistry,
    id: u64,
}

impl Drop for KeyScope {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_the_scope_releases_the_listener() {
        let registry = KeyRegistry::new();
        let hits = Rc::new(Cell::new(0));
        let sink = hits.clone();
        let scope = registry.acquire(move |_| {
            sink.set(sink.get() + 1);
            true
        });

        assert!(registry.dispatch(KeyPress::Enter));
        assert_eq!(hits.get(), 1);

        drop(scope);
        assert!(!registry.dispatch(KeyPress::Enter));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn most_recent_scope_wins() {
        let registry = KeyRegistry::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first_sink = order.clone();
        let _first = registry.acquire(move |_| {
            first_sink.borrow_mut().push("first");
            true
        });
        let second_sink = order.clone();
        let _second = registry.acquire(move |_| {
            second_sink.borrow_mut().push("second");
            true
        });

        registry.dispatch(KeyPress::ArrowDown);
        assert_eq!(*order.borrow(), vec!["second"]);
    }

    #[test]
    fn unhandled_keys_fall_through_to_older_scopes() {
        let registry = KeyRegistry::new();
        let hits = Rc::new(Cell::new(0));
        let sink = hits.clone();
        let _outer = registry.acquire(move |key| {
            if key == KeyPress::Escape {
                sink.set(sink.get() + 1);
                true
            } else {
                false
            }
        });
        let _inner = registry.acquire(|key| key == KeyPress::Enter);

        assert!(registry.dispatch(KeyPress::Escape));
        assert_eq!(hits.get(), 1);
        assert!(!registry.dispatch(KeyPress::ArrowLeft));
    }
}
