//! Lexical scopes for consumers that resolve names.
//!
//! A [`ScopeStack`] is owned by one consumer. [`ScopeStack::enter_scope`]
//! pushes a frame and hands back a [`ScopeGuard`]; dropping the guard pops
//! that frame, whichever way control leaves the block. The guard keeps no
//! borrow of the stack, so a visitor can hold one while recursing through
//! `&mut self`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

struct Frame<V> {
    id: usize,
    bindings: HashMap<String, V>,
}

pub struct ScopeStack<V> {
    frames: Rc<RefCell<Vec<Frame<V>>>>,
    next_id: Cell<usize>,
}

impl<V: Clone> ScopeStack<V> {
    pub fn new() -> Self {
        ScopeStack {
            frames: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        }
    }

    pub fn enter_scope(&self) -> ScopeGuard<V> {
        let mut frames = self.frames.borrow_mut();
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let depth = frames.len();
        frames.push(Frame {
            id,
            bindings: HashMap::new(),
        });
        ScopeGuard {
            frames: Rc::clone(&self.frames),
            id,
            depth,
        }
    }

    /// Binds `name` in the innermost frame, shadowing outer bindings.
    ///
    /// Returns `false` when no scope has been entered.
    pub fn bind(&self, name: &str, value: V) -> bool {
        match self.frames.borrow_mut().last_mut() {
            Some(frame) => {
                frame.bindings.insert(name.to_owned(), value);
                true
            }
            None => false,
        }
    }

    /// Searches innermost to outermost.
    pub fn lookup(&self, name: &str) -> Option<V> {
        self.frames
            .borrow()
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(name).cloned())
    }

    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Depth of the frame `name` resolves in, counted from the outermost.
    pub fn depth_of(&self, name: &str) -> Option<usize> {
        self.frames
            .borrow()
            .iter()
            .rposition(|frame| frame.bindings.contains_key(name))
    }
}

impl<V: Clone> Default for ScopeStack<V> {
    fn default() -> Self {
        ScopeStack::new()
    }
}

impl<V> fmt::Debug for ScopeStack<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ScopeStack")
            .field("depth", &self.frames.borrow().len())
            .finish()
    }
}

/// Pops the frame it was created for when dropped, together with any frame
/// pushed after it that is still open.
#[must_use = "the scope is popped as soon as the guard is dropped"]
pub struct ScopeGuard<V> {
    frames: Rc<RefCell<Vec<Frame<V>>>>,
    id: usize,
    depth: usize,
}

impl<V> ScopeGuard<V> {
    /// Position of this guard's frame in the stack when it was entered.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl<V> Drop for ScopeGuard<V> {
    fn drop(&mut self) {
        let mut frames = self.frames.borrow_mut();
        // Already gone if an outer guard was dropped first.
        if let Some(position) = frames.iter().rposition(|frame| frame.id == self.id) {
            frames.truncate(position);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lookup_without_scope() {
        let scopes: ScopeStack<i32> = ScopeStack::new();
        assert_eq!(scopes.lookup("x"), None);
        assert!(!scopes.bind("x", 1));
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_shadowing_and_restore() {
        let scopes = ScopeStack::new();
        let _outer = scopes.enter_scope();
        scopes.bind("x", 1);
        scopes.bind("y", 2);
        {
            let inner = scopes.enter_scope();
            assert_eq!(inner.depth(), 1);
            scopes.bind("x", 10);
            assert_eq!(scopes.lookup("x"), Some(10));
            assert_eq!(scopes.lookup("y"), Some(2));
            assert_eq!(scopes.depth_of("x"), Some(1));
            assert_eq!(scopes.depth_of("y"), Some(0));
        }
        assert_eq!(scopes.lookup("x"), Some(1));
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn test_pop_discards_bindings() {
        let scopes = ScopeStack::new();
        {
            let _scope = scopes.enter_scope();
            scopes.bind("tmp", "value");
        }
        assert_eq!(scopes.lookup("tmp"), None);
        assert_eq!(scopes.depth(), 0);
    }

    fn fails_inside_scope(scopes: &ScopeStack<i32>) -> Result<(), String> {
        let _scope = scopes.enter_scope();
        scopes.bind("a", 1);
        let failed: Result<(), String> = Err("early".to_owned());
        failed?;
        scopes.bind("b", 2);
        Ok(())
    }

    #[test]
    fn test_pop_on_early_return() {
        let scopes = ScopeStack::new();
        assert!(fails_inside_scope(&scopes).is_err());
        assert_eq!(scopes.depth(), 0);
        assert_eq!(scopes.lookup("a"), None);
    }

    #[test]
    fn test_pop_on_unwind() {
        let scopes = ScopeStack::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = scopes.enter_scope();
            scopes.bind("a", 1);
            panic!("unwind");
        }));
        assert!(result.is_err());
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_leaked_inner_guard() {
        let scopes: ScopeStack<i32> = ScopeStack::new();
        let outer = scopes.enter_scope();
        std::mem::forget(scopes.enter_scope());
        assert_eq!(scopes.depth(), 2);
        drop(outer);
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_stale_guard_keeps_newer_frames() {
        let scopes = ScopeStack::new();
        let first = scopes.enter_scope();
        let second = scopes.enter_scope();
        drop(first);
        assert_eq!(scopes.depth(), 0);

        let _third = scopes.enter_scope();
        let _fourth = scopes.enter_scope();
        scopes.bind("x", 1);
        drop(second);
        assert_eq!(scopes.depth(), 2);
        assert_eq!(scopes.lookup("x"), Some(1));
        assert_eq!(scopes.depth_of("x"), Some(1));
    }
}
