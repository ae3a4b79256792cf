use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Action = Box<dyn FnMut()>;

struct Binding {
    id: u64,
    key: String,
    // Taken out while the action runs so the registry is not borrowed
    // during the callback.
    action: Option<Action>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    bindings: Vec<Binding>,
}

impl Registry {
    fn position(&self, id: u64) -> Option<usize> {
        self.bindings.iter().position(|binding| binding.id == id)
    }
}

/// Dispatches named key presses to registered actions.
///
/// Matching is case-insensitive on the key name; bindings for different
/// keys coexist independently. The press source is injected: whoever
/// owns the input surface calls [`Keymap::dispatch`], so tests run
/// without a real event target.
#[derive(Clone, Default)]
pub struct Keymap {
    registry: Rc<RefCell<Registry>>,
}

/// Handle for one binding. Dropping it releases the binding exactly
/// once; presses dispatched after the drop never fire the action.
pub struct KeyBinding {
    registry: Weak<RefCell<Registry>>,
    id: u64,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` for presses of `key`. The binding stays active
    /// until the returned handle is dropped.
    #[must_use = "dropping the binding releases it immediately"]
    pub fn bind(&self, key: &str, action: impl FnMut() + 'static) -> KeyBinding {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.bindings.push(Binding {
            id,
            key: key.to_lowercase(),
            action: Some(Box::new(action)),
        });
        KeyBinding {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    /// Deliver one press of `key`, invoking every matching action exactly
    /// once. Actions may bind or drop bindings while running.
    pub fn dispatch(&self, key: &str) {
        let pressed = key.to_lowercase();
        let matching: Vec<u64> = self
            .registry
            .borrow()
            .bindings
            .iter()
            .filter(|binding| binding.key == pressed)
            .map(|binding| binding.id)
            .collect();

        for id in matching {
            let action = {
                let mut registry = self.registry.borrow_mut();
                let index = registry.position(id);
                index.and_then(|index| registry.bindings[index].action.take())
            };
            if let Some(mut action) = action {
                action();
                // Restore unless the binding was dropped mid-action.
                let mut registry = self.registry.borrow_mut();
                if let Some(index) = registry.position(id) {
                    registry.bindings[index].action = Some(action);
                }
            }
        }
    }
}

impl Drop for KeyBinding {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.borrow_mut();
            if let Some(index) = registry.position(self.id) {
                registry.bindings.remove(index);
            }
        }
    }
}
