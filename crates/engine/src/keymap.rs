use std::sync::Arc;

use crate::command::Command;
use crate::plugin::Plugin;
use crate::state::{EditorState, Transaction};

/// Builds a keymap plugin from `(key, command)` bindings.
pub fn keymap(name: impl Into<String>, bindings: Vec<(String, Arc<dyn Command>)>) -> Plugin {
    Plugin::new(name).with_keymap(bindings)
}

/// Resolves a key against every keymap plugin in registration order. The
/// first matching binding whose command produces a transaction wins; a
/// command that declines lets later bindings see the key.
pub fn dispatch_key(state: &EditorState, key: &str) -> Option<Transaction> {
    for plugin in state.plugins() {
        let Some(bindings) = plugin.keymap() else {
            continue;
        };
        for (bound, command) in bindings {
            if bound != key {
                continue;
            }
            if let Some(tr) = command.apply(state) {
                log::debug!("key {key:?} handled by plugin {:?}", plugin.name());
                return Some(tr);
            }
        }
    }
    None
}
