use std::sync::{Arc, Mutex};

use crate::command::Command;
use crate::doc::Selection;
use crate::plugin::Plugin;
use crate::state::{EditorState, Transaction};
use crate::steps::Step;

const UNDO_SOURCE: &str = "history:undo";
const REDO_SOURCE: &str = "history:redo";

#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryConfig {
    /// Undo depth; zero means the default of 100.
    pub depth: usize,
}

impl HistoryConfig {
    fn with_defaults(mut self) -> Self {
        if self.depth == 0 {
            self.depth = 100;
        }
        self
    }
}

struct HistoryRecord {
    steps: Vec<Step>,
    selection: Selection,
}

struct HistoryStacks {
    undo: Vec<HistoryRecord>,
    redo: Vec<HistoryRecord>,
    depth: usize,
}

/// Shared undo/redo stacks. The plugin observes applied transactions and
/// records each one's reversed inverses; the commands replay them.
#[derive(Clone)]
pub struct HistoryHandle {
    shared: Arc<Mutex<HistoryStacks>>,
}

pub fn history(config: HistoryConfig) -> HistoryHandle {
    let config = config.with_defaults();
    HistoryHandle {
        shared: Arc::new(Mutex::new(HistoryStacks {
            undo: Vec::new(),
            redo: Vec::new(),
            depth: config.depth,
        })),
    }
}

impl HistoryHandle {
    pub fn plugin(&self) -> Plugin {
        let shared = Arc::clone(&self.shared);
        Plugin::new("history").with_observer(move |tr, old, _new| {
            if !tr.meta().add_to_history || tr.steps().is_empty() {
                return;
            }
            let Ok(mut stacks) = shared.lock() else {
                return;
            };
            let mut steps = tr.inverses().to_vec();
            steps.reverse();
            let record = HistoryRecord {
                steps,
                selection: old.selection().clone(),
            };
            match tr.meta().source.as_deref() {
                Some(UNDO_SOURCE) => stacks.redo.push(record),
                Some(REDO_SOURCE) => stacks.undo.push(record),
                _ => {
                    stacks.undo.push(record);
                    stacks.redo.clear();
                }
            }
            if stacks.undo.len() > stacks.depth {
                let overflow = stacks.undo.len() - stacks.depth;
                stacks.undo.drain(..overflow);
            }
        })
    }

    pub fn can_undo(&self) -> bool {
        self.shared
            .lock()
            .map(|stacks| !stacks.undo.is_empty())
            .unwrap_or(false)
    }

    pub fn can_redo(&self) -> bool {
        self.shared
            .lock()
            .map(|stacks| !stacks.redo.is_empty())
            .unwrap_or(false)
    }

    pub fn undo_command(&self) -> Arc<dyn Command> {
        Arc::new(HistoryCommand {
            shared: Arc::clone(&self.shared),
            redo: false,
        })
    }

    pub fn redo_command(&self) -> Arc<dyn Command> {
        Arc::new(HistoryCommand {
            shared: Arc::clone(&self.shared),
            redo: true,
        })
    }
}

struct HistoryCommand {
    shared: Arc<Mutex<HistoryStacks>>,
    redo: bool,
}

impl Command for HistoryCommand {
    fn can_apply(&self, _state: &EditorState) -> bool {
        let Ok(stacks) = self.shared.lock() else {
            return false;
        };
        if self.redo {
            !stacks.redo.is_empty()
        } else {
            !stacks.undo.is_empty()
        }
    }

    // Pops before replaying; a record whose transaction the caller drops is
    // gone, matching the stacks the observer rebuilds on dispatch.
    fn apply(&self, state: &EditorState) -> Option<Transaction> {
        let record = {
            let Ok(mut stacks) = self.shared.lock() else {
                return None;
            };
            if self.redo {
                stacks.redo.pop()?
            } else {
                stacks.undo.pop()?
            }
        };
        let mut tr = state.tr();
        for step in &record.steps {
            if let Err(err) = tr.step(step.clone()) {
                log::warn!("history replay failed: {err}");
                return None;
            }
        }
        tr.set_selection(record.selection);
        let source = if self.redo { REDO_SOURCE } else { UNDO_SOURCE };
        Some(tr.source(source))
    }
}
