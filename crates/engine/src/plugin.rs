use std::fmt;
use std::sync::Arc;

use crate::command::Command;
use crate::input::InputRule;
use crate::state::{EditorState, Transaction};
use crate::view::{EditorView, PluginView};

pub type KeyBindings = Vec<(String, Arc<dyn Command>)>;
pub type TransactionObserver = Arc<dyn Fn(&Transaction, &EditorState, &EditorState) + Send + Sync>;
pub type ViewFactory = Arc<dyn Fn(&EditorView) -> Box<dyn PluginView>>;

/// A named bundle of editor behavior. Plugins are held by the state in
/// registration order; that order decides key dispatch, input rule priority,
/// and view mounting.
#[derive(Clone)]
pub struct Plugin {
    name: String,
    keymap: Option<KeyBindings>,
    input_rules: Option<Vec<InputRule>>,
    view: Option<ViewFactory>,
    observer: Option<TransactionObserver>,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Plugin {
        Plugin {
            name: name.into(),
            keymap: None,
            input_rules: None,
            view: None,
            observer: None,
        }
    }

    pub fn with_keymap(mut self, bindings: KeyBindings) -> Plugin {
        self.keymap = Some(bindings);
        self
    }

    pub fn with_input_rules(mut self, rules: Vec<InputRule>) -> Plugin {
        self.input_rules = Some(rules);
        self
    }

    pub fn with_view(
        mut self,
        factory: impl Fn(&EditorView) -> Box<dyn PluginView> + 'static,
    ) -> Plugin {
        self.view = Some(Arc::new(factory));
        self
    }

    pub fn with_observer(
        mut self,
        observer: impl Fn(&Transaction, &EditorState, &EditorState) + Send + Sync + 'static,
    ) -> Plugin {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keymap(&self) -> Option<&KeyBindings> {
        self.keymap.as_ref()
    }

    pub fn input_rules(&self) -> Option<&[InputRule]> {
        self.input_rules.as_deref()
    }

    pub fn view_factory(&self) -> Option<&ViewFactory> {
        self.view.as_ref()
    }

    pub fn observer(&self) -> Option<&TransactionObserver> {
        self.observer.as_ref()
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("keymap", &self.keymap.as_ref().map(|b| b.len()))
            .field("input_rules", &self.input_rules.as_ref().map(|r| r.len()))
            .field("view", &self.view.is_some())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
