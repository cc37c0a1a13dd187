use std::sync::Arc;

use thiserror::Error;

use prose_engine::{
    EditorState, EditorView, Element, HtmlSerializer, MarkdownSerializer, Plugin, Schema,
    StateConfig, Transaction,
};

use crate::extension::{Extension, ExtensionError};
use crate::listeners::{Listeners, UPDATE};
use crate::plugins::assemble_plugins;
use crate::schema::{assemble_schema, SchemaDefaults, SchemaError};

#[derive(Default)]
pub struct EditorOptions {
    pub extensions: Vec<Arc<dyn Extension>>,
    pub plugins: Vec<Plugin>,
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Extension(#[from] ExtensionError),
}

/// Assembled schema plus the mounted view, shared by both editor flavors.
struct EditorCore {
    schema: Schema,
    view: EditorView,
}

impl EditorCore {
    fn new(container: Element, options: EditorOptions) -> Result<EditorCore, EditorError> {
        let schema = assemble_schema(&options.extensions, &SchemaDefaults::default())?;
        let plugins = assemble_plugins(&options.extensions, options.plugins)?;
        let state = EditorState::create(StateConfig {
            schema: schema.clone(),
            doc: None,
            selection: None,
            plugins,
        });
        let view = EditorView::new(container, state);
        Ok(EditorCore { schema, view })
    }

    fn apply(&mut self, tr: Transaction) {
        let next = self.view.state().apply(tr);
        self.view.update_state(next);
    }
}

/// Editor whose `value()` renders the document as HTML markup.
pub struct HtmlEditor {
    core: EditorCore,
    listeners: Listeners<HtmlEditor>,
}

impl HtmlEditor {
    pub fn new(container: Element, options: EditorOptions) -> Result<HtmlEditor, EditorError> {
        Ok(HtmlEditor {
            core: EditorCore::new(container, options)?,
            listeners: Listeners::new(),
        })
    }

    pub fn language(&self) -> &'static str {
        "html"
    }

    pub fn value(&self) -> String {
        HtmlSerializer::from_schema(&self.core.schema)
            .serialize_fragment(self.core.view.state().doc())
    }

    pub fn schema(&self) -> &Schema {
        &self.core.schema
    }

    pub fn state(&self) -> &EditorState {
        self.core.view.state()
    }

    pub fn view(&self) -> &EditorView {
        &self.core.view
    }

    pub fn listeners(&self) -> &Listeners<HtmlEditor> {
        &self.listeners
    }

    pub fn on_update(&mut self, handler: impl Fn(&HtmlEditor) + 'static) -> &mut HtmlEditor {
        self.listeners.add(UPDATE, handler);
        self
    }

    /// Applies the transaction, refreshes the view and every plugin view,
    /// then notifies the update listeners.
    pub fn dispatch(&mut self, tr: Transaction) {
        self.core.apply(tr);
        self.listeners.trigger(UPDATE, self);
    }

    pub fn input_text(&mut self, text: &str) {
        if let Some(tr) = self.core.view.handle_text_input(text) {
            self.dispatch(tr);
        }
    }

    /// Returns whether any binding consumed the key.
    pub fn key_down(&mut self, key: &str) -> bool {
        match self.core.view.handle_key(key) {
            Some(tr) => {
                self.dispatch(tr);
                true
            }
            None => false,
        }
    }

    pub fn mousedown(&mut self, target: &Element) {
        if let Some(tr) = self.core.view.handle_mousedown(target) {
            self.dispatch(tr);
        }
    }
}

/// Editor whose `value()` renders the document as markdown.
pub struct MarkdownEditor {
    core: EditorCore,
    listeners: Listeners<MarkdownEditor>,
}

impl MarkdownEditor {
    pub fn new(container: Element, options: EditorOptions) -> Result<MarkdownEditor, EditorError> {
        Ok(MarkdownEditor {
            core: EditorCore::new(container, options)?,
            listeners: Listeners::new(),
        })
    }

    pub fn language(&self) -> &'static str {
        "markdown"
    }

    pub fn value(&self) -> String {
        MarkdownSerializer::from_schema(&self.core.schema).serialize(self.core.view.state().doc())
    }

    pub fn schema(&self) -> &Schema {
        &self.core.schema
    }

    pub fn state(&self) -> &EditorState {
        self.core.view.state()
    }

    pub fn view(&self) -> &EditorView {
        &self.core.view
    }

    pub fn listeners(&self) -> &Listeners<MarkdownEditor> {
        &self.listeners
    }

    pub fn on_update(&mut self, handler: impl Fn(&MarkdownEditor) + 'static) -> &mut MarkdownEditor {
        self.listeners.add(UPDATE, handler);
        self
    }

    pub fn dispatch(&mut self, tr: Transaction) {
        self.core.apply(tr);
        self.listeners.trigger(UPDATE, self);
    }

    pub fn input_text(&mut self, text: &str) {
        if let Some(tr) = self.core.view.handle_text_input(text) {
            self.dispatch(tr);
        }
    }

    pub fn key_down(&mut self, key: &str) -> bool {
        match self.core.view.handle_key(key) {
            Some(tr) => {
                self.dispatch(tr);
                true
            }
            None => false,
        }
    }

    pub fn mousedown(&mut self, target: &Element) {
        if let Some(tr) = self.core.view.handle_mousedown(target) {
            self.dispatch(tr);
        }
    }
}
