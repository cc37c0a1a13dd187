use std::mem;

use crate::dom::Element;
use crate::doc::text_content;
use crate::input::run_input_rules;
use crate::keymap::dispatch_key;
use crate::plugin::ViewFactory;
use crate::state::{EditorState, Transaction};

pub enum EventResult {
    Ignored,
    /// The event was consumed; the payload is the transaction to dispatch,
    /// if the handler produced one.
    Handled(Option<Transaction>),
}

/// Per-plugin view attachment. Instantiated when the editor view mounts,
/// updated after every state change, torn down with the view.
pub trait PluginView {
    fn update(&mut self, _view: &EditorView, _prev: &EditorState) {}

    fn on_mousedown(&mut self, _view: &EditorView, _target: &Element) -> EventResult {
        EventResult::Ignored
    }

    fn destroy(&mut self) {}
}

struct PluginViewSlot {
    plugin: String,
    view: Box<dyn PluginView>,
}

/// Owns the editing surface and the plugin views. Event handlers produce
/// transactions but never apply them; the embedder applies and feeds the
/// next state back through `update_state`.
pub struct EditorView {
    container: Element,
    surface: Element,
    state: EditorState,
    plugin_views: Vec<PluginViewSlot>,
    destroyed: bool,
}

impl EditorView {
    pub fn new(container: Element, state: EditorState) -> EditorView {
        let surface = Element::create("div");
        surface.add_class("sp__editor");
        surface.set_attr("contenteditable", "true");
        container.append_child(&surface);
        let mut view = EditorView {
            container,
            surface,
            state,
            plugin_views: Vec::new(),
            destroyed: false,
        };
        view.sync_surface();
        let factories: Vec<(String, ViewFactory)> = view
            .state
            .plugins()
            .iter()
            .filter_map(|p| Some((p.name().to_string(), p.view_factory()?.clone())))
            .collect();
        for (plugin, factory) in factories {
            let plugin_view = (*factory)(&view);
            view.plugin_views.push(PluginViewSlot {
                plugin,
                view: plugin_view,
            });
        }
        view
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn container(&self) -> &Element {
        &self.container
    }

    pub fn surface(&self) -> &Element {
        &self.surface
    }

    fn sync_surface(&self) {
        self.surface.set_text(&text_content(self.state.doc()));
    }

    pub fn update_state(&mut self, next: EditorState) {
        let prev = mem::replace(&mut self.state, next);
        self.sync_surface();
        let mut views = mem::take(&mut self.plugin_views);
        for slot in &mut views {
            slot.view.update(&*self, &prev);
        }
        self.plugin_views = views;
    }

    pub fn handle_key(&self, key: &str) -> Option<Transaction> {
        dispatch_key(&self.state, key)
    }

    /// Typed text goes through the input rules first; when none fires it
    /// falls back to a plain insertion at the selection head.
    pub fn handle_text_input(&self, text: &str) -> Option<Transaction> {
        if let Some(tr) = run_input_rules(&self.state, text) {
            return Some(tr);
        }
        let mut tr = self.state.tr();
        tr.insert_text(text).ok()?;
        Some(tr.source("input:text"))
    }

    /// Offers the event to plugin views in order; the first one that does
    /// not ignore it ends the walk. Unclaimed clicks inside the surface
    /// focus it.
    pub fn handle_mousedown(&mut self, target: &Element) -> Option<Transaction> {
        let mut views = mem::take(&mut self.plugin_views);
        let mut outcome = EventResult::Ignored;
        for slot in &mut views {
            match slot.view.on_mousedown(&*self, target) {
                EventResult::Ignored => continue,
                EventResult::Handled(tr) => {
                    log::debug!("mousedown handled by plugin {:?}", slot.plugin);
                    outcome = EventResult::Handled(tr);
                    break;
                }
            }
        }
        self.plugin_views = views;
        match outcome {
            EventResult::Handled(tr) => tr,
            EventResult::Ignored => {
                if self.surface.contains(target) {
                    self.surface.focus();
                }
                None
            }
        }
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for slot in &mut self.plugin_views {
            slot.view.destroy();
        }
        self.plugin_views.clear();
        self.surface.remove();
    }
}

impl Drop for EditorView {
    fn drop(&mut self) {
        self.destroy();
    }
}
