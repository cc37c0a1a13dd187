use std::cell::RefCell;
use std::rc::Rc;

use prose_engine::{
    ChildConstraint, Document, EditorState, EditorView, Element, EventResult, MarkConstraint, Node,
    NodeRole, NodeSpec, Plugin, PluginView, Schema, SchemaSpec, Selection, StateConfig, TextPos,
};

fn block_schema() -> Schema {
    let mut spec = SchemaSpec::new();
    spec.add_node(
        "doc",
        NodeSpec {
            role: NodeRole::Doc,
            children: ChildConstraint::BlockOnly,
            marks: MarkConstraint::All,
            tag: None,
        },
    );
    spec.add_node(
        "paragraph",
        NodeSpec {
            role: NodeRole::Block,
            children: ChildConstraint::InlineOnly,
            marks: MarkConstraint::All,
            tag: Some("p".to_string()),
        },
    );
    Schema::new(spec)
}

fn state_with_plugins(text: &str, offset: usize, plugins: Vec<Plugin>) -> EditorState {
    EditorState::create(StateConfig {
        schema: block_schema(),
        doc: Some(Document {
            children: vec![Node::paragraph(text)],
        }),
        selection: Some(Selection::caret(TextPos::new(vec![0], offset))),
        plugins,
    })
}

struct RecordingView {
    name: &'static str,
    log: Rc<RefCell<Vec<String>>>,
}

impl PluginView for RecordingView {
    fn update(&mut self, _view: &EditorView, _prev: &EditorState) {
        self.log.borrow_mut().push(format!("{}:update", self.name));
    }

    fn destroy(&mut self) {
        self.log.borrow_mut().push(format!("{}:destroy", self.name));
    }
}

fn view_plugin(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Plugin {
    let log = Rc::clone(log);
    Plugin::new(name).with_view(move |_view| {
        log.borrow_mut().push(format!("{name}:mount"));
        Box::new(RecordingView {
            name,
            log: Rc::clone(&log),
        })
    })
}

#[test]
fn plugin_views_mount_update_and_destroy_in_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let state = state_with_plugins(
        "",
        0,
        vec![view_plugin("one", &log), view_plugin("two", &log)],
    );
    let container = Element::create("div");
    let mut view = EditorView::new(container.clone(), state);
    assert_eq!(*log.borrow(), vec!["one:mount", "two:mount"]);

    let mut tr = view.state().tr();
    tr.insert_text("a").unwrap();
    let next = view.state().apply(tr);
    view.update_state(next);
    assert_eq!(
        *log.borrow(),
        vec!["one:mount", "two:mount", "one:update", "two:update"]
    );

    view.destroy();
    assert!(log
        .borrow()
        .ends_with(&["one:destroy".to_string(), "two:destroy".to_string()]));
    assert!(container.children().is_empty());
}

#[test]
fn the_surface_mirrors_the_document_text() {
    let state = state_with_plugins("ab", 1, Vec::new());
    let container = Element::create("div");
    let mut view = EditorView::new(container.clone(), state);
    assert!(view.surface().has_class("sp__editor"));
    assert_eq!(view.surface().attr("contenteditable").as_deref(), Some("true"));
    assert_eq!(view.surface().text(), "ab");

    let tr = view.handle_text_input("x").unwrap();
    let next = view.state().apply(tr);
    view.update_state(next);
    assert_eq!(view.state().doc().children, vec![Node::paragraph("axb")]);
    assert_eq!(view.surface().text(), "axb");
}

#[test]
fn unclaimed_clicks_inside_the_surface_focus_it() {
    let state = state_with_plugins("ab", 0, Vec::new());
    let container = Element::create("div");
    let mut view = EditorView::new(container, state);
    assert!(!view.surface().is_focused());

    let outside = Element::create("div");
    assert!(view.handle_mousedown(&outside).is_none());
    assert!(!view.surface().is_focused());

    let surface = view.surface().clone();
    assert!(view.handle_mousedown(&surface).is_none());
    assert!(view.surface().is_focused());
}

struct ClaimingView {
    seen: Rc<RefCell<u32>>,
}

impl PluginView for ClaimingView {
    fn on_mousedown(&mut self, _view: &EditorView, _target: &Element) -> EventResult {
        *self.seen.borrow_mut() += 1;
        EventResult::Handled(None)
    }
}

#[test]
fn the_first_view_to_claim_a_click_ends_the_walk() {
    let first = Rc::new(RefCell::new(0));
    let second = Rc::new(RefCell::new(0));
    let claiming = |seen: &Rc<RefCell<u32>>, name: &'static str| {
        let seen = Rc::clone(seen);
        Plugin::new(name).with_view(move |_view| {
            Box::new(ClaimingView {
                seen: Rc::clone(&seen),
            })
        })
    };
    let state = state_with_plugins(
        "ab",
        0,
        vec![claiming(&first, "one"), claiming(&second, "two")],
    );
    let container = Element::create("div");
    let mut view = EditorView::new(container, state);

    let target = Element::create("span");
    assert!(view.handle_mousedown(&target).is_none());
    assert_eq!(*first.borrow(), 1);
    assert_eq!(*second.borrow(), 0);
}
