use std::sync::{Arc, Mutex};

use prose_engine::{
    base_keymap, dispatch_key, keymap, ChildConstraint, Command, CommandFn, Document, EditorState,
    MarkConstraint, Node, NodeRole, NodeSpec, Schema, SchemaSpec, Selection, StateConfig, TextPos,
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

fn recording_command(
    log: &Arc<Mutex<Vec<&'static str>>>,
    name: &'static str,
    handles: bool,
) -> Arc<dyn Command> {
    let log = Arc::clone(log);
    CommandFn::new(
        |_state| true,
        move |state| {
            log.lock().unwrap().push(name);
            handles.then(|| state.tr().source("test:recorded"))
        },
    )
}

fn state_with_plugins(
    text: &str,
    offset: usize,
    plugins: Vec<prose_engine::Plugin>,
) -> EditorState {
    EditorState::create(StateConfig {
        schema: block_schema(),
        doc: Some(Document {
            children: vec![Node::paragraph(text)],
        }),
        selection: Some(Selection::caret(TextPos::new(vec![0], offset))),
        plugins,
    })
}

#[test]
fn first_registered_binding_wins() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let state = state_with_plugins(
        "ab",
        0,
        vec![
            keymap(
                "keymap:first",
                vec![("Mod-k".to_string(), recording_command(&log, "first", true))],
            ),
            keymap(
                "keymap:second",
                vec![("Mod-k".to_string(), recording_command(&log, "second", true))],
            ),
        ],
    );
    assert!(dispatch_key(&state, "Mod-k").is_some());
    assert_eq!(*log.lock().unwrap(), vec!["first"]);
}

#[test]
fn a_declining_binding_falls_through() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let state = state_with_plugins(
        "ab",
        0,
        vec![
            keymap(
                "keymap:first",
                vec![(
                    "Mod-k".to_string(),
                    recording_command(&log, "decliner", false),
                )],
            ),
            keymap(
                "keymap:second",
                vec![("Mod-k".to_string(), recording_command(&log, "second", true))],
            ),
        ],
    );
    assert!(dispatch_key(&state, "Mod-k").is_some());
    assert_eq!(*log.lock().unwrap(), vec!["decliner", "second"]);
}

#[test]
fn unbound_keys_are_ignored() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let state = state_with_plugins(
        "ab",
        0,
        vec![keymap(
            "keymap:only",
            vec![("Mod-k".to_string(), recording_command(&log, "only", true))],
        )],
    );
    assert!(dispatch_key(&state, "Mod-q").is_none());
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn enter_splits_the_block_at_the_caret() {
    let state = state_with_plugins("hello", 3, vec![base_keymap()]);
    let state = state.apply(dispatch_key(&state, "Enter").unwrap());
    assert_eq!(
        state.doc().children,
        vec![Node::paragraph("hel"), Node::paragraph("lo")]
    );
    assert_eq!(
        state.selection(),
        &Selection::caret(TextPos::new(vec![1], 0))
    );
}

#[test]
fn enter_at_the_block_end_opens_an_empty_sibling() {
    let state = state_with_plugins("hi", 2, vec![base_keymap()]);
    let state = state.apply(dispatch_key(&state, "Enter").unwrap());
    assert_eq!(
        state.doc().children,
        vec![Node::paragraph("hi"), Node::paragraph("")]
    );
    assert_eq!(
        state.selection(),
        &Selection::caret(TextPos::new(vec![1], 0))
    );
}

#[test]
fn backspace_deletes_and_joins() {
    let state = EditorState::create(StateConfig {
        schema: block_schema(),
        doc: Some(Document {
            children: vec![Node::paragraph("ab"), Node::paragraph("cd")],
        }),
        selection: Some(Selection::caret(TextPos::new(vec![1], 1))),
        plugins: vec![base_keymap()],
    });

    // one character back
    let state = state.apply(dispatch_key(&state, "Backspace").unwrap());
    assert_eq!(
        state.doc().children,
        vec![Node::paragraph("ab"), Node::paragraph("d")]
    );
    assert_eq!(
        state.selection(),
        &Selection::caret(TextPos::new(vec![1], 0))
    );

    // at offset zero the block joins its previous sibling
    let state = state.apply(dispatch_key(&state, "Backspace").unwrap());
    assert_eq!(state.doc().children, vec![Node::paragraph("abd")]);
    assert_eq!(
        state.selection(),
        &Selection::caret(TextPos::new(vec![0], 2))
    );
}

#[test]
fn backspace_removes_a_full_character() {
    let state = state_with_plugins("aé", 3, vec![base_keymap()]);
    let state = state.apply(dispatch_key(&state, "Backspace").unwrap());
    assert_eq!(state.doc().children, vec![Node::paragraph("a")]);
    assert_eq!(
        state.selection(),
        &Selection::caret(TextPos::new(vec![0], 1))
    );
}

#[test]
fn delete_forward_pulls_the_next_block_in() {
    let state = EditorState::create(StateConfig {
        schema: block_schema(),
        doc: Some(Document {
            children: vec![Node::paragraph("ab"), Node::paragraph("cd")],
        }),
        selection: Some(Selection::caret(TextPos::new(vec![0], 2))),
        plugins: vec![base_keymap()],
    });
    let state = state.apply(dispatch_key(&state, "Delete").unwrap());
    assert_eq!(state.doc().children, vec![Node::paragraph("abcd")]);
    assert_eq!(
        state.selection(),
        &Selection::caret(TextPos::new(vec![0], 2))
    );
}

#[test]
fn backspace_across_a_range_deletes_it() {
    let state = EditorState::create(StateConfig {
        schema: block_schema(),
        doc: Some(Document {
            children: vec![Node::paragraph("one"), Node::paragraph("two")],
        }),
        selection: Some(Selection::Text {
            anchor: TextPos::new(vec![0], 2),
            head: TextPos::new(vec![1], 1),
        }),
        plugins: vec![base_keymap()],
    });
    let state = state.apply(dispatch_key(&state, "Backspace").unwrap());
    assert_eq!(state.doc().children, vec![Node::paragraph("onwo")]);
    assert_eq!(
        state.selection(),
        &Selection::caret(TextPos::new(vec![0], 2))
    );
}
