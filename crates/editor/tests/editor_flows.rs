use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use prose_engine::Element;
use simple_prose::{
    EditorOptions, HtmlEditor, MarkdownEditor, StrongExtension, MENU_ITEM_CLASS,
};

fn strong_options() -> EditorOptions {
    EditorOptions {
        extensions: vec![Arc::new(StrongExtension::new())],
        plugins: Vec::new(),
    }
}

fn type_text(editor: &mut HtmlEditor, text: &str) {
    for ch in text.chars() {
        editor.input_text(&ch.to_string());
    }
}

#[test]
fn typing_markdown_shorthand_creates_strong_text() {
    let mut editor = HtmlEditor::new(Element::create("div"), strong_options()).unwrap();
    assert_eq!(editor.language(), "html");
    assert_eq!(editor.value(), "<p></p>");

    type_text(&mut editor, "**hi**x");
    assert_eq!(editor.value(), "<p><strong>hi</strong>x</p>");

    // the rule cleared the stored mark, so typing stays plain
    editor.input_text("y");
    assert_eq!(editor.value(), "<p><strong>hi</strong>xy</p>");
}

#[test]
fn mod_b_toggles_the_stored_mark_for_typing() {
    let mut editor = HtmlEditor::new(Element::create("div"), strong_options()).unwrap();

    assert!(editor.key_down("Mod-b"));
    type_text(&mut editor, "hi");
    assert_eq!(editor.value(), "<p><strong>hi</strong></p>");

    assert!(editor.key_down("Mod-b"));
    editor.input_text("!");
    assert_eq!(editor.value(), "<p><strong>hi</strong>!</p>");
}

#[test]
fn undo_and_redo_ride_the_default_keymap() {
    let mut editor = HtmlEditor::new(Element::create("div"), strong_options()).unwrap();
    type_text(&mut editor, "abc");
    assert_eq!(editor.value(), "<p>abc</p>");

    assert!(editor.key_down("Mod-z"));
    assert!(editor.key_down("Mod-z"));
    assert_eq!(editor.value(), "<p>a</p>");

    assert!(editor.key_down("Mod-y"));
    assert_eq!(editor.value(), "<p>ab</p>");
}

#[test]
fn update_listeners_observe_each_dispatch() {
    let mut editor = HtmlEditor::new(Element::create("div"), strong_options()).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));

    let first = Rc::clone(&log);
    let second = Rc::clone(&log);
    editor
        .on_update(move |ed| first.borrow_mut().push(format!("first:{}", ed.value())))
        .on_update(move |ed| second.borrow_mut().push(format!("second:{}", ed.value())));

    editor.input_text("a");
    editor.input_text("b");
    assert_eq!(
        *log.borrow(),
        vec![
            "first:<p>a</p>",
            "second:<p>a</p>",
            "first:<p>ab</p>",
            "second:<p>ab</p>",
        ]
    );
}

#[test]
fn the_markdown_editor_serializes_delimiters() {
    let mut editor = MarkdownEditor::new(Element::create("div"), strong_options()).unwrap();
    assert_eq!(editor.language(), "markdown");

    for ch in "**hi**x".chars() {
        editor.input_text(&ch.to_string());
    }
    assert_eq!(editor.value(), "**hi**x");

    assert!(editor.key_down("Enter"));
    for ch in "two".chars() {
        editor.input_text(&ch.to_string());
    }
    assert_eq!(editor.value(), "**hi**x\n\ntwo");
}

#[test]
fn menu_clicks_dispatch_through_the_editor() {
    let container = Element::create("div");
    let mut editor = HtmlEditor::new(container.clone(), strong_options()).unwrap();

    let item = container.find_by_class(MENU_ITEM_CLASS).unwrap();
    editor.mousedown(&item);
    assert!(editor.view().surface().is_focused());

    editor.input_text("z");
    assert_eq!(editor.value(), "<p><strong>z</strong></p>");
}

#[test]
fn the_default_pipeline_wraps_extension_plugins() {
    let editor = HtmlEditor::new(Element::create("div"), strong_options()).unwrap();
    let names: Vec<&str> = editor.state().plugins().iter().map(|p| p.name()).collect();
    assert_eq!(
        names,
        vec![
            "history",
            "keymap:base",
            "keymap:history",
            "keymap:Strong",
            "menu",
            "input_rules",
        ]
    );
}
