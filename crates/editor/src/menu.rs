use std::sync::Arc;

use prose_engine::{Command, EditorState, EditorView, Element, EventResult, Plugin, PluginView};

pub const MENU_BAR_CLASS: &str = "sp__menu__bar";
pub const MENU_ITEM_CLASS: &str = "sp__menu__item";

/// Icon alternatives for a menu item, tried in priority order: material
/// ligature, inline svg, image url, plain text. Empty strings count as
/// absent.
#[derive(Debug, Clone, Default)]
pub struct MenuIcon {
    pub material: Option<String>,
    pub svg: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
}

#[derive(Clone)]
pub struct MenuEntry {
    pub command: Arc<dyn Command>,
    pub icon: MenuIcon,
    pub label: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

struct MenuItem {
    entry: MenuEntry,
    dom: Element,
}

impl MenuItem {
    fn new(entry: MenuEntry) -> MenuItem {
        let dom = Element::create("div");
        dom.add_class(MENU_ITEM_CLASS);
        dom.set_data("label", &entry.label);
        if let Some(material) = non_empty(&entry.icon.material) {
            let icon = Element::create("span");
            icon.add_class("material-icons");
            icon.set_text(material);
            dom.append_child(&icon);
        } else if let Some(svg) = non_empty(&entry.icon.svg) {
            dom.set_markup(svg);
        } else if let Some(url) = non_empty(&entry.icon.url) {
            let img = Element::create("img");
            img.set_attr("src", url);
            img.set_attr("alt", &entry.label);
            dom.append_child(&img);
        } else {
            dom.set_text(non_empty(&entry.icon.text).unwrap_or(""));
        }
        MenuItem { entry, dom }
    }
}

/// Toolbar mounted before the editing surface. Item visibility tracks each
/// command's `can_apply` on every state change; a click runs the first item
/// containing the target and refocuses the surface, and exactly that one
/// command fires.
pub struct MenuView {
    dom: Element,
    items: Vec<MenuItem>,
}

impl MenuView {
    pub fn new(entries: Vec<MenuEntry>, view: &EditorView) -> MenuView {
        let dom = Element::create("div");
        dom.add_class(MENU_BAR_CLASS);
        let items: Vec<MenuItem> = entries.into_iter().map(MenuItem::new).collect();
        for item in &items {
            dom.append_child(&item.dom);
        }
        view.container().insert_before(&dom, view.surface());
        let menu = MenuView { dom, items };
        menu.refresh(view.state());
        menu
    }

    pub fn dom(&self) -> &Element {
        &self.dom
    }

    fn refresh(&self, state: &EditorState) {
        for item in &self.items {
            if item.entry.command.can_apply(state) {
                item.dom.set_display(None);
            } else {
                item.dom.set_display(Some("none"));
            }
        }
    }
}

impl PluginView for MenuView {
    fn update(&mut self, view: &EditorView, _prev: &EditorState) {
        self.refresh(view.state());
    }

    fn on_mousedown(&mut self, view: &EditorView, target: &Element) -> EventResult {
        if !self.dom.contains(target) {
            return EventResult::Ignored;
        }
        // hand focus back before the command runs, like a native toolbar
        view.surface().focus();
        for item in &self.items {
            if !item.dom.contains(target) {
                continue;
            }
            return EventResult::Handled(item.entry.command.apply(view.state()));
        }
        EventResult::Handled(None)
    }

    fn destroy(&mut self) {
        self.dom.remove();
    }
}

pub fn menu_plugin(entries: Vec<MenuEntry>) -> Plugin {
    Plugin::new("menu").with_view(move |view| Box::new(MenuView::new(entries.clone(), view)))
}
