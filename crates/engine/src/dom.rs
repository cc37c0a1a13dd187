use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// A retained element tree standing in for the host page's DOM. Handles are
/// cheap clones sharing one node; parent links are weak, so dropping the
/// root drops the tree.
#[derive(Clone)]
pub struct Element {
    inner: Rc<RefCell<ElementInner>>,
}

struct ElementInner {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    dataset: BTreeMap<String, String>,
    text: String,
    markup: String,
    display: Option<String>,
    focused: bool,
    children: Vec<Element>,
    parent: Option<Weak<RefCell<ElementInner>>>,
}

impl Element {
    pub fn create(tag: impl Into<String>) -> Element {
        Element {
            inner: Rc::new(RefCell::new(ElementInner {
                tag: tag.into(),
                classes: Vec::new(),
                attrs: BTreeMap::new(),
                dataset: BTreeMap::new(),
                text: String::new(),
                markup: String::new(),
                display: None,
                focused: false,
                children: Vec::new(),
                parent: None,
            })),
        }
    }

    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    pub fn add_class(&self, class: &str) {
        let mut inner = self.inner.borrow_mut();
        if !inner.classes.iter().any(|c| c == class) {
            inner.classes.push(class.to_string());
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.inner.borrow().classes.iter().any(|c| c == class)
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        self.inner
            .borrow_mut()
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.inner.borrow().attrs.get(name).cloned()
    }

    pub fn set_data(&self, key: &str, value: &str) {
        self.inner
            .borrow_mut()
            .dataset
            .insert(key.to_string(), value.to_string());
    }

    pub fn data(&self, key: &str) -> Option<String> {
        self.inner.borrow().dataset.get(key).cloned()
    }

    pub fn set_text(&self, text: &str) {
        self.inner.borrow_mut().text = text.to_string();
    }

    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    pub fn set_markup(&self, markup: &str) {
        self.inner.borrow_mut().markup = markup.to_string();
    }

    pub fn markup(&self) -> String {
        self.inner.borrow().markup.clone()
    }

    /// `None` restores the stylesheet default; `Some("none")` hides.
    pub fn set_display(&self, display: Option<&str>) {
        self.inner.borrow_mut().display = display.map(str::to_string);
    }

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().display.as_deref() != Some("none")
    }

    pub fn focus(&self) {
        self.inner.borrow_mut().focused = true;
    }

    pub fn blur(&self) {
        self.inner.borrow_mut().focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.inner.borrow().focused
    }

    pub fn same_node(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn append_child(&self, child: &Element) {
        if self.same_node(child) {
            return;
        }
        child.remove();
        child.inner.borrow_mut().parent = Some(Rc::downgrade(&self.inner));
        self.inner.borrow_mut().children.push(child.clone());
    }

    /// Inserts `new` before `reference` among this element's children,
    /// appending when the reference is not a child.
    pub fn insert_before(&self, new: &Element, reference: &Element) {
        if self.same_node(new) {
            return;
        }
        new.remove();
        new.inner.borrow_mut().parent = Some(Rc::downgrade(&self.inner));
        let mut inner = self.inner.borrow_mut();
        let at = inner
            .children
            .iter()
            .position(|c| c.same_node(reference))
            .unwrap_or(inner.children.len());
        inner.children.insert(at, new.clone());
    }

    /// Detaches this element from its parent, if any.
    pub fn remove(&self) {
        let parent = self.inner.borrow_mut().parent.take();
        let Some(parent) = parent.and_then(|weak| weak.upgrade()) else {
            return;
        };
        parent
            .borrow_mut()
            .children
            .retain(|c| !Rc::ptr_eq(&c.inner, &self.inner));
    }

    pub fn parent(&self) -> Option<Element> {
        self.inner
            .borrow()
            .parent
            .as_ref()?
            .upgrade()
            .map(|inner| Element { inner })
    }

    pub fn children(&self) -> Vec<Element> {
        self.inner.borrow().children.clone()
    }

    pub fn contains(&self, other: &Element) -> bool {
        if self.same_node(other) {
            return true;
        }
        let mut cursor = other.parent();
        while let Some(node) = cursor {
            if node.same_node(self) {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    pub fn find_by_class(&self, class: &str) -> Option<Element> {
        if self.has_class(class) {
            return Some(self.clone());
        }
        for child in self.children() {
            if let Some(found) = child.find_by_class(class) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_all_by_class(&self, class: &str) -> Vec<Element> {
        let mut out = Vec::new();
        if self.has_class(class) {
            out.push(self.clone());
        }
        for child in self.children() {
            out.extend(child.find_all_by_class(class));
        }
        out
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Element")
            .field("tag", &inner.tag)
            .field("classes", &inner.classes)
            .field("children", &inner.children.len())
            .finish()
    }
}
