pub mod caps;
pub mod svg;

use anyhow::Result;
use std::fmt::Display;

/// Id of the root element every face builds into.
pub const ROOT_ID: &str = "clock";

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Tick,
    VisibilityChanged(bool),
    Resized { width: f32, height: f32 },
    PointerMoved { x: f32, y: f32 },
    KeyPressed(char),
    DoubleClick,
}

/// A node to be appended to the surface tree. Built with the chained
/// constructors, consumed by `Surface::append`.
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) text: Option<String>,
    pub(crate) children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn attr(mut self, name: &str, value: impl Display) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}

/// The graphical surface the renderers draw onto: a tree of elements keyed
/// by stable string ids. Writes to unknown ids are skipped silently, and
/// writes that would not change anything are no-ops.
pub trait Surface {
    fn append(&mut self, parent_id: &str, element: Element);
    fn set_text(&mut self, id: &str, text: &str);
    fn set_attr(&mut self, id: &str, name: &str, value: &str);
    fn set_title(&mut self, title: &str);
    fn title(&self) -> String;
    fn present(&mut self) -> Result<()>;

    fn set_visible(&mut self, id: &str, visible: bool) {
        let value = if visible { "visible" } else { "hidden" };
        self.set_attr(id, "visibility", value);
    }
}
