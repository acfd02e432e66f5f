use super::{Element, Surface, ROOT_ID};
use anyhow::{Context, Result};
use log::trace;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<usize>,
}

/// Id-indexed element tree serialized to an SVG document on `present`.
/// The output file is replaced atomically so consumers only ever see
/// complete frames.
pub struct SvgSurface {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    title: String,
    out_path: PathBuf,
    dirty: bool,
}

impl SvgSurface {
    pub fn new(out_path: PathBuf, title: &str, width: f32, height: f32) -> Self {
        let root = Node {
            tag: "svg".to_string(),
            attrs: vec![
                ("xmlns".to_string(), "http://www.w3.org/2000/svg".to_string()),
                ("id".to_string(), ROOT_ID.to_string()),
                ("viewBox".to_string(), format!("0 0 {width} {height}")),
                ("width".to_string(), width.to_string()),
                ("height".to_string(), height.to_string()),
            ],
            text: None,
            children: Vec::new(),
        };

        let mut index = HashMap::new();
        index.insert(ROOT_ID.to_string(), 0);

        Self {
            nodes: vec![root],
            index,
            title: title.to_string(),
            out_path,
            dirty: true,
        }
    }

    fn lookup(&self, id: &str) -> Option<usize> {
        let found = self.index.get(id).copied();
        if found.is_none() {
            trace!("no element with id {id:?}, skipping");
        }
        found
    }

    fn insert(&mut self, parent: usize, element: Element) {
        let Element { tag, attrs, text, children } = element;

        let idx = self.nodes.len();
        if let Some((_, id)) = attrs.iter().find(|(name, _)| name == "id") {
            self.index.insert(id.clone(), idx);
        }
        self.nodes.push(Node { tag, attrs, text, children: Vec::new() });
        self.nodes[parent].children.push(idx);

        for child in children {
            self.insert(idx, child);
        }
    }

    pub fn attr(&self, id: &str, name: &str) -> Option<&str> {
        let node = &self.nodes[*self.index.get(id)?];
        let (_, value) = node.attrs.iter().find(|(n, _)| n == name)?;
        Some(value)
    }

    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.nodes[*self.index.get(id)?].text.as_deref()
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.attr(id, "visibility") != Some("hidden")
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(4096);
        self.write_node(0, 0, &mut out);
        out
    }

    fn write_node(&self, idx: usize, depth: usize, out: &mut String) {
        let node = &self.nodes[idx];
        let pad = "  ".repeat(depth);

        let _ = write!(out, "{pad}<{}", node.tag);
        for (name, value) in &node.attrs {
            let _ = write!(out, " {name}=\"");
            escape_into(value, out);
            out.push('"');
        }

        let has_title = idx == 0;
        if node.children.is_empty() && node.text.is_none() && !has_title {
            out.push_str("/>\n");
            return;
        }
        out.push('>');

        if let Some(text) = &node.text {
            escape_into(text, out);
        }
        if has_title {
            let _ = write!(out, "\n{pad}  <title>");
            escape_into(&self.title, out);
            out.push_str("</title>\n");
        } else if !node.children.is_empty() {
            out.push('\n');
        }
        for &child in &node.children {
            self.write_node(child, depth + 1, out);
        }
        if !node.children.is_empty() || has_title {
            let _ = write!(out, "{pad}");
        }
        let _ = write!(out, "</{}>\n", node.tag);
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

impl Surface for SvgSurface {
    fn append(&mut self, parent_id: &str, element: Element) {
        if let Some(parent) = self.lookup(parent_id) {
            self.insert(parent, element);
            self.dirty = true;
        }
    }

    fn set_text(&mut self, id: &str, text: &str) {
        if let Some(idx) = self.lookup(id) {
            let node = &mut self.nodes[idx];
            if node.text.as_deref() != Some(text) {
                node.text = Some(text.to_string());
                self.dirty = true;
            }
        }
    }

    fn set_attr(&mut self, id: &str, name: &str, value: &str) {
        if let Some(idx) = self.lookup(id) {
            let node = &mut self.nodes[idx];
            match node.attrs.iter_mut().find(|(n, _)| n == name) {
                Some((_, current)) => {
                    if current != value {
                        *current = value.to_string();
                        self.dirty = true;
                    }
                }
                None => {
                    node.attrs.push((name.to_string(), value.to_string()));
                    self.dirty = true;
                }
            }
        }
    }

    fn set_title(&mut self, title: &str) {
        if self.title != title {
            self.title = title.to_string();
            self.dirty = true;
        }
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn present(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(dir) = self.out_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let tmp = self.out_path.with_extension("svg.tmp");
        fs::write(&tmp, self.to_svg())
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.out_path)
            .with_context(|| format!("replacing {}", self.out_path.display()))?;

        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> SvgSurface {
        SvgSurface::new(PathBuf::from("unused.svg"), "cadran", 200.0, 200.0)
    }

    #[test]
    fn append_and_mutate_by_id() {
        let mut s = surface();
        s.append(ROOT_ID, Element::new("g").id("hands").child(
            Element::new("line").id("second-hand").attr("x1", 100).attr("y1", 100),
        ));

        s.set_attr("second-hand", "transform", "rotate(180.0 100 100)");
        assert_eq!(s.attr("second-hand", "transform"), Some("rotate(180.0 100 100)"));

        s.set_text("second-hand", "x");
        assert_eq!(s.text_of("second-hand"), Some("x"));
    }

    #[test]
    fn unchanged_writes_do_not_dirty() {
        let mut s = surface();
        s.append(ROOT_ID, Element::new("text").id("time-str").text("00:00"));
        s.dirty = false;

        s.set_text("time-str", "00:00");
        assert!(!s.dirty);
        s.set_attr(ROOT_ID, "width", "200");
        assert!(!s.dirty);

        s.set_text("time-str", "00:01");
        assert!(s.dirty);
    }

    #[test]
    fn missing_ids_are_skipped() {
        let mut s = surface();
        s.dirty = false;
        s.set_text("nope", "x");
        s.set_attr("nope", "width", "1");
        s.append("nope", Element::new("g"));
        assert!(!s.dirty);
    }

    #[test]
    fn visibility_defaults_to_visible() {
        let mut s = surface();
        s.append(ROOT_ID, Element::new("rect").id("p1"));
        assert!(s.is_visible("p1"));
        s.set_visible("p1", false);
        assert!(!s.is_visible("p1"));
        s.set_visible("p1", true);
        assert!(s.is_visible("p1"));
    }

    #[test]
    fn serializes_escaped_document_with_title() {
        let mut s = surface();
        s.set_title("a<b & \"c\"");
        s.append(ROOT_ID, Element::new("text").id("t").text("5 > 4"));

        let svg = s.to_svg();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" id=\"clock\""));
        assert!(svg.contains("<title>a&lt;b &amp; &quot;c&quot;</title>"));
        assert!(svg.contains("<text id=\"t\">5 &gt; 4</text>"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn present_replaces_file_and_clears_dirty() {
        let path = std::env::temp_dir().join(format!("cadran-test-{}.svg", std::process::id()));
        let mut s = SvgSurface::new(path.clone(), "cadran", 200.0, 200.0);
        s.append(ROOT_ID, Element::new("g").id("markers"));

        s.present().unwrap();
        assert!(!s.dirty);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("<g id=\"markers\"/>"));
        fs::remove_file(&path).unwrap();
    }
}
