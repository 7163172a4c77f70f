use std::collections::{HashMap, HashSet};

use crate::selector::{SelectorPart, parse_selector_groups};
use crate::{Error, Result};

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    layout: Layout,
}

/// Box metrics of a scroll container. Nothing is laid out, so the host sets
/// them explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Layout {
    client_width: f64,
    scroll_width: f64,
    scroll_left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

/// One `scroll_by` request as the page saw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRecord {
    pub node: NodeId,
    pub delta: f64,
    pub from: f64,
    pub to: f64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
    id_index: HashMap<String, NodeId>,
    scroll_log: Vec<ScrollRecord>,
    scroll_log_limit: usize,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
            scroll_log: Vec::new(),
            scroll_log_limit: 10_000,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: HashMap<String, String>,
    ) -> Result<NodeId> {
        if !self.can_have_children(parent) {
            return Err(Error::Dom("parent cannot have children".into()));
        }
        let element = Element {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
            layout: Layout::default(),
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            if !id_attr.is_empty() {
                self.id_index.entry(id_attr).or_insert(id);
            }
        }
        Ok(id)
    }

    pub fn create_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        if !self.can_have_children(parent) {
            return Err(Error::Dom("parent cannot have children".into()));
        }
        Ok(self.create_node(Some(parent), NodeType::Text(text.to_string())))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_or_err(&self, node_id: NodeId, what: &str) -> Result<&Element> {
        self.element(node_id)
            .ok_or_else(|| Error::Dom(format!("{what} target is not an element")))
    }

    fn element_mut_or_err(&mut self, node_id: NodeId, what: &str) -> Result<&mut Element> {
        self.element_mut(node_id)
            .ok_or_else(|| Error::Dom(format!("{what} target is not an element")))
    }

    pub fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0).and_then(|node| node.parent)
    }

    /// Ancestors of `node_id`, nearest first, ending at the document.
    pub fn ancestors(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.parent(current);
        }
        out
    }

    pub fn is_connected(&self, node_id: NodeId) -> bool {
        let mut cursor = Some(node_id);
        while let Some(node) = cursor {
            if node == self.root {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn text_content(&self, node_id: NodeId) -> String {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            match &self.nodes[node_id.0].node_type {
                NodeType::Text(text) => text.clone(),
                _ => {
                    let mut out = String::new();
                    for child in &self.nodes[node_id.0].children {
                        out.push_str(&self.text_content(*child));
                    }
                    out
                }
            }
        })
    }

    pub fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self.element_mut_or_err(node_id, "setAttribute")?;
        element
            .attrs
            .insert(name.to_ascii_lowercase(), value.to_string());
        if name.eq_ignore_ascii_case("id") {
            self.rebuild_id_index();
        }
        Ok(())
    }

    pub fn class_contains(&self, node_id: NodeId, class_name: &str) -> Result<bool> {
        let element = self.element_or_err(node_id, "classList")?;
        Ok(has_class(element, class_name))
    }

    pub fn class_add(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self.element_mut_or_err(node_id, "classList")?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        set_class_attr(element, &classes);
        Ok(())
    }

    pub fn class_remove(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self.element_mut_or_err(node_id, "classList")?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        classes.retain(|name| name != class_name);
        set_class_attr(element, &classes);
        Ok(())
    }

    /// `classList.toggle(name, force)`: the class ends up present iff `force`.
    pub fn class_set(&mut self, node_id: NodeId, class_name: &str, force: bool) -> Result<()> {
        if force {
            self.class_add(node_id, class_name)
        } else {
            self.class_remove(node_id, class_name)
        }
    }

    pub fn style_get(&self, node_id: NodeId, name: &str) -> Result<String> {
        let element = self.element_or_err(node_id, "style")?;
        let name = name.to_ascii_lowercase();
        let decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        Ok(decls
            .iter()
            .find(|(prop, _)| prop == &name)
            .map(|(_, value)| value.clone())
            .unwrap_or_default())
    }

    pub fn style_set(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let element = self.element_mut_or_err(node_id, "style")?;

        let mut decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        if let Some(pos) = decls.iter().position(|(prop, _)| prop == &name) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((name, value.to_string()));
        }

        if decls.is_empty() {
            element.attrs.remove("style");
        } else {
            element
                .attrs
                .insert("style".to_string(), serialize_style_declarations(&decls));
        }

        Ok(())
    }

    pub fn set_layout(&mut self, node_id: NodeId, client_width: f64, scroll_width: f64) -> Result<()> {
        if !(client_width.is_finite() && scroll_width.is_finite())
            || client_width < 0.0
            || scroll_width < 0.0
        {
            return Err(Error::Dom(format!(
                "layout widths must be finite and non-negative (client_width={client_width}, scroll_width={scroll_width})"
            )));
        }
        let element = self.element_mut_or_err(node_id, "layout")?;
        element.layout.client_width = client_width;
        element.layout.scroll_width = scroll_width.max(client_width);
        let max = element.layout.scroll_width - element.layout.client_width;
        element.layout.scroll_left = element.layout.scroll_left.clamp(0.0, max);
        Ok(())
    }

    pub fn client_width(&self, node_id: NodeId) -> Result<f64> {
        Ok(self.element_or_err(node_id, "clientWidth")?.layout.client_width)
    }

    pub fn scroll_width(&self, node_id: NodeId) -> Result<f64> {
        Ok(self.element_or_err(node_id, "scrollWidth")?.layout.scroll_width)
    }

    pub fn scroll_left(&self, node_id: NodeId) -> Result<f64> {
        Ok(self.element_or_err(node_id, "scrollLeft")?.layout.scroll_left)
    }

    /// Scrolls horizontally by `delta`, clamped to the scrollable range, and
    /// returns the new offset. Smooth scrolls land on their final offset at
    /// once.
    pub fn scroll_by(&mut self, node_id: NodeId, delta: f64, behavior: ScrollBehavior) -> Result<f64> {
        let element = self.element_mut_or_err(node_id, "scrollBy")?;
        let layout = &mut element.layout;
        let from = layout.scroll_left;
        let max = (layout.scroll_width - layout.client_width).max(0.0);
        let to = (from + delta).clamp(0.0, max);
        layout.scroll_left = to;
        self.scroll_log.push(ScrollRecord {
            node: node_id,
            delta,
            from,
            to,
            behavior,
        });
        self.trim_scroll_log();
        Ok(to)
    }

    /// Recorded scroll requests, oldest first. Only the most recent
    /// `scroll_log_limit` entries are kept.
    pub fn scroll_log(&self) -> &[ScrollRecord] {
        &self.scroll_log
    }

    pub fn take_scroll_log(&mut self) -> Vec<ScrollRecord> {
        std::mem::take(&mut self.scroll_log)
    }

    pub fn set_scroll_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Dom(
                "scroll log limit requires at least 1 entry".into(),
            ));
        }
        self.scroll_log_limit = max_entries;
        self.trim_scroll_log();
        Ok(())
    }

    fn trim_scroll_log(&mut self) {
        if self.scroll_log.len() > self.scroll_log_limit {
            let excess = self.scroll_log.len() - self.scroll_log_limit;
            self.scroll_log.drain(..excess);
        }
    }

    /// Detaches `node` from its parent. Detached nodes stay addressable.
    pub fn remove_node(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(Error::Dom("cannot remove the document".into()));
        }
        let Some(parent) = self.parent(node) else {
            return Ok(());
        };
        self.nodes[parent.0].children.retain(|child| *child != node);
        self.nodes[node.0].parent = None;
        self.rebuild_id_index();
        Ok(())
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all(selector)?;
        Ok(all.into_iter().next())
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }

        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        Ok(self.filter_matching(ids, &groups))
    }

    pub fn query_selector_from(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all_from(root, selector)?;
        Ok(all.into_iter().next())
    }

    pub fn query_selector_all_from(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        let mut ids = Vec::new();
        for child in &self.nodes[root.0].children {
            self.collect_elements_dfs(*child, &mut ids);
        }
        Ok(self.filter_matching(ids, &groups))
    }

    fn filter_matching(&self, candidates: Vec<NodeId>, groups: &[Vec<SelectorPart>]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for candidate in candidates {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(candidate, steps))
                && seen.insert(candidate)
            {
                matched.push(candidate);
            }
        }
        matched
    }

    fn can_have_children(&self, node_id: NodeId) -> bool {
        matches!(
            self.nodes.get(node_id.0).map(|n| &n.node_type),
            Some(NodeType::Document | NodeType::Element(_))
        )
    }

    fn rebuild_id_index(&mut self) {
        let mut next = HashMap::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if let NodeType::Element(element) = &self.nodes[node.0].node_type {
                if let Some(id) = element.attrs.get("id") {
                    if !id.is_empty() {
                        next.entry(id.clone()).or_insert(node);
                    }
                }
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        self.id_index = next;
    }

    fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
                out.push(node_id);
            }
            for child in &self.nodes[node_id.0].children {
                self.collect_elements_dfs(*child, out);
            }
        })
    }

    pub fn dump_node(&self, node_id: NodeId) -> String {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            match &self.nodes[node_id.0].node_type {
                NodeType::Document => {
                    let mut out = String::new();
                    for child in &self.nodes[node_id.0].children {
                        out.push_str(&self.dump_node(*child));
                    }
                    out
                }
                NodeType::Text(text) => escape_html(text, false),
                NodeType::Element(element) => {
                    let mut out = String::new();
                    out.push('<');
                    out.push_str(&element.tag_name);
                    let mut attrs = element.attrs.iter().collect::<Vec<_>>();
                    attrs.sort();
                    for (k, v) in attrs {
                        out.push(' ');
                        out.push_str(k);
                        out.push_str("=\"");
                        out.push_str(&escape_html(v, true));
                        out.push('"');
                    }
                    out.push('>');
                    for child in &self.nodes[node_id.0].children {
                        out.push_str(&self.dump_node(*child));
                    }
                    out.push_str("</");
                    out.push_str(&element.tag_name);
                    out.push('>');
                    out
                }
            }
        })
    }
}

fn has_class(element: &Element, class_name: &str) -> bool {
    element
        .attrs
        .get("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| {
            value
                .split_whitespace()
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
}

fn set_class_attr(element: &mut Element, classes: &[String]) {
    if classes.is_empty() {
        element.attrs.remove("class");
    } else {
        element.attrs.insert("class".to_string(), classes.join(" "));
    }
}

// Splits on `;` outside of quotes and parentheses so `url("a;b")` survives.
fn parse_style_declarations(style_attr: Option<&str>) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    let Some(style_attr) = style_attr else {
        return out;
    };

    let mut decls = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut paren_depth = 0usize;
    for ch in style_attr.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(ch);
            }
            (Some(_), _) => current.push(ch),
            (None, '"' | '\'') => {
                quote = Some(ch);
                current.push(ch);
            }
            (None, '(') => {
                paren_depth += 1;
                current.push(ch);
            }
            (None, ')') => {
                paren_depth = paren_depth.saturating_sub(1);
                current.push(ch);
            }
            (None, ';') if paren_depth == 0 => decls.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    decls.push(current);

    for decl in decls {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let value = value.trim().to_string();
        if let Some(pos) = out.iter().position(|(existing, _)| existing == &name) {
            out[pos].1 = value;
        } else {
            out.push((name, value));
        }
    }

    out
}

fn serialize_style_declarations(decls: &[(String, String)]) -> String {
    let mut out = String::new();
    for (idx, (name, value)) in decls.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push(';');
    }
    out
}

fn escape_html(value: &str, in_attr: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attr => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(dom: &mut Dom, parent: NodeId, tag: &str, class: &str) -> NodeId {
        let mut attrs = HashMap::new();
        attrs.insert("class".to_string(), class.to_string());
        dom.create_element(parent, tag, attrs).expect("create element")
    }

    #[test]
    fn class_set_adds_and_removes_without_duplicates() -> Result<()> {
        let mut dom = Dom::new();
        let root = dom.root();
        let dot = element(&mut dom, root, "button", "hero-dot");

        dom.class_set(dot, "active", true)?;
        dom.class_set(dot, "active", true)?;
        assert_eq!(dom.attr(dot, "class").as_deref(), Some("hero-dot active"));

        dom.class_set(dot, "active", false)?;
        assert!(!dom.class_contains(dot, "active")?);
        assert!(dom.class_contains(dot, "hero-dot")?);
        Ok(())
    }

    #[test]
    fn style_set_keeps_url_with_semicolon_intact() -> Result<()> {
        let mut dom = Dom::new();
        let root = dom.root();
        let bg = element(&mut dom, root, "div", "hero-bg");

        dom.style_set(bg, "color", "red")?;
        dom.style_set(bg, "background-image", r#"url("/a;b.webp")"#)?;
        assert_eq!(dom.style_get(bg, "background-image")?, r#"url("/a;b.webp")"#);
        assert_eq!(dom.style_get(bg, "color")?, "red");

        dom.style_set(bg, "color", "")?;
        assert_eq!(
            dom.attr(bg, "style").as_deref(),
            Some(r#"background-image: url("/a;b.webp");"#)
        );
        Ok(())
    }

    #[test]
    fn scroll_by_clamps_to_scrollable_range() -> Result<()> {
        let mut dom = Dom::new();
        let root = dom.root();
        let track = element(&mut dom, root, "div", "track");
        dom.set_layout(track, 500.0, 1200.0)?;

        assert_eq!(dom.scroll_by(track, -100.0, ScrollBehavior::Smooth)?, 0.0);
        assert_eq!(dom.scroll_by(track, 400.0, ScrollBehavior::Smooth)?, 400.0);
        assert_eq!(dom.scroll_by(track, 400.0, ScrollBehavior::Smooth)?, 700.0);
        assert_eq!(dom.scroll_by(track, 400.0, ScrollBehavior::Auto)?, 700.0);

        let log = dom.scroll_log();
        assert_eq!(log.len(), 4);
        assert_eq!(log[2].from, 400.0);
        assert_eq!(log[3].behavior, ScrollBehavior::Auto);
        Ok(())
    }

    #[test]
    fn set_layout_rejects_non_finite_widths() -> Result<()> {
        let mut dom = Dom::new();
        let root = dom.root();
        let track = element(&mut dom, root, "div", "track");
        dom.set_layout(track, 500.0, 1200.0)?;
        dom.scroll_by(track, 400.0, ScrollBehavior::Smooth)?;

        for (client, scroll) in [
            (f64::NAN, 100.0),
            (100.0, f64::NAN),
            (f64::INFINITY, f64::INFINITY),
            (500.0, f64::INFINITY),
            (-1.0, 100.0),
        ] {
            assert!(
                matches!(dom.set_layout(track, client, scroll), Err(Error::Dom(_))),
                "expected ({client}, {scroll}) to be rejected"
            );
        }
        assert_eq!(dom.client_width(track)?, 500.0);
        assert_eq!(dom.scroll_left(track)?, 400.0);
        Ok(())
    }

    #[test]
    fn scroll_log_keeps_only_the_most_recent_entries() -> Result<()> {
        let mut dom = Dom::new();
        let root = dom.root();
        let track = element(&mut dom, root, "div", "track");
        dom.set_layout(track, 100.0, 1000.0)?;
        for _ in 0..5 {
            dom.scroll_by(track, 100.0, ScrollBehavior::Smooth)?;
        }
        dom.set_scroll_log_limit(3)?;
        assert_eq!(dom.scroll_log().len(), 3);
        assert_eq!(dom.scroll_log()[0].from, 200.0);

        dom.scroll_by(track, 100.0, ScrollBehavior::Smooth)?;
        assert_eq!(dom.scroll_log().len(), 3);
        assert_eq!(dom.scroll_log()[2].to, 600.0);

        let taken = dom.take_scroll_log();
        assert_eq!(taken.len(), 3);
        assert!(dom.scroll_log().is_empty());
        assert!(dom.set_scroll_log_limit(0).is_err());
        Ok(())
    }

    #[test]
    fn dump_node_escapes_text_and_attribute_values() -> Result<()> {
        let mut dom = Dom::new();
        let root = dom.root();
        let mut attrs = HashMap::new();
        attrs.insert("title".to_string(), r#"say "hi" & <go>"#.to_string());
        let button = dom.create_element(root, "button", attrs)?;
        dom.create_text(button, "< & >")?;
        assert_eq!(
            dom.dump_node(button),
            r#"<button title="say &quot;hi&quot; &amp; &lt;go&gt;">&lt; &amp; &gt;</button>"#
        );
        assert_eq!(dom.text_content(button), "< & >");
        Ok(())
    }

    #[test]
    fn remove_node_detaches_and_drops_id_index() -> Result<()> {
        let mut dom = Dom::new();
        let root = dom.root();
        let mut attrs = HashMap::new();
        attrs.insert("id".to_string(), "flash".to_string());
        let alert = dom.create_element(root, "div", attrs)?;
        assert_eq!(dom.by_id("flash"), Some(alert));

        dom.remove_node(alert)?;
        assert!(!dom.is_connected(alert));
        assert_eq!(dom.by_id("flash"), None);
        assert_eq!(dom.query_selector("div")?, None);

        dom.remove_node(alert)?;
        assert!(dom.remove_node(root).is_err());
        Ok(())
    }

    #[test]
    fn text_nodes_reject_class_operations() {
        let mut dom = Dom::new();
        let root = dom.root();
        let text = dom.create_text(root, "hello").expect("create text");
        assert!(matches!(dom.class_add(text, "x"), Err(Error::Dom(_))));
        assert!(dom.create_text(text, "nested").is_err());
    }

    #[test]
    fn truncate_chars_appends_ellipsis_only_when_cut() {
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abcd", 3), "abc...");
    }
}
