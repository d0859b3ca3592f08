//! In-memory element tree implementing [`Dom`].
//!
//! Used as a test fixture: build the static markup with [`MemoryDom::append`],
//! run renderers against it, then inspect the tree or [`MemoryDom::snapshot`]
//! it. Events (clicks, scrolls, intersections, end of parsing) are dispatched
//! explicitly by the test.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::rc::Rc;

use super::{Dom, IntersectionOptions};
use crate::error::DomError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
enum Content {
    Empty,
    Text(String),
    Html(String),
}

#[derive(Debug)]
struct NodeData {
    tag: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    content: Content,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    offset_top: f64,
    styleable: bool,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            content: Content::Empty,
            children: Vec::new(),
            parent: None,
            offset_top: 0.0,
            styleable: true,
        }
    }
}

struct Observer {
    targets: Vec<NodeId>,
    options: IntersectionOptions,
    callback: Rc<dyn Fn(&NodeId)>,
}

struct State {
    nodes: Vec<NodeData>,
    scroll_y: f64,
    scroll_requests: Vec<f64>,
    click_handlers: HashMap<NodeId, Vec<Rc<dyn Fn()>>>,
    scroll_handlers: Vec<Rc<dyn Fn()>>,
    observers: Vec<Observer>,
    loading: bool,
    ready_handlers: Vec<Box<dyn FnOnce()>>,
}

pub struct MemoryDom {
    state: RefCell<State>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// An empty, fully parsed document with a `body` root.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                nodes: vec![NodeData::new("body")],
                scroll_y: 0.0,
                scroll_requests: Vec::new(),
                click_handlers: HashMap::new(),
                scroll_handlers: Vec::new(),
                observers: Vec::new(),
                loading: false,
                ready_handlers: Vec::new(),
            }),
        }
    }

    /// A document still being parsed; `when_ready` handlers wait for
    /// [`MemoryDom::finish_loading`].
    pub fn loading() -> Self {
        let dom = Self::new();
        dom.state.borrow_mut().loading = true;
        dom
    }

    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    /// Creates an element with `attributes` and attaches it under `parent`.
    pub fn append(&self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let mut state = self.state.borrow_mut();
        let id = NodeId(state.nodes.len());
        let mut data = NodeData::new(tag);
        for (name, value) in attributes {
            data.attributes.insert(name.to_string(), value.to_string());
        }
        data.parent = Some(parent);
        state.nodes.push(data);
        state.nodes[parent.0].children.push(id);
        id
    }

    /// Like [`MemoryDom::append`] with initial text content.
    pub fn append_text(
        &self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> NodeId {
        let id = self.append(parent, tag, attributes);
        self.state.borrow_mut().nodes[id.0].content = Content::Text(text.to_string());
        id
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.state.borrow().nodes[node.0].tag.clone()
    }

    /// Text set through `set_text_content`, if that is the node's content.
    pub fn text(&self, node: NodeId) -> Option<String> {
        match &self.state.borrow().nodes[node.0].content {
            Content::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Markup set through `set_inner_html`, if that is the node's content.
    pub fn inner_html(&self, node: NodeId) -> Option<String> {
        match &self.state.borrow().nodes[node.0].content {
            Content::Html(markup) => Some(markup.clone()),
            _ => None,
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.state.borrow().nodes[node.0].styles.get(property).cloned()
    }

    /// Makes `set_style` fail on `node`, like an element without inline style.
    pub fn refuse_styles(&self, node: NodeId) {
        self.state.borrow_mut().nodes[node.0].styleable = false;
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.state.borrow().nodes[node.0].parent
    }

    pub fn set_offset_top(&self, node: NodeId, top: f64) {
        self.state.borrow_mut().nodes[node.0].offset_top = top;
    }

    /// Targets of every smooth scroll requested so far.
    pub fn scroll_requests(&self) -> Vec<f64> {
        self.state.borrow().scroll_requests.clone()
    }

    /// Dispatches a click. Returns whether default navigation was prevented,
    /// which is the case for any node with a registered listener.
    pub fn click(&self, node: NodeId) -> bool {
        let handlers = self
            .state
            .borrow()
            .click_handlers
            .get(&node)
            .cloned()
            .unwrap_or_default();
        for handler in &handlers {
            handler();
        }
        !handlers.is_empty()
    }

    pub fn click_listener_count(&self, node: NodeId) -> usize {
        self.state
            .borrow()
            .click_handlers
            .get(&node)
            .map(Vec::len)
            .unwrap_or_default()
    }

    /// Moves the viewport and dispatches a scroll event.
    pub fn scroll_window(&self, y: f64) {
        let handlers = {
            let mut state = self.state.borrow_mut();
            state.scroll_y = y;
            state.scroll_handlers.clone()
        };
        for handler in &handlers {
            handler();
        }
    }

    /// Nodes currently watched by some intersection observer.
    pub fn observed(&self) -> Vec<NodeId> {
        self.state
            .borrow()
            .observers
            .iter()
            .flat_map(|observer| observer.targets.iter().copied())
            .collect()
    }

    pub fn observer_options(&self) -> Vec<IntersectionOptions> {
        self.state
            .borrow()
            .observers
            .iter()
            .map(|observer| observer.options.clone())
            .collect()
    }

    /// Reports `node` as visible to every observer watching it; each observer
    /// stops watching it afterwards.
    pub fn intersect(&self, node: NodeId) {
        let callbacks: Vec<Rc<dyn Fn(&NodeId)>> = {
            let mut state = self.state.borrow_mut();
            state
                .observers
                .iter_mut()
                .filter_map(|observer| {
                    let position = observer.targets.iter().position(|t| *t == node)?;
                    observer.targets.remove(position);
                    Some(Rc::clone(&observer.callback))
                })
                .collect()
        };
        for callback in callbacks {
            callback(&node);
        }
    }

    /// Marks parsing as finished and runs the queued `when_ready` handlers.
    pub fn finish_loading(&self) {
        let handlers = {
            let mut state = self.state.borrow_mut();
            state.loading = false;
            std::mem::take(&mut state.ready_handlers)
        };
        for handler in handlers {
            handler();
        }
    }

    /// Deterministic markup rendering of the attached tree.
    pub fn snapshot(&self) -> String {
        let state = self.state.borrow();
        let mut out = String::new();
        write_node(&state, self.body(), &mut out);
        out
    }

    fn descendants(state: &State, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = state.nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(state.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    fn select(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selectors) = selector::parse_list(selector) else {
            return Vec::new();
        };
        let state = self.state.borrow();
        Self::descendants(&state, scope)
            .into_iter()
            .filter(|node| selectors.iter().any(|s| s.matches(&state, *node)))
            .collect()
    }

    fn detach(state: &mut State, node: NodeId) {
        if let Some(parent) = state.nodes[node.0].parent.take() {
            state.nodes[parent.0].children.retain(|child| *child != node);
        }
    }

    fn clear_children(state: &mut State, node: NodeId) {
        for child in std::mem::take(&mut state.nodes[node.0].children) {
            state.nodes[child.0].parent = None;
        }
    }
}

fn write_node(state: &State, node: NodeId, out: &mut String) {
    let data = &state.nodes[node.0];
    let _ = write!(out, "<{}", data.tag);
    for (name, value) in &data.attributes {
        let _ = write!(out, " {}=\"{}\"", name, value);
    }
    if !data.styles.is_empty() {
        let style: Vec<String> = data
            .styles
            .iter()
            .map(|(property, value)| format!("{}: {}", property, value))
            .collect();
        let _ = write!(out, " style=\"{}\"", style.join("; "));
    }
    out.push('>');
    match &data.content {
        Content::Empty => {}
        Content::Text(text) => out.push_str(text),
        Content::Html(markup) => out.push_str(markup),
    }
    for child in &data.children {
        write_node(state, *child, out);
    }
    let _ = write!(out, "</{}>", data.tag);
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let state = self.state.borrow();
        Self::descendants(&state, self.body())
            .into_iter()
            .find(|node| state.nodes[node.0].attributes.get("id").map(String::as_str) == Some(id))
    }

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.select(self.body(), selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.select(self.body(), selector)
    }

    fn query_selector_all_in(&self, scope: &NodeId, selector: &str) -> Vec<NodeId> {
        self.select(*scope, selector)
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        let mut state = self.state.borrow_mut();
        let id = NodeId(state.nodes.len());
        state.nodes.push(NodeData::new(tag));
        Ok(id)
    }

    fn set_text_content(&self, node: &NodeId, text: &str) {
        let mut state = self.state.borrow_mut();
        Self::clear_children(&mut state, *node);
        state.nodes[node.0].content = Content::Text(text.to_string());
    }

    fn set_inner_html(&self, node: &NodeId, markup: &str) {
        let mut state = self.state.borrow_mut();
        Self::clear_children(&mut state, *node);
        state.nodes[node.0].content = if markup.is_empty() {
            Content::Empty
        } else {
            Content::Html(markup.to_string())
        };
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.state.borrow().nodes[node.0].attributes.get(name).cloned()
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.state.borrow_mut().nodes[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_class_name(&self, node: &NodeId, class: &str) {
        self.state.borrow_mut().nodes[node.0]
            .attributes
            .insert("class".to_string(), class.to_string());
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) -> Result<(), DomError> {
        let mut state = self.state.borrow_mut();
        let data = &mut state.nodes[node.0];
        if !data.styleable {
            return Err(DomError::NotStyleable);
        }
        data.styles.insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    fn insert_before(
        &self,
        parent: &NodeId,
        child: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), DomError> {
        let mut state = self.state.borrow_mut();
        if let Some(reference) = reference {
            if state.nodes[reference.0].parent != Some(*parent) {
                return Err(DomError::NotAChild);
            }
        }
        Self::detach(&mut state, *child);
        let position = match reference {
            Some(reference) => state.nodes[parent.0]
                .children
                .iter()
                .position(|c| c == reference)
                .ok_or(DomError::NotAChild)?,
            None => state.nodes[parent.0].children.len(),
        };
        state.nodes[parent.0].children.insert(position, *child);
        state.nodes[child.0].parent = Some(*parent);
        Ok(())
    }

    fn remove(&self, node: &NodeId) {
        Self::detach(&mut self.state.borrow_mut(), *node);
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.state.borrow().nodes[node.0].children.clone()
    }

    fn offset_top(&self, node: &NodeId) -> f64 {
        self.state.borrow().nodes[node.0].offset_top
    }

    fn scroll_y(&self) -> f64 {
        self.state.borrow().scroll_y
    }

    fn smooth_scroll_to(&self, top: f64) {
        self.state.borrow_mut().scroll_requests.push(top);
    }

    fn on_click(&self, node: &NodeId, handler: Box<dyn Fn()>) -> Result<(), DomError> {
        self.state
            .borrow_mut()
            .click_handlers
            .entry(*node)
            .or_default()
            .push(Rc::from(handler));
        Ok(())
    }

    fn on_scroll(&self, handler: Box<dyn Fn()>) -> Result<(), DomError> {
        self.state.borrow_mut().scroll_handlers.push(Rc::from(handler));
        Ok(())
    }

    fn observe_intersection(
        &self,
        nodes: &[NodeId],
        options: &IntersectionOptions,
        on_visible: Box<dyn Fn(&NodeId)>,
    ) -> Result<(), DomError> {
        self.state.borrow_mut().observers.push(Observer {
            targets: nodes.to_vec(),
            options: options.clone(),
            callback: Rc::from(on_visible),
        });
        Ok(())
    }

    fn when_ready(&self, handler: Box<dyn FnOnce()>) -> Result<(), DomError> {
        let loading = self.state.borrow().loading;
        if loading {
            self.state.borrow_mut().ready_handlers.push(handler);
        } else {
            handler();
        }
        Ok(())
    }
}

/// The selector subset used by the page: type, `#id`, `.class` and
/// attribute (`[a]`, `[a="v"]`, `[a^="v"]`) compounds, descendant
/// combinators and comma lists.
mod selector {
    use super::{NodeId, State};

    #[derive(Debug, PartialEq)]
    enum AttrOp {
        Exists,
        Equals(String),
        Prefix(String),
    }

    #[derive(Debug, Default, PartialEq)]
    struct Compound {
        tag: Option<String>,
        id: Option<String>,
        classes: Vec<String>,
        attributes: Vec<(String, AttrOp)>,
    }

    impl Compound {
        fn matches(&self, state: &State, node: NodeId) -> bool {
            let data = &state.nodes[node.0];
            if let Some(tag) = &self.tag {
                if *tag != data.tag {
                    return false;
                }
            }
            if let Some(id) = &self.id {
                if data.attributes.get("id") != Some(id) {
                    return false;
                }
            }
            let classes: Vec<&str> = data
                .attributes
                .get("class")
                .map(|c| c.split_whitespace().collect())
                .unwrap_or_default();
            if !self.classes.iter().all(|c| classes.contains(&c.as_str())) {
                return false;
            }
            self.attributes.iter().all(|(name, op)| {
                let value = data.attributes.get(name);
                match (op, value) {
                    (_, None) => false,
                    (AttrOp::Exists, Some(_)) => true,
                    (AttrOp::Equals(expected), Some(v)) => v == expected,
                    (AttrOp::Prefix(prefix), Some(v)) => v.starts_with(prefix.as_str()),
                }
            })
        }
    }

    /// Descendant chain, outermost first.
    #[derive(Debug, PartialEq)]
    pub(super) struct Selector(Vec<Compound>);

    impl Selector {
        pub(super) fn matches(&self, state: &State, node: NodeId) -> bool {
            let Some((last, ancestors)) = self.0.split_last() else {
                return false;
            };
            if !last.matches(state, node) {
                return false;
            }
            let mut pending = ancestors.iter().rev().peekable();
            let mut current = state.nodes[node.0].parent;
            while let Some(compound) = pending.peek() {
                let Some(ancestor) = current else {
                    return false;
                };
                if compound.matches(state, ancestor) {
                    pending.next();
                }
                current = state.nodes[ancestor.0].parent;
            }
            true
        }
    }

    pub(super) fn parse_list(input: &str) -> Option<Vec<Selector>> {
        input.split(',').map(parse_selector).collect()
    }

    fn parse_selector(input: &str) -> Option<Selector> {
        let parts: Vec<Compound> = split_compounds(input)?
            .into_iter()
            .map(parse_compound)
            .collect::<Option<_>>()?;
        if parts.is_empty() {
            return None;
        }
        Some(Selector(parts))
    }

    /// Splits on whitespace outside of brackets and quotes.
    fn split_compounds(input: &str) -> Option<Vec<&str>> {
        let mut parts = Vec::new();
        let mut start = None;
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        for (i, c) in input.char_indices() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '[') => depth += 1,
                (None, ']') => depth = depth.checked_sub(1)?,
                (None, c) if c.is_whitespace() && depth == 0 => {
                    if let Some(s) = start.take() {
                        parts.push(&input[s..i]);
                    }
                    continue;
                }
                _ => {}
            }
            if start.is_none() {
                start = Some(i);
            }
        }
        if quote.is_some() || depth != 0 {
            return None;
        }
        if let Some(s) = start {
            parts.push(&input[s..]);
        }
        Some(parts)
    }

    fn is_name_char(c: char) -> bool {
        c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
    }

    fn take_identifier(chars: &[char], pos: &mut usize) -> Option<String> {
        let start = *pos;
        while *pos < chars.len() && is_name_char(chars[*pos]) {
            *pos += 1;
        }
        let ident: String = chars[start..*pos].iter().collect();
        let first = ident.chars().next()?;
        if first.is_ascii_digit() {
            return None;
        }
        Some(ident)
    }

    fn parse_compound(input: &str) -> Option<Compound> {
        let chars: Vec<char> = input.chars().collect();
        let mut compound = Compound::default();
        let mut pos = 0;
        if chars.first().map_or(false, |c| is_name_char(*c)) {
            compound.tag = Some(take_identifier(&chars, &mut pos)?.to_ascii_lowercase());
        } else if chars.first() == Some(&'*') {
            pos += 1;
        }
        while pos < chars.len() {
            match chars[pos] {
                '#' => {
                    pos += 1;
                    compound.id = Some(take_identifier(&chars, &mut pos)?);
                }
                '.' => {
                    pos += 1;
                    compound.classes.push(take_identifier(&chars, &mut pos)?);
                }
                '[' => {
                    pos += 1;
                    let end = chars[pos..].iter().position(|c| *c == ']')? + pos;
                    let body: String = chars[pos..end].iter().collect();
                    compound.attributes.push(parse_attribute(&body)?);
                    pos = end + 1;
                }
                _ => return None,
            }
        }
        Some(compound)
    }

    fn parse_attribute(body: &str) -> Option<(String, AttrOp)> {
        let unquote = |raw: &str| -> Option<String> {
            let raw = raw.trim();
            let quoted = raw.len() >= 2
                && ((raw.starts_with('"') && raw.ends_with('"'))
                    || (raw.starts_with('\'') && raw.ends_with('\'')));
            if quoted {
                Some(raw[1..raw.len() - 1].to_string())
            } else if !raw.is_empty() && raw.chars().all(is_name_char) {
                Some(raw.to_string())
            } else {
                None
            }
        };
        let valid_name = |name: &str| !name.is_empty() && name.chars().all(is_name_char);

        if let Some((name, value)) = body.split_once("^=") {
            let name = name.trim();
            if !valid_name(name) {
                return None;
            }
            Some((name.to_string(), AttrOp::Prefix(unquote(value)?)))
        } else if let Some((name, value)) = body.split_once('=') {
            let name = name.trim();
            if !valid_name(name) {
                return None;
            }
            Some((name.to_string(), AttrOp::Equals(unquote(value)?)))
        } else {
            let name = body.trim();
            valid_name(name).then(|| (name.to_string(), AttrOp::Exists))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn parses_compound_with_attribute_prefix() {
            let list = parse_list(r##"a[href^="#"]"##).expect("valid selector");
            assert_eq!(list.len(), 1);
        }

        #[test]
        fn rejects_empty_and_digit_ids() {
            assert!(parse_list("#").is_none());
            assert!(parse_list("#1abc").is_none());
            assert!(parse_list("").is_none());
            assert!(parse_list("a[href").is_none());
        }
    }
}
