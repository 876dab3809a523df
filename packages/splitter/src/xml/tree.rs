//! Owned, mutable XML tree.
//!
//! Parsers produce a `Document`; records are moved between documents by
//! value, so a record always belongs to exactly one tree.

/// Position of a node as child indices, starting below the root element.
///
/// An empty path addresses the root element itself.
pub type NodePath = Vec<usize>;

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction { target: String, content: String },
}

impl Node {
    /// Check if this node carries character data (text or CDATA).
    #[must_use]
    pub fn is_character_data(&self) -> bool {
        matches!(self, Self::Text(_) | Self::CData(_))
    }

    /// The element, if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// The element, if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// An element with its attributes and children in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name, including any prefix.
    pub name: String,

    /// Attributes in document order, including namespace declarations.
    pub attributes: Vec<(String, String)>,

    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child node.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Add a text child.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    /// Append a text run, merging it with a preceding text node.
    pub fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    /// Iterate over element children.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Check if any direct child is text or CDATA.
    #[must_use]
    pub fn has_character_data(&self) -> bool {
        self.children.iter().any(Node::is_character_data)
    }

    /// Concatenated text of the direct text and CDATA children.
    ///
    /// Returns `None` when the element has no character data at all.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let mut text: Option<String> = None;
        for child in &self.children {
            if let Node::Text(t) | Node::CData(t) = child {
                text.get_or_insert_with(String::new).push_str(t);
            }
        }
        text
    }

    /// Replace the character data of this element with a single CDATA section.
    ///
    /// The section takes the place of the first text run; other children
    /// are kept in order.
    pub fn set_cdata(&mut self, content: impl Into<String>) {
        let position = self
            .children
            .iter()
            .position(Node::is_character_data)
            .unwrap_or(0);
        self.children.retain(|child| !child.is_character_data());
        let position = position.min(self.children.len());
        self.children.insert(position, Node::CData(content.into()));
    }

    /// Get the element at `path` below this element.
    #[must_use]
    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &index in path {
            current = current.children.get(index)?.as_element()?;
        }
        Some(current)
    }

    /// Get the element at `path` below this element, mutably.
    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &index in path {
            current = current.children.get_mut(index)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Detach the element at `path` and return it.
    ///
    /// Namespace declarations in scope at the old position (from this
    /// element and every ancestor of the detached one) are copied onto the
    /// detached element unless it declares the same name itself, so its
    /// prefixes stay bound wherever it is attached next.
    ///
    /// Returns `None` (and leaves the tree untouched) if the path is empty
    /// or does not address an element.
    pub fn take_element(&mut self, path: &[usize]) -> Option<Element> {
        let (&last, parent_path) = path.split_last()?;
        let in_scope = self.namespaces_in_scope(parent_path);
        let parent = self.element_at_mut(parent_path)?;
        if !matches!(parent.children.get(last), Some(Node::Element(_))) {
            return None;
        }
        match parent.children.remove(last) {
            Node::Element(mut element) => {
                element.inherit_namespaces(in_scope);
                Some(element)
            }
            _ => None,
        }
    }

    /// Namespace declarations made on this element.
    pub fn namespace_declarations(&self) -> impl Iterator<Item = &(String, String)> {
        self.attributes
            .iter()
            .filter(|(name, _)| is_namespace_declaration(name))
    }

    /// The declaration on this element that binds its own prefix, or the
    /// default namespace when the name has no prefix.
    #[must_use]
    pub fn own_namespace_declaration(&self) -> Option<(String, String)> {
        let key = match self.name.split_once(':') {
            Some((prefix, _)) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        self.attributes.iter().find(|(name, _)| *name == key).cloned()
    }

    /// Declarations in scope at the element at `path`; nearer ones win.
    fn namespaces_in_scope(&self, path: &[usize]) -> Vec<(String, String)> {
        let mut scope: Vec<(String, String)> = Vec::new();
        let mut current = self;
        merge_declarations(&mut scope, current);
        for &index in path {
            let Some(child) = current.children.get(index).and_then(Node::as_element) else {
                break;
            };
            current = child;
            merge_declarations(&mut scope, current);
        }
        scope
    }

    /// Prepend declarations this element does not make itself.
    fn inherit_namespaces(&mut self, declarations: Vec<(String, String)>) {
        let mut attributes: Vec<(String, String)> = declarations
            .into_iter()
            .filter(|(name, _)| !self.attributes.iter().any(|(own, _)| own == name))
            .collect();
        attributes.append(&mut self.attributes);
        self.attributes = attributes;
    }

    /// Paths of all descendant elements named `tag`, in document order.
    ///
    /// The element itself is not included.
    #[must_use]
    pub fn descendant_paths(&self, tag: &str) -> Vec<NodePath> {
        let mut found = Vec::new();
        let mut path = Vec::new();
        collect_paths(self, tag, &mut path, &mut found);
        found
    }
}

fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

fn merge_declarations(scope: &mut Vec<(String, String)>, element: &Element) {
    for (name, uri) in element.namespace_declarations() {
        match scope.iter_mut().find(|(declared, _)| declared == name) {
            Some(entry) => entry.1 = uri.clone(),
            None => scope.push((name.clone(), uri.clone())),
        }
    }
}

fn collect_paths(element: &Element, tag: &str, path: &mut NodePath, found: &mut Vec<NodePath>) {
    for (index, child) in element.children.iter().enumerate() {
        if let Node::Element(child) = child {
            path.push(index);
            if child.name == tag {
                found.push(path.clone());
            }
            collect_paths(child, tag, path, found);
            path.pop();
        }
    }
}

/// A document with a single root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Create a document with an empty root element.
    #[must_use]
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self {
            root: Element::new(root_tag),
        }
    }

    /// Wrap an existing root element.
    #[must_use]
    pub fn from_root(root: Element) -> Self {
        Self { root }
    }

    /// Tag name of the root element.
    #[must_use]
    pub fn root_tag(&self) -> &str {
        &self.root.name
    }
}
