//! Owned srcML element tree

/// One piece of mixed element content
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Element(Node),
    Text(String),
}

/// A srcML element with its ordered mixed content.
///
/// Every node knows its tree position relative to the file unit it belongs
/// to (`/unit/class[1]/block[1]`) and the line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    content: Vec<Content>,
    xpath: String,
    line: u32,
}

impl Node {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            content: Vec::new(),
            xpath: String::new(),
            line: 1,
        }
    }

    /// Set an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Append a child element
    pub fn with_child(mut self, child: Node) -> Self {
        self.push_child(child);
        self
    }

    /// Append a text run
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn push_child(&mut self, child: Node) {
        self.content.push(Content::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if let Some(Content::Text(last)) = self.content.last_mut() {
            last.push_str(&text);
        } else {
            self.content.push(Content::Text(text));
        }
    }

    pub(crate) fn set_line(&mut self, line: u32) {
        self.line = line;
    }

    pub(crate) fn into_content(self) -> Vec<Content> {
        self.content
    }

    /// Element name, without namespace prefix
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// True if this element is named `tag`
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Tree position relative to the enclosing file unit
    pub fn xpath(&self) -> &str {
        &self.xpath
    }

    /// Line this element started on (1-indexed)
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Look up an attribute by local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Ordered mixed content
    pub fn content(&self) -> &[Content] {
        &self.content
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Node> {
        self.content.iter().filter_map(|c| match c {
            Content::Element(node) => Some(node),
            Content::Text(_) => None,
        })
    }

    /// Child elements named `tag`
    pub fn elements_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.elements().filter(move |node| node.tag == tag)
    }

    /// First child element named `tag`
    pub fn element(&self, tag: &str) -> Option<&Node> {
        self.elements().find(|node| node.tag == tag)
    }

    /// First child element, whatever its name
    pub fn first_element(&self) -> Option<&Node> {
        self.elements().next()
    }

    /// Child elements that come before `child` (compared by identity)
    pub fn elements_before(&self, child: &Node) -> Vec<&Node> {
        let mut before = Vec::new();
        for element in self.elements() {
            if std::ptr::eq(element, child) {
                return before;
            }
            before.push(element);
        }
        before
    }

    /// All descendant elements, depth first, in document order
    pub fn descendants(&self) -> Vec<&Node> {
        let mut found = Vec::new();
        let mut stack: Vec<&Node> = self.elements().collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            found.push(node);
            let mut children: Vec<&Node> = node.elements().collect();
            children.reverse();
            stack.extend(children);
        }
        found
    }

    /// Concatenated text of this element and all its descendants
    pub fn value(&self) -> String {
        let mut value = String::new();
        self.collect_text(&mut value);
        value
    }

    fn collect_text(&self, into: &mut String) {
        for content in &self.content {
            match content {
                Content::Text(text) => into.push_str(text),
                Content::Element(node) => node.collect_text(into),
            }
        }
    }

    /// Text that sits directly inside this element, outside any child element
    pub fn direct_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                Content::Text(text) => Some(text.as_str()),
                Content::Element(_) => None,
            })
            .collect()
    }

    /// Assign tree positions to this subtree, rooted at `/<tag>`
    pub fn index_positions(&mut self) {
        let root = format!("/{}", self.tag);
        self.assign_position(root);
    }

    fn assign_position(&mut self, xpath: String) {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for content in &mut self.content {
            if let Content::Element(child) = content {
                let index = match counts.iter_mut().find(|(tag, _)| *tag == child.tag) {
                    Some(entry) => {
                        entry.1 += 1;
                        entry.1
                    }
                    None => {
                        counts.push((child.tag.clone(), 1));
                        1
                    }
                };
                child.assign_position(format!("{}/{}[{}]", xpath, child.tag, index));
            }
        }
        self.xpath = xpath;
    }

    /// Stable content hash of this subtree
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        self.feed(&mut hasher);
        hasher.finalize()
    }

    fn feed(&self, hasher: &mut blake3::Hasher) {
        hasher.update(b"<");
        hasher.update(self.tag.as_bytes());
        for (key, value) in &self.attributes {
            hasher.update(b" ");
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }
        hasher.update(b">");
        for content in &self.content {
            match content {
                Content::Text(text) => {
                    hasher.update(text.as_bytes());
                }
                Content::Element(node) => node.feed(hasher),
            }
        }
        hasher.update(b"</>");
    }
}
