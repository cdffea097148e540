//! The raw element tree handed over by a markup reader.

/// An object element: `<Type attr="..">children</Type>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawElement {
    pub type_name: String,
    pub attributes: Vec<RawAttribute>,
    pub children: Vec<RawNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawAttribute {
    pub name: String,
    pub value: String,
}

/// A property element: `<Owner.Member>children</Owner.Member>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPropertyElement {
    pub label: String,
    pub children: Vec<RawNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    Element(RawElement),
    Property(RawPropertyElement),
    Text(String),
    Comment(String),
}

impl RawNode {
    pub fn text(text: impl Into<String>) -> Self {
        RawNode::Text(text.into())
    }

    /// Text made only of whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, RawNode::Text(t) if t.trim().is_empty())
    }
}

impl From<RawElement> for RawNode {
    fn from(element: RawElement) -> Self {
        RawNode::Element(element)
    }
}

impl From<RawPropertyElement> for RawNode {
    fn from(property: RawPropertyElement) -> Self {
        RawNode::Property(property)
    }
}

impl RawElement {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(RawAttribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn child(mut self, node: impl Into<RawNode>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(RawNode::Text(text.into()));
        self
    }

    /// Append a property element labelled `label`.
    pub fn property<I>(mut self, label: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RawNode>,
    {
        self.children.push(RawNode::Property(RawPropertyElement::new(label, children)));
        self
    }
}

impl RawPropertyElement {
    pub fn new<I>(label: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RawNode>,
    {
        Self {
            label: label.into(),
            children: children.into_iter().map(Into::into).collect(),
        }
    }

    /// Split `Owner.Member` into its parts.
    pub fn split_label(&self) -> Option<(&str, &str)> {
        split_label(&self.label)
    }
}

/// Split a dotted member label at its last dot.
pub fn split_label(label: &str) -> Option<(&str, &str)> {
    let (owner, member) = label.rsplit_once('.')?;
    (!owner.is_empty() && !member.is_empty()).then_some((owner, member))
}
