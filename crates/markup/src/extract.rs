//! Assignment extraction: raw element -> construction node.
//!
//! Children of an element are either property elements (an explicit member
//! label) or content. Content must form one contiguous run; property
//! elements may come before and after it but never in between.

use crate::raw::{split_label, RawElement, RawNode, RawPropertyElement};
use std::sync::Arc;
use tracing::{trace, warn};
use weaver_config::ExtractionConfig;
use weaver_core::{
    ConstructionNode, Error, ExtractionError, Member, MemberAssignment, MetadataProvider, Result,
    TypeId,
};

/// Position relative to the content run while scanning children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentState {
    Before,
    In,
    After,
}

/// One slot of the output ordering: a finished assignment, or the place the
/// content assignment goes once the run is complete.
enum Slot {
    Assignment(MemberAssignment),
    Content,
}

/// Children of an element or a property element, with blanks and comments
/// already dropped.
enum Payload<'a> {
    Empty,
    Text(String),
    Elements(Vec<&'a RawElement>),
}

pub struct AssignmentExtractor {
    metadata: Arc<dyn MetadataProvider>,
    config: ExtractionConfig,
}

impl AssignmentExtractor {
    pub fn new(metadata: Arc<dyn MetadataProvider>, config: ExtractionConfig) -> Self {
        Self { metadata, config }
    }

    /// Extract a full construction tree rooted at `element`.
    pub fn extract(&self, element: &RawElement) -> Result<ConstructionNode> {
        let type_id = self.resolve(&element.type_name)?;
        let mut node = ConstructionNode::new(type_id.clone());

        if let Some(name) = element
            .attributes
            .iter()
            .find(|a| a.name == self.config.name_directive)
        {
            node.name = Some(name.value.clone());
        }

        let (assignments, arguments) = self.partition(&type_id, element)?;
        node.assignments = assignments;
        node.arguments = arguments;

        trace!(
            type_name = %type_id,
            assignments = node.assignments.len(),
            named = node.name.is_some(),
            "node extracted"
        );
        Ok(node)
    }

    /// The member assignments of `element`, read as an instance of `type_id`.
    pub fn assignments(&self, type_id: &TypeId, element: &RawElement) -> Result<Vec<MemberAssignment>> {
        Ok(self.partition(type_id, element)?.0)
    }

    fn partition(
        &self,
        type_id: &TypeId,
        element: &RawElement,
    ) -> Result<(Vec<MemberAssignment>, Vec<String>)> {
        let mut slots = Vec::new();

        for attribute in &element.attributes {
            if attribute.name == self.config.name_directive {
                continue;
            }
            let member = self.resolve_member(type_id, &attribute.name)?;
            slots.push(Slot::Assignment(MemberAssignment::literal(
                member,
                attribute.value.clone(),
            )));
        }

        let mut state = ContentState::Before;
        let mut last_property: Option<&str> = None;
        let mut content: Vec<&RawNode> = Vec::new();

        // Blank text never starts or extends the content run.
        for child in element.children.iter().filter(|c| !c.is_blank_text()) {
            match child {
                RawNode::Property(property) => {
                    if state == ContentState::In {
                        state = ContentState::After;
                    }
                    last_property = Some(property.label.as_str());
                    slots.push(Slot::Assignment(self.property_assignment(type_id, property)?));
                }
                RawNode::Element(_) | RawNode::Text(_) => {
                    match state {
                        ContentState::Before => {
                            state = ContentState::In;
                            slots.push(Slot::Content);
                        }
                        ContentState::In => {}
                        ContentState::After => {
                            let member = last_property.unwrap_or_default().to_string();
                            warn!(type_name = %type_id, member = %member, "content is not contiguous");
                            return Err(ExtractionError::ContentContiguity {
                                type_name: type_id.to_string(),
                                member,
                            }
                            .into());
                        }
                    }
                    content.push(child);
                }
                RawNode::Comment(_) => {}
            }
        }

        let mut arguments = Vec::new();
        let content_assignment = match self.payload(type_id, content)? {
            Payload::Empty => None,
            Payload::Text(text) => match self.metadata.content_member_of(type_id) {
                Some(member) => Some(MemberAssignment::literal(member, text)),
                None => {
                    arguments.push(text);
                    None
                }
            },
            Payload::Elements(elements) => Some(self.content_assignment(type_id, &elements)?),
        };

        let mut assignments = Vec::with_capacity(slots.len());
        let mut content_assignment = content_assignment;
        for slot in slots {
            match slot {
                Slot::Assignment(assignment) => assignments.push(assignment),
                Slot::Content => assignments.extend(content_assignment.take()),
            }
        }
        Ok((assignments, arguments))
    }

    /// The single content assignment for a run of element children.
    fn content_assignment(&self, type_id: &TypeId, elements: &[&RawElement]) -> Result<MemberAssignment> {
        let member = match self.metadata.content_member_of(type_id) {
            Some(member) => member,
            None if self.metadata.is_collection_type(type_id) => Member::items(type_id),
            None => {
                return Err(ExtractionError::NoContentMember {
                    type_name: type_id.to_string(),
                }
                .into());
            }
        };

        if elements.len() > 1 && !self.metadata.is_collection_target(&member) {
            return Err(ExtractionError::AmbiguousContent {
                type_name: type_id.to_string(),
                count: elements.len(),
            }
            .into());
        }

        let children = elements
            .iter()
            .map(|e| self.extract(e))
            .collect::<Result<Vec<_>>>()?;
        Ok(MemberAssignment::children(member, children))
    }

    fn property_assignment(
        &self,
        type_id: &TypeId,
        property: &RawPropertyElement,
    ) -> Result<MemberAssignment> {
        let member = self.resolve_member(type_id, &property.label)?;

        let mut nodes = Vec::new();
        for child in self.significant(&property.children) {
            if let RawNode::Property(inner) = child {
                return Err(ExtractionError::NestedPropertyElement {
                    outer: property.label.clone(),
                    inner: inner.label.clone(),
                }
                .into());
            }
            nodes.push(child);
        }

        match self.payload(type_id, nodes)? {
            Payload::Text(text) => Ok(MemberAssignment::literal(member, text)),
            Payload::Empty if self.metadata.is_collection_target(&member) => {
                Ok(MemberAssignment::children(member, Vec::new()))
            }
            Payload::Empty => Err(ExtractionError::EmptyAssignment {
                type_name: type_id.to_string(),
                member: member.qualified_name(),
            }
            .into()),
            Payload::Elements(elements) => {
                if elements.len() > 1 && !self.metadata.is_collection_target(&member) {
                    return Err(ExtractionError::AmbiguousContent {
                        type_name: type_id.to_string(),
                        count: elements.len(),
                    }
                    .into());
                }
                let children = elements
                    .iter()
                    .map(|e| self.extract(e))
                    .collect::<Result<Vec<_>>>()?;
                Ok(MemberAssignment::children(member, children))
            }
        }
    }

    /// Resolve an attribute name or property-element label on `type_id`.
    ///
    /// `Owner.Member` with the element's own type as owner is a standard
    /// member; any other owner makes it an attached member.
    fn resolve_member(&self, type_id: &TypeId, label: &str) -> Result<Member> {
        let unknown = || ExtractionError::UnknownMember {
            type_name: type_id.to_string(),
            member: label.to_string(),
        };

        match split_label(label) {
            None if label.contains('.') => Err(ExtractionError::InvalidLabel {
                label: label.to_string(),
            }
            .into()),
            None => Ok(self.metadata.member(type_id, label).ok_or_else(unknown)?),
            Some((owner, name)) => {
                let owner = self.resolve(owner)?;
                let member = if &owner == type_id {
                    self.metadata.member(type_id, name)
                } else {
                    self.metadata.attached_member(&owner, name)
                };
                Ok(member.ok_or_else(unknown)?)
            }
        }
    }

    fn resolve(&self, name: &str) -> Result<TypeId> {
        self.metadata
            .resolve_type(name)
            .ok_or_else(|| Error::TypeResolution {
                name: name.to_string(),
            })
    }

    fn significant<'a>(&self, children: &'a [RawNode]) -> impl Iterator<Item = &'a RawNode> {
        let skip_blank = self.config.ignore_whitespace_text;
        children
            .iter()
            .filter(move |c| !(skip_blank && c.is_blank_text()))
    }

    /// Classify a run of non-property children. Literal text is trimmed
    /// unless whitespace is configured as significant.
    fn payload<'a>(&self, type_id: &TypeId, nodes: Vec<&'a RawNode>) -> Result<Payload<'a>> {
        let mut text = String::new();
        let mut elements = Vec::new();
        for node in nodes {
            match node {
                RawNode::Text(t) => text.push_str(t),
                RawNode::Element(e) => elements.push(e),
                RawNode::Property(_) | RawNode::Comment(_) => {}
            }
        }

        let has_text = !text.trim().is_empty();
        match (has_text, elements.is_empty()) {
            (true, false) => Err(ExtractionError::MixedContent {
                type_name: type_id.to_string(),
            }
            .into()),
            (true, true) if self.config.ignore_whitespace_text => {
                Ok(Payload::Text(text.trim().to_string()))
            }
            (true, true) => Ok(Payload::Text(text)),
            (false, false) => Ok(Payload::Elements(elements)),
            (false, true) => Ok(Payload::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weaver_core::AssignmentValue;
    use weaver_registry::fixtures;

    fn extractor() -> AssignmentExtractor {
        AssignmentExtractor::new(Arc::new(fixtures::registry()), ExtractionConfig::default())
    }

    fn items_control() -> TypeId {
        TypeId::new("ItemsControl")
    }

    fn text_block() -> RawElement {
        RawElement::new("TextBlock")
    }

    #[test]
    fn content_property_with_children() {
        let element = RawElement::new("ItemsControl")
            .child(text_block())
            .child(text_block())
            .child(text_block());

        let assignments = extractor().assignments(&items_control(), &element).unwrap();

        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].member.name(), "Items");
        let children = assignments[0].child_nodes();
        assert_eq!(children.len(), 3);
        assert!(children.iter().all(|c| c.type_id.name() == "TextBlock"));
    }

    #[test]
    fn property_element_between_content_is_rejected() {
        let element = RawElement::new("ItemsControl")
            .text("\n")
            .child(text_block())
            .text("\n")
            .property("ItemsControl.HeaderText", [RawNode::text("Hola")])
            .text("\n")
            .child(text_block())
            .text("\n");

        let err = extractor().assignments(&items_control(), &element).unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction(ExtractionError::ContentContiguity { ref member, .. })
                if member == "ItemsControl.HeaderText"
        ));
    }

    #[test]
    fn property_after_direct_content() {
        let element = RawElement::new("ItemsControl")
            .child(text_block())
            .child(text_block())
            .property("ItemsControl.HeaderText", [RawNode::text("Hola")]);

        let assignments = extractor().assignments(&items_control(), &element).unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].member.name(), "Items");
        assert_eq!(assignments[0].child_nodes().len(), 2);
        assert_eq!(assignments[1].as_literal(), Some("Hola"));
    }

    #[test]
    fn property_before_direct_content() {
        let element = RawElement::new("ItemsControl")
            .property("ItemsControl.HeaderText", [RawNode::text("Hola")])
            .child(text_block())
            .child(text_block());

        let assignments = extractor().assignments(&items_control(), &element).unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].member.name(), "HeaderText");
        assert_eq!(assignments[1].child_nodes().len(), 2);
    }

    #[test]
    fn property_element_with_text_is_literal() {
        let element = RawElement::new("ItemsControl")
            .property("ItemsControl.HeaderText", [RawNode::text("  Hola ")]);

        let assignments = extractor().assignments(&items_control(), &element).unwrap();
        assert_eq!(
            assignments,
            vec![MemberAssignment::literal(
                Member::standard("ItemsControl", "HeaderText"),
                "Hola"
            )]
        );
    }

    #[test]
    fn attributes_come_first_and_name_is_a_directive() {
        let element = RawElement::new("Window")
            .property("Window.Height", [RawNode::text("12")])
            .attr("Name", "Main")
            .attr("Title", "Hello");

        let node = extractor().extract(&element).unwrap();
        assert_eq!(node.name.as_deref(), Some("Main"));
        let names: Vec<_> = node.assignments.iter().map(|a| a.member.name()).collect();
        assert_eq!(names, ["Title", "Height"]);
    }

    #[test]
    fn single_valued_content_rejects_two_children() {
        let element = RawElement::new("Window").child(text_block()).child(text_block());
        let err = extractor().extract(&element).unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction(ExtractionError::AmbiguousContent { count: 2, .. })
        ));
    }

    #[test]
    fn text_content_goes_to_content_member() {
        let element = RawElement::new("TextBlock").text(" Hello ");
        let node = extractor().extract(&element).unwrap();
        assert_eq!(node.assignments[0].member.name(), "Text");
        assert_eq!(node.assignments[0].as_literal(), Some("Hello"));
    }

    #[test]
    fn text_without_content_member_becomes_arguments() {
        let node = extractor().extract(&RawElement::new("MyImmutable").text("Hola")).unwrap();
        assert!(node.assignments.is_empty());
        assert_eq!(node.arguments, ["Hola"]);
    }

    #[test]
    fn collection_type_content_uses_items_directive() {
        let element = RawElement::new("Collection")
            .attr("Title", "My title")
            .child(text_block());
        let node = extractor().extract(&element).unwrap();
        assert_eq!(node.assignments.len(), 2);
        assert!(node.assignments[1].member.is_items());
    }

    #[test]
    fn element_content_without_content_member_fails() {
        let element = RawElement::new("Setter").child(text_block());
        let err = extractor().extract(&element).unwrap_err();
        assert!(matches!(err, Error::Extraction(ExtractionError::NoContentMember { .. })));
    }

    #[test]
    fn mixed_text_and_elements_fail() {
        let element = RawElement::new("ItemsControl").text("hi").child(text_block());
        let err = extractor().extract(&element).unwrap_err();
        assert!(matches!(err, Error::Extraction(ExtractionError::MixedContent { .. })));
    }

    #[test]
    fn foreign_owner_resolves_attached_member() {
        let element = RawElement::new("TextBlock").attr("Grid.Row", "1");
        let node = extractor().extract(&element).unwrap();
        let member = &node.assignments[0].member;
        assert!(member.is_attached());
        assert_eq!(member.qualified_name(), "Grid.Row");
    }

    #[test]
    fn unknown_members_and_types_fail() {
        let err = extractor()
            .extract(&RawElement::new("Window").attr("Colour", "red"))
            .unwrap_err();
        assert!(matches!(err, Error::Extraction(ExtractionError::UnknownMember { .. })));

        let err = extractor().extract(&RawElement::new("Nope")).unwrap_err();
        assert!(matches!(err, Error::TypeResolution { ref name } if name == "Nope"));
    }

    #[test]
    fn empty_property_element() {
        let empty_items = RawElement::new("ItemsControl").property("ItemsControl.Items", Vec::<RawNode>::new());
        let node = extractor().extract(&empty_items).unwrap();
        assert_eq!(node.assignments[0].value, AssignmentValue::Children(Vec::new()));

        let empty_header =
            RawElement::new("ItemsControl").property("ItemsControl.HeaderText", Vec::<RawNode>::new());
        let err = extractor().extract(&empty_header).unwrap_err();
        assert!(matches!(err, Error::Extraction(ExtractionError::EmptyAssignment { .. })));
    }

    #[test]
    fn nested_property_elements_fail() {
        let element = RawElement::new("Window").property(
            "Window.Content",
            [RawNode::Property(RawPropertyElement::new(
                "Window.Title",
                [RawNode::text("x")],
            ))],
        );
        let err = extractor().extract(&element).unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction(ExtractionError::NestedPropertyElement { .. })
        ));
    }

    #[test]
    fn comments_do_not_break_contiguity() {
        let element = RawElement::new("ItemsControl")
            .child(text_block())
            .child(RawNode::Comment("spacer".into()))
            .child(text_block());
        let node = extractor().extract(&element).unwrap();
        assert_eq!(node.assignments[0].child_nodes().len(), 2);
    }

    fn keeping_whitespace() -> AssignmentExtractor {
        let config = ExtractionConfig {
            ignore_whitespace_text: false,
            ..ExtractionConfig::default()
        };
        AssignmentExtractor::new(Arc::new(fixtures::registry()), config)
    }

    #[test]
    fn indentation_does_not_break_contiguity_when_whitespace_is_kept() {
        let element = RawElement::new("ItemsControl")
            .text("\n  ")
            .child(text_block())
            .text("\n  ")
            .property("ItemsControl.HeaderText", [RawNode::text("Hola")])
            .text("\n");

        let assignments = keeping_whitespace()
            .assignments(&items_control(), &element)
            .unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].child_nodes().len(), 1);
        assert_eq!(assignments[1].as_literal(), Some("Hola"));
    }

    #[test]
    fn kept_whitespace_stays_in_literals() {
        let element = RawElement::new("TextBlock").text(" Hello ");
        let node = keeping_whitespace().extract(&element).unwrap();
        assert_eq!(node.assignments[0].as_literal(), Some(" Hello "));
    }
}
