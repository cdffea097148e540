//! End-to-end tests: raw markup elements through extraction, sorting and
//! assembly into live object graphs.

use std::sync::Arc;

use weaver_assembler::{MarkupLoader, TemplateContent, TemplateLoader};
use weaver_config::WeaverConfig;
use weaver_core::{BuildContext, Error, ExtractionError, TypeId, Value, MetadataProvider};
use weaver_markup::{RawElement, RawNode};
use weaver_registry::fixtures::{
    self, DataTemplate, ItemsControl, MyImmutable, Setter, TestWindow, TextBlock, Window,
};

// ── Helpers ──────────────────────────────────────────────────────────────

fn loader() -> MarkupLoader {
    MarkupLoader::from_registry(Arc::new(fixtures::registry()), WeaverConfig::default())
}

fn text_block(text: &str) -> RawElement {
    RawElement::new("TextBlock").attr("Text", text)
}

fn texts(control: &ItemsControl) -> Vec<Option<String>> {
    control
        .item_values()
        .iter()
        .map(|item| {
            item.as_object()
                .and_then(|o| o.with(|t: &TextBlock| t.text.clone()))
                .flatten()
        })
        .collect()
}

// ── Loading ──────────────────────────────────────────────────────────────

#[test]
fn e2e_window_with_attributes_and_content() {
    let markup = RawElement::new("Window")
        .attr("Name", "Main")
        .attr("Title", "Hello")
        .attr("Height", "300")
        .text("\n  ")
        .child(text_block("Body"))
        .text("\n");

    let mut ctx = BuildContext::new();
    let window = loader().load(&markup, &mut ctx).unwrap();

    let (title, height, content) = window
        .with(|w: &Window| (w.title.clone(), w.height, w.content.clone()))
        .unwrap();
    assert_eq!(title.as_deref(), Some("Hello"));
    assert_eq!(height, 300);
    let body = content.as_object().unwrap();
    assert_eq!(
        body.with(|t: &TextBlock| t.text.clone()).flatten().as_deref(),
        Some("Body")
    );
}

#[test]
fn e2e_content_children_keep_document_order() {
    let markup = RawElement::new("ItemsControl")
        .child(text_block("1"))
        .child(RawNode::Comment("separator".into()))
        .child(text_block("2"))
        .child(text_block("3"))
        .property("ItemsControl.HeaderText", [RawNode::text("Numbers")]);

    let control = loader().load(&markup, &mut BuildContext::new()).unwrap();

    let (items, header) = control
        .with(|c: &ItemsControl| (texts(c), c.header_text.clone()))
        .unwrap();
    assert_eq!(
        items,
        [Some("1".to_string()), Some("2".to_string()), Some("3".to_string())]
    );
    assert_eq!(header.as_deref(), Some("Numbers"));
}

#[test]
fn e2e_text_content_becomes_constructor_argument() {
    let markup = RawElement::new("MyImmutable").text(" Hola ");
    let immutable = loader().load(&markup, &mut BuildContext::new()).unwrap();
    assert_eq!(
        immutable.with(|m: &MyImmutable| m.text.clone()),
        Some("Hola".to_string())
    );
}

#[test]
fn e2e_dependent_member_written_first_is_reordered() {
    let markup = RawElement::new("Setter")
        .attr("Value", "Red")
        .attr("Property", "Background");
    let setter = loader().load(&markup, &mut BuildContext::new()).unwrap();
    assert_eq!(setter.with(|s: &Setter| s.right_order), Some(true));
}

#[test]
fn e2e_attached_attribute() {
    let markup = RawElement::new("Grid").property(
        "Grid.Children",
        [RawNode::from(text_block("a").attr("Grid.Row", "2"))],
    );
    let grid = loader().load(&markup, &mut BuildContext::new()).unwrap();

    let child = grid
        .with(|g: &fixtures::Grid| g.children.first().and_then(Value::as_object).cloned())
        .flatten()
        .unwrap();
    let row = fixtures::registry()
        .attached_member(&TypeId::new("Grid"), "Row")
        .unwrap();
    assert_eq!(
        child.with(|t: &TextBlock| t.attached.get(&row).cloned()).flatten(),
        Some(Value::Int(2))
    );
}

#[test]
fn e2e_load_into_existing_root_wires_events() {
    let markup = RawElement::new("Window")
        .attr("Title", "Clickable")
        .child(RawElement::new("Button").attr("Click", "OnClick"));
    let root = weaver_core::ObjectRef::new(TestWindow::default());

    let result = loader()
        .load_into(&markup, root.clone(), &mut BuildContext::new())
        .unwrap();
    assert!(result.ptr_eq(&root));

    let button = root
        .with(|w: &TestWindow| w.content.as_object().cloned())
        .flatten()
        .unwrap();
    assert!(fixtures::click(&button));
    assert_eq!(
        root.with(|w: &TestWindow| (w.title.clone(), w.button_clicked)),
        Some((Some("Clickable".to_string()), true))
    );
}

#[test]
fn e2e_names_resolve_through_extensions() {
    let markup = RawElement::new("Window").child(
        RawElement::new("ItemsControl")
            .child(text_block("target").attr("Name", "First"))
            .child(RawElement::new("Reference").attr("Target", "First")),
    );

    let mut ctx = BuildContext::new();
    let window = loader().load(&markup, &mut ctx).unwrap();

    let first = ctx.namescopes().find("First", &window).unwrap();
    let control = window
        .with(|w: &Window| w.content.as_object().cloned())
        .flatten()
        .unwrap();
    let items = control.with(|c: &ItemsControl| c.item_values()).unwrap();
    assert_eq!(items, [Value::Object(first.clone()), Value::Object(first)]);
}

#[test]
fn e2e_template_loaded_from_markup() {
    let mut loader = loader();
    loader
        .builder_mut()
        .register_deferred(fixtures::data_template_content(), Arc::new(TemplateLoader))
        .unwrap();

    let markup = RawElement::new("ItemsControl").property(
        "ItemsControl.ItemTemplate",
        [RawNode::from(
            RawElement::new("DataTemplate").child(text_block("row")),
        )],
    );
    let control = loader.load(&markup, &mut BuildContext::new()).unwrap();

    let content = control
        .with(|c: &ItemsControl| c.item_template.clone())
        .flatten()
        .and_then(|t| t.with(|t: &DataTemplate| t.content.clone()).flatten())
        .unwrap();
    let row = content
        .with(|t: &TemplateContent| t.load(loader.builder(), &mut BuildContext::new()))
        .unwrap()
        .unwrap();
    assert_eq!(
        row.with(|t: &TextBlock| t.text.clone()).flatten().as_deref(),
        Some("row")
    );
}

// ── Failures ─────────────────────────────────────────────────────────────

#[test]
fn e2e_interleaved_content_is_rejected() {
    let markup = RawElement::new("ItemsControl")
        .child(text_block("1"))
        .property("ItemsControl.HeaderText", [RawNode::text("Header")])
        .child(text_block("2"));

    let err = loader().load(&markup, &mut BuildContext::new()).unwrap_err();
    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::ContentContiguity { .. })
    ));
}

#[test]
fn e2e_unknown_attribute_is_rejected() {
    let markup = RawElement::new("Window").attr("Colour", "Blue");
    let err = loader().load(&markup, &mut BuildContext::new()).unwrap_err();
    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::UnknownMember { ref member, .. }) if member == "Colour"
    ));
}

#[test]
fn e2e_custom_name_directive() {
    let mut config = WeaverConfig::default();
    config.extraction.name_directive = "x:Name".into();
    let loader = MarkupLoader::from_registry(Arc::new(fixtures::registry()), config);

    let markup = RawElement::new("Window").attr("x:Name", "Shell");
    let node = loader.extract(&markup).unwrap();
    assert_eq!(node.name.as_deref(), Some("Shell"));
    assert!(node.assignments.is_empty());
}
