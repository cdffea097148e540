//! Model types for tests: a small widget vocabulary covering every capability
//! the pipeline supports.
//!
//! Enabled with the `fixtures` feature.

use crate::registry::{TypeDescriptor, TypeRegistry};
use weaver_core::{
    ActivationError, AttachedValues, EventHandler, ExtensionContext, ExtensionError,
    Instance, Lifecycle, Member, MemberError, ObjectRef, TypeId, Value, ValueProvider, ValueType,
};

fn rejected(member: &Member, reason: impl Into<String>) -> MemberError {
    MemberError::SetFailed {
        member: member.qualified_name(),
        reason: reason.into(),
    }
}

fn unknown(member: &Member) -> MemberError {
    rejected(member, "no such member")
}

fn text(member: &Member, value: Value) -> Result<String, MemberError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(rejected(member, format!("expected string, got {}", other.kind()))),
    }
}

fn integer(member: &Member, value: Value) -> Result<i64, MemberError> {
    value
        .as_int()
        .ok_or_else(|| rejected(member, format!("expected integer, got {}", value.kind())))
}

fn object(member: &Member, value: Value) -> Result<ObjectRef, MemberError> {
    match value {
        Value::Object(obj) => Ok(obj),
        other => Err(rejected(member, format!("expected object, got {}", other.kind()))),
    }
}

fn single_argument(type_name: &str, arguments: &[String]) -> Result<String, ActivationError> {
    arguments
        .first()
        .cloned()
        .ok_or_else(|| ActivationError::NoMatchingConstructor {
            type_name: type_name.to_string(),
            arity: arguments.len(),
        })
}

// --- Window ---

/// Namescope boundary with a single content slot.
#[derive(Debug, Default)]
pub struct Window {
    pub title: Option<String>,
    pub content: Value,
    pub height: i64,
    pub begun: u32,
    pub initialized: u32,
}

impl Instance for Window {
    fn instance_type(&self) -> TypeId {
        TypeId::new("Window")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "Title" => self.title = Some(text(member, value)?),
            "Content" => self.content = value,
            "Height" => self.height = integer(member, value)?,
            _ => return Err(unknown(member)),
        }
        Ok(())
    }

    fn get_member(&self, member: &Member) -> Option<Value> {
        match member.name() {
            "Title" => self.title.clone().map(Value::Str),
            "Content" => Some(self.content.clone()),
            "Height" => Some(Value::Int(self.height)),
            _ => None,
        }
    }

    fn as_lifecycle_mut(&mut self) -> Option<&mut dyn Lifecycle> {
        Some(self)
    }
}

impl Lifecycle for Window {
    fn on_begin_init(&mut self) {
        self.begun += 1;
    }

    fn on_end_init(&mut self) {
        self.initialized += 1;
    }
}

/// A window exposing `OnClick` and `OnLoad` handlers for event wiring.
#[derive(Debug, Default)]
pub struct TestWindow {
    pub title: Option<String>,
    pub content: Value,
    pub button_clicked: bool,
    pub window_loaded: bool,
    pub attached: AttachedValues,
}

impl Instance for TestWindow {
    fn instance_type(&self) -> TypeId {
        TypeId::new("TestWindow")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "Title" => self.title = Some(text(member, value)?),
            "Content" => self.content = value,
            _ => return Err(unknown(member)),
        }
        Ok(())
    }

    fn set_attached(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        self.attached.set(member, value);
        Ok(())
    }

    fn handles(&self, handler: &str) -> bool {
        matches!(handler, "OnClick" | "OnLoad")
    }

    fn invoke_handler(&mut self, handler: &str, _sender: &ObjectRef) -> bool {
        match handler {
            "OnClick" => self.button_clicked = true,
            "OnLoad" => self.window_loaded = true,
            _ => return false,
        }
        true
    }
}

/// The attached `Window.Loaded` event.
pub fn window_loaded() -> Member {
    Member::attached_event("Window", "Loaded")
}

/// Raise `Window.Loaded` on a test window. Returns whether a handler ran.
pub fn raise_loaded(window: &ObjectRef) -> bool {
    let handler = window
        .with(|w: &TestWindow| match w.attached.get(&window_loaded()) {
            Some(Value::Handler(handler)) => Some(handler.clone()),
            _ => None,
        })
        .flatten();
    handler.is_some_and(|h| h.invoke(window))
}

/// A second boundary type, for nested namescopes.
#[derive(Debug, Default)]
pub struct UserControl {
    pub content: Value,
}

impl Instance for UserControl {
    fn instance_type(&self) -> TypeId {
        TypeId::new("UserControl")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "Content" => self.content = value,
            _ => return Err(unknown(member)),
        }
        Ok(())
    }
}

// --- Controls ---

#[derive(Debug, Default)]
pub struct TextBlock {
    pub text: Option<String>,
    pub attached: AttachedValues,
}

impl Instance for TextBlock {
    fn instance_type(&self) -> TypeId {
        TypeId::new("TextBlock")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "Text" => self.text = Some(text(member, value)?),
            _ => return Err(unknown(member)),
        }
        Ok(())
    }

    fn get_member(&self, member: &Member) -> Option<Value> {
        match member.name() {
            "Text" => self.text.clone().map(Value::Str),
            _ => None,
        }
    }

    fn set_attached(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        self.attached.set(member, value);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Button {
    pub click: Option<EventHandler>,
}

impl Instance for Button {
    fn instance_type(&self) -> TypeId {
        TypeId::new("Button")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match (member.name(), value) {
            ("Click", Value::Handler(handler)) => {
                self.click = Some(handler);
                Ok(())
            }
            ("Click", other) => Err(rejected(member, format!("expected handler, got {}", other.kind()))),
            _ => Err(unknown(member)),
        }
    }
}

/// Raise the `Click` event of a button. Returns whether a handler ran.
pub fn click(button: &ObjectRef) -> bool {
    let handler = button.with(|b: &Button| b.click.clone()).flatten();
    handler.is_some_and(|h| h.invoke(button))
}

/// A read-only collection reached through `ItemsControl.Items`.
#[derive(Debug, Default)]
pub struct ItemCollection {
    pub items: Vec<Value>,
}

impl Instance for ItemCollection {
    fn instance_type(&self) -> TypeId {
        TypeId::new("ItemCollection")
    }

    fn set_member(&mut self, member: &Member, _value: Value) -> Result<(), MemberError> {
        Err(unknown(member))
    }

    fn as_collection_mut(&mut self) -> Option<&mut dyn weaver_core::Collection> {
        Some(self)
    }
}

impl weaver_core::Collection for ItemCollection {
    fn append(&mut self, item: Value) -> Result<(), MemberError> {
        self.items.push(item);
        Ok(())
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[derive(Debug)]
pub struct ItemsControl {
    pub items: ObjectRef,
    pub header_text: Option<String>,
    pub item_template: Option<ObjectRef>,
}

impl Default for ItemsControl {
    fn default() -> Self {
        Self {
            items: ObjectRef::new(ItemCollection::default()),
            header_text: None,
            item_template: None,
        }
    }
}

impl ItemsControl {
    pub fn item_values(&self) -> Vec<Value> {
        self.items
            .with(|c: &ItemCollection| c.items.clone())
            .unwrap_or_default()
    }
}

impl Instance for ItemsControl {
    fn instance_type(&self) -> TypeId {
        TypeId::new("ItemsControl")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "HeaderText" => self.header_text = Some(text(member, value)?),
            "ItemTemplate" => self.item_template = Some(object(member, value)?),
            _ => return Err(unknown(member)),
        }
        Ok(())
    }

    fn get_member(&self, member: &Member) -> Option<Value> {
        match member.name() {
            "Items" => Some(Value::Object(self.items.clone())),
            "HeaderText" => self.header_text.clone().map(Value::Str),
            _ => None,
        }
    }
}

/// Panel whose children member is set as a whole list.
#[derive(Debug, Default)]
pub struct Grid {
    pub children: Vec<Value>,
}

impl Instance for Grid {
    fn instance_type(&self) -> TypeId {
        TypeId::new("Grid")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match (member.name(), value) {
            ("Children", Value::List(items)) => {
                self.children = items;
                Ok(())
            }
            ("Children", other) => {
                self.children = vec![other];
                Ok(())
            }
            _ => Err(unknown(member)),
        }
    }
}

/// A type that is itself a collection, with a title.
#[derive(Debug, Default)]
pub struct Collection {
    pub title: Option<String>,
    pub items: Vec<Value>,
}

impl Instance for Collection {
    fn instance_type(&self) -> TypeId {
        TypeId::new("Collection")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "Title" => self.title = Some(text(member, value)?),
            _ => return Err(unknown(member)),
        }
        Ok(())
    }

    fn as_collection_mut(&mut self) -> Option<&mut dyn weaver_core::Collection> {
        Some(self)
    }
}

impl weaver_core::Collection for Collection {
    fn append(&mut self, item: Value) -> Result<(), MemberError> {
        self.items.push(item);
        Ok(())
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

// --- Ordering ---

/// `Value` must observe `Property` already set.
#[derive(Debug, Default)]
pub struct Setter {
    pub property: Option<String>,
    pub value: Option<String>,
    pub right_order: bool,
}

impl Instance for Setter {
    fn instance_type(&self) -> TypeId {
        TypeId::new("Setter")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "Property" => self.property = Some(text(member, value)?),
            "Value" => {
                self.right_order = self.property.is_some();
                self.value = Some(text(member, value)?);
            }
            _ => return Err(unknown(member)),
        }
        Ok(())
    }
}

/// Two members that depend on each other.
#[derive(Debug, Default)]
pub struct Knot {
    pub left: Option<String>,
    pub right: Option<String>,
}

impl Instance for Knot {
    fn instance_type(&self) -> TypeId {
        TypeId::new("Knot")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "Left" => self.left = Some(text(member, value)?),
            "Right" => self.right = Some(text(member, value)?),
            _ => return Err(unknown(member)),
        }
        Ok(())
    }
}

// --- Immutable ---

#[derive(Debug, PartialEq)]
pub struct MyImmutable {
    pub text: String,
}

impl Instance for MyImmutable {
    fn instance_type(&self) -> TypeId {
        TypeId::new("MyImmutable")
    }

    fn set_member(&mut self, member: &Member, _value: Value) -> Result<(), MemberError> {
        Err(rejected(member, "immutable"))
    }
}

// --- Extensions ---

#[derive(Debug, Default)]
pub struct SimpleExtension {
    pub property: Option<String>,
}

impl Instance for SimpleExtension {
    fn instance_type(&self) -> TypeId {
        TypeId::new("SimpleExtension")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "Property" => self.property = Some(text(member, value)?),
            _ => return Err(unknown(member)),
        }
        Ok(())
    }

    fn as_value_provider(&self) -> Option<&dyn ValueProvider> {
        Some(self)
    }
}

impl ValueProvider for SimpleExtension {
    fn provide_value(&self, _context: &ExtensionContext<'_>) -> Result<Value, ExtensionError> {
        self.property
            .clone()
            .map(Value::Str)
            .ok_or_else(|| ExtensionError {
                extension: "SimpleExtension".into(),
                reason: "Property is not set".into(),
            })
    }
}

/// Provides a fixed list of strings.
#[derive(Debug, Default)]
pub struct CollectionExtension;

impl CollectionExtension {
    pub const ITEMS: [&'static str; 3] = ["One", "Two", "Three"];
}

impl Instance for CollectionExtension {
    fn instance_type(&self) -> TypeId {
        TypeId::new("CollectionExtension")
    }

    fn set_member(&mut self, member: &Member, _value: Value) -> Result<(), MemberError> {
        Err(unknown(member))
    }

    fn as_value_provider(&self) -> Option<&dyn ValueProvider> {
        Some(self)
    }
}

impl ValueProvider for CollectionExtension {
    fn provide_value(&self, _context: &ExtensionContext<'_>) -> Result<Value, ExtensionError> {
        Ok(Value::List(Self::ITEMS.iter().map(|s| Value::from(*s)).collect()))
    }
}

/// Constructed from one literal argument; provides it back.
#[derive(Debug, PartialEq)]
pub struct ParametrizedExtension {
    pub text: String,
}

impl Instance for ParametrizedExtension {
    fn instance_type(&self) -> TypeId {
        TypeId::new("ParametrizedExtension")
    }

    fn set_member(&mut self, member: &Member, _value: Value) -> Result<(), MemberError> {
        Err(unknown(member))
    }

    fn as_value_provider(&self) -> Option<&dyn ValueProvider> {
        Some(self)
    }
}

impl ValueProvider for ParametrizedExtension {
    fn provide_value(&self, _context: &ExtensionContext<'_>) -> Result<Value, ExtensionError> {
        Ok(Value::Str(self.text.clone()))
    }
}

/// Resolves `Target` in the namescope it is constructed in.
#[derive(Debug, Default)]
pub struct Reference {
    pub target: Option<String>,
}

impl Instance for Reference {
    fn instance_type(&self) -> TypeId {
        TypeId::new("Reference")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "Target" => self.target = Some(text(member, value)?),
            _ => return Err(unknown(member)),
        }
        Ok(())
    }

    fn as_value_provider(&self) -> Option<&dyn ValueProvider> {
        Some(self)
    }
}

impl ValueProvider for Reference {
    fn provide_value(&self, context: &ExtensionContext<'_>) -> Result<Value, ExtensionError> {
        let failed = |reason: String| ExtensionError {
            extension: "Reference".into(),
            reason,
        };
        let target = self
            .target
            .as_deref()
            .ok_or_else(|| failed("Target is not set".into()))?;
        context
            .find_name(target)
            .map(Value::Object)
            .ok_or_else(|| failed(format!("no object named '{target}' in scope")))
    }
}

/// Provides the most recent ambient value of the member named `Member`.
#[derive(Debug, Default)]
pub struct AmbientLookup {
    pub member: Option<String>,
}

impl Instance for AmbientLookup {
    fn instance_type(&self) -> TypeId {
        TypeId::new("AmbientLookup")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "Member" => self.member = Some(text(member, value)?),
            _ => return Err(unknown(member)),
        }
        Ok(())
    }

    fn as_value_provider(&self) -> Option<&dyn ValueProvider> {
        Some(self)
    }
}

impl ValueProvider for AmbientLookup {
    fn provide_value(&self, context: &ExtensionContext<'_>) -> Result<Value, ExtensionError> {
        Ok(self
            .member
            .as_deref()
            .and_then(|name| context.ambient_value(name))
            .cloned()
            .unwrap_or_default())
    }
}

// --- Templates ---

/// Holds whatever its deferred loader returned for `Content`.
#[derive(Debug, Default)]
pub struct DataTemplate {
    pub content: Option<ObjectRef>,
}

impl Instance for DataTemplate {
    fn instance_type(&self) -> TypeId {
        TypeId::new("DataTemplate")
    }

    fn set_member(&mut self, member: &Member, value: Value) -> Result<(), MemberError> {
        match member.name() {
            "Content" => self.content = Some(object(member, value)?),
            _ => return Err(unknown(member)),
        }
        Ok(())
    }
}

/// The deferred member of [`DataTemplate`].
pub fn data_template_content() -> Member {
    Member::standard("DataTemplate", "Content")
        .as_content()
        .as_deferred()
}

/// A registry holding every fixture type.
pub fn registry() -> TypeRegistry {
    let string = ValueType::String;
    let standard = |owner: &str, name: &str, value_type: ValueType| {
        Member::standard(owner, name).with_value_type(value_type)
    };

    TypeRegistry::new()
        .with(
            TypeDescriptor::new("Window")
                .namescope()
                .lifecycle()
                .member(standard("Window", "Title", string))
                .member(Member::standard("Window", "Content").as_content())
                .member(standard("Window", "Height", ValueType::Integer))
                .attached_event("Loaded")
                .activatable::<Window>(),
        )
        .with(
            TypeDescriptor::new("TestWindow")
                .namescope()
                .member(standard("TestWindow", "Title", string))
                .member(Member::standard("TestWindow", "Content").as_content())
                .activatable::<TestWindow>(),
        )
        .with(
            TypeDescriptor::new("UserControl")
                .namescope()
                .member(Member::standard("UserControl", "Content").as_content())
                .activatable::<UserControl>(),
        )
        .with(
            TypeDescriptor::new("TextBlock")
                .member(standard("TextBlock", "Text", string).as_content())
                .activatable::<TextBlock>(),
        )
        .with(
            TypeDescriptor::new("Button")
                .member(Member::event("Button", "Click"))
                .activatable::<Button>(),
        )
        .with(
            TypeDescriptor::new("ItemsControl")
                .member(Member::standard("ItemsControl", "Items").as_content().as_collection())
                .member(standard("ItemsControl", "HeaderText", string))
                .member(Member::standard("ItemsControl", "ItemTemplate"))
                .activatable::<ItemsControl>(),
        )
        .with(
            TypeDescriptor::new("ItemCollection")
                .collection()
                .activatable::<ItemCollection>(),
        )
        .with(
            TypeDescriptor::new("Grid")
                .member(Member::standard("Grid", "Children").as_content().as_collection())
                .attached("Row", ValueType::Integer)
                .attached("Column", ValueType::Integer)
                .activatable::<Grid>(),
        )
        .with(
            TypeDescriptor::new("Collection")
                .collection()
                .member(standard("Collection", "Title", string))
                .activatable::<Collection>(),
        )
        .with(
            TypeDescriptor::new("Setter")
                .member(standard("Setter", "Property", string))
                .member(standard("Setter", "Value", string).depends_on("Property"))
                .activatable::<Setter>(),
        )
        .with(
            TypeDescriptor::new("Knot")
                .member(standard("Knot", "Left", string).depends_on("Right"))
                .member(standard("Knot", "Right", string).depends_on("Left"))
                .activatable::<Knot>(),
        )
        .with(TypeDescriptor::new("MyImmutable").constructor(1, |args| {
            Ok(ObjectRef::new(MyImmutable {
                text: single_argument("MyImmutable", args)?,
            }))
        }))
        .with(
            TypeDescriptor::new("SimpleExtension")
                .extension()
                .member(standard("SimpleExtension", "Property", string))
                .activatable::<SimpleExtension>(),
        )
        .with(
            TypeDescriptor::new("CollectionExtension")
                .extension()
                .activatable::<CollectionExtension>(),
        )
        .with(
            TypeDescriptor::new("ParametrizedExtension")
                .extension()
                .constructor(1, |args| {
                    Ok(ObjectRef::new(ParametrizedExtension {
                        text: single_argument("ParametrizedExtension", args)?,
                    }))
                }),
        )
        .with(
            TypeDescriptor::new("Reference")
                .extension()
                .member(standard("Reference", "Target", string))
                .activatable::<Reference>(),
        )
        .with(
            TypeDescriptor::new("AmbientLookup")
                .extension()
                .member(standard("AmbientLookup", "Member", string))
                .activatable::<AmbientLookup>(),
        )
        .with(
            TypeDescriptor::new("DataTemplate")
                .member(data_template_content())
                .activatable::<DataTemplate>(),
        )
}
