//! Runtime values and shared object references.

use crate::instance::Instance;
use crate::types::TypeId;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

/// A shared reference to a constructed instance.
///
/// Instances belong to one build and one thread. Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<dyn Instance>>);

impl ObjectRef {
    pub fn new<T: Instance>(instance: T) -> Self {
        Self(Rc::new(RefCell::new(instance)))
    }

    pub fn borrow(&self) -> Ref<'_, dyn Instance> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, dyn Instance> {
        self.0.borrow_mut()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    /// A non-owning reference to the same instance.
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Rc::downgrade(&self.0))
    }

    /// A stable key for identity-keyed maps, valid while this reference lives.
    pub fn key(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn instance_type(&self) -> TypeId {
        self.0.borrow().instance_type()
    }

    pub fn is<T: Instance>(&self) -> bool {
        let guard = self.0.borrow();
        let instance: &dyn Instance = &*guard;
        instance.as_any().is::<T>()
    }

    /// Run `f` against the concrete instance, if it is a `T`.
    pub fn with<T: Instance, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.0.borrow();
        let instance: &dyn Instance = &*guard;
        instance.as_any().downcast_ref::<T>().map(f)
    }

    /// Run `f` against the concrete instance mutably, if it is a `T`.
    pub fn with_mut<T: Instance, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.0.borrow_mut();
        let instance: &mut dyn Instance = &mut *guard;
        instance.as_any_mut().downcast_mut::<T>().map(f)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(instance) => fmt::Debug::fmt(&*instance, f),
            Err(_) => write!(f, "ObjectRef(<borrowed>)"),
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// A non-owning [`ObjectRef`], for back-references into the object graph.
#[derive(Clone)]
pub struct WeakObjectRef(Weak<RefCell<dyn Instance>>);

impl WeakObjectRef {
    /// The instance, if it is still alive.
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }

    pub fn ptr_eq(&self, other: &WeakObjectRef) -> bool {
        std::ptr::addr_eq(self.0.as_ptr(), other.0.as_ptr())
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(instance) => write!(f, "Weak({instance:?})"),
            None => f.write_str("Weak(<dropped>)"),
        }
    }
}

/// A wired event handler: a handler name on a target instance.
///
/// The target is usually the root of the graph that holds the handler, so
/// it is held weakly.
#[derive(Clone)]
pub struct EventHandler {
    handler: String,
    target: WeakObjectRef,
}

impl EventHandler {
    pub fn new(handler: impl Into<String>, target: &ObjectRef) -> Self {
        Self {
            handler: handler.into(),
            target: target.downgrade(),
        }
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// The target instance, unless it has been dropped.
    pub fn target(&self) -> Option<ObjectRef> {
        self.target.upgrade()
    }

    /// Call the handler on its target. Returns `false` if the target is gone
    /// or no longer recognises the handler.
    pub fn invoke(&self, sender: &ObjectRef) -> bool {
        let Some(target) = self.target() else {
            return false;
        };
        target.borrow_mut().invoke_handler(&self.handler, sender)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.handler == other.handler && self.target.ptr_eq(&other.target)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({})", self.handler)
    }
}

/// A resolved member value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Type(TypeId),
    Object(ObjectRef),
    List(Vec<Value>),
    Handler(EventHandler),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short description of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Type(_) => "type",
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Handler(_) => "handler",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Handler(a), Value::Handler(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}
