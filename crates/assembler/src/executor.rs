//! The object assembler: executes an instruction stream against a frame
//! stack, resolving values and committing them to instances.
//!
//! Instances are created lazily, on the first start-member or at end-object,
//! so that constructor arguments and a supplied root instance are known
//! first. Members with a registered deferred loader switch the assembler into
//! recording mode until their matching end-member.

use crate::frame::FrameStack;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use weaver_config::{RootScopePolicy, WeaverConfig};
use weaver_core::{
    Activator, BuildContext, DeferredError, DeferredLoader, DeferredLoaders, Error, EventHandler,
    ExtensionContext, Instruction, Member, MemberError, MetadataProvider, ObjectRef, ObjectStart,
    RecordedInstructions, Result, ScopeId, StructureError, TypeId, Value, ValueConverter,
};

/// The host services and settings an assembly runs with.
#[derive(Clone)]
pub struct AssemblerServices {
    pub metadata: Arc<dyn MetadataProvider>,
    pub activator: Arc<dyn Activator>,
    pub converter: Arc<dyn ValueConverter>,
    pub loaders: DeferredLoaders,
    pub config: WeaverConfig,
}

impl std::fmt::Debug for AssemblerServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblerServices")
            .field("loaders", &self.loaders)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Instructions captured for a deferred member.
struct Recording {
    member: Member,
    loader: Arc<dyn DeferredLoader>,
    depth: usize,
    buffer: Vec<Instruction>,
}

fn structural(error: StructureError) -> Error {
    warn!(error = %error, "instruction stream is malformed");
    Error::Structure(error)
}

fn missing_capability(type_id: &TypeId, capability: &'static str) -> Error {
    MemberError::MissingCapability {
        type_name: type_id.to_string(),
        capability,
    }
    .into()
}

/// The value recorded in the ambient registry for one committed member.
fn ambient_value(values: &[Value]) -> Value {
    match values {
        [single] => single.clone(),
        many => Value::List(many.to_vec()),
    }
}

/// Append `values` to the collection exposed by `target`, flattening lists.
fn append_all(target: &ObjectRef, member: &Member, values: Vec<Value>) -> Result<()> {
    let mut guard = target.borrow_mut();
    let collection = guard
        .as_collection_mut()
        .ok_or_else(|| MemberError::NotCollection {
            member: member.qualified_name(),
        })?;
    for value in values {
        match value {
            Value::List(items) => {
                for item in items {
                    collection.append(item)?;
                }
            }
            item => collection.append(item)?,
        }
    }
    Ok(())
}

fn exposes_collection(instance: &ObjectRef) -> bool {
    instance.borrow_mut().as_collection_mut().is_some()
}

/// Set a single member value, through the attached store when needed.
fn set(instance: &ObjectRef, member: &Member, value: Value) -> Result<()> {
    let mut guard = instance.borrow_mut();
    if member.is_attached() {
        guard.set_attached(member, value)?;
    } else {
        guard.set_member(member, value)?;
    }
    Ok(())
}

/// Executes one instruction stream. Owned by one build.
pub struct ObjectAssembler<'a> {
    services: &'a AssemblerServices,
    ctx: &'a mut BuildContext,
    frames: FrameStack,
    root_instance: Option<ObjectRef>,
    base_scope: Option<ScopeId>,
    result: Option<ObjectRef>,
    recording: Option<Recording>,
}

impl<'a> ObjectAssembler<'a> {
    pub fn new(services: &'a AssemblerServices, ctx: &'a mut BuildContext) -> Self {
        Self {
            services,
            ctx,
            frames: FrameStack::new(services.config.limits.max_depth),
            root_instance: None,
            base_scope: None,
            result: None,
            recording: None,
        }
    }

    /// Populate `root` instead of activating the level-1 object.
    pub fn with_root_instance(mut self, root: ObjectRef) -> Self {
        self.root_instance = Some(root);
        self
    }

    /// Use `scope` as the enclosing namescope of the level-1 object instead
    /// of the context's document scope.
    pub fn with_base_scope(mut self, scope: ScopeId) -> Self {
        self.base_scope = Some(scope);
        self
    }

    pub fn level(&self) -> usize {
        self.frames.level()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn process_all<I>(&mut self, instructions: I) -> Result<()>
    where
        I: IntoIterator<Item = Instruction>,
    {
        for instruction in instructions {
            self.process(instruction)?;
        }
        Ok(())
    }

    pub fn process(&mut self, instruction: Instruction) -> Result<()> {
        if self.services.config.diagnostics.trace_instructions {
            trace!(
                level = self.frames.level(),
                recording = self.recording.is_some(),
                instruction = %instruction,
                "instruction"
            );
        }

        if self.recording.is_some() {
            return self.record(instruction);
        }

        match instruction {
            Instruction::StartObject(start) => self.start_object(start),
            Instruction::GetObject => self.get_object(),
            Instruction::StartMember(member) => self.start_member(member),
            Instruction::Value(literal) => self.value(&literal),
            Instruction::EndMember => self.end_member(),
            Instruction::EndObject => self.end_object(),
        }
    }

    /// The root instance, once the stream is complete.
    pub fn finish(self) -> Result<ObjectRef> {
        let open_levels = self.frames.level() + usize::from(self.recording.is_some());
        if open_levels > 0 {
            return Err(structural(StructureError::Incomplete { open_levels }));
        }
        self.result.ok_or_else(|| structural(StructureError::NoRoot))
    }

    // --- Recording ---

    fn record(&mut self, instruction: Instruction) -> Result<()> {
        let Some(recording) = self.recording.as_mut() else {
            return Ok(());
        };

        match instruction {
            Instruction::StartMember(_) => recording.depth += 1,
            Instruction::EndMember if recording.depth == 1 => {
                return match self.recording.take() {
                    Some(recording) => self.finish_recording(recording),
                    None => Ok(()),
                };
            }
            Instruction::EndMember => recording.depth -= 1,
            _ => {}
        }
        recording.buffer.push(instruction);
        Ok(())
    }

    fn finish_recording(&mut self, recording: Recording) -> Result<()> {
        debug!(
            member = %recording.member,
            instructions = recording.buffer.len(),
            "deferred member recorded"
        );
        let value = recording
            .loader
            .load(&recording.member, RecordedInstructions::from(recording.buffer))?;
        if let Some(frame) = self.frames.current_mut() {
            frame.values.push(value);
        }
        self.end_member()
    }

    // --- Instructions ---

    fn start_object(&mut self, start: ObjectStart) -> Result<()> {
        if self.services.metadata.resolve_type(start.type_id.name()).is_none() {
            return Err(Error::TypeResolution {
                name: start.type_id.to_string(),
            });
        }

        let is_root = self.frames.level() == 0;
        let frame = self.frames.open(&start.type_id).map_err(structural)?;
        frame.name = start.name;
        frame.arguments = start.arguments;

        if is_root {
            if let Some(root) = self.root_instance.take() {
                let type_id = root.instance_type();
                debug!(declared = %start.type_id, runtime = %type_id, "populating supplied root");
                self.adopt(root, type_id, true)?;
            }
        }
        Ok(())
    }

    fn get_object(&mut self) -> Result<()> {
        let (member, instance, scope) = match self.frames.current() {
            Some(frame) => match (&frame.member, &frame.instance) {
                (Some(member), Some(instance)) => (member.clone(), instance.clone(), frame.scope),
                (member, _) => {
                    return Err(structural(StructureError::GetObjectWithoutValue {
                        member: member
                            .as_ref()
                            .map(Member::qualified_name)
                            .unwrap_or_default(),
                    }));
                }
            },
            None => {
                return Err(structural(StructureError::GetObjectWithoutValue {
                    member: String::new(),
                }));
            }
        };

        let current = instance.borrow().get_member(&member);
        let Some(Value::Object(target)) = current else {
            return Err(structural(StructureError::GetObjectWithoutValue {
                member: member.qualified_name(),
            }));
        };

        if let Some(frame) = self.frames.current_mut() {
            frame.retrieved = Some(Value::Object(target.clone()));
        }

        let collection = exposes_collection(&target).then(|| target.clone());
        let frame = self
            .frames
            .open(&target.instance_type())
            .map_err(structural)?;
        frame.instance = Some(target);
        frame.get_object = true;
        frame.collection = collection;
        frame.scope = scope;
        Ok(())
    }

    fn start_member(&mut self, member: Member) -> Result<()> {
        match self.frames.current() {
            None => {
                return Err(structural(StructureError::MemberWithoutObject {
                    member: member.qualified_name(),
                }));
            }
            Some(frame) => {
                if let Some(open) = &frame.member {
                    return Err(structural(StructureError::MemberAlreadyOpen {
                        member: member.qualified_name(),
                        open: open.qualified_name(),
                    }));
                }
            }
        }

        self.ensure_instance()?;

        let loader = self.services.loaders.get(&member);
        if loader.is_none() && member.is_deferred() {
            return Err(DeferredError::MissingLoader {
                member: member.qualified_name(),
            }
            .into());
        }

        if let Some(frame) = self.frames.current_mut() {
            frame.member = Some(member.clone());
            frame.values.clear();
            frame.retrieved = None;
        }

        if let Some(loader) = loader {
            self.recording = Some(Recording {
                member,
                loader,
                depth: 1,
                buffer: Vec::new(),
            });
        }
        Ok(())
    }

    fn value(&mut self, literal: &str) -> Result<()> {
        let Some(member) = self.frames.current().and_then(|f| f.member.clone()) else {
            return Err(structural(StructureError::ValueWithoutMember {
                value: literal.to_string(),
            }));
        };

        let value = if member.is_event() {
            self.wire_handler(&member, literal)?
        } else {
            self.services.converter.convert(&member, literal)?
        };

        if let Some(frame) = self.frames.current_mut() {
            frame.values.push(value);
        }
        Ok(())
    }

    fn end_member(&mut self) -> Result<()> {
        let Some(frame) = self.frames.current_mut() else {
            return Err(structural(StructureError::UnmatchedEndMember));
        };
        let Some(member) = frame.member.take() else {
            return Err(structural(StructureError::UnmatchedEndMember));
        };
        let values = std::mem::take(&mut frame.values);
        let retrieved = frame.retrieved.take();
        let collection = frame.collection.clone();
        let Some(instance) = frame.instance.clone() else {
            return Err(structural(StructureError::UnmatchedEndMember));
        };

        let recorded = self.commit(&instance, collection.as_ref(), &member, values, retrieved)?;
        self.ctx.ambient_mut().record(&member, recorded, &instance);
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        let level = self.frames.level();
        match self.frames.current() {
            None => return Err(structural(StructureError::UnmatchedEndObject)),
            Some(frame) => {
                if let Some(open) = &frame.member {
                    return Err(structural(StructureError::EndObjectWithOpenMember {
                        member: open.qualified_name(),
                    }));
                }
                if frame.get_object {
                    self.frames.close();
                    return Ok(());
                }
            }
        }

        let instance = self.ensure_instance()?;
        let (type_id, name, scope, supplied) = match self.frames.current() {
            Some(frame) => (
                frame.type_id.clone(),
                frame.name.clone(),
                frame.scope,
                frame.supplied,
            ),
            None => return Err(structural(StructureError::UnmatchedEndObject)),
        };
        let metadata = &self.services.metadata;

        if metadata.is_lifecycle_aware(&type_id) {
            self.ctx.lifecycle_mut().notify_created(&instance);
        }

        if let Some(name) = name {
            // A nested boundary is named in the scope around it, not its own.
            let target = if level > 1 && metadata.is_namescope_boundary(&type_id) {
                self.frames.parent().and_then(|f| f.scope)
            } else {
                scope
            };
            if let Some(target) = target {
                self.ctx.namescopes_mut().register(target, &name, &instance)?;
            }
        }

        let value = if level > 1 && metadata.is_value_producing_extension(&type_id) {
            self.provide_value(&type_id, &instance, scope)?
        } else {
            Value::Object(instance.clone())
        };

        self.frames.close();
        match self.frames.current_mut() {
            Some(parent) => parent.values.push(value),
            None => {
                debug!(root = %type_id, supplied, "root object closed");
                self.result = Some(instance);
            }
        }
        Ok(())
    }

    // --- Helpers ---

    /// The current frame's instance, activating it if still pending.
    fn ensure_instance(&mut self) -> Result<ObjectRef> {
        let (type_id, arguments) = match self.frames.current() {
            Some(frame) => {
                if let Some(instance) = &frame.instance {
                    return Ok(instance.clone());
                }
                (frame.type_id.clone(), frame.arguments.clone())
            }
            None => return Err(structural(StructureError::UnmatchedEndObject)),
        };

        let instance = self.services.activator.activate(&type_id, &arguments)?;
        trace!(type_name = %type_id, arguments = arguments.len(), "instance activated");

        if self.services.metadata.is_lifecycle_aware(&type_id)
            && !self.ctx.lifecycle_mut().notify_begin_init(&instance)
        {
            return Err(missing_capability(&type_id, "lifecycle-aware"));
        }

        self.adopt(instance.clone(), type_id, false)?;
        Ok(instance)
    }

    /// Install `instance` in the current frame: namescope and collection.
    fn adopt(&mut self, instance: ObjectRef, type_id: TypeId, supplied: bool) -> Result<()> {
        let scope = self.scope_for(&type_id, &instance, supplied);

        let collection = exposes_collection(&instance);
        if !collection && self.services.metadata.is_collection_type(&type_id) {
            return Err(missing_capability(&type_id, "a collection"));
        }

        if let Some(frame) = self.frames.current_mut() {
            frame.type_id = type_id;
            frame.collection = collection.then(|| instance.clone());
            frame.instance = Some(instance);
            frame.supplied = supplied;
            frame.scope = Some(scope);
        }
        Ok(())
    }

    /// The namescope in effect for a newly installed instance.
    fn scope_for(&mut self, type_id: &TypeId, instance: &ObjectRef, supplied: bool) -> ScopeId {
        let parent_scope = match self.frames.parent() {
            Some(frame) => frame.scope,
            None => self.base_scope,
        };
        let boundary = self.services.metadata.is_namescope_boundary(type_id);
        let policy = self.services.config.namescope.root_instance_policy;
        let namescopes = self.ctx.namescopes_mut();

        if boundary && !(supplied && policy == RootScopePolicy::Inherit) {
            return namescopes.create_scope(Some(instance), parent_scope);
        }

        let scope = match parent_scope {
            Some(scope) => scope,
            None if supplied => namescopes
                .scope_of(instance)
                .unwrap_or_else(|| namescopes.document_scope()),
            None => namescopes.document_scope(),
        };
        namescopes.enter(instance, scope);
        scope
    }

    /// Commit the pending values of `member`. Returns the ambient value.
    fn commit(
        &self,
        instance: &ObjectRef,
        collection: Option<&ObjectRef>,
        member: &Member,
        mut values: Vec<Value>,
        retrieved: Option<Value>,
    ) -> Result<Value> {
        if member.is_items() {
            let target =
                collection.ok_or_else(|| missing_capability(&instance.instance_type(), "a collection"))?;
            let recorded = ambient_value(&values);
            append_all(target, member, values)?;
            return Ok(recorded);
        }

        if self.services.metadata.is_collection_target(member) {
            let existing = instance.borrow().get_member(member);
            if let Some(Value::Object(target)) = existing {
                if exposes_collection(&target) {
                    let recorded = if values.is_empty() {
                        Value::Object(target.clone())
                    } else {
                        ambient_value(&values)
                    };
                    append_all(&target, member, values)?;
                    return Ok(recorded);
                }
            }

            let value = if values.len() == 1 && matches!(values[0], Value::List(_)) {
                values.swap_remove(0)
            } else {
                Value::List(values)
            };
            set(instance, member, value.clone())?;
            return Ok(value);
        }

        if values.is_empty() {
            if let Some(retrieved) = retrieved {
                return Ok(retrieved);
            }
        }
        if values.len() != 1 {
            return Err(MemberError::UnexpectedValueCount {
                member: member.qualified_name(),
                count: values.len(),
            }
            .into());
        }
        let value = values.swap_remove(0);
        set(instance, member, value.clone())?;
        Ok(value)
    }

    /// Resolve an event literal to a handler on the level-1 root instance.
    fn wire_handler(&self, member: &Member, handler: &str) -> Result<Value> {
        let root = self.frames.root().and_then(|f| f.instance.clone());
        match root {
            Some(root) if root.borrow().handles(handler) => {
                Ok(Value::Handler(EventHandler::new(handler, &root)))
            }
            _ => Err(MemberError::UnknownHandler {
                member: member.qualified_name(),
                handler: handler.to_string(),
            }
            .into()),
        }
    }

    fn provide_value(
        &self,
        type_id: &TypeId,
        instance: &ObjectRef,
        scope: Option<ScopeId>,
    ) -> Result<Value> {
        let parent = self.frames.parent();
        let context = ExtensionContext::new(&*self.ctx)
            .with_target(
                parent.and_then(|f| f.instance.as_ref()),
                parent.and_then(|f| f.member.as_ref()),
            )
            .with_scope(scope)
            .with_root(self.frames.root().and_then(|f| f.instance.as_ref()));

        let guard = instance.borrow();
        let provider = guard
            .as_value_provider()
            .ok_or_else(|| missing_capability(type_id, "a value-producing extension"))?;
        Ok(provider.provide_value(&context)?)
    }
}
