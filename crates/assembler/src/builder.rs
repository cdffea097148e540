//! The top-level build API: construction node -> object graph.

use crate::executor::{AssemblerServices, ObjectAssembler};
use crate::stream::InstructionWriter;
use std::sync::Arc;
use tracing::debug;
use weaver_config::WeaverConfig;
use weaver_core::{
    Activator, BuildContext, ConstructionNode, DeferredLoader, Instruction, Member,
    MetadataProvider, ObjectRef, RecordedInstructions, Result, ScopeId, ValueConverter,
};

/// Builds object graphs from construction nodes.
///
/// Holds only shareable services; all per-build state lives in the
/// [`BuildContext`] passed to each call.
#[derive(Debug, Clone)]
pub struct ObjectBuilder {
    services: AssemblerServices,
}

impl ObjectBuilder {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        activator: Arc<dyn Activator>,
        converter: Arc<dyn ValueConverter>,
    ) -> Self {
        Self {
            services: AssemblerServices {
                metadata,
                activator,
                converter,
                loaders: Default::default(),
                config: WeaverConfig::default(),
            },
        }
    }

    /// A builder whose three host services are one type registry.
    pub fn from_registry<R>(registry: Arc<R>) -> Self
    where
        R: MetadataProvider + Activator + ValueConverter + 'static,
    {
        Self::new(registry.clone(), registry.clone(), registry)
    }

    pub fn with_config(mut self, config: WeaverConfig) -> Self {
        self.services.config = config;
        self
    }

    pub fn config(&self) -> &WeaverConfig {
        &self.services.config
    }

    pub fn metadata(&self) -> &Arc<dyn MetadataProvider> {
        &self.services.metadata
    }

    /// Route `member` to `loader` instead of assembling it in place.
    pub fn register_deferred(&mut self, member: Member, loader: Arc<dyn DeferredLoader>) -> Result<()> {
        self.services.loaders.register(member, loader)?;
        Ok(())
    }

    /// Build `node` into fresh instances.
    pub fn build(&self, node: &ConstructionNode, ctx: &mut BuildContext) -> Result<ObjectRef> {
        debug!(root = %node.type_id, nodes = node.node_count(), "build started");
        let instructions = InstructionWriter::write(node)?;
        self.execute(instructions, None, ctx)
    }

    /// Build `node` into the caller's `root` instance. Returns `root`.
    ///
    /// A failure can leave `root` partly populated.
    pub fn build_into(
        &self,
        node: &ConstructionNode,
        root: ObjectRef,
        ctx: &mut BuildContext,
    ) -> Result<ObjectRef> {
        debug!(root = %node.type_id, instance = %root.instance_type(), "build into instance started");
        let instructions = InstructionWriter::write(node)?;
        self.execute(instructions, Some(root), ctx)
    }

    /// Assemble a recorded instruction stream, e.g. template content, into
    /// fresh instances. Can be repeated any number of times.
    ///
    /// Each run gets its own unowned namescope, so names inside the content
    /// never collide across runs or with the caller's document.
    pub fn materialize(
        &self,
        instructions: &RecordedInstructions,
        ctx: &mut BuildContext,
    ) -> Result<ObjectRef> {
        let scope = ctx.namescopes_mut().create_scope(None, None);
        debug!(
            instructions = instructions.len(),
            scope = scope.index(),
            "materializing recorded instructions"
        );
        self.run(instructions.iter().cloned(), None, Some(scope), ctx)
    }

    /// Run a raw instruction stream.
    pub fn execute<I>(&self, instructions: I, root: Option<ObjectRef>, ctx: &mut BuildContext) -> Result<ObjectRef>
    where
        I: IntoIterator<Item = Instruction>,
    {
        self.run(instructions, root, None, ctx)
    }

    fn run<I>(
        &self,
        instructions: I,
        root: Option<ObjectRef>,
        base_scope: Option<ScopeId>,
        ctx: &mut BuildContext,
    ) -> Result<ObjectRef>
    where
        I: IntoIterator<Item = Instruction>,
    {
        let mut assembler = ObjectAssembler::new(&self.services, ctx);
        if let Some(root) = root {
            assembler = assembler.with_root_instance(root);
        }
        if let Some(scope) = base_scope {
            assembler = assembler.with_base_scope(scope);
        }
        assembler.process_all(instructions)?;
        let result = assembler.finish()?;
        debug!(
            root = %result.instance_type(),
            scopes = ctx.namescopes().scope_count(),
            ambient = ctx.ambient().len(),
            "build finished"
        );
        Ok(result)
    }
}
