//! Raw markup in, object graph out.

use crate::builder::ObjectBuilder;
use std::sync::Arc;
use weaver_config::WeaverConfig;
use weaver_core::{
    Activator, BuildContext, ConstructionNode, MetadataProvider, ObjectRef, Result, ValueConverter,
};
use weaver_markup::{AssignmentExtractor, RawElement};

/// Extraction followed by building, with one shared configuration.
pub struct MarkupLoader {
    extractor: AssignmentExtractor,
    builder: ObjectBuilder,
}

impl MarkupLoader {
    pub fn new(builder: ObjectBuilder) -> Self {
        let extractor = AssignmentExtractor::new(
            builder.metadata().clone(),
            builder.config().extraction.clone(),
        );
        Self { extractor, builder }
    }

    /// A loader whose host services are one type registry.
    pub fn from_registry<R>(registry: Arc<R>, config: WeaverConfig) -> Self
    where
        R: MetadataProvider + Activator + ValueConverter + 'static,
    {
        Self::new(ObjectBuilder::from_registry(registry).with_config(config))
    }

    pub fn builder(&self) -> &ObjectBuilder {
        &self.builder
    }

    /// Access to the builder, e.g. for registering deferred loaders.
    pub fn builder_mut(&mut self) -> &mut ObjectBuilder {
        &mut self.builder
    }

    pub fn extract(&self, element: &RawElement) -> Result<ConstructionNode> {
        self.extractor.extract(element)
    }

    pub fn load(&self, element: &RawElement, ctx: &mut BuildContext) -> Result<ObjectRef> {
        let node = self.extract(element)?;
        self.builder.build(&node, ctx)
    }

    /// Load `element` into the caller's `root` instance.
    pub fn load_into(
        &self,
        element: &RawElement,
        root: ObjectRef,
        ctx: &mut BuildContext,
    ) -> Result<ObjectRef> {
        let node = self.extract(element)?;
        self.builder.build_into(&node, root, ctx)
    }
}
