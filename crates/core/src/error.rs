//! Error types for the Weaver construction pipeline.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each pipeline stage has its own error variant; every failure is fatal for
//! the build it occurs in and is reported once, at the top-level call.

use thiserror::Error;

/// The top-level error type for all Weaver operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Instruction ordering ---
    #[error("Structural ordering error: {0}")]
    Structure(#[from] StructureError),

    // --- Assignment extraction ---
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    // --- Dependency sorting ---
    #[error("Dependency cycle among members of '{owner}': {}", .members.join(", "))]
    DependencyCycle { owner: String, members: Vec<String> },

    // --- Type resolution ---
    #[error("Type resolution error: unknown type '{name}'")]
    TypeResolution { name: String },

    // --- Activation ---
    #[error("Construction failure: {0}")]
    Activation(#[from] ActivationError),

    // --- Literal conversion ---
    #[error("Conversion failure: {0}")]
    Conversion(#[from] ConversionError),

    // --- Member assignment ---
    #[error("Member error: {0}")]
    Member(#[from] MemberError),

    // --- Names ---
    #[error("Namescope error: {0}")]
    Namescope(#[from] NamescopeError),

    // --- Value-producing extensions ---
    #[error("Extension error: {0}")]
    Extension(#[from] ExtensionError),

    // --- Deferred sub-assembly ---
    #[error("Deferred assembly error: {0}")]
    Deferred(#[from] DeferredError),

    // --- Configuration ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Stage errors ---

/// Violations of the start/end pairing rules of an instruction stream.
#[derive(Debug, Clone, Error)]
pub enum StructureError {
    #[error("object '{type_name}' started after the root object was closed; only one root object is allowed")]
    RootAlreadyClosed { type_name: String },

    #[error("object '{type_name}' started while root '{root}' is still open without an open member")]
    SecondRoot { type_name: String, root: String },

    #[error("object '{type_name}' started inside '{parent}' without an open member")]
    ObjectWithoutMember { type_name: String, parent: String },

    #[error("member '{member}' started with no open object")]
    MemberWithoutObject { member: String },

    #[error("member '{member}' started while member '{open}' is still open")]
    MemberAlreadyOpen { member: String, open: String },

    #[error("value '{value}' supplied with no open member")]
    ValueWithoutMember { value: String },

    #[error("end-member with no matching start-member")]
    UnmatchedEndMember,

    #[error("end-object with no matching start-object")]
    UnmatchedEndObject,

    #[error("end-object while member '{member}' is still open")]
    EndObjectWithOpenMember { member: String },

    #[error("get-object for member '{member}' found no current value")]
    GetObjectWithoutValue { member: String },

    #[error("nesting depth exceeds the configured limit of {max_depth}")]
    TooDeep { max_depth: usize },

    #[error("instruction stream ended with {open_levels} open level(s)")]
    Incomplete { open_levels: usize },

    #[error("instruction stream produced no root object")]
    NoRoot,
}

/// Failures while turning a raw element into member assignments.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("content of '{type_name}' is interleaved with property element '{member}'")]
    ContentContiguity { type_name: String, member: String },

    #[error("'{type_name}' has a single-valued content member but {count} content children")]
    AmbiguousContent { type_name: String, count: usize },

    #[error("'{type_name}' has element content but no content member")]
    NoContentMember { type_name: String },

    #[error("'{type_name}' has no member named '{member}'")]
    UnknownMember { type_name: String, member: String },

    #[error("content of '{type_name}' mixes text and elements")]
    MixedContent { type_name: String },

    #[error("member '{member}' of '{type_name}' is not a collection and received no value")]
    EmptyAssignment { type_name: String, member: String },

    #[error("property element '{inner}' cannot appear inside property element '{outer}'")]
    NestedPropertyElement { outer: String, inner: String },

    #[error("'{label}' is not a valid member label")]
    InvalidLabel { label: String },
}

#[derive(Debug, Clone, Error)]
pub enum ActivationError {
    #[error("no constructor of '{type_name}' accepts {arity} argument(s)")]
    NoMatchingConstructor { type_name: String, arity: usize },

    #[error("type '{type_name}' is not activatable")]
    NotActivatable { type_name: String },

    #[error("constructor of '{type_name}' failed: {reason}")]
    Failed { type_name: String, reason: String },
}

#[derive(Debug, Clone, Error)]
#[error("cannot convert '{value}' to {target} for member '{member}': {reason}")]
pub struct ConversionError {
    pub member: String,
    pub value: String,
    pub target: String,
    pub reason: String,
}

#[derive(Debug, Clone, Error)]
pub enum MemberError {
    #[error("setting '{member}' failed: {reason}")]
    SetFailed { member: String, reason: String },

    #[error("'{target}' does not accept attached member '{member}'")]
    NotAttachable { member: String, target: String },

    #[error("member '{member}' does not expose a collection to append to")]
    NotCollection { member: String },

    #[error("member '{member}' expects a single value but received {count}")]
    UnexpectedValueCount { member: String, count: usize },

    #[error("handler '{handler}' for event '{member}' is not exposed by the root instance")]
    UnknownHandler { member: String, handler: String },

    #[error("'{type_name}' is declared {capability} but its instance does not expose it")]
    MissingCapability {
        type_name: String,
        capability: &'static str,
    },
}

#[derive(Debug, Clone, Error)]
pub enum NamescopeError {
    #[error("name '{name}' is already registered in this namescope")]
    DuplicateName { name: String },

    #[error("namescope {0} does not exist")]
    UnknownScope(usize),
}

#[derive(Debug, Clone, Error)]
#[error("extension '{extension}' failed to provide a value: {reason}")]
pub struct ExtensionError {
    pub extension: String,
    pub reason: String,
}

#[derive(Debug, Clone, Error)]
pub enum DeferredError {
    #[error("a deferred loader is already registered for '{member}'")]
    DuplicateLoader { member: String },

    #[error("member '{member}' is declared deferred but no loader is registered")]
    MissingLoader { member: String },

    #[error("deferred loader for '{member}' failed: {reason}")]
    LoadFailed { member: String, reason: String },
}
