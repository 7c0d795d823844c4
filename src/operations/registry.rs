//! Name-to-operation dispatch table.

use std::collections::HashMap;
use std::sync::Arc;

use super::builtin::{ConvertOp, FilterOp, ResizeOp, ThumbnailOp};
use super::params::{ParamSpec, Params, ValidParams};
use super::{Codec, OutputSink};
use crate::error::OperationError;

// == Operation Trait ==
/// A named transform a worker can apply to resolved input bytes.
///
/// `run` is synchronous and may be CPU-heavy; the pool calls it on the
/// blocking thread pool.
pub trait Operation: Send + Sync + 'static {
    /// Registry key, e.g. `"resize"`.
    fn name(&self) -> &str;

    /// Parameters this operation requires. Checked before `run` is called.
    fn schema(&self) -> &[ParamSpec];

    /// Transforms `input` (the bytes stored under `key`) and returns the
    /// location of the produced output.
    fn run(&self, key: &str, input: &[u8], params: &ValidParams) -> Result<String, OperationError>;
}

// == Operation Registry ==
/// Registry of operations keyed by name. Adding an operation never touches
/// the dispatcher.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    ops: HashMap<String, Arc<dyn Operation>>,
}

impl OperationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `resize`, `thumbnail`, `filter` and `convert`, all
    /// rendering through `codec` and writing to `sink`.
    #[must_use]
    pub fn with_builtins(codec: Arc<dyn Codec>, sink: Arc<dyn OutputSink>) -> Self {
        let mut registry = Self::new();
        registry.register(ResizeOp::new(codec.clone(), sink.clone()));
        registry.register(ThumbnailOp::new(codec.clone(), sink.clone()));
        registry.register(FilterOp::new(codec.clone(), sink.clone()));
        registry.register(ConvertOp::new(codec, sink));
        registry
    }

    /// Registers `op` under its own name, replacing any previous entry.
    pub fn register<O: Operation>(&mut self, op: O) {
        self.register_arc(Arc::new(op));
    }

    pub fn register_arc(&mut self, op: Arc<dyn Operation>) {
        self.ops.insert(op.name().to_string(), op);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.ops.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.ops.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("ops", &self.names())
            .finish()
    }
}

// == Closure Operation ==
type OpFn = dyn Fn(&str, &[u8], &ValidParams) -> Result<String, OperationError> + Send + Sync;

/// Adapter turning a closure into an [`Operation`].
pub struct FnOperation {
    name: String,
    schema: Vec<ParamSpec>,
    func: Box<OpFn>,
}

impl FnOperation {
    pub fn new<F>(name: impl Into<String>, schema: Vec<ParamSpec>, func: F) -> Self
    where
        F: Fn(&str, &[u8], &ValidParams) -> Result<String, OperationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            schema,
            func: Box::new(func),
        }
    }
}

impl Operation for FnOperation {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &[ParamSpec] {
        &self.schema
    }

    fn run(&self, key: &str, input: &[u8], params: &ValidParams) -> Result<String, OperationError> {
        (self.func)(key, input, params)
    }
}

/// Validates `params` against `op`'s schema, then runs it.
pub fn invoke(
    op: &dyn Operation,
    key: &str,
    input: &[u8],
    params: &Params,
) -> Result<String, OperationError> {
    let valid = super::params::validate(op.schema(), params)?;
    op.run(key, input, &valid)
}
