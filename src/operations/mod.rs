//! Operations Module
//!
//! Named, pluggable transforms invoked by the workers, their parameter
//! schemas, and the stock image operations.

mod builtin;
mod image_codec;
mod params;
mod registry;
mod render;
mod sink;

pub use builtin::{ConvertOp, FilterOp, ResizeOp, ThumbnailOp, SUPPORTED_FORMATS};
pub use image_codec::{ImageCodec, DEFAULT_JPEG_QUALITY, MAX_OUTPUT_PIXELS};
pub use params::{params, validate, ParamKind, ParamSpec, ParamValue, Params, ValidParams};
pub use registry::{invoke, FnOperation, Operation, OperationRegistry};
pub use render::{Codec, FilterKind, PassthroughCodec, PngCompression, RenderPlan};
pub use sink::{DirectorySink, OutputSink};
