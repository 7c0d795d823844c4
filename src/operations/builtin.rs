//! The stock image operations: resize, thumbnail, filter and convert.

use std::sync::Arc;

use super::params::{ParamKind, ParamSpec, ValidParams};
use super::registry::Operation;
use super::render::{Codec, FilterKind, PngCompression, RenderPlan};
use super::sink::OutputSink;
use crate::error::OperationError;

/// Output formats the `convert` operation can target.
pub const SUPPORTED_FORMATS: &[&str] = &["jpeg", "jpg", "png", "gif", "bmp", "tiff"];

/// Codec and sink shared by every built-in.
#[derive(Clone)]
struct Pipeline {
    codec: Arc<dyn Codec>,
    sink: Arc<dyn OutputSink>,
}

impl Pipeline {
    fn execute(&self, key: &str, input: &[u8], plan: RenderPlan) -> Result<String, OperationError> {
        let rendered = self.codec.render(input, &plan)?;
        self.sink.write(&plan.output_name(key), &rendered)
    }
}

fn dimension(params: &ValidParams, name: &str, allow_zero: bool) -> Result<u32, OperationError> {
    let raw = params.int(name)?;
    let min = if allow_zero { 0 } else { 1 };
    if raw < min || raw > i64::from(u32::MAX) {
        return Err(OperationError::InvalidParameterValue {
            name: name.to_string(),
            reason: format!("{raw} is out of range"),
        });
    }
    Ok(raw as u32)
}

macro_rules! builtin_op {
    ($ty:ident, $name:literal, $schema:expr) => {
        pub struct $ty {
            pipeline: Pipeline,
        }

        impl $ty {
            pub const SCHEMA: &'static [ParamSpec] = $schema;

            pub fn new(codec: Arc<dyn Codec>, sink: Arc<dyn OutputSink>) -> Self {
                Self {
                    pipeline: Pipeline { codec, sink },
                }
            }
        }

        impl Operation for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn schema(&self) -> &[ParamSpec] {
                Self::SCHEMA
            }

            fn run(
                &self,
                key: &str,
                input: &[u8],
                params: &ValidParams,
            ) -> Result<String, OperationError> {
                let plan = Self::plan(params)?;
                self.pipeline.execute(key, input, plan)
            }
        }
    };
}

builtin_op!(
    ResizeOp,
    "resize",
    &[
        ParamSpec::new("width", ParamKind::Integer),
        ParamSpec::new("height", ParamKind::Integer),
    ]
);

impl ResizeOp {
    /// A zero side keeps the aspect ratio; both zero is rejected.
    fn plan(params: &ValidParams) -> Result<RenderPlan, OperationError> {
        let width = dimension(params, "width", true)?;
        let height = dimension(params, "height", true)?;
        if width == 0 && height == 0 {
            return Err(OperationError::InvalidParameterValue {
                name: "width".to_string(),
                reason: "width and height cannot both be zero".to_string(),
            });
        }
        Ok(RenderPlan::Resize { width, height })
    }
}

builtin_op!(
    ThumbnailOp,
    "thumbnail",
    &[ParamSpec::new("size", ParamKind::Integer)]
);

impl ThumbnailOp {
    fn plan(params: &ValidParams) -> Result<RenderPlan, OperationError> {
        Ok(RenderPlan::Thumbnail {
            size: dimension(params, "size", false)?,
        })
    }
}

builtin_op!(
    FilterOp,
    "filter",
    &[
        ParamSpec::new("filter_type", ParamKind::Text),
        ParamSpec::new("intensity", ParamKind::Number),
    ]
);

impl FilterOp {
    fn plan(params: &ValidParams) -> Result<RenderPlan, OperationError> {
        let kind = FilterKind::parse(params.text("filter_type")?)?;
        let intensity = params.number("intensity")?;
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(OperationError::InvalidParameterValue {
                name: "intensity".to_string(),
                reason: format!("{intensity} must be a non-negative number"),
            });
        }
        Ok(RenderPlan::Filter { kind, intensity })
    }
}

builtin_op!(
    ConvertOp,
    "convert",
    &[
        ParamSpec::new("format", ParamKind::Text),
        ParamSpec::new("quality", ParamKind::Integer),
    ]
);

impl ConvertOp {
    fn plan(params: &ValidParams) -> Result<RenderPlan, OperationError> {
        let format = params.text("format")?.to_ascii_lowercase();
        if !SUPPORTED_FORMATS.contains(&format.as_str()) {
            return Err(OperationError::InvalidParameterValue {
                name: "format".to_string(),
                reason: format!("unsupported format: {format}"),
            });
        }
        let quality = params.int("quality")?;
        let png = (format == "png").then(|| PngCompression::from_quality(quality));
        Ok(RenderPlan::Convert {
            format,
            quality,
            png,
        })
    }
}
