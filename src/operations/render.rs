//! Pixel codec boundary used by the built-in operations.

use crate::error::OperationError;

/// Filter applied by the `filter` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Blur,
    Sharpen,
    Grayscale,
}

impl FilterKind {
    pub fn parse(raw: &str) -> Result<Self, OperationError> {
        match raw {
            "blur" => Ok(FilterKind::Blur),
            "sharpen" => Ok(FilterKind::Sharpen),
            "grayscale" => Ok(FilterKind::Grayscale),
            other => Err(OperationError::InvalidParameterValue {
                name: "filter_type".to_string(),
                reason: format!("unknown filter type: {other}"),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Blur => "blur",
            FilterKind::Sharpen => "sharpen",
            FilterKind::Grayscale => "grayscale",
        }
    }
}

/// PNG compression level derived from a 0-100 quality value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngCompression {
    Default,
    None,
    BestSpeed,
    BestCompression,
}

impl PngCompression {
    /// Below 20 compresses hardest, above 80 favors speed, the open range in
    /// between uses the default, and exactly 20 or 80 disables compression.
    pub fn from_quality(quality: i64) -> Self {
        if quality < 20 {
            PngCompression::BestCompression
        } else if quality > 20 && quality < 80 {
            PngCompression::Default
        } else if quality > 80 {
            PngCompression::BestSpeed
        } else {
            PngCompression::None
        }
    }
}

/// Fully-typed description of one transform.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPlan {
    Resize { width: u32, height: u32 },
    Thumbnail { size: u32 },
    Filter { kind: FilterKind, intensity: f64 },
    Convert {
        format: String,
        quality: i64,
        png: Option<PngCompression>,
    },
}

impl RenderPlan {
    /// Output file name for the image stored under `key`.
    pub fn output_name(&self, key: &str) -> String {
        match self {
            RenderPlan::Resize { width, height } => format!("{key}_resized_{width}x{height}.jpg"),
            RenderPlan::Thumbnail { size } => format!("{key}_thumb_{size}.jpg"),
            RenderPlan::Filter { kind, .. } => format!("{key}_filter_{}.jpg", kind.as_str()),
            RenderPlan::Convert { format, .. } => format!("{key}_converted.{format}"),
        }
    }
}

/// Decodes, transforms and re-encodes image bytes.
pub trait Codec: Send + Sync + 'static {
    fn render(&self, input: &[u8], plan: &RenderPlan) -> Result<Vec<u8>, OperationError>;
}

/// Re-emits the input unchanged. Lets tests exercise naming, sinks and
/// records without real image data; the service uses `ImageCodec`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCodec;

impl Codec for PassthroughCodec {
    fn render(&self, input: &[u8], plan: &RenderPlan) -> Result<Vec<u8>, OperationError> {
        if input.is_empty() {
            return Err(OperationError::Decode("empty input".to_string()));
        }
        tracing::debug!(?plan, bytes = input.len(), "passthrough render");
        Ok(input.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_kind_parse() {
        assert_eq!(FilterKind::parse("blur").unwrap(), FilterKind::Blur);
        assert_eq!(FilterKind::parse("grayscale").unwrap(), FilterKind::Grayscale);

        let err = FilterKind::parse("sepia").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for parameter filter_type: unknown filter type: sepia"
        );
    }

    #[test]
    fn test_png_compression_bands() {
        assert_eq!(PngCompression::from_quality(5), PngCompression::BestCompression);
        assert_eq!(PngCompression::from_quality(20), PngCompression::None);
        assert_eq!(PngCompression::from_quality(50), PngCompression::Default);
        assert_eq!(PngCompression::from_quality(80), PngCompression::None);
        assert_eq!(PngCompression::from_quality(95), PngCompression::BestSpeed);
    }

    #[test]
    fn test_output_names() {
        assert_eq!(
            RenderPlan::Resize { width: 640, height: 480 }.output_name("img1"),
            "img1_resized_640x480.jpg"
        );
        assert_eq!(RenderPlan::Thumbnail { size: 128 }.output_name("img1"), "img1_thumb_128.jpg");
        assert_eq!(
            RenderPlan::Filter { kind: FilterKind::Sharpen, intensity: 1.0 }.output_name("img1"),
            "img1_filter_sharpen.jpg"
        );
        assert_eq!(
            RenderPlan::Convert { format: "png".into(), quality: 90, png: None }
                .output_name("img1"),
            "img1_converted.png"
        );
    }

    #[test]
    fn test_passthrough_rejects_empty_input() {
        let plan = RenderPlan::Thumbnail { size: 10 };
        assert!(matches!(
            PassthroughCodec.render(&[], &plan),
            Err(OperationError::Decode(_))
        ));
        assert_eq!(PassthroughCodec.render(b"abc", &plan).unwrap(), b"abc".to_vec());
    }
}
