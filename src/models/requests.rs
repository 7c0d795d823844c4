//! Request DTOs for the image job API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::operations::Params;

/// Request body for `POST /process/:operation`
///
/// Every field other than `image_id` is passed to the operation as a
/// parameter, e.g. `{"image_id": "cat", "width": 640, "height": 480}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRequest {
    /// Key of the original image
    #[serde(default)]
    pub image_id: String,
    #[serde(flatten)]
    pub parameters: Params,
}

impl ProcessRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.image_id.trim().is_empty() {
            return Some("image_id is required".to_string());
        }
        None
    }
}

/// Request body for `POST /cache`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheWarmRequest {
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub image_ids: Vec<String>,
}

impl CacheWarmRequest {
    /// All requested keys, in order, without blanks or repeats.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for key in self.image_id.iter().chain(self.image_ids.iter()) {
            let key = key.trim();
            if !key.is_empty() && !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::ParamValue;

    #[test]
    fn test_process_request_collects_parameters() {
        let json = r#"{"image_id": "cat", "width": 640, "height": 480.5, "format": "png"}"#;
        let req: ProcessRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.image_id, "cat");
        assert_eq!(req.parameters.len(), 3);
        assert_eq!(req.parameters["width"], ParamValue::Int(640));
        assert_eq!(req.parameters["height"], ParamValue::Float(480.5));
        assert_eq!(req.parameters["format"], ParamValue::Str("png".to_string()));
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_process_request_missing_image_id() {
        let req: ProcessRequest = serde_json::from_str(r#"{"size": 64}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_warm_request_keys() {
        let json = r#"{"image_id": "a", "image_ids": ["b", "", "a", " c "]}"#;
        let req: CacheWarmRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.keys(), vec!["a", "b", "c"]);

        let empty: CacheWarmRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.keys().is_empty());
    }
}
