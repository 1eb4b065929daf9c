//! JSON payloads exchanged between the site client and the HTTP API.

use serde::{Deserialize, Serialize};

/// 200 body of `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub message: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: u32,
    pub src: String,
    pub title: String,
    pub category: String,
}

/// Body of `GET /api/gallery`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryResponse {
    pub success: bool,
    pub images: Vec<GalleryImage>,
    pub total: usize,
}

/// Body of `GET /api/gallery/scan`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryScanResponse {
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_omits_empty_details() {
        let body = ErrorResponse {
            error: "Ungültige Anfrage".into(),
            details: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"Ungültige Anfrage"}"#
        );

        let parsed: ErrorResponse = serde_json::from_str(r#"{"error":"x"}"#).unwrap();
        assert!(parsed.details.is_none());
    }
}
