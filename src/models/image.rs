use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing state of a catalog image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageStatus {
    Uploaded,
    Processing,
    Processed,
    Failed,
}

impl ImageStatus {
    /// Only processed images have a DZI pyramid to view.
    pub fn is_viewable(&self) -> bool {
        matches!(self, ImageStatus::Processed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ImageStatus::Failed)
    }
}

impl std::fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ImageStatus::Uploaded => "UPLOADED",
            ImageStatus::Processing => "PROCESSING",
            ImageStatus::Processed => "PROCESSED",
            ImageStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// A whole-slide image record from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    pub patient_id: String,
    pub creator_id: String,
    pub name: String,
    pub format: String,
    pub origin_path: String,
    pub status: ImageStatus,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub processed_path: Option<String>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub last_processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Mutable image fields accepted by the update endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
}

/// Query filters for the image list endpoint.
#[derive(Debug, Clone, Default)]
pub struct ImageFilters {
    pub patient_id: Option<String>,
    pub status: Option<ImageStatus>,
}

impl ImageFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(ref patient_id) = self.patient_id {
            query.push(("patient_id", patient_id.clone()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_record() {
        let json = r#"{
            "id": "img-1",
            "patient_id": "pat-9",
            "creator_id": "usr-3",
            "name": "biopsy_a.svs",
            "format": "svs",
            "origin_path": "/raw/biopsy_a.svs",
            "status": "PROCESSED",
            "width": 98304,
            "height": 65536,
            "processed_path": "/dzi/img-1",
            "created_at": "2024-03-01T10:00:00Z"
        }"#;

        let image: ImageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(image.id, "img-1");
        assert_eq!(image.status, ImageStatus::Processed);
        assert!(image.status.is_viewable());
        assert_eq!(image.width, Some(98304));
        assert_eq!(image.size, None);
        assert_eq!(image.retry_count, 0);
    }

    #[test]
    fn test_invalid_status_is_rejected() {
        let json = r#"{
            "id": "img-1",
            "patient_id": "pat-9",
            "creator_id": "usr-3",
            "name": "x",
            "format": "svs",
            "origin_path": "/raw/x",
            "status": "ARCHIVED"
        }"#;
        assert!(serde_json::from_str::<ImageRecord>(json).is_err());
    }

    #[test]
    fn test_filters_to_query() {
        let filters = ImageFilters {
            patient_id: Some("pat-9".to_string()),
            status: Some(ImageStatus::Failed),
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("patient_id", "pat-9".to_string()),
                ("status", "FAILED".to_string())
            ]
        );
        assert!(ImageFilters::default().to_query().is_empty());
    }
}
