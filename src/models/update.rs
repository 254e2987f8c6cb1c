use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An image a device could move to. Its contents are decided by whoever
/// populates the store; this service only relays them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableUpdate {
    pub image_id: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAvailability {
    pub device_uuid: String,
    pub update_available: bool,
    pub updates: Vec<AvailableUpdate>,
}

impl UpdateAvailability {
    pub fn new(device_uuid: impl Into<String>, updates: Vec<AvailableUpdate>) -> Self {
        Self {
            device_uuid: device_uuid.into(),
            update_available: !updates.is_empty(),
            updates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_available_follows_update_list() {
        let none = UpdateAvailability::new("dev", Vec::new());
        assert!(!none.update_available);

        let some = UpdateAvailability::new(
            "dev",
            vec![AvailableUpdate {
                image_id: "img-2".into(),
                name: "edge-image".into(),
                version: "2".into(),
                release_notes: None,
                released_at: None,
            }],
        );
        assert!(some.update_available);

        let body = serde_json::to_value(&some).unwrap();
        assert_eq!(body["device_uuid"], "dev");
        assert_eq!(body["updates"][0]["image_id"], "img-2");
        assert!(body["updates"][0].get("release_notes").is_none());
    }
}
