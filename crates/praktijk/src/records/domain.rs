use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier issued at creation time (milliseconds since the Unix epoch).
pub type RecordId = i64;

/// Placeholder name for leave periods submitted without one.
pub const DEFAULT_LEAVE_NAME: &str = "Verlof";

/// The single persisted aggregate holding both record collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub leave_periods: Vec<LeavePeriod>,
    #[serde(default)]
    pub popups: Vec<Popup>,
}

/// A date range during which the practice is closed, shown on the contact page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeavePeriod {
    pub id: RecordId,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub created_at: DateTime<Utc>,
}

/// A promotional banner for the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Popup {
    pub id: RecordId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Form fields accepted when adding a leave period.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeavePeriod {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// Form fields accepted when adding a popup. `active` carries the raw checkbox value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPopup {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub active: Option<String>,
}

impl NewPopup {
    pub fn is_enabled(&self) -> bool {
        matches!(
            self.active.as_deref().map(str::trim),
            Some("on") | Some("true") | Some("1")
        )
    }
}

/// Behavior shared by every stored entity.
pub trait Record {
    fn id(&self) -> RecordId;

    /// Mutable access to a named boolean field, if the entity has one.
    fn flag_mut(&mut self, _field: &str) -> Option<&mut bool> {
        None
    }
}

impl Record for LeavePeriod {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Record for Popup {
    fn id(&self) -> RecordId {
        self.id
    }

    fn flag_mut(&mut self, field: &str) -> Option<&mut bool> {
        match field {
            "active" => Some(&mut self.active),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_uses_camel_case_collection_names() {
        let value = serde_json::to_value(Document::default()).expect("serializes");
        assert_eq!(value, json!({ "leavePeriods": [], "popups": [] }));
    }

    #[test]
    fn reads_documents_written_with_millisecond_timestamps() {
        let raw = r#"{
          "leavePeriods": [
            { "id": 1719830400000, "name": "Zomer", "startDate": "2024-07-01",
              "endDate": "2024-07-14", "createdAt": "2024-06-01T09:30:00.000Z" }
          ],
          "popups": [
            { "id": 42, "title": "Sale", "content": "20% off",
              "createdAt": "2024-06-01T09:30:00.000Z" }
          ]
        }"#;
        let doc: Document = serde_json::from_str(raw).expect("parses");
        assert_eq!(doc.leave_periods[0].name, "Zomer");
        assert_eq!(doc.leave_periods[0].start_date, "2024-07-01");
        assert!(!doc.popups[0].active);
    }

    #[test]
    fn missing_collection_defaults_to_empty() {
        let doc: Document = serde_json::from_str(r#"{ "popups": [] }"#).expect("parses");
        assert!(doc.leave_periods.is_empty());
    }

    #[test]
    fn checkbox_values_enable_popup() {
        for raw in ["on", "true", "1"] {
            let draft = NewPopup {
                active: Some(raw.to_string()),
                ..NewPopup::default()
            };
            assert!(draft.is_enabled(), "{raw} should enable");
        }
        assert!(!NewPopup::default().is_enabled());
        let off = NewPopup {
            active: Some("off".to_string()),
            ..NewPopup::default()
        };
        assert!(!off.is_enabled());
    }

    #[test]
    fn only_popups_expose_the_active_flag() {
        let mut popup = Popup {
            id: 1,
            title: "t".to_string(),
            content: "c".to_string(),
            active: false,
            created_at: Utc::now(),
        };
        assert!(popup.flag_mut("active").is_some());
        assert!(popup.flag_mut("title").is_none());

        let mut leave = LeavePeriod {
            id: 2,
            name: DEFAULT_LEAVE_NAME.to_string(),
            start_date: String::new(),
            end_date: String::new(),
            created_at: Utc::now(),
        };
        assert!(leave.flag_mut("active").is_none());
    }
}
