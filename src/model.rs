use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One perceived object reported by the detector for a single frame.
#[derive(Debug, Clone, Deserialize)]
pub struct Detection {
    pub class_name: String,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
}

/// Center/size bounding box in pixel coordinates. Carried through for
/// completeness; the aggregation logic never reads it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BoundingBox {
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
}

/// Identity classification of a person in the frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityInfo {
    #[serde(rename = "type", default)]
    pub kind: IdentityKind,
    #[serde(default)]
    pub name: Option<String>,
}

impl IdentityInfo {
    /// The person's name, treating an empty string as absent.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Name of a recognized friend, if this entry is one.
    pub fn friend_name(&self) -> Option<&str> {
        (self.kind == IdentityKind::Friend)
            .then(|| self.name())
            .flatten()
    }
}

/// Whether the identity classifier recognized the person.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    Friend,
    #[default]
    Unknown,
}

impl<'de> Deserialize<'de> for IdentityKind {
    // Any tag other than "friend" counts as unknown so that a newer
    // classifier cannot make the server reject frames.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "friend" => IdentityKind::Friend,
            _ => IdentityKind::Unknown,
        })
    }
}

/// `person_info` arrives as a single object, a list, or null.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PersonField {
    One(IdentityInfo),
    Many(Vec<IdentityInfo>),
}

impl PersonField {
    pub fn normalize(field: Option<Self>) -> Vec<IdentityInfo> {
        match field {
            None => Vec::new(),
            Some(PersonField::One(p)) => vec![p],
            Some(PersonField::Many(v)) => v,
        }
    }
}

/// Body of `POST /frame_result`.
#[derive(Debug, Deserialize)]
pub struct FrameRequest {
    #[serde(default)]
    pub camera_id: Option<String>,
    #[serde(default)]
    pub frame_id: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub person_info: Option<PersonField>,
    #[serde(default)]
    pub image_jpeg_base64: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl FrameRequest {
    /// Image payload, whichever field the sender used.
    pub fn image_b64(&self) -> Option<&str> {
        self.image_jpeg_base64.as_deref().or(self.image.as_deref())
    }
}

/// Per-frame situational booleans derived from detections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub has_person: bool,
    pub has_box: bool,
    pub has_weapon: bool,
}

/// Escalation level of the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Attention,
    Danger,
}

/// Discrete event classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Visitor,
    Delivery,
    Threat,
}

/// High-level state shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentState {
    #[default]
    Idle,
    EventActive,
    ThreatActive,
}

/// Compact summary of what was in frame when an event fired.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectsSummary {
    pub person_count: usize,
    #[serde(rename = "box")]
    pub has_box: bool,
    #[serde(rename = "weapon")]
    pub has_weapon: bool,
}

/// A durable record of one visitor/delivery/threat occurrence.
///
/// Immutable after creation; ids are strictly increasing and never reused.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub event_id: u64,
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_sec: f64,
    pub severity: Severity,
    pub objects_summary: ObjectsSummary,
    pub person_info: Vec<IdentityInfo>,
    pub snapshot_path: Option<String>,
    pub caption: String,
}

/// Trimmed event view returned by `GET /events`.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub event_id: u64,
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_sec: f64,
    pub severity: Severity,
    pub caption: String,
    pub snapshot_url: Option<String>,
}

impl From<&Event> for EventSummary {
    fn from(ev: &Event) -> Self {
        Self {
            event_id: ev.event_id,
            event_type: ev.event_type,
            start_time: ev.start_time,
            end_time: ev.end_time,
            duration_sec: ev.duration_sec,
            severity: ev.severity,
            caption: ev.caption.clone(),
            snapshot_url: ev.snapshot_path.clone(),
        }
    }
}

/// The single live status record, overwritten (in part) by every frame and
/// returned verbatim to all status readers.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StatusSnapshot {
    pub current_state: CurrentState,
    pub danger: bool,
    pub needs_attention: bool,
    pub last_event_id: Option<u64>,
    pub last_event_type: Option<EventType>,
    pub last_event_caption: Option<String>,
    pub last_event_severity: Severity,
    pub latest_snapshot_url: Option<String>,
    pub live_caption: Option<String>,
    pub threat_flag: bool,
    pub threat_image: Option<String>,
    pub threat_name: Option<String>,
    pub new_person: bool,
    pub person_id: Option<String>,
    pub person_snapshot_b64: Option<String>,
    pub threat_snapshot_b64: Option<String>,
    pub threat_history: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_field_accepts_object_list_and_null() {
        let one: Option<PersonField> =
            serde_json::from_str(r#"{"type":"friend","name":"Alice"}"#).unwrap();
        assert_eq!(
            PersonField::normalize(one),
            vec![IdentityInfo {
                kind: IdentityKind::Friend,
                name: Some("Alice".into())
            }]
        );

        let many: Option<PersonField> =
            serde_json::from_str(r#"[{"type":"unknown","name":null}]"#).unwrap();
        assert_eq!(PersonField::normalize(many).len(), 1);

        let null: Option<PersonField> = serde_json::from_str("null").unwrap();
        assert!(PersonField::normalize(null).is_empty());
    }

    #[test]
    fn unrecognized_identity_tag_is_unknown() {
        let p: IdentityInfo = serde_json::from_str(r#"{"type":"stranger","name":"x"}"#).unwrap();
        assert_eq!(p.kind, IdentityKind::Unknown);
    }

    #[test]
    fn empty_name_counts_as_absent() {
        let p = IdentityInfo {
            kind: IdentityKind::Friend,
            name: Some(String::new()),
        };
        assert_eq!(p.name(), None);
        assert_eq!(p.friend_name(), None);
    }

    #[test]
    fn enums_serialize_as_wire_strings() {
        assert_eq!(
            serde_json::to_string(&CurrentState::ThreatActive).unwrap(),
            "\"threat_active\""
        );
        assert_eq!(
            serde_json::to_string(&Severity::Attention).unwrap(),
            "\"attention\""
        );
        assert_eq!(
            serde_json::to_string(&EventType::Delivery).unwrap(),
            "\"delivery\""
        );
    }

    #[test]
    fn status_snapshot_defaults_match_idle_boot_state() {
        let s = StatusSnapshot::default();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["current_state"], "idle");
        assert_eq!(v["danger"], false);
        assert_eq!(v["last_event_id"], serde_json::Value::Null);
        assert_eq!(v["last_event_severity"], "normal");
        assert_eq!(v["threat_history"], serde_json::json!([]));
    }
}
