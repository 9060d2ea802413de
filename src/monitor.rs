use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, NaiveDateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::caption;
use crate::classify;
use crate::danger_list;
use crate::model::{
    CurrentState, Event, EventSummary, EventType, FrameRequest, IdentityInfo, PersonField,
    Severity, StatusSnapshot,
};
use crate::snapshot::SnapshotStore;

/// Everything that must mutate atomically per frame: the live status, the
/// event history, the id counter, the names ever seen, and the blacklist.
#[derive(Debug, Default)]
struct State {
    status: StatusSnapshot,
    events: Vec<Event>,
    next_event_id: u64,
    known_persons: HashSet<String>,
    danger_list: BTreeSet<String>,
}

/// The aggregation core.
///
/// One instance exists per daemon; all HTTP handlers share it behind an
/// `Arc`. Frame processing takes the single state lock for the whole
/// read-modify-write, so concurrent submissions serialize rather than
/// interleave. Blacklist persistence runs after the lock is released and
/// may lag the in-memory set.
#[derive(Debug)]
pub struct Monitor {
    state: Mutex<State>,
    snapshots: SnapshotStore,
    danger_path: PathBuf,
}

impl Monitor {
    /// Build the monitor, creating the snapshot directory and loading any
    /// previously persisted blacklist.
    pub fn new(events_dir: impl Into<PathBuf>, danger_path: impl Into<PathBuf>) -> Self {
        let danger_path = danger_path.into();
        let state = State {
            next_event_id: 1,
            danger_list: danger_list::load(&danger_path),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
            snapshots: SnapshotStore::new(events_dir),
            danger_path,
        }
    }

    /// Process one frame end-to-end and return the updated status.
    pub async fn handle_frame(&self, frame: FrameRequest) -> StatusSnapshot {
        let ts = parse_timestamp(frame.timestamp.as_deref());
        let image = decode_image(frame.image_b64());
        let persons = PersonField::normalize(frame.person_info);
        let flags = classify::compute_flags(&frame.detections);
        debug!(
            camera = frame.camera_id.as_deref().unwrap_or("cam"),
            frame_id = ?frame.frame_id,
            ?flags,
            persons = persons.len(),
            "frame received"
        );

        let person_key = persons
            .first()
            .and_then(IdentityInfo::name)
            .map(str::to_lowercase);

        let mut state = self.state.lock().await;
        let severity = classify::resolve_severity(flags, &persons, &state.danger_list);
        let objs = classify::objects_summary(flags, &persons);
        let live_caption = caption::describe(&persons, &objs, severity);
        let event_type = classify::decide_event_type(flags);

        let mut new_person = false;
        let mut snapshot_path = None;
        let mut snapshot_b64 = None;
        if let Some(kind) = event_type {
            let event_id = state.next_event_id;
            state.next_event_id += 1;

            if let Some(bytes) = image.as_deref() {
                snapshot_path = self.snapshots.save(event_id, bytes).await;
                if snapshot_path.is_some() {
                    snapshot_b64 = Some(general_purpose::STANDARD.encode(bytes));
                }
            }

            let event = Event {
                event_id,
                event_type: kind,
                start_time: ts,
                end_time: ts,
                duration_sec: 0.0,
                severity,
                objects_summary: objs.clone(),
                person_info: persons.clone(),
                snapshot_path: snapshot_path.clone(),
                caption: live_caption.clone(),
            };
            info!(event_id, event_type = ?kind, ?severity, caption = %live_caption, "recorded event");

            state.status.last_event_id = Some(event_id);
            state.status.last_event_type = Some(kind);
            state.status.last_event_caption = Some(live_caption.clone());
            state.status.last_event_severity = severity;
            state.status.latest_snapshot_url = snapshot_path.clone();
            state.events.push(event);

            if let Some(key) = &person_key {
                if state.known_persons.insert(key.clone()) {
                    new_person = true;
                    info!(person = %key, "first sighting of a named person");
                }
            }
        }

        state.status.current_state = if flags.has_weapon {
            CurrentState::ThreatActive
        } else if flags.has_person {
            CurrentState::EventActive
        } else {
            CurrentState::Idle
        };
        state.status.live_caption = Some(live_caption);
        state.status.threat_flag = flags.has_weapon;

        let mut danger_changed = false;
        if flags.has_weapon {
            // Only an event created on this very frame counts as the threat image.
            state.status.threat_image = if event_type.is_some() {
                snapshot_path.clone()
            } else {
                None
            };

            let threat_name = match persons.iter().find_map(IdentityInfo::name) {
                Some(name) => name.to_string(),
                None => {
                    let id = state
                        .status
                        .last_event_id
                        .unwrap_or_else(|| ts.timestamp().unsigned_abs());
                    format!("danger_{id}")
                }
            };
            danger_changed = state.danger_list.insert(threat_name.to_lowercase());
            state.status.threat_name = Some(threat_name);

            match severity {
                Severity::Danger => state.status.danger = true,
                Severity::Attention if !state.status.danger => {
                    state.status.needs_attention = true;
                }
                Severity::Attention | Severity::Normal => {}
            }
        } else {
            state.status.threat_image = None;
            state.status.threat_name = None;
        }

        state.status.new_person = new_person;
        state.status.person_id = person_key;
        state.status.person_snapshot_b64 = if new_person { snapshot_b64.clone() } else { None };
        state.status.threat_snapshot_b64 = if state.status.threat_flag {
            snapshot_b64
        } else {
            None
        };
        state.status.threat_history = threat_history(&state.events);

        let status = state.status.clone();
        let to_persist = danger_changed.then(|| sorted(&state.danger_list));
        drop(state);

        if let Some(names) = to_persist {
            danger_list::persist(&self.danger_path, &names).await;
        }
        status
    }

    /// Current status, without mutation.
    pub async fn latest_status(&self) -> StatusSnapshot {
        self.state.lock().await.status.clone()
    }

    /// The last `limit` events, oldest first.
    pub async fn recent_events(&self, limit: usize) -> Vec<EventSummary> {
        let state = self.state.lock().await;
        let skip = state.events.len().saturating_sub(limit);
        state.events[skip..].iter().map(EventSummary::from).collect()
    }

    /// Clear the active alert fields. Event history, the blacklist, and the
    /// new-person fields are untouched.
    pub async fn ack_alert(&self) {
        let mut state = self.state.lock().await;
        state.status.danger = false;
        state.status.needs_attention = false;
        state.status.threat_flag = false;
        state.status.threat_image = None;
        state.status.threat_name = None;
        state.status.threat_snapshot_b64 = None;
        info!("alert acknowledged");
    }

    /// Sorted blacklist contents.
    pub async fn danger_names(&self) -> Vec<String> {
        sorted(&self.state.lock().await.danger_list)
    }

    /// Add or remove a blacklist name and persist if anything changed.
    /// The name must already be trimmed and lowercased.
    pub async fn update_danger_list(&self, name: &str, remove: bool) -> Vec<String> {
        let mut state = self.state.lock().await;
        let changed = if remove {
            state.danger_list.remove(name)
        } else {
            state.danger_list.insert(name.to_string())
        };
        let names = sorted(&state.danger_list);
        drop(state);

        if changed {
            info!(%name, remove, "danger list updated");
            danger_list::persist(&self.danger_path, &names).await;
        }
        names
    }

    /// Raw bytes of a stored event snapshot.
    pub async fn snapshot_bytes(&self, filename: &str) -> Option<Vec<u8>> {
        self.snapshots.read(filename).await
    }
}

fn sorted(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

fn threat_history(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .rev()
        .filter(|ev| ev.event_type == EventType::Threat)
        .filter_map(|ev| ev.snapshot_path.clone())
        .collect()
}

/// Parse the sender's timestamp, falling back to "now" on anything odd.
fn parse_timestamp(ts: Option<&str>) -> DateTime<Utc> {
    let Some(ts) = ts else {
        return Utc::now();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    // The perception client may send naive ISO-8601 without an offset.
    if let Ok(naive) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc();
    }
    warn!(%ts, "unparsable frame timestamp, using current time");
    Utc::now()
}

fn decode_image(b64: Option<&str>) -> Option<Vec<u8>> {
    let b64 = b64?;
    match general_purpose::STANDARD.decode(b64) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(error = ?e, "frame image is not valid base64, ignoring");
            None
        }
    }
}
