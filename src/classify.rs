use std::collections::BTreeSet;

use crate::model::{Detection, EventType, Flags, IdentityInfo, IdentityKind, ObjectsSummary, Severity};

/// Minimum confidence for a `person` detection to count.
pub const PERSON_THRESH: f32 = 0.5;
/// Minimum confidence for a container detection to count.
pub const BOX_THRESH: f32 = 0.5;
/// Minimum confidence for a weapon detection to count.
pub const WEAPON_THRESH: f32 = 0.5;

/// Detector classes treated as a package/container.
pub const BOX_CLASSES: [&str; 3] = ["box", "backpack", "package"];

/// Detector classes treated as a weapon.
pub const WEAPON_CLASSES: [&str; 11] = [
    "knife",
    "scissors",
    "axe",
    "gun",
    "pistol",
    "rifle",
    "bat",
    "hammer",
    "crowbar",
    "wrench",
    "screwdriver",
];

/// Reduce a frame's detections to the three situational flags.
///
/// Each category applies its own threshold independently; an empty
/// detection list yields all-false flags.
pub fn compute_flags(detections: &[Detection]) -> Flags {
    let mut flags = Flags::default();
    for det in detections {
        let class = det.class_name.as_str();
        if class == "person" && det.confidence >= PERSON_THRESH {
            flags.has_person = true;
        }
        if BOX_CLASSES.contains(&class) && det.confidence >= BOX_THRESH {
            flags.has_box = true;
        }
        if WEAPON_CLASSES.contains(&class) && det.confidence >= WEAPON_THRESH {
            flags.has_weapon = true;
        }
    }
    flags
}

/// Resolve the frame's escalation level.
///
/// Anything short of weapon-plus-person is normal. With both present, a
/// missing or unrecognized identity escalates to danger, as does a
/// blacklisted name; a frame of recognized, non-blacklisted friends only
/// warrants attention.
pub fn resolve_severity(
    flags: Flags,
    persons: &[IdentityInfo],
    danger_list: &BTreeSet<String>,
) -> Severity {
    if !flags.has_weapon || !flags.has_person {
        return Severity::Normal;
    }
    // No identity data at all is treated as an unknown person.
    let any_unknown = persons.is_empty()
        || persons.iter().any(|p| p.kind != IdentityKind::Friend);
    let any_blacklisted = persons
        .iter()
        .filter_map(IdentityInfo::name)
        .any(|n| danger_list.contains(&n.to_lowercase()));
    if any_unknown || any_blacklisted {
        Severity::Danger
    } else {
        Severity::Attention
    }
}

/// Decide whether this frame opens a discrete event, and of which type.
pub fn decide_event_type(flags: Flags) -> Option<EventType> {
    if !flags.has_person {
        return None;
    }
    Some(if flags.has_weapon {
        EventType::Threat
    } else if flags.has_box {
        EventType::Delivery
    } else {
        EventType::Visitor
    })
}

/// Summarize the frame contents for the event record and caption.
///
/// The detector reports presence, not a head count, so when the identity
/// list is empty the person count degrades to 1 or 0 from `has_person`.
pub fn objects_summary(flags: Flags, persons: &[IdentityInfo]) -> ObjectsSummary {
    let person_count = if persons.is_empty() {
        usize::from(flags.has_person)
    } else {
        persons.len()
    };
    ObjectsSummary {
        person_count,
        has_box: flags.has_box,
        has_weapon: flags.has_weapon,
    }
}
