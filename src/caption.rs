use crate::model::{IdentityInfo, IdentityKind, ObjectsSummary, Severity};

/// Produce the one-sentence situation caption.
///
/// Priority order, first match wins: weapon, package, visitor, nothing.
/// The exact wording is part of the API contract; clients display these
/// strings verbatim.
pub fn describe(persons: &[IdentityInfo], objs: &ObjectsSummary, severity: Severity) -> String {
    let friend = persons.iter().find_map(IdentityInfo::friend_name);
    let num_unknown = persons
        .iter()
        .filter(|p| p.kind != IdentityKind::Friend)
        .count();

    if objs.has_weapon {
        return match severity {
            Severity::Danger => {
                if num_unknown >= 1 {
                    "An unknown person is holding a weapon. DANGER.".to_string()
                } else if let Some(name) = friend {
                    format!("Your friend {name} is holding a weapon. DANGER.")
                } else {
                    "Someone is holding a weapon. DANGER.".to_string()
                }
            }
            _ => {
                if let Some(name) = friend {
                    format!("Your friend {name} is holding a potential weapon. Pay attention.")
                } else {
                    "Someone is holding a potential weapon. Pay attention.".to_string()
                }
            }
        };
    }

    if objs.has_box {
        return if let Some(name) = friend {
            format!("Your friend {name} is delivering a package.")
        } else if num_unknown >= 1 {
            "Someone is delivering a package.".to_string()
        } else {
            "A package is at your door.".to_string()
        };
    }

    if objs.person_count >= 1 {
        if let Some(name) = friend {
            return format!("Your friend {name} is standing at your door.");
        }
        if num_unknown == 1 {
            return "An unknown person is standing at your door.".to_string();
        }
        if num_unknown > 1 {
            return "Multiple unknown people are standing at your door.".to_string();
        }
    }

    "No one is at your door.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn friend(name: &str) -> IdentityInfo {
        IdentityInfo {
            kind: IdentityKind::Friend,
            name: Some(name.to_string()),
        }
    }

    fn unknown() -> IdentityInfo {
        IdentityInfo {
            kind: IdentityKind::Unknown,
            name: None,
        }
    }

    fn objs(person_count: usize, has_box: bool, has_weapon: bool) -> ObjectsSummary {
        ObjectsSummary {
            person_count,
            has_box,
            has_weapon,
        }
    }

    #[test]
    fn weapon_danger_prefers_unknown_holder() {
        assert_eq!(
            describe(&[unknown()], &objs(1, false, true), Severity::Danger),
            "An unknown person is holding a weapon. DANGER."
        );
        assert_eq!(
            describe(&[friend("Mallory")], &objs(1, false, true), Severity::Danger),
            "Your friend Mallory is holding a weapon. DANGER."
        );
        assert_eq!(
            describe(&[], &objs(1, false, true), Severity::Danger),
            "Someone is holding a weapon. DANGER."
        );
    }

    #[test]
    fn weapon_attention_names_the_friend() {
        assert_eq!(
            describe(&[friend("Alice")], &objs(1, false, true), Severity::Attention),
            "Your friend Alice is holding a potential weapon. Pay attention."
        );
        assert_eq!(
            describe(&[], &objs(1, false, true), Severity::Attention),
            "Someone is holding a potential weapon. Pay attention."
        );
    }

    #[test]
    fn weapon_outranks_box() {
        let caption = describe(&[unknown()], &objs(1, true, true), Severity::Danger);
        assert_eq!(caption, "An unknown person is holding a weapon. DANGER.");
    }

    #[test]
    fn delivery_captions() {
        assert_eq!(
            describe(&[friend("Alice")], &objs(1, true, false), Severity::Normal),
            "Your friend Alice is delivering a package."
        );
        assert_eq!(
            describe(&[unknown()], &objs(1, true, false), Severity::Normal),
            "Someone is delivering a package."
        );
        assert_eq!(
            describe(&[], &objs(0, true, false), Severity::Normal),
            "A package is at your door."
        );
    }

    #[test]
    fn visitor_captions_single_and_plural() {
        assert_eq!(
            describe(&[friend("Bob")], &objs(1, false, false), Severity::Normal),
            "Your friend Bob is standing at your door."
        );
        assert_eq!(
            describe(&[unknown()], &objs(1, false, false), Severity::Normal),
            "An unknown person is standing at your door."
        );
        assert_eq!(
            describe(
                &[unknown(), unknown()],
                &objs(2, false, false),
                Severity::Normal
            ),
            "Multiple unknown people are standing at your door."
        );
    }

    #[test]
    fn empty_frame_caption() {
        assert_eq!(
            describe(&[], &objs(0, false, false), Severity::Normal),
            "No one is at your door."
        );
    }
}
