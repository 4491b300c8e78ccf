//! Crime classification.
//!
//! An ordered table of `(predicate, crime, level)` rules, most severe first.
//! The first matching rule wins; when none match the frame is `Normal`/`LOW`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detect::{Activity, Signal, TagSet};

/// Ordinal severity.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreatLevel::Low => "LOW",
            ThreatLevel::Medium => "MEDIUM",
            ThreatLevel::High => "HIGH",
            ThreatLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed crime taxonomy. Serialized as its display label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrimeType {
    #[serde(rename = "Choking / Attempted Murder")]
    Choking,
    #[serde(rename = "Assault with Weapon")]
    AssaultWithWeapon,
    #[serde(rename = "Kidnapping / Abduction")]
    Kidnapping,
    #[serde(rename = "Assault on Fallen Victim")]
    AssaultOnFallenVictim,
    #[serde(rename = "Crowd Violence / Riot")]
    CrowdViolence,
    #[serde(rename = "Physical Assault")]
    PhysicalAssault,
    #[serde(rename = "Fight / Physical Violence")]
    Fight,
    #[serde(rename = "Robbery / Mugging")]
    Robbery,
    #[serde(rename = "Threatening Behavior")]
    ThreateningBehavior,
    #[serde(rename = "Suspicious Activity")]
    SuspiciousActivity,
    #[default]
    Normal,
}

impl CrimeType {
    pub fn label(self) -> &'static str {
        match self {
            CrimeType::Choking => "Choking / Attempted Murder",
            CrimeType::AssaultWithWeapon => "Assault with Weapon",
            CrimeType::Kidnapping => "Kidnapping / Abduction",
            CrimeType::AssaultOnFallenVictim => "Assault on Fallen Victim",
            CrimeType::CrowdViolence => "Crowd Violence / Riot",
            CrimeType::PhysicalAssault => "Physical Assault",
            CrimeType::Fight => "Fight / Physical Violence",
            CrimeType::Robbery => "Robbery / Mugging",
            CrimeType::ThreateningBehavior => "Threatening Behavior",
            CrimeType::SuspiciousActivity => "Suspicious Activity",
            CrimeType::Normal => "Normal",
        }
    }
}

impl fmt::Display for CrimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a rule predicate sees.
#[derive(Clone, Copy, Debug)]
pub struct Evidence<'a> {
    pub tags: &'a TagSet,
    pub persons: usize,
}

impl Evidence<'_> {
    fn any_signal(&self, pred: impl Fn(Signal) -> bool) -> bool {
        self.tags.signals.iter().any(|s| pred(*s))
    }

    fn has(&self, signal: Signal) -> bool {
        self.tags.has(signal)
    }

    fn doing(&self, activity: Activity) -> bool {
        self.tags.has_activity(activity)
    }
}

/// One classification rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&Evidence<'_>) -> bool,
    pub crime: CrimeType,
    pub level: ThreatLevel,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("crime", &self.crime)
            .field("level", &self.level)
            .finish()
    }
}

/// Rules in priority order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "neck_grab",
        matches: |e| e.any_signal(Signal::is_grab_neck),
        crime: CrimeType::Choking,
        level: ThreatLevel::Critical,
    },
    Rule {
        name: "weapon_in_contact",
        matches: |e| {
            e.any_signal(Signal::is_weapon_threat)
                && (e.has(Signal::CloseContact) || e.doing(Activity::PhysicalAssault))
        },
        crime: CrimeType::AssaultWithWeapon,
        level: ThreatLevel::Critical,
    },
    Rule {
        name: "grab_and_chase",
        matches: |e| e.has(Signal::Grabbing) && e.has(Signal::FollowingChasing),
        crime: CrimeType::Kidnapping,
        level: ThreatLevel::Critical,
    },
    Rule {
        name: "strike_on_fallen",
        matches: |e| {
            e.has(Signal::Fallen) && e.persons >= 2 && e.any_signal(Signal::is_punch_or_kick)
        },
        crime: CrimeType::AssaultOnFallenVictim,
        level: ThreatLevel::Critical,
    },
    Rule {
        name: "group_violence",
        matches: |e| {
            e.persons >= 3
                && (e.doing(Activity::PhysicalAssault) || e.has(Signal::CrowdFormation))
        },
        crime: CrimeType::CrowdViolence,
        level: ThreatLevel::High,
    },
    Rule {
        name: "head_strike",
        matches: |e| e.has(Signal::AssaultHead),
        crime: CrimeType::PhysicalAssault,
        level: ThreatLevel::High,
    },
    Rule {
        name: "pair_fight",
        matches: |e| e.persons == 2 && e.any_signal(Signal::is_punch_or_kick),
        crime: CrimeType::Fight,
        level: ThreatLevel::High,
    },
    Rule {
        name: "contact_and_flight",
        matches: |e| e.has(Signal::CloseContact) && e.persons == 2 && e.doing(Activity::Running),
        crime: CrimeType::Robbery,
        level: ThreatLevel::High,
    },
    Rule {
        name: "threat_in_contact",
        matches: |e| e.doing(Activity::ThreateningGesture) && e.has(Signal::CloseContact),
        crime: CrimeType::ThreateningBehavior,
        level: ThreatLevel::Medium,
    },
    Rule {
        name: "pair_contact",
        matches: |e| e.has(Signal::CloseContact) && e.persons == 2,
        crime: CrimeType::Robbery,
        level: ThreatLevel::Medium,
    },
    Rule {
        name: "any_tag",
        matches: |e| !e.tags.is_empty(),
        crime: CrimeType::SuspiciousActivity,
        level: ThreatLevel::Low,
    },
];

/// First matching rule, if any.
pub fn matching_rule(tags: &TagSet, persons: usize) -> Option<&'static Rule> {
    let evidence = Evidence { tags, persons };
    RULES.iter().find(|rule| (rule.matches)(&evidence))
}

/// Total classification: always returns a crime and level.
pub fn classify(tags: &TagSet, persons: usize) -> (CrimeType, ThreatLevel) {
    matching_rule(tags, persons)
        .map(|rule| (rule.crime, rule.level))
        .unwrap_or((CrimeType::Normal, ThreatLevel::Low))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(signals: &[Signal]) -> TagSet {
        let mut tags = TagSet::new();
        for s in signals {
            tags.insert(*s);
        }
        tags
    }

    fn rule_name(signals: &[Signal], persons: usize) -> Option<&'static str> {
        matching_rule(&tags(signals), persons).map(|r| r.name)
    }

    #[test]
    fn empty_tags_are_normal() {
        assert_eq!(
            classify(&TagSet::new(), 0),
            (CrimeType::Normal, ThreatLevel::Low)
        );
        assert_eq!(rule_name(&[], 4), None);
    }

    #[test]
    fn neck_grab_outranks_everything() {
        let everything: Vec<Signal> = Signal::ALL.to_vec();
        assert_eq!(
            classify(&tags(&everything), 3),
            (CrimeType::Choking, ThreatLevel::Critical)
        );
        assert_eq!(rule_name(&[Signal::GrabNeckLeft], 1), Some("neck_grab"));
    }

    #[test]
    fn weapon_needs_contact_or_assault() {
        assert_eq!(rule_name(&[Signal::WeaponThreatRight], 1), Some("any_tag"));
        assert_eq!(
            rule_name(&[Signal::WeaponThreatRight, Signal::CloseContact], 2),
            Some("weapon_in_contact")
        );
        assert_eq!(
            rule_name(&[Signal::WeaponThreatLeft, Signal::AssaultHead], 2),
            Some("weapon_in_contact")
        );
    }

    #[test]
    fn grab_plus_chase_is_kidnapping() {
        assert_eq!(
            classify(&tags(&[Signal::Grabbing, Signal::FollowingChasing]), 2),
            (CrimeType::Kidnapping, ThreatLevel::Critical)
        );
        assert_eq!(rule_name(&[Signal::Grabbing], 2), Some("any_tag"));
    }

    #[test]
    fn strike_on_fallen_needs_two_persons() {
        assert_eq!(
            rule_name(&[Signal::Fallen, Signal::KickLeft], 2),
            Some("strike_on_fallen")
        );
        assert_eq!(rule_name(&[Signal::Fallen, Signal::KickLeft], 1), Some("any_tag"));
    }

    #[test]
    fn crowd_rules() {
        assert_eq!(rule_name(&[Signal::CrowdFormation], 3), Some("group_violence"));
        assert_eq!(rule_name(&[Signal::AssaultHead], 4), Some("group_violence"));
        assert_eq!(rule_name(&[Signal::AssaultHead], 2), Some("head_strike"));
    }

    #[test]
    fn pair_rules_in_order() {
        assert_eq!(rule_name(&[Signal::PunchRight], 2), Some("pair_fight"));
        assert_eq!(rule_name(&[Signal::PunchRight], 1), Some("any_tag"));
        assert_eq!(rule_name(&[Signal::PunchRight], 3), Some("any_tag"));
        assert_eq!(
            rule_name(&[Signal::CloseContact, Signal::Running], 2),
            Some("contact_and_flight")
        );
        assert_eq!(
            rule_name(&[Signal::CloseContact, Signal::WeaponThreatLeft, Signal::Running], 2),
            Some("weapon_in_contact")
        );
        assert_eq!(rule_name(&[Signal::CloseContact], 2), Some("pair_contact"));
        assert_eq!(rule_name(&[Signal::CloseContact], 3), Some("any_tag"));
    }

    #[test]
    fn threatening_gesture_in_contact() {
        // the weapon rule fires first whenever WEAPON_THREAT_* is a signal, so
        // feed the activity alone
        let mut t = TagSet::new();
        t.activities.insert(Activity::ThreateningGesture);
        t.insert(Signal::CloseContact);
        assert_eq!(
            classify(&t, 2),
            (CrimeType::ThreateningBehavior, ThreatLevel::Medium)
        );
    }

    #[test]
    fn serialized_labels() {
        assert_eq!(
            serde_json::to_string(&CrimeType::Choking).unwrap(),
            "\"Choking / Attempted Murder\""
        );
        assert_eq!(serde_json::to_string(&ThreatLevel::Critical).unwrap(), "\"CRITICAL\"");
        assert!(ThreatLevel::Low < ThreatLevel::Medium);
        assert!(ThreatLevel::High < ThreatLevel::Critical);
    }
}
