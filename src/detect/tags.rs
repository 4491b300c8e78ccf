use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pose::Side;

/// Fine-grained per-frame observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    PunchLeft,
    PunchRight,
    KickLeft,
    KickRight,
    WeaponThreatLeft,
    WeaponThreatRight,
    GrabNeckLeft,
    GrabNeckRight,
    Fallen,
    Running,
    Crouching,
    HandsUp,
    CloseContact,
    AssaultHead,
    Grabbing,
    FollowingChasing,
    CrowdFormation,
}

impl Signal {
    pub const ALL: [Signal; 17] = [
        Signal::PunchLeft,
        Signal::PunchRight,
        Signal::KickLeft,
        Signal::KickRight,
        Signal::WeaponThreatLeft,
        Signal::WeaponThreatRight,
        Signal::GrabNeckLeft,
        Signal::GrabNeckRight,
        Signal::Fallen,
        Signal::Running,
        Signal::Crouching,
        Signal::HandsUp,
        Signal::CloseContact,
        Signal::AssaultHead,
        Signal::Grabbing,
        Signal::FollowingChasing,
        Signal::CrowdFormation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::PunchLeft => "PUNCH_LEFT",
            Signal::PunchRight => "PUNCH_RIGHT",
            Signal::KickLeft => "KICK_LEFT",
            Signal::KickRight => "KICK_RIGHT",
            Signal::WeaponThreatLeft => "WEAPON_THREAT_LEFT",
            Signal::WeaponThreatRight => "WEAPON_THREAT_RIGHT",
            Signal::GrabNeckLeft => "GRAB_NECK_LEFT",
            Signal::GrabNeckRight => "GRAB_NECK_RIGHT",
            Signal::Fallen => "FALLEN",
            Signal::Running => "RUNNING",
            Signal::Crouching => "CROUCHING",
            Signal::HandsUp => "HANDS_UP",
            Signal::CloseContact => "CLOSE_CONTACT",
            Signal::AssaultHead => "ASSAULT_HEAD",
            Signal::Grabbing => "GRABBING",
            Signal::FollowingChasing => "FOLLOWING_CHASING",
            Signal::CrowdFormation => "CROWD_FORMATION",
        }
    }

    pub fn punch(side: Side) -> Self {
        match side {
            Side::Left => Signal::PunchLeft,
            Side::Right => Signal::PunchRight,
        }
    }

    pub fn kick(side: Side) -> Self {
        match side {
            Side::Left => Signal::KickLeft,
            Side::Right => Signal::KickRight,
        }
    }

    pub fn weapon_threat(side: Side) -> Self {
        match side {
            Side::Left => Signal::WeaponThreatLeft,
            Side::Right => Signal::WeaponThreatRight,
        }
    }

    pub fn grab_neck(side: Side) -> Self {
        match side {
            Side::Left => Signal::GrabNeckLeft,
            Side::Right => Signal::GrabNeckRight,
        }
    }

    pub fn is_punch_or_kick(self) -> bool {
        matches!(
            self,
            Signal::PunchLeft | Signal::PunchRight | Signal::KickLeft | Signal::KickRight
        )
    }

    pub fn is_weapon_threat(self) -> bool {
        matches!(self, Signal::WeaponThreatLeft | Signal::WeaponThreatRight)
    }

    pub fn is_grab_neck(self) -> bool {
        matches!(self, Signal::GrabNeckLeft | Signal::GrabNeckRight)
    }

    /// The coarser activity this signal collapses into.
    pub fn activity(self) -> Activity {
        match self {
            Signal::PunchLeft | Signal::PunchRight | Signal::KickLeft | Signal::KickRight => {
                Activity::AggressiveGesture
            }
            Signal::WeaponThreatLeft | Signal::WeaponThreatRight => Activity::ThreateningGesture,
            Signal::GrabNeckLeft | Signal::GrabNeckRight => Activity::Choking,
            Signal::Fallen => Activity::PersonDown,
            Signal::Running => Activity::Running,
            Signal::Crouching => Activity::Crouching,
            Signal::HandsUp => Activity::Surrender,
            Signal::CloseContact => Activity::Proximity,
            Signal::AssaultHead => Activity::PhysicalAssault,
            Signal::Grabbing => Activity::Restraining,
            Signal::FollowingChasing => Activity::Chasing,
            Signal::CrowdFormation => Activity::GroupGathering,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarser behavioral tag derived from one or more signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
    AggressiveGesture,
    ThreateningGesture,
    Choking,
    PersonDown,
    Running,
    Crouching,
    Surrender,
    Proximity,
    PhysicalAssault,
    Restraining,
    Chasing,
    GroupGathering,
}

impl Activity {
    pub const ALL: [Activity; 12] = [
        Activity::AggressiveGesture,
        Activity::ThreateningGesture,
        Activity::Choking,
        Activity::PersonDown,
        Activity::Running,
        Activity::Crouching,
        Activity::Surrender,
        Activity::Proximity,
        Activity::PhysicalAssault,
        Activity::Restraining,
        Activity::Chasing,
        Activity::GroupGathering,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Activity::AggressiveGesture => "AGGRESSIVE_GESTURE",
            Activity::ThreateningGesture => "THREATENING_GESTURE",
            Activity::Choking => "CHOKING",
            Activity::PersonDown => "PERSON_DOWN",
            Activity::Running => "RUNNING",
            Activity::Crouching => "CROUCHING",
            Activity::Surrender => "SURRENDER",
            Activity::Proximity => "PROXIMITY",
            Activity::PhysicalAssault => "PHYSICAL_ASSAULT",
            Activity::Restraining => "RESTRAINING",
            Activity::Chasing => "CHASING",
            Activity::GroupGathering => "GROUP_GATHERING",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicated signals and activities observed in one frame (or one person).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSet {
    pub signals: BTreeSet<Signal>,
    pub activities: BTreeSet<Activity>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a signal together with the activity it implies.
    pub fn insert(&mut self, signal: Signal) {
        self.signals.insert(signal);
        self.activities.insert(signal.activity());
    }

    pub fn merge(&mut self, other: TagSet) {
        self.signals.extend(other.signals);
        self.activities.extend(other.activities);
    }

    pub fn has(&self, signal: Signal) -> bool {
        self.signals.contains(&signal)
    }

    pub fn has_activity(&self, activity: Activity) -> bool {
        self.activities.contains(&activity)
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty() && self.activities.is_empty()
    }
}
