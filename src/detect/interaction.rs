//! Pairwise interaction analysis.
//!
//! Runs over every unordered pair of persons in a frame, plus one group-level
//! check for three or more. Results for all pairs accumulate into one
//! deduplicated set.
//!
//! The head and grab checks use absolute pixel radii while close contact is
//! normalized by box size; the mix is kept as observed in the field.

use crate::geometry::{distance, unit_vector, DEGENERATE_LEN};
use crate::pose::{BoundingBox, Landmark, PersonPose};

use super::tags::{Signal, TagSet};

/// Hip-center distance over the pair's union box diagonal.
const CLOSE_CONTACT_RATIO: f32 = 0.3;
const HEAD_STRIKE_PX: f32 = 30.0;
const GRAB_PX: f32 = 25.0;
/// Cosine between facing direction and direction to the other person.
const CHASE_ALIGNMENT: f32 = 0.7;
/// Coefficient of variation of radial distances below which a group is a ring.
const CROWD_SPREAD_RATIO: f32 = 0.3;
const CROWD_MIN_PERSONS: usize = 3;

const WRISTS: [Landmark; 2] = [Landmark::LeftWrist, Landmark::RightWrist];
const GRAB_TARGETS: [Landmark; 4] = [
    Landmark::LeftShoulder,
    Landmark::RightShoulder,
    Landmark::LeftHip,
    Landmark::RightHip,
];

/// Analyze all pairs in a frame. `boxes` is index-aligned with `persons`.
pub fn analyze(persons: &[PersonPose], boxes: &[BoundingBox]) -> TagSet {
    let mut tags = TagSet::new();

    for i in 0..persons.len() {
        for j in (i + 1)..persons.len() {
            let (a, b) = (&persons[i], &persons[j]);

            if let (Some(box_a), Some(box_b)) = (boxes.get(i), boxes.get(j)) {
                if close_contact(a, b, box_a, box_b) {
                    tags.insert(Signal::CloseContact);
                }
            }
            if strikes_head(a, b) || strikes_head(b, a) {
                tags.insert(Signal::AssaultHead);
            }
            if grabs(a, b) || grabs(b, a) {
                tags.insert(Signal::Grabbing);
            }
            if faces_toward(a, b) || faces_toward(b, a) {
                tags.insert(Signal::FollowingChasing);
            }
        }
    }

    if persons.len() >= CROWD_MIN_PERSONS && ring_formation(persons) {
        tags.insert(Signal::CrowdFormation);
    }

    if !tags.is_empty() {
        log::trace!("interactions persons={} signals={:?}", persons.len(), tags.signals);
    }
    tags
}

fn close_contact(
    a: &PersonPose,
    b: &PersonPose,
    box_a: &BoundingBox,
    box_b: &BoundingBox,
) -> bool {
    let diagonal = box_a.union(box_b).diagonal();
    if diagonal.is_nan() || diagonal <= 0.0 {
        return false;
    }
    distance(a.hip_center(), b.hip_center()) / diagonal < CLOSE_CONTACT_RATIO
}

/// Any wrist of `attacker` near any head landmark of `victim`.
fn strikes_head(attacker: &PersonPose, victim: &PersonPose) -> bool {
    WRISTS.iter().any(|&w| {
        Landmark::HEAD
            .iter()
            .any(|&h| distance(attacker.get(w), victim.get(h)) < HEAD_STRIKE_PX)
    })
}

/// Any wrist of `grabber` near a shoulder or hip of `target`.
fn grabs(grabber: &PersonPose, target: &PersonPose) -> bool {
    WRISTS.iter().any(|&w| {
        GRAB_TARGETS
            .iter()
            .any(|&t| distance(grabber.get(w), target.get(t)) < GRAB_PX)
    })
}

/// `follower` faces (shoulders to nose) toward `other`'s hips.
fn faces_toward(follower: &PersonPose, other: &PersonPose) -> bool {
    let facing = unit_vector(follower.shoulder_center(), follower.get(Landmark::Nose));
    let toward = unit_vector(follower.hip_center(), other.hip_center());
    match (facing, toward) {
        (Some((fx, fy)), Some((tx, ty))) => fx * tx + fy * ty > CHASE_ALIGNMENT,
        _ => false,
    }
}

/// Hip centers spaced evenly around their centroid.
fn ring_formation(persons: &[PersonPose]) -> bool {
    let centers: Vec<_> = persons.iter().map(PersonPose::hip_center).collect();
    let n = centers.len() as f32;
    let cx = centers.iter().map(|p| p.x).sum::<f32>() / n;
    let cy = centers.iter().map(|p| p.y).sum::<f32>() / n;

    let radii: Vec<f32> = centers.iter().map(|p| (p.x - cx).hypot(p.y - cy)).collect();
    let mean = radii.iter().sum::<f32>() / n;
    if mean.is_nan() || mean <= DEGENERATE_LEN {
        return false;
    }
    let variance = radii.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / n;
    variance.sqrt() / mean < CROWD_SPREAD_RATIO
}
