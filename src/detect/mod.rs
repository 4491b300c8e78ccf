//! Frame-level signal extraction.
//!
//! Per-person extraction and pairwise analysis are pure functions over the
//! frame's immutable snapshot. Persons are processed in parallel; results are
//! merged into ordered sets so output never depends on scheduling.

pub mod interaction;
pub mod person;
mod tags;

use rayon::prelude::*;

use crate::pose::{BoundingBox, PersonPose};

pub use person::{extract, ExtractorSettings};
pub use tags::{Activity, Signal, TagSet};

/// Extract every signal and activity visible in one frame.
///
/// `boxes` is index-aligned with `persons`; a pose without a box is skipped by
/// the box-normalized checks only.
pub fn extract_frame(
    persons: &[PersonPose],
    boxes: &[BoundingBox],
    settings: &ExtractorSettings,
) -> TagSet {
    let per_person: Vec<TagSet> = persons
        .par_iter()
        .map(|pose| person::extract(pose, settings))
        .collect();

    let mut tags = TagSet::new();
    for person_tags in per_person {
        tags.merge(person_tags);
    }
    tags.merge(interaction::analyze(persons, boxes));
    tags
}

#[cfg(test)]
mod tests {
    use super::person::fixtures::*;
    use super::*;

    #[test]
    fn empty_frame_has_no_tags() {
        let tags = extract_frame(&[], &[], &ExtractorSettings::default());
        assert!(tags.is_empty());
    }

    #[test]
    fn person_and_pair_tags_are_merged() {
        let tags = extract_frame(
            &[punching_left(), standing()],
            &[person_box(), person_box()],
            &ExtractorSettings::default(),
        );
        assert!(tags.has(Signal::PunchLeft));
        assert!(tags.has(Signal::CloseContact));
        assert!(tags.has_activity(Activity::AggressiveGesture));
        assert!(tags.has_activity(Activity::Proximity));
    }
}
