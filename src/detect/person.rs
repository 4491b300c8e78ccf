//! Per-person signal extraction.
//!
//! Every heuristic is scaled by the person's own torso height or shoulder
//! width, so results hold across resolutions for a fixed camera framing.
//! Checks are independent; one pose can raise several signals.

use crate::geometry::{angle_at, distance, verticality};
use crate::pose::{Landmark, PersonPose, Point, Side};

use super::tags::{Signal, TagSet};

/// Elbow angle must be within this many degrees of straight.
const ARM_STRAIGHT_TOLERANCE_DEG: f32 = 30.0;
/// Wrist-shoulder reach, in torso heights, for an extended arm.
const ARM_REACH_RATIO: f32 = 0.7;
/// Wrist above elbow, in torso heights, for a punch.
const PUNCH_LIFT_RATIO: f32 = 0.1;
/// Knee above hip or ankle above knee, in torso heights, for a kick.
const KICK_LIFT_RATIO: f32 = 0.1;
/// Open interval of knee angles read as a kicking leg.
const KICK_KNEE_ANGLE_DEG: (f32, f32) = (120.0, 160.0);
/// Horizontal wrist offset, in shoulder widths, for a pointed weapon.
const WEAPON_REACH_RATIO: f32 = 1.5;
/// Estimated neck sits this far below the nose, in torso heights.
const NECK_OFFSET_RATIO: f32 = 0.2;
/// Wrist within this many torso heights of the neck reads as a grab.
const NECK_GRAB_RATIO: f32 = 0.3;
const FALLEN_VERTICALITY: f32 = 0.3;
const RUNNING_KNEE_ANGLE_DEG: f32 = 120.0;
const RUNNING_KNEE_SPREAD_PX: f32 = 20.0;
const CROUCH_KNEE_HIP_RATIO: f32 = 1.2;
/// Wrists above shoulders, in torso heights, for hands up.
const HANDS_UP_RATIO: f32 = 0.2;

/// Quality gate applied before any heuristic runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtractorSettings {
    /// A landmark counts as visible above this confidence.
    pub keypoint_confidence: f32,
    /// Fewer visible landmarks than this and the pose is noise.
    pub min_visible_keypoints: usize,
    /// Torso height and shoulder width floor, in pixels.
    pub min_body_px: f32,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            keypoint_confidence: 0.4,
            min_visible_keypoints: 10,
            min_body_px: 10.0,
        }
    }
}

/// Extract signals and activities for one person.
///
/// Poses that fail the quality gate yield an empty set.
pub fn extract(pose: &PersonPose, settings: &ExtractorSettings) -> TagSet {
    let mut tags = TagSet::new();

    if pose.confidence().is_some()
        && pose.visible_count(settings.keypoint_confidence) < settings.min_visible_keypoints
    {
        return tags;
    }

    let torso = pose.torso_height();
    let shoulders = pose.shoulder_width();
    // NaN from missing landmarks must fail the gate too
    if !(torso >= settings.min_body_px && shoulders >= settings.min_body_px) {
        return tags;
    }

    let body = Body {
        pose,
        torso,
        shoulders,
    };

    for side in Side::BOTH {
        let extended = body.arm_extended(side);
        if extended && body.wrist_above_elbow(side) {
            tags.insert(Signal::punch(side));
        }
        if body.kicking(side) {
            tags.insert(Signal::kick(side));
        }
        if extended && body.wrist_reach_x(side) > WEAPON_REACH_RATIO * shoulders {
            tags.insert(Signal::weapon_threat(side));
        }
        if body.wrist_at_neck(side) {
            tags.insert(Signal::grab_neck(side));
        }
    }

    if verticality(pose) < FALLEN_VERTICALITY {
        tags.insert(Signal::Fallen);
    }
    if body.running() {
        tags.insert(Signal::Running);
    }
    if body.crouching() {
        tags.insert(Signal::Crouching);
    }
    if body.hands_up() {
        tags.insert(Signal::HandsUp);
    }

    log::trace!(
        "person torso={:.1} shoulders={:.1} signals={:?}",
        torso,
        shoulders,
        tags.signals
    );
    tags
}

/// A pose that passed the quality gate, with its scale measures.
struct Body<'a> {
    pose: &'a PersonPose,
    torso: f32,
    shoulders: f32,
}

impl Body<'_> {
    fn at(&self, landmark: Landmark) -> Point {
        self.pose.get(landmark)
    }

    fn arm_extended(&self, side: Side) -> bool {
        let limb = side.limb();
        let shoulder = self.at(limb.shoulder);
        let wrist = self.at(limb.wrist);
        let angle = angle_at(shoulder, self.at(limb.elbow), wrist);
        (180.0 - angle).abs() <= ARM_STRAIGHT_TOLERANCE_DEG
            && distance(wrist, shoulder) > ARM_REACH_RATIO * self.torso
    }

    fn wrist_above_elbow(&self, side: Side) -> bool {
        let limb = side.limb();
        self.at(limb.elbow).y - self.at(limb.wrist).y > PUNCH_LIFT_RATIO * self.torso
    }

    fn wrist_reach_x(&self, side: Side) -> f32 {
        let limb = side.limb();
        (self.at(limb.wrist).x - self.at(limb.shoulder).x).abs()
    }

    fn knee_angle(&self, side: Side) -> f32 {
        let limb = side.limb();
        angle_at(self.at(limb.hip), self.at(limb.knee), self.at(limb.ankle))
    }

    fn kicking(&self, side: Side) -> bool {
        let limb = side.limb();
        let (hip, knee, ankle) = (self.at(limb.hip), self.at(limb.knee), self.at(limb.ankle));
        let lift = KICK_LIFT_RATIO * self.torso;
        let angle = self.knee_angle(side);
        hip.y - knee.y > lift
            || knee.y - ankle.y > lift
            || (angle > KICK_KNEE_ANGLE_DEG.0 && angle < KICK_KNEE_ANGLE_DEG.1)
    }

    fn wrist_at_neck(&self, side: Side) -> bool {
        let nose = self.at(Landmark::Nose);
        let neck = Point::new(nose.x, nose.y + NECK_OFFSET_RATIO * self.torso);
        distance(self.at(side.limb().wrist), neck) < NECK_GRAB_RATIO * self.torso
    }

    fn running(&self) -> bool {
        // a 0 degree angle means a leg landmark is missing or collapsed
        let bent = Side::BOTH.iter().any(|&side| {
            let angle = self.knee_angle(side);
            angle > 0.0 && angle < RUNNING_KNEE_ANGLE_DEG
        });
        let spread = (self.at(Landmark::LeftKnee).y - self.at(Landmark::RightKnee).y).abs();
        bent && spread > RUNNING_KNEE_SPREAD_PX
    }

    fn crouching(&self) -> bool {
        let knees = (self.at(Landmark::LeftKnee).y + self.at(Landmark::RightKnee).y) / 2.0;
        let hips = (self.at(Landmark::LeftHip).y + self.at(Landmark::RightHip).y) / 2.0;
        knees > CROUCH_KNEE_HIP_RATIO * hips
    }

    fn hands_up(&self) -> bool {
        let lift = HANDS_UP_RATIO * self.torso;
        Side::BOTH.iter().all(|&side| {
            let limb = side.limb();
            self.at(limb.shoulder).y - self.at(limb.wrist).y > lift
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Hand-built poses shared by the detector tests.
    //!
    //! The standing pose has torso height 100 px (shoulders y=300, hips y=400)
    //! and shoulder width 60 px, and raises no signal.

    use crate::pose::{BoundingBox, Landmark, PersonPose, Point, KEYPOINT_COUNT};

    pub fn standing_points() -> [Point; KEYPOINT_COUNT] {
        let mut p = [Point::new(0.0, 0.0); KEYPOINT_COUNT];
        let mut set = |l: Landmark, x: f32, y: f32| p[l.index()] = Point::new(x, y);
        set(Landmark::Nose, 100.0, 250.0);
        set(Landmark::LeftEye, 95.0, 245.0);
        set(Landmark::RightEye, 105.0, 245.0);
        set(Landmark::LeftEar, 90.0, 250.0);
        set(Landmark::RightEar, 110.0, 250.0);
        set(Landmark::LeftShoulder, 70.0, 300.0);
        set(Landmark::RightShoulder, 130.0, 300.0);
        set(Landmark::LeftElbow, 65.0, 350.0);
        set(Landmark::RightElbow, 135.0, 350.0);
        set(Landmark::LeftWrist, 60.0, 395.0);
        set(Landmark::RightWrist, 140.0, 395.0);
        set(Landmark::LeftHip, 88.0, 400.0);
        set(Landmark::RightHip, 112.0, 400.0);
        set(Landmark::LeftKnee, 88.0, 460.0);
        set(Landmark::RightKnee, 112.0, 460.0);
        set(Landmark::LeftAnkle, 88.0, 520.0);
        set(Landmark::RightAnkle, 112.0, 520.0);
        p
    }

    pub fn standing() -> PersonPose {
        PersonPose::new(standing_points())
    }

    /// Standing pose with landmarks moved.
    pub fn with(moves: &[(Landmark, f32, f32)]) -> PersonPose {
        let mut p = standing_points();
        for &(l, x, y) in moves {
            p[l.index()] = Point::new(x, y);
        }
        PersonPose::new(p)
    }

    /// Same pose translated by `(dx, dy)`.
    pub fn shifted(pose: &PersonPose, dx: f32, dy: f32) -> PersonPose {
        let mut p = *pose.keypoints();
        for point in p.iter_mut() {
            point.x += dx;
            point.y += dy;
        }
        PersonPose::new(p)
    }

    /// Left arm straight, wrist 30 px above the elbow, reach 80 px.
    pub fn punching_left() -> PersonPose {
        let reach_x = (80.0f32 * 80.0 - 60.0 * 60.0).sqrt();
        with(&[
            (Landmark::LeftElbow, 70.0 - reach_x / 2.0, 270.0),
            (Landmark::LeftWrist, 70.0 - reach_x, 240.0),
        ])
    }

    /// Right wrist 14 px from the estimated neck point.
    pub fn choking_right() -> PersonPose {
        with(&[
            (Landmark::RightElbow, 140.0, 340.0),
            (Landmark::RightWrist, 110.0, 280.0),
        ])
    }

    /// Right arm held straight out sideways, wrist 100 px from the shoulder.
    pub fn pointing_right() -> PersonPose {
        with(&[
            (Landmark::RightElbow, 180.0, 300.0),
            (Landmark::RightWrist, 230.0, 300.0),
        ])
    }

    /// Right knee bent to 90 degrees and raised 30 px above the left.
    pub fn running() -> PersonPose {
        with(&[
            (Landmark::RightKnee, 142.0, 430.0),
            (Landmark::RightAnkle, 112.0, 460.0),
        ])
    }

    /// Elbows bent, both wrists 100 px above the shoulders.
    pub fn hands_up() -> PersonPose {
        with(&[
            (Landmark::LeftElbow, 40.0, 260.0),
            (Landmark::LeftWrist, 60.0, 200.0),
            (Landmark::RightElbow, 160.0, 260.0),
            (Landmark::RightWrist, 140.0, 200.0),
        ])
    }

    /// Torso lying along the x axis.
    pub fn lying() -> PersonPose {
        with(&[
            (Landmark::LeftShoulder, 100.0, 290.0),
            (Landmark::RightShoulder, 100.0, 310.0),
            (Landmark::LeftHip, 200.0, 290.0),
            (Landmark::RightHip, 200.0, 310.0),
            (Landmark::LeftElbow, 130.0, 280.0),
            (Landmark::RightElbow, 130.0, 320.0),
            (Landmark::LeftWrist, 160.0, 280.0),
            (Landmark::RightWrist, 160.0, 320.0),
            (Landmark::LeftKnee, 260.0, 290.0),
            (Landmark::RightKnee, 260.0, 310.0),
            (Landmark::LeftAnkle, 320.0, 290.0),
            (Landmark::RightAnkle, 320.0, 310.0),
            (Landmark::Nose, 50.0, 300.0),
        ])
    }

    /// Box with a 200 px diagonal.
    pub fn person_box() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 120.0, 160.0)
    }
}
