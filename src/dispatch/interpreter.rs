//! Table-driven gesture interpreter
//!
//! Default [`GestureInterpreter`]. The right hand drives stateful gestures
//! (play/pause, volume, speed, loop and cut regions); the left hand plays
//! drums. State changes only happen when a hand's category changes, so a
//! held pose fires once. A hand that leaves the frame forgets its last
//! category, and losing the right hand releases volume or speed control.
//!
//! | State | Category | Hand | Next | Effect |
//! |---|---|---|---|---|
//! | Idle | Thumb_Up | Right | Idle | request play/pause |
//! | Idle | Pointing_Up | Right | Volume | |
//! | Idle | Victory | Right | Speed | |
//! | Idle | Closed_Fist | Right | LoopArmed | stamp start |
//! | Idle | Thumb_Down | Right | CutArmed | stamp start |
//! | LoopArmed | Open_Palm | Right | Idle | looping region |
//! | CutArmed | Open_Palm | Right | Idle | cut region |
//! | any | ILoveYou | Right | Idle | clear regions |
//! | Volume, Speed | other | Right | Idle | |

use super::traits::{GestureInterpreter, Region, Regions};
use crate::landmarks::{
    GestureCategory, Handedness, Landmark, HAND_LANDMARK_COUNT, INDEX_FINGER_TIP, WRIST,
};
use std::collections::HashMap;
use std::sync::Arc;

const MIN_SPEED: f32 = 0.5;
const MAX_SPEED: f32 = 2.0;
const SPEED_STEP: f32 = 0.25;

/// Drum kit indexed by extended-finger count
const DRUM_KIT: [&str; 5] = ["kick", "snare", "hihat", "clap", "crash"];

/// (tip, pip) landmark pairs for index..pinky
const FINGER_JOINTS: [(usize, usize); 4] = [(8, 6), (12, 10), (16, 14), (20, 18)];
const THUMB_TIP: usize = 4;
const THUMB_IP: usize = 3;
const INDEX_FINGER_MCP: usize = 5;

/// Interpreter state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Volume,
    Speed,
    /// Loop gesture held; `start` is stamped from the next playhead update
    LoopArmed { start: Option<f64> },
    CutArmed { start: Option<f64> },
}

/// Side effect of a transition
#[derive(Debug, Clone, Copy, PartialEq)]
enum Effect {
    None,
    TogglePlayback,
    CommitRegion { start: Option<f64>, looping: bool },
    ClearRegions,
}

/// Transition table lookup. `None` means no transition.
fn transition(
    state: GestureState,
    category: &GestureCategory,
    handedness: Handedness,
) -> Option<(GestureState, Effect, &'static str)> {
    use GestureCategory as C;
    use GestureState as S;

    if handedness != Handedness::Right {
        return None;
    }

    let row = match (state, category) {
        (_, C::ILoveYou) => (S::Idle, Effect::ClearRegions, "Regions cleared"),
        (S::Idle, C::ThumbUp) => (S::Idle, Effect::TogglePlayback, "Play/Pause"),
        (S::Idle, C::PointingUp) => (S::Volume, Effect::None, "Volume control"),
        (S::Idle, C::Victory) => (S::Speed, Effect::None, "Speed control"),
        (S::Idle, C::ClosedFist) => (S::LoopArmed { start: None }, Effect::None, "Loop start"),
        (S::Idle, C::ThumbDown) => (S::CutArmed { start: None }, Effect::None, "Cut start"),
        (S::LoopArmed { start }, C::OpenPalm) => (
            S::Idle,
            Effect::CommitRegion { start, looping: true },
            "Loop set",
        ),
        (S::CutArmed { start }, C::OpenPalm) => (
            S::Idle,
            Effect::CommitRegion { start, looping: false },
            "Cut set",
        ),
        (S::Volume, C::PointingUp) | (S::Speed, C::Victory) => return None,
        (S::Volume, _) | (S::Speed, _) => (S::Idle, Effect::None, "Ready"),
        _ => return None,
    };
    Some(row)
}

fn distance(a: &Landmark, b: &Landmark) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.depth() - b.depth();
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Number of extended fingers, thumb included
fn extended_fingers(landmarks: &[Landmark]) -> usize {
    let wrist = &landmarks[WRIST];
    let fingers = FINGER_JOINTS
        .iter()
        .filter(|(tip, pip)| distance(&landmarks[*tip], wrist) > distance(&landmarks[*pip], wrist))
        .count();

    let anchor = &landmarks[INDEX_FINGER_MCP];
    let thumb = distance(&landmarks[THUMB_TIP], anchor) > distance(&landmarks[THUMB_IP], anchor);

    fingers + usize::from(thumb)
}

/// Playback speed from fingertip height: top of frame is fastest
fn speed_for_height(y: f32) -> f32 {
    let raw = MIN_SPEED + (1.0 - y) * (MAX_SPEED - MIN_SPEED);
    ((raw / SPEED_STEP).round() * SPEED_STEP).clamp(MIN_SPEED, MAX_SPEED)
}

#[derive(Debug, Clone, Copy)]
struct PendingRegion {
    start: Option<f64>,
    looping: bool,
}

/// Default gesture interpreter
pub struct TransitionFsm {
    state: GestureState,
    last_category: HashMap<Handedness, GestureCategory>,
    toggle_requested: bool,
    speed: f32,
    last_drum_count: Option<usize>,
    pending_region: Option<PendingRegion>,
    clear_requested: bool,
    regions: Option<Arc<dyn Regions>>,
}

impl TransitionFsm {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            last_category: HashMap::new(),
            toggle_requested: false,
            speed: 1.0,
            last_drum_count: None,
            pending_region: None,
            clear_requested: false,
            regions: None,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }
}

impl Default for TransitionFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureInterpreter for TransitionFsm {
    fn update_state(
        &mut self,
        category: &GestureCategory,
        handedness: Handedness,
        _landmarks: &[Landmark],
    ) -> Option<String> {
        if self.last_category.get(&handedness) == Some(category) {
            return None;
        }
        self.last_category.insert(handedness, category.clone());

        let (next, effect, status) = transition(self.state, category, handedness)?;
        tracing::debug!(
            "Gesture transition {:?} -> {:?} on {} {}",
            self.state,
            next,
            handedness,
            category
        );
        self.state = next;

        match effect {
            Effect::None => {}
            Effect::TogglePlayback => self.toggle_requested = true,
            Effect::CommitRegion { start, looping } => {
                self.pending_region = Some(PendingRegion { start, looping });
            }
            Effect::ClearRegions => {
                self.pending_region = None;
                self.clear_requested = true;
            }
        }

        Some(status.to_string())
    }

    fn hands_present(&mut self, present: &[Handedness]) {
        // a hand that left the frame starts fresh when it comes back
        self.last_category.retain(|hand, _| present.contains(hand));

        if !present.contains(&Handedness::Left) {
            self.last_drum_count = None;
        }

        if !present.contains(&Handedness::Right)
            && matches!(self.state, GestureState::Volume | GestureState::Speed)
        {
            tracing::debug!("Right hand left the frame; releasing {:?}", self.state);
            self.state = GestureState::Idle;
        }
    }

    fn drum_sound_for(&mut self, landmarks: &[Landmark]) -> Option<String> {
        if landmarks.len() < HAND_LANDMARK_COUNT {
            return None;
        }

        let count = extended_fingers(landmarks);
        if self.last_drum_count == Some(count) {
            return None;
        }
        self.last_drum_count = Some(count);

        count
            .checked_sub(1)
            .and_then(|i| DRUM_KIT.get(i))
            .map(|sound| sound.to_string())
    }

    fn should_toggle_playback(&mut self) -> bool {
        std::mem::take(&mut self.toggle_requested)
    }

    fn speed_change_text(
        &mut self,
        landmarks: &[Landmark],
        handedness: Handedness,
    ) -> Option<String> {
        if self.state != GestureState::Speed || handedness != Handedness::Right {
            return None;
        }

        let tip = landmarks.get(INDEX_FINGER_TIP)?;
        let speed = speed_for_height(tip.y);
        if (speed - self.speed).abs() < f32::EPSILON {
            return None;
        }

        self.speed = speed;
        Some(format!("Speed {:.2}x", speed))
    }

    fn current_speed(&self) -> f32 {
        self.speed
    }

    fn manage_loop_regions(&mut self, current_time_sec: f64) {
        match &mut self.state {
            GestureState::LoopArmed { start } | GestureState::CutArmed { start } => {
                start.get_or_insert(current_time_sec);
            }
            _ => {}
        }

        let Some(regions) = &self.regions else {
            return;
        };

        if std::mem::take(&mut self.clear_requested) {
            regions.clear_regions();
        }

        if let Some(pending) = self.pending_region.take() {
            let start = pending.start.unwrap_or(current_time_sec);
            if current_time_sec > start {
                regions.add_region(Region {
                    start_sec: start,
                    end_sec: current_time_sec,
                    looping: pending.looping,
                    label: if pending.looping { "loop" } else { "cut" }.to_string(),
                });
            } else {
                tracing::debug!("Dropping empty region at {:.3}s", start);
            }
        }
    }

    fn is_volume_gesture_active(&self) -> bool {
        self.state == GestureState::Volume
    }

    fn has_regions_attached(&self) -> bool {
        self.regions.is_some()
    }

    fn attach_regions(&mut self, regions: Arc<dyn Regions>) {
        self.regions = Some(regions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRegions;

    fn right(fsm: &mut TransitionFsm, category: GestureCategory) -> Option<String> {
        fsm.update_state(&category, Handedness::Right, &[])
    }

    /// Hand with the first `extended` of thumb/index/middle/ring/pinky straight
    fn hand_with_fingers(extended: usize) -> Vec<Landmark> {
        let mut lm = vec![Landmark::new(0.5, 0.9, 0.0); 21];
        lm[INDEX_FINGER_MCP] = Landmark::new(0.5, 0.7, 0.0);
        // thumb: tip beyond ip when extended, tucked otherwise
        lm[THUMB_IP] = Landmark::new(0.4, 0.75, 0.0);
        lm[THUMB_TIP] = if extended >= 1 {
            Landmark::new(0.3, 0.75, 0.0)
        } else {
            Landmark::new(0.48, 0.72, 0.0)
        };
        for (i, (tip, pip)) in FINGER_JOINTS.iter().enumerate() {
            lm[*pip] = Landmark::new(0.5, 0.6, 0.0);
            lm[*tip] = if extended >= i + 2 {
                Landmark::new(0.5, 0.4, 0.0)
            } else {
                Landmark::new(0.5, 0.8, 0.0)
            };
        }
        lm
    }

    #[test]
    fn test_thumb_up_toggles_once_while_held() {
        let mut fsm = TransitionFsm::new();
        assert_eq!(right(&mut fsm, GestureCategory::ThumbUp).as_deref(), Some("Play/Pause"));
        assert!(right(&mut fsm, GestureCategory::ThumbUp).is_none());

        assert!(fsm.should_toggle_playback());
        assert!(!fsm.should_toggle_playback());
    }

    #[test]
    fn test_thumb_up_fires_again_after_hand_leaves() {
        let mut fsm = TransitionFsm::new();
        fsm.hands_present(&[Handedness::Right]);
        right(&mut fsm, GestureCategory::ThumbUp);
        assert!(fsm.should_toggle_playback());

        fsm.hands_present(&[]);
        fsm.hands_present(&[Handedness::Right]);
        assert_eq!(right(&mut fsm, GestureCategory::ThumbUp).as_deref(), Some("Play/Pause"));
        assert!(fsm.should_toggle_playback());
    }

    #[test]
    fn test_other_hand_leaving_keeps_memory() {
        let mut fsm = TransitionFsm::new();
        fsm.hands_present(&[Handedness::Right, Handedness::Left]);
        right(&mut fsm, GestureCategory::ThumbUp);
        assert!(fsm.should_toggle_playback());

        fsm.hands_present(&[Handedness::Right]);
        assert!(right(&mut fsm, GestureCategory::ThumbUp).is_none());
        assert!(!fsm.should_toggle_playback());
    }

    #[test]
    fn test_volume_released_when_right_hand_leaves() {
        let mut fsm = TransitionFsm::new();
        right(&mut fsm, GestureCategory::PointingUp);
        assert!(fsm.is_volume_gesture_active());

        fsm.hands_present(&[Handedness::Left]);
        assert!(!fsm.is_volume_gesture_active());
        assert_eq!(fsm.state(), GestureState::Idle);

        right(&mut fsm, GestureCategory::Victory);
        fsm.hands_present(&[]);
        assert_eq!(fsm.state(), GestureState::Idle);
    }

    #[test]
    fn test_armed_loop_survives_hand_leaving() {
        let mut fsm = TransitionFsm::new();
        right(&mut fsm, GestureCategory::ClosedFist);
        fsm.hands_present(&[]);
        assert_eq!(fsm.state(), GestureState::LoopArmed { start: None });
    }

    #[test]
    fn test_left_hand_never_transitions() {
        let mut fsm = TransitionFsm::new();
        assert!(fsm
            .update_state(&GestureCategory::PointingUp, Handedness::Left, &[])
            .is_none());
        assert_eq!(fsm.state(), GestureState::Idle);
    }

    #[test]
    fn test_volume_state_until_release() {
        let mut fsm = TransitionFsm::new();
        right(&mut fsm, GestureCategory::PointingUp);
        assert!(fsm.is_volume_gesture_active());

        right(&mut fsm, GestureCategory::OpenPalm);
        assert!(!fsm.is_volume_gesture_active());
        assert_eq!(fsm.state(), GestureState::Idle);
    }

    #[test]
    fn test_speed_follows_fingertip() {
        let mut fsm = TransitionFsm::new();
        let mut lm = vec![Landmark::new(0.5, 0.5, 0.0); 21];

        // not in speed state yet
        assert!(fsm.speed_change_text(&lm, Handedness::Right).is_none());

        right(&mut fsm, GestureCategory::Victory);
        lm[INDEX_FINGER_TIP] = Landmark::new(0.5, 0.0, 0.0);
        assert_eq!(
            fsm.speed_change_text(&lm, Handedness::Right).as_deref(),
            Some("Speed 2.00x")
        );
        assert_eq!(fsm.current_speed(), 2.0);

        // unchanged speed reports nothing
        assert!(fsm.speed_change_text(&lm, Handedness::Right).is_none());

        lm[INDEX_FINGER_TIP] = Landmark::new(0.5, 1.0, 0.0);
        fsm.speed_change_text(&lm, Handedness::Right);
        assert_eq!(fsm.current_speed(), 0.5);
    }

    #[test]
    fn test_speed_quantized() {
        assert_eq!(speed_for_height(0.5), 1.25);
        assert_eq!(speed_for_height(2.0), MIN_SPEED);
        assert_eq!(speed_for_height(-1.0), MAX_SPEED);
    }

    #[test]
    fn test_drum_edge_triggered() {
        let mut fsm = TransitionFsm::new();

        assert_eq!(fsm.drum_sound_for(&hand_with_fingers(2)).as_deref(), Some("snare"));
        assert!(fsm.drum_sound_for(&hand_with_fingers(2)).is_none());
        assert!(fsm.drum_sound_for(&hand_with_fingers(0)).is_none());
        assert_eq!(fsm.drum_sound_for(&hand_with_fingers(5)).as_deref(), Some("crash"));
        assert_eq!(fsm.drum_sound_for(&hand_with_fingers(1)).as_deref(), Some("kick"));
    }

    #[test]
    fn test_drum_repeats_after_left_hand_leaves() {
        let mut fsm = TransitionFsm::new();
        assert_eq!(fsm.drum_sound_for(&hand_with_fingers(2)).as_deref(), Some("snare"));

        fsm.hands_present(&[Handedness::Right]);
        assert_eq!(fsm.drum_sound_for(&hand_with_fingers(2)).as_deref(), Some("snare"));
    }

    #[test]
    fn test_drum_requires_full_hand() {
        let mut fsm = TransitionFsm::new();
        assert!(fsm.drum_sound_for(&[Landmark::default(); 5]).is_none());
    }

    #[test]
    fn test_loop_region_created_from_playhead() {
        let regions = Arc::new(RecordingRegions::default());
        let mut fsm = TransitionFsm::new();
        fsm.attach_regions(regions.clone());
        assert!(fsm.has_regions_attached());

        right(&mut fsm, GestureCategory::ClosedFist);
        fsm.manage_loop_regions(4.0);
        fsm.manage_loop_regions(5.0);
        right(&mut fsm, GestureCategory::OpenPalm);
        fsm.manage_loop_regions(6.5);
        // second call in the same frame does nothing more
        fsm.manage_loop_regions(6.5);

        let created = regions.regions.lock().clone();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].start_sec, 4.0);
        assert_eq!(created[0].end_sec, 6.5);
        assert!(created[0].looping);
    }

    #[test]
    fn test_cut_region_and_clear() {
        let regions = Arc::new(RecordingRegions::default());
        let mut fsm = TransitionFsm::new();
        fsm.attach_regions(regions.clone());

        right(&mut fsm, GestureCategory::ThumbDown);
        fsm.manage_loop_regions(1.0);
        right(&mut fsm, GestureCategory::OpenPalm);
        fsm.manage_loop_regions(2.0);
        assert_eq!(regions.regions.lock().len(), 1);
        assert!(!regions.regions.lock()[0].looping);

        right(&mut fsm, GestureCategory::ILoveYou);
        fsm.manage_loop_regions(3.0);
        assert!(regions.regions.lock().is_empty());
        assert_eq!(*regions.clears.lock(), 1);
    }

    #[test]
    fn test_regions_wait_for_attachment() {
        let regions = Arc::new(RecordingRegions::default());
        let mut fsm = TransitionFsm::new();

        right(&mut fsm, GestureCategory::ClosedFist);
        fsm.manage_loop_regions(1.0);
        right(&mut fsm, GestureCategory::OpenPalm);
        fsm.manage_loop_regions(2.0);

        fsm.attach_regions(regions.clone());
        fsm.manage_loop_regions(3.0);
        let created = regions.regions.lock().clone();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].start_sec, 1.0);
        assert_eq!(created[0].end_sec, 3.0);
    }
}
