//! Scripted camera tour driven by a frame counter.
//!
//! The script is a table of inclusive frame windows. Each frame the directive whose window
//! holds the counter gets one chance to act: rotations step by one degree until their limit
//! is reached and then idle for the rest of the window, translations step every frame.

use crate::camera::{Camera, MoveDirection};
use crate::movement::MovementPolicy;
use crate::orientation::Orientation;

/// What a directive does on each frame of its window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Add `step` degrees to yaw while yaw has not reached `limit`
    RotateYawUntil { limit: f32, step: f32 },
    /// Add `step` degrees to pitch while pitch has not reached `limit`
    RotatePitchUntil { limit: f32, step: f32 },
    /// Move one camera step
    Translate(MoveDirection),
}

/// Inclusive frame window and its action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Directive {
    pub start: u32,
    pub end: u32,
    pub action: Action,
}

impl Directive {
    const fn new(start: u32, end: u32, action: Action) -> Self {
        Self { start, end, action }
    }

    pub fn contains(&self, frame: u32) -> bool {
        (self.start..=self.end).contains(&frame)
    }
}

const fn yaw(limit: f32, step: f32) -> Action {
    Action::RotateYawUntil { limit, step }
}

const fn pitch(limit: f32, step: f32) -> Action {
    Action::RotatePitchUntil { limit, step }
}

/// The cinematic tour of the valley
pub const TOUR: [Directive; 15] = [
    Directive::new(0, 149, yaw(-145.0, -1.0)),
    Directive::new(150, 199, pitch(-60.0, -1.0)),
    Directive::new(200, 249, Action::Translate(MoveDirection::Backward)),
    Directive::new(250, 299, pitch(50.0, 1.0)),
    Directive::new(300, 324, Action::Translate(MoveDirection::Right)),
    Directive::new(325, 424, Action::Translate(MoveDirection::Forward)),
    Directive::new(425, 479, yaw(30.0, 1.0)),
    Directive::new(480, 579, Action::Translate(MoveDirection::Forward)),
    Directive::new(580, 649, yaw(45.0, 1.0)),
    Directive::new(650, 679, pitch(20.0, 1.0)),
    Directive::new(680, 749, Action::Translate(MoveDirection::Forward)),
    Directive::new(750, 859, yaw(100.0, 1.0)),
    Directive::new(860, 879, pitch(-15.0, -1.0)),
    Directive::new(880, 999, Action::Translate(MoveDirection::Forward)),
    Directive::new(1000, 1199, yaw(-180.0, -1.0)),
];

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Rotated,
    Moved,
    /// Translation refused by the movement policy
    Blocked,
    /// Limit already reached, or no directive covers the frame
    Idle,
    /// The script has finished; nothing was touched
    Inactive,
}

/// Frame-indexed autopilot. Once finished it stays finished.
#[derive(Debug, Clone)]
pub struct Choreography {
    script: Vec<Directive>,
    frame: u32,
    end_frame: u32,
    active: bool,
    speed: f32,
}

impl Choreography {
    /// Interpret `script`, translating `speed` units per step.
    /// Directives must be sorted by start frame and must not overlap.
    pub fn new(script: Vec<Directive>, speed: f32) -> Self {
        debug_assert!(
            script.windows(2).all(|w| w[0].end < w[1].start),
            "directives must be ordered and disjoint"
        );
        let end_frame = script.last().map_or(0, |d| d.end + 1);
        Self {
            script,
            frame: 0,
            end_frame,
            active: end_frame > 0,
            speed,
        }
    }

    pub fn tour(speed: f32) -> Self {
        Self::new(TOUR.to_vec(), speed)
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// First frame past the last window
    pub fn end_frame(&self) -> u32 {
        self.end_frame
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Fraction of the script already played, in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.end_frame == 0 {
            1.0
        } else {
            self.frame as f32 / self.end_frame as f32
        }
    }

    pub fn directive_at(&self, frame: u32) -> Option<&Directive> {
        self.script.iter().find(|d| d.contains(frame))
    }

    /// Play one frame of the script against the camera and the shared orientation
    pub fn tick(
        &mut self,
        camera: &mut Camera,
        orientation: &mut Orientation,
        policy: &impl MovementPolicy,
    ) -> Tick {
        if !self.active {
            return Tick::Inactive;
        }

        let outcome = match self.directive_at(self.frame).map(|d| d.action) {
            Some(Action::RotateYawUntil { limit, step }) => {
                if limit_reached(orientation.yaw(), limit, step) {
                    Tick::Idle
                } else {
                    orientation.add_yaw(step);
                    camera.rotate(orientation.pitch(), orientation.yaw());
                    Tick::Rotated
                }
            }
            Some(Action::RotatePitchUntil { limit, step }) => {
                if limit_reached(orientation.pitch(), limit, step) {
                    Tick::Idle
                } else {
                    orientation.add_pitch(step);
                    camera.rotate(orientation.pitch(), orientation.yaw());
                    Tick::Rotated
                }
            }
            Some(Action::Translate(direction)) => {
                if camera.move_by(direction, self.speed, policy) {
                    Tick::Moved
                } else {
                    Tick::Blocked
                }
            }
            None => Tick::Idle,
        };

        self.frame += 1;
        if self.frame >= self.end_frame {
            self.active = false;
        }
        outcome
    }
}

/// Decreasing steps stop at or below the limit, increasing steps at or above it
fn limit_reached(value: f32, limit: f32, step: f32) -> bool {
    if step < 0.0 {
        value <= limit
    } else {
        value >= limit
    }
}
