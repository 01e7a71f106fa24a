//! Button edge detector for the fire (primary) and aim (secondary) buttons.
//!
//! Mutated only from the device's button callback; the playback task polls
//! `stop_reason()` before every step.

use recoil_traits::MouseButton;
use std::sync::atomic::{AtomicBool, Ordering};

/// What the caller must do after an edge has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    None,
    StartPlayback,
}

/// Why a playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    PrimaryReleased,
    SecondaryHeld,
    PatternExhausted,
    Shutdown,
}

#[derive(Debug)]
pub struct TriggerState {
    primary_released: AtomicBool,
    secondary_held: AtomicBool,
    active: AtomicBool,
}

impl Default for TriggerState {
    fn default() -> Self {
        Self {
            primary_released: AtomicBool::new(true),
            secondary_held: AtomicBool::new(false),
            active: AtomicBool::new(false),
        }
    }
}

impl TriggerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one button edge.
    ///
    /// Primary press while the secondary is held is ignored.
    pub fn on_button(&self, button: MouseButton, pressed: bool) -> TriggerAction {
        match (button, pressed) {
            (MouseButton::Secondary, true) => {
                self.secondary_held.store(true, Ordering::Release);
                TriggerAction::None
            }
            (MouseButton::Secondary, false) => {
                self.secondary_held.store(false, Ordering::Release);
                self.active.store(false, Ordering::Release);
                TriggerAction::None
            }
            (MouseButton::Primary, false) => {
                self.primary_released.store(true, Ordering::Release);
                self.active.store(false, Ordering::Release);
                TriggerAction::None
            }
            (MouseButton::Primary, true) => {
                if self.secondary_held.load(Ordering::Acquire) {
                    return TriggerAction::None;
                }
                self.primary_released.store(false, Ordering::Release);
                self.active.store(true, Ordering::Release);
                TriggerAction::StartPlayback
            }
            (MouseButton::Middle, _) => TriggerAction::None,
        }
    }

    /// Drop the active flag after a press that did not start a run.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn primary_released(&self) -> bool {
        self.primary_released.load(Ordering::Acquire)
    }

    pub fn secondary_held(&self) -> bool {
        self.secondary_held.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop condition polled by the playback task before each step.
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.primary_released() {
            Some(StopReason::PrimaryReleased)
        } else if self.secondary_held() {
            Some(StopReason::SecondaryHeld)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MouseButton::{Middle, Primary, Secondary};

    #[test]
    fn primary_press_starts_and_release_stops() {
        let t = TriggerState::new();
        assert_eq!(t.stop_reason(), Some(StopReason::PrimaryReleased));
        assert_eq!(t.on_button(Primary, true), TriggerAction::StartPlayback);
        assert!(t.is_active());
        assert_eq!(t.stop_reason(), None);
        assert_eq!(t.on_button(Primary, false), TriggerAction::None);
        assert!(!t.is_active());
        assert_eq!(t.stop_reason(), Some(StopReason::PrimaryReleased));
    }

    #[test]
    fn secondary_held_vetoes_primary_press() {
        let t = TriggerState::new();
        t.on_button(Secondary, true);
        assert_eq!(t.on_button(Primary, true), TriggerAction::None);
        assert!(t.primary_released());
        assert!(!t.is_active());
        t.on_button(Secondary, false);
        assert_eq!(t.on_button(Primary, true), TriggerAction::StartPlayback);
    }

    #[test]
    fn secondary_press_mid_burst_stops_playback() {
        let t = TriggerState::new();
        t.on_button(Primary, true);
        t.on_button(Secondary, true);
        assert_eq!(t.stop_reason(), Some(StopReason::SecondaryHeld));
        t.on_button(Secondary, false);
        assert!(!t.is_active());
    }

    #[test]
    fn deactivate_keeps_button_state() {
        let t = TriggerState::new();
        t.on_button(Primary, true);
        t.deactivate();
        assert!(!t.is_active());
        assert!(!t.primary_released());
        assert_eq!(t.stop_reason(), None);
    }

    #[test]
    fn middle_button_is_ignored() {
        let t = TriggerState::new();
        assert_eq!(t.on_button(Middle, true), TriggerAction::None);
        assert!(t.primary_released());
    }
}
