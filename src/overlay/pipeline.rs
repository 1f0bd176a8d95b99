//! # Dispatch Pipeline
//!
//! Ordered play-mode dispatch stages and the short-circuit rules between
//! them.
//!
//! Moves and releases are *forced*: they reach every stage and every
//! control regardless of hit tests, so a control whose finger wandered off
//! its region still sees the release. Downs stop at the first stage that
//! reports a hit and are only offered to enabled controls under the finger.
//!
//! | Action | Forced | Stage offered when | Control offered when |
//! |--------|--------|--------------------|----------------------|
//! | down / pointer-down | no | nothing hit yet | nothing hit yet, enabled, contains the point |
//! | move | yes | always | always |
//! | up / pointer-up / cancel | yes | always | always |

use crate::touch::TouchAction;

/// One group of controls in the play-mode dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Directional pads.
    Pads,
    /// Push buttons.
    Buttons,
    /// Fixed (always visible) analog sticks.
    FixedSticks,
    /// Active floating sticks.
    FloatingSticks,
}

/// Short-circuit policy for one event.
///
/// # Examples
///
/// ```
/// use pad_overlay::overlay::pipeline::DispatchPolicy;
/// use pad_overlay::touch::TouchAction;
///
/// let down = DispatchPolicy::for_action(TouchAction::Down);
/// assert!(down.offers_stage(false));
/// assert!(!down.offers_stage(true));
///
/// let up = DispatchPolicy::for_action(TouchAction::Up);
/// assert!(up.is_forced());
/// assert!(up.offers_stage(true));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    force: bool,
}

impl DispatchPolicy {
    #[must_use]
    pub const fn for_action(action: TouchAction) -> Self {
        Self {
            force: matches!(
                action,
                TouchAction::Up | TouchAction::PointerUp | TouchAction::Cancel | TouchAction::Move
            ),
        }
    }

    /// Returns true when the event is broadcast to every control.
    #[must_use]
    pub const fn is_forced(&self) -> bool {
        self.force
    }

    /// Whether a stage runs, given whether an earlier one reported a hit.
    #[must_use]
    pub const fn offers_stage(&self, hit: bool) -> bool {
        self.force || !hit
    }

    /// Whether a single control receives the event.
    #[must_use]
    pub const fn offers_control(&self, hit: bool, enabled: bool, contains: bool) -> bool {
        self.force || (!hit && enabled && contains)
    }
}

/// Ordered list of dispatch stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPipeline {
    stages: Vec<Stage>,
}

impl Default for DispatchPipeline {
    /// Pads, then buttons, then fixed sticks, then floating sticks.
    fn default() -> Self {
        Self {
            stages: vec![Stage::Pads, Stage::Buttons, Stage::FixedSticks, Stage::FloatingSticks],
        }
    }
}

impl DispatchPipeline {
    #[must_use]
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Returns a copy without `stage`.
    #[must_use]
    pub fn without(mut self, stage: Stage) -> Self {
        self.stages.retain(|s| *s != stage);
        self
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// Runs `run` for each offered stage, OR-ing the hits together.
    ///
    /// ```
    /// use pad_overlay::overlay::pipeline::{DispatchPipeline, DispatchPolicy, Stage};
    /// use pad_overlay::touch::TouchAction;
    ///
    /// let pipeline = DispatchPipeline::default();
    /// let mut visited = Vec::new();
    /// let hit = pipeline.run(DispatchPolicy::for_action(TouchAction::Down), |stage, _| {
    ///     visited.push(stage);
    ///     stage == Stage::Buttons
    /// });
    /// assert!(hit);
    /// assert_eq!(visited, vec![Stage::Pads, Stage::Buttons]);
    /// ```
    pub fn run<F>(&self, policy: DispatchPolicy, mut run: F) -> bool
    where
        F: FnMut(Stage, bool) -> bool,
    {
        let mut hit = false;
        for &stage in &self.stages {
            if policy.offers_stage(hit) {
                hit |= run(stage, hit);
            }
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Policy Tests ====================

    #[test]
    fn test_forced_actions() {
        assert!(!DispatchPolicy::for_action(TouchAction::Down).is_forced());
        assert!(!DispatchPolicy::for_action(TouchAction::PointerDown).is_forced());
        assert!(DispatchPolicy::for_action(TouchAction::Move).is_forced());
        assert!(DispatchPolicy::for_action(TouchAction::PointerUp).is_forced());
        assert!(DispatchPolicy::for_action(TouchAction::Up).is_forced());
        assert!(DispatchPolicy::for_action(TouchAction::Cancel).is_forced());
    }

    #[test]
    fn test_offers_control() {
        let down = DispatchPolicy::for_action(TouchAction::Down);
        assert!(down.offers_control(false, true, true));
        assert!(!down.offers_control(true, true, true));
        assert!(!down.offers_control(false, false, true));
        assert!(!down.offers_control(false, true, false));

        let moved = DispatchPolicy::for_action(TouchAction::Move);
        assert!(moved.offers_control(true, false, false));
    }

    // ==================== Pipeline Tests ====================

    #[test]
    fn test_default_order() {
        assert_eq!(
            DispatchPipeline::default().stages(),
            &[Stage::Pads, Stage::Buttons, Stage::FixedSticks, Stage::FloatingSticks]
        );
    }

    #[test]
    fn test_without() {
        let pipeline = DispatchPipeline::default().without(Stage::FloatingSticks);
        assert!(!pipeline.contains(Stage::FloatingSticks));
        assert_eq!(pipeline.stages().len(), 3);
    }

    #[test]
    fn test_down_short_circuits() {
        let mut visited = Vec::new();
        let hit = DispatchPipeline::default().run(DispatchPolicy::for_action(TouchAction::Down), |stage, _| {
            visited.push(stage);
            stage == Stage::Pads
        });
        assert!(hit);
        assert_eq!(visited, vec![Stage::Pads]);
    }

    #[test]
    fn test_forced_visits_everything_and_accumulates() {
        let mut seen_hit = Vec::new();
        let hit = DispatchPipeline::default().run(DispatchPolicy::for_action(TouchAction::Up), |stage, hit| {
            seen_hit.push(hit);
            stage == Stage::Buttons
        });
        assert!(hit);
        assert_eq!(seen_hit, vec![false, false, true, true]);
    }

    #[test]
    fn test_no_hit_visits_everything() {
        let mut count = 0;
        let hit = DispatchPipeline::default().run(DispatchPolicy::for_action(TouchAction::Down), |_, _| {
            count += 1;
            false
        });
        assert!(!hit);
        assert_eq!(count, 4);
    }
}
