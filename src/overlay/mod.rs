//! # Overlay Module
//!
//! The touch router: single entry point for every touch event.
//!
//! The overlay owns every control, the pointer ownership arena and the
//! aggregated [`ControllerState`]. In play mode each event runs through the
//! [`DispatchPipeline`] (pads, buttons, fixed sticks, floating sticks), the
//! resulting state is forwarded to the [`StateSink`], and a touch-down that
//! nothing claimed may spawn a floating stick. In edit mode the same events
//! select and drag controls instead (see [`editor`]).
//!
//! ## Usage
//!
//! ```
//! use pad_overlay::config::Config;
//! use pad_overlay::overlay::Overlay;
//! use pad_overlay::state::{Digital2, DigitalField, LoggingSink};
//! use pad_overlay::store::MemoryStore;
//! use pad_overlay::touch::{TouchEvent, TouchPointer};
//!
//! let config = Config::default();
//! let mut overlay = Overlay::with_default_layout(
//!     &config,
//!     Box::new(MemoryStore::new()),
//!     Box::new(LoggingSink::new()),
//! )?;
//!
//! // Bottom edge of the face-button pad is Cross
//! let outcome = overlay.handle_touch(&TouchEvent::down(TouchPointer::new(0, 1596.0, 1010.0)));
//! assert!(outcome.hit);
//! assert!(overlay.state().is_pressed(DigitalField::Second, Digital2::CROSS.bits()));
//! # Ok::<(), pad_overlay::error::OverlayError>(())
//! ```

pub mod editor;
pub mod layout;
pub mod pipeline;

pub use editor::LayoutEditor;
pub use layout::{DefaultLayout, FloatingRegion};
pub use pipeline::{DispatchPipeline, DispatchPolicy, Stage};

use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

use crate::config::Config;
use crate::controls::{AnalogStick, Control, LayoutControl, SelectionInfo, StickResponse, TouchContext};
use crate::error::{OverlayError, Result};
use crate::state::{ControllerState, StateSink, StickSide};
use crate::store::SettingsStore;
use crate::touch::ownership::{ControlHandle, TouchOwnership};
use crate::touch::{TouchAction, TouchEvent, TouchPointer};

/// Result of routing one touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Some control handled the event.
    pub hit: bool,
    /// The overlay should be redrawn.
    pub redraw: bool,
    /// Side of a floating stick spawned by this event.
    pub spawned: Option<StickSide>,
}

#[derive(Debug, Clone)]
struct FloatingStick {
    stick: AnalogStick,
    active: bool,
}

/// Controls plus floating stick slots.
#[derive(Debug, Default)]
struct ControlSet {
    controls: Vec<Control>,
    floating: [Option<FloatingStick>; 2],
}

impl ControlSet {
    /// Floating sticks take the handles right after the fixed controls.
    fn floating_handle(&self, side: StickSide) -> ControlHandle {
        ControlHandle(self.controls.len() + side.index())
    }

    fn floating_active(&self, side: StickSide) -> bool {
        self.floating[side.index()].as_ref().is_some_and(|f| f.active)
    }

    fn fixed_stick_active(&self, side: StickSide, owners: &TouchOwnership) -> bool {
        self.controls.iter().enumerate().any(|(i, control)| match control {
            Control::Stick(stick) => stick.side() == side && stick.is_active(ControlHandle(i), owners),
            _ => false,
        })
    }

    /// Runs one pipeline stage; returns the accumulated hit.
    #[allow(clippy::too_many_arguments)]
    fn dispatch(
        &mut self,
        stage: Stage,
        event: &TouchEvent,
        pointer_index: usize,
        point: Option<(i32, i32)>,
        policy: DispatchPolicy,
        mut hit: bool,
        ctx: &mut TouchContext<'_>,
    ) -> bool {
        match stage {
            Stage::Pads => {
                for (i, control) in self.controls.iter_mut().enumerate() {
                    let Control::Pad(pad) = control else { continue };
                    if policy.offers_control(hit, pad.is_enabled(), contains_point(point, pad)) {
                        hit |= pad.on_touch(ControlHandle(i), event, pointer_index, ctx);
                    }
                }
            }
            Stage::Buttons => {
                for (i, control) in self.controls.iter_mut().enumerate() {
                    let Control::Button(button) = control else { continue };
                    if policy.offers_control(hit, button.is_enabled(), contains_point(point, button)) {
                        hit |= button.on_touch(ControlHandle(i), event, pointer_index, ctx);
                    }
                }
            }
            Stage::FixedSticks => {
                let floating = [
                    self.floating_active(StickSide::Left),
                    self.floating_active(StickSide::Right),
                ];
                for (i, control) in self.controls.iter_mut().enumerate() {
                    let Control::Stick(stick) = control else { continue };
                    let shadowed = !policy.is_forced() && floating[stick.side().index()];
                    if shadowed || !policy.offers_control(hit, stick.is_enabled(), contains_point(point, stick)) {
                        continue;
                    }
                    let response = stick.on_touch(ControlHandle(i), event, pointer_index, ctx);
                    hit |= response != StickResponse::Idle;
                }
            }
            Stage::FloatingSticks => {
                let base = self.controls.len();
                for (index, slot) in self.floating.iter_mut().enumerate() {
                    let Some(floating) = slot.as_mut().filter(|f| f.active) else { continue };
                    match floating
                        .stick
                        .on_touch(ControlHandle(base + index), event, pointer_index, ctx)
                    {
                        StickResponse::Released => {
                            floating.active = false;
                            hit = true;
                        }
                        StickResponse::Active => hit = true,
                        StickResponse::Idle => {}
                    }
                }
            }
        }

        hit
    }

    /// Spawns the floating stick for the half of the screen under `point`.
    fn spawn(
        &mut self,
        region: &FloatingRegion,
        event: &TouchEvent,
        pointer_index: usize,
        point: Option<(i32, i32)>,
        ctx: &mut TouchContext<'_>,
    ) -> Option<StickSide> {
        let (x, y) = point?;
        if !region.contains(x, y) {
            return None;
        }

        let side = region.side_of(x);
        if self.fixed_stick_active(side, ctx.owners) {
            return None;
        }

        let handle = self.floating_handle(side);
        let floating = self.floating[side.index()].as_mut()?;
        if floating.active || !floating.stick.on_add(handle, event, pointer_index, ctx) {
            return None;
        }

        floating.active = true;
        debug!("Spawned {:?} floating stick at ({}, {})", side, x, y);
        Some(side)
    }
}

fn check_unique(controls: &[Control]) -> Result<()> {
    let mut seen = HashSet::new();
    for control in controls {
        let id = control.as_layout().id();
        if !seen.insert(id) {
            return Err(OverlayError::DuplicateControl(id.to_string()));
        }
    }
    Ok(())
}

fn contains_point(point: Option<(i32, i32)>, control: &dyn LayoutControl) -> bool {
    point.is_some_and(|(x, y)| control.contains(x, y))
}

/// Touch router and edit surface for one set of controls.
pub struct Overlay {
    set: ControlSet,
    region: Option<FloatingRegion>,
    pipeline: DispatchPipeline,
    owners: TouchOwnership,
    state: ControllerState,
    store: Box<dyn SettingsStore>,
    sink: Box<dyn StateSink>,
    edit_mode: bool,
    selected: Option<ControlHandle>,
    listener: Option<Box<dyn FnMut(&SelectionInfo)>>,
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("controls", &self.set.controls.len())
            .field("state", &self.state)
            .field("edit_mode", &self.edit_mode)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl Overlay {
    /// Creates an overlay over `controls`, loading their persisted layouts.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateControl` when two controls share an identity.
    pub fn new(controls: Vec<Control>, store: Box<dyn SettingsStore>, sink: Box<dyn StateSink>) -> Result<Self> {
        check_unique(&controls)?;

        let mut controls = controls;
        for control in &mut controls {
            control.as_layout_mut().layout_mut().load(store.as_ref());
        }

        info!("Overlay ready with {} controls", controls.len());

        Ok(Self {
            set: ControlSet {
                controls,
                floating: [None, None],
            },
            region: None,
            pipeline: DispatchPipeline::default(),
            owners: TouchOwnership::new(),
            state: ControllerState::default(),
            store,
            sink,
            edit_mode: false,
            selected: None,
            listener: None,
        })
    }

    /// Builds the default PS3-style layout for the configured screen.
    pub fn with_default_layout(
        config: &Config,
        store: Box<dyn SettingsStore>,
        sink: Box<dyn StateSink>,
    ) -> Result<Self> {
        let layout = DefaultLayout::new(
            config.screen.width as i32,
            config.screen.height as i32,
            &config.overlay,
        );
        let overlay = Self::new(layout.controls, store, sink)?;

        if config.overlay.floating_sticks {
            let [left, right] = layout.floating;
            Ok(overlay.with_floating_sticks(left, right, layout.region))
        } else {
            let pipeline = DispatchPipeline::default().without(Stage::FloatingSticks);
            Ok(overlay.with_pipeline(pipeline))
        }
    }

    /// Enables floating sticks spawned inside `region`.
    #[must_use]
    pub fn with_floating_sticks(mut self, left: AnalogStick, right: AnalogStick, region: FloatingRegion) -> Self {
        self.set.floating = [
            Some(FloatingStick { stick: left, active: false }),
            Some(FloatingStick { stick: right, active: false }),
        ];
        self.region = Some(region);
        self
    }

    /// Replaces the dispatch pipeline.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: DispatchPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Current aggregated state.
    #[must_use]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    #[must_use]
    pub fn controls(&self) -> &[Control] {
        &self.set.controls
    }

    /// Looks a control up by identity.
    #[must_use]
    pub fn control(&self, id: &str) -> Option<&Control> {
        self.set.controls.iter().find(|c| c.as_layout().id() == id)
    }

    /// The spawned floating stick for `side`, if any.
    #[must_use]
    pub fn floating_stick(&self, side: StickSide) -> Option<&AnalogStick> {
        self.set.floating[side.index()]
            .as_ref()
            .filter(|f| f.active)
            .map(|f| &f.stick)
    }

    /// Number of pointers currently owning a control.
    #[must_use]
    pub fn active_touches(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn store(&self) -> &dyn SettingsStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn pipeline(&self) -> &DispatchPipeline {
        &self.pipeline
    }

    /// Routes one touch event.
    ///
    /// Never fails: events without a usable action pointer are ignored.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> DispatchOutcome {
        if event.action_pointer().is_none() && event.action != TouchAction::Cancel {
            debug!(
                "Ignoring {:?} with pointer index {} of {}",
                event.action,
                event.index,
                event.pointers.len()
            );
            return DispatchOutcome::default();
        }

        if self.edit_mode {
            return self.handle_edit_touch(event);
        }

        let hit = self.run_pipeline(event);
        self.sink.forward(&self.state);

        let mut spawned = None;
        if !hit && event.action.is_down() && self.pipeline.contains(Stage::FloatingSticks) {
            if let Some(region) = self.region {
                let point = event.action_pointer().map(TouchPointer::pixel);
                let mut ctx = TouchContext {
                    owners: &mut self.owners,
                    state: &mut self.state,
                };
                spawned = self.set.spawn(&region, event, event.pointer_index(), point, &mut ctx);
            }
        }

        let hit = hit || spawned.is_some();
        DispatchOutcome {
            hit,
            redraw: hit || event.action.is_release(),
            spawned,
        }
    }

    /// Runs the play-mode stages without forwarding.
    fn run_pipeline(&mut self, event: &TouchEvent) -> bool {
        let policy = DispatchPolicy::for_action(event.action);
        let pointer_index = event.pointer_index();
        let point = event.action_pointer().map(TouchPointer::pixel);

        let set = &mut self.set;
        let owners = &mut self.owners;
        let state = &mut self.state;
        self.pipeline.run(policy, |stage, hit| {
            let mut ctx = TouchContext {
                owners: &mut *owners,
                state: &mut *state,
            };
            set.dispatch(stage, event, pointer_index, point, policy, hit, &mut ctx)
        })
    }
}
