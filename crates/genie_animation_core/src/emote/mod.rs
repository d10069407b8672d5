//! Emote overlay mixer.
//!
//! Three logical tracks: the base locomotion track, and two interchangeable overlay slots
//! holding emote clips. A newly requested emote always lands in the slot with the lower weight,
//! so the other slot can keep fading out while the new one fades in.
//!
//! The overlay weights are linear fades of equal duration, so an incoming fade from 0 and an
//! outgoing fade from `w <= 1` always sum to at most 1. The combined overlay weight is
//! additionally clamped to 1 and the base track takes whatever remains.

mod slot;

use bevy::{
    ecs::component::Component,
    log::debug,
    prelude::ReflectComponent,
    reflect::Reflect,
};

pub use slot::*;

use crate::placement::locomotion::LocomotionState;

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct EmoteClip {
    pub id: String,
    /// Clip length, in seconds
    pub duration: f32,
    pub root_motion: bool,
}

impl EmoteClip {
    pub fn new(id: impl Into<String>, duration: f32) -> Self {
        Self {
            id: id.into(),
            duration,
            root_motion: false,
        }
    }

    pub fn with_root_motion(mut self) -> Self {
        self.root_motion = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum MixerPhase {
    Idle,
    BlendingIn,
    Holding,
    BlendingOut,
}

/// Things the owner of the mixer must react to, in the order they happened.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum MixerSignal {
    OverlayStarted { clip: String, slot: OverlaySlotId },
    OverlayStopped { clip: String },
    /// A root-motion clip stopped driving the skeleton; its drift must be folded back into the
    /// avatar transform.
    FoldRootMotion,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct EmoteMixer {
    slots: [OverlaySlot; 2],
    /// Slot of the most recently requested emote
    active: Option<OverlaySlotId>,
    blend_duration: f32,
    #[reflect(ignore)]
    signals: Vec<MixerSignal>,
}

impl Default for EmoteMixer {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl EmoteMixer {
    pub fn new(blend_duration: f32) -> Self {
        Self {
            slots: Default::default(),
            active: None,
            blend_duration,
            signals: Vec::new(),
        }
    }

    pub fn slot(&self, id: OverlaySlotId) -> &OverlaySlot {
        &self.slots[id.index()]
    }

    fn slot_mut(&mut self, id: OverlaySlotId) -> &mut OverlaySlot {
        &mut self.slots[id.index()]
    }

    pub fn blend_duration(&self) -> f32 {
        self.blend_duration
    }

    /// Changes the cross-fade length. Fades already in progress continue at the new rate.
    pub fn set_blend_duration(&mut self, blend_duration: f32) {
        self.blend_duration = blend_duration;
    }

    /// Combined overlay influence, in [0, 1]
    pub fn blend_weight(&self) -> f32 {
        self.slots.iter().map(|s| s.weight()).sum::<f32>().min(1.)
    }

    pub fn base_weight(&self) -> f32 {
        1. - self.blend_weight()
    }

    /// Whether any overlay is still playing or fading
    pub fn is_emoting(&self) -> bool {
        self.slots.iter().any(|s| s.clip().is_some())
    }

    /// Whether some overlay is currently allowed to move the skeletal root
    pub fn root_motion_active(&self) -> bool {
        self.slots
            .iter()
            .any(|s| !s.is_fading_out() && s.clip().is_some_and(|c| c.root_motion))
    }

    pub fn phase(&self) -> MixerPhase {
        let active = self
            .active
            .map(|id| self.slot(id))
            .filter(|s| s.clip().is_some());

        match active.map(|s| s.fade()) {
            Some(SlotFade::In { .. }) => MixerPhase::BlendingIn,
            Some(SlotFade::Steady) => MixerPhase::Holding,
            Some(SlotFade::Out { .. }) => MixerPhase::BlendingOut,
            None if self.is_emoting() => MixerPhase::BlendingOut,
            None => MixerPhase::Idle,
        }
    }

    /// Starts cross-fading `clip` in over the lower-weighted slot. Whatever the other slot holds
    /// starts fading out at the same time.
    pub fn play(&mut self, clip: EmoteClip) -> OverlaySlotId {
        if let Some(active) = self.active {
            let slot = self.slot(active);
            if slot.is_fading_in() && slot.clip().is_some_and(|c| c.id == clip.id) {
                debug!("Emote {} is already blending in, ignoring request", clip.id);
                return active;
            }
        }

        let target = if self.slot(OverlaySlotId::A).weight() > self.slot(OverlaySlotId::B).weight()
        {
            OverlaySlotId::B
        } else {
            OverlaySlotId::A
        };

        self.begin_fade_out(target.other());
        if let Some(replaced) = self.slot_mut(target).release() {
            self.announce_stop(replaced);
        }

        debug!("Emote {} starting in slot {:?}", clip.id, target);
        self.signals.push(MixerSignal::OverlayStarted {
            clip: clip.id.clone(),
            slot: target,
        });
        self.slot_mut(target).start(clip);
        self.active = Some(target);

        target
    }

    /// Fades every playing overlay back out to the base track.
    pub fn soft_stop(&mut self) {
        let mut stopped_any = false;
        for id in OverlaySlotId::ALL {
            stopped_any |= self.begin_fade_out(id);
        }
        if !stopped_any {
            debug!("Soft stop requested with no playing emote, ignoring");
        }
    }

    /// Drops every overlay immediately.
    pub fn hard_stop(&mut self) {
        for id in OverlaySlotId::ALL {
            if let Some(released) = self.slot_mut(id).release() {
                self.announce_stop(released);
            }
        }
        self.active = None;
    }

    /// Applies the overlay interruption policy for a locomotion state change.
    pub fn on_locomotion(&mut self, state: LocomotionState) {
        if state.interrupts_overlay() && self.phase() != MixerPhase::Idle {
            self.soft_stop();
        }
    }

    /// Advances clip time and fades by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let duration = self.blend_duration;
        for id in OverlaySlotId::ALL {
            let finished = self.slot_mut(id).advance(dt, duration);
            if finished {
                self.begin_fade_out(id);
            }
        }

        if self
            .active
            .is_some_and(|id| self.slot(id).clip().is_none())
        {
            self.active = None;
        }
    }

    pub fn drain_signals(&mut self) -> impl Iterator<Item = MixerSignal> + '_ {
        self.signals.drain(..)
    }

    /// Returns whether a fade-out was started.
    fn begin_fade_out(&mut self, id: OverlaySlotId) -> bool {
        let slot = self.slot_mut(id);
        if slot.is_fading_out() || slot.clip().is_none() {
            return false;
        }
        if let Some(stopped) = slot.fade_out() {
            self.announce_stop(stopped);
        }
        true
    }

    fn announce_stop(&mut self, stopped: StoppedClip) {
        if stopped.announced {
            return;
        }
        debug!("Emote {} stopped", stopped.clip.id);
        self.signals.push(MixerSignal::OverlayStopped {
            clip: stopped.clip.id,
        });
        if stopped.clip.root_motion {
            self.signals.push(MixerSignal::FoldRootMotion);
        }
    }
}
