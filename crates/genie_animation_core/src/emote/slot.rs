use bevy::reflect::Reflect;

use super::EmoteClip;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum OverlaySlotId {
    A,
    B,
}

impl OverlaySlotId {
    pub const ALL: [OverlaySlotId; 2] = [OverlaySlotId::A, OverlaySlotId::B];

    pub fn index(&self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Fade progress of one overlay slot. Elapsed times are in seconds since the fade started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub enum SlotFade {
    In {
        elapsed: f32,
    },
    #[default]
    Steady,
    Out {
        from: f32,
        elapsed: f32,
    },
}

/// A clip leaving its slot, with whether its stop was already reported
#[derive(Debug, Clone, PartialEq)]
pub struct StoppedClip {
    pub clip: EmoteClip,
    pub announced: bool,
}

#[derive(Debug, Clone, Default, Reflect)]
pub struct OverlaySlot {
    clip: Option<EmoteClip>,
    /// Playback time of the clip
    elapsed: f32,
    weight: f32,
    fade: SlotFade,
    stop_announced: bool,
}

impl OverlaySlot {
    pub fn clip(&self) -> Option<&EmoteClip> {
        self.clip.as_ref()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn fade(&self) -> SlotFade {
        self.fade
    }

    pub fn is_fading_in(&self) -> bool {
        matches!(self.fade, SlotFade::In { .. })
    }

    pub fn is_fading_out(&self) -> bool {
        matches!(self.fade, SlotFade::Out { .. })
    }

    pub(super) fn start(&mut self, clip: EmoteClip) {
        *self = Self {
            clip: Some(clip),
            elapsed: 0.,
            weight: 0.,
            fade: SlotFade::In { elapsed: 0. },
            stop_announced: false,
        };
    }

    /// Starts fading out from the current weight. Returns the clip if its stop still has to be
    /// reported.
    pub(super) fn fade_out(&mut self) -> Option<StoppedClip> {
        self.fade = SlotFade::Out {
            from: self.weight,
            elapsed: 0.,
        };
        let announced = std::mem::replace(&mut self.stop_announced, true);
        self.clip.clone().map(|clip| StoppedClip { clip, announced })
    }

    pub(super) fn release(&mut self) -> Option<StoppedClip> {
        let announced = self.stop_announced;
        let clip = std::mem::take(self).clip?;
        Some(StoppedClip { clip, announced })
    }

    /// Advances the slot by `dt`. Returns `true` when a steady clip has just played to its end.
    pub(super) fn advance(&mut self, dt: f32, blend_duration: f32) -> bool {
        let Some(clip) = &self.clip else {
            return false;
        };
        let clip_duration = clip.duration;
        self.elapsed += dt;

        match &mut self.fade {
            SlotFade::In { elapsed } => {
                *elapsed += dt;
                if *elapsed >= blend_duration {
                    self.weight = 1.;
                    self.fade = SlotFade::Steady;
                } else {
                    self.weight = *elapsed / blend_duration;
                }
                false
            }
            SlotFade::Steady => self.elapsed >= clip_duration,
            SlotFade::Out { from, elapsed } => {
                *elapsed += dt;
                if *elapsed >= blend_duration {
                    *self = Self::default();
                } else {
                    self.weight = *from * (1. - *elapsed / blend_duration);
                }
                false
            }
        }
    }
}
