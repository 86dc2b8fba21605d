use crate::assets::{AssetRegistry, ClipId};
use crate::error::{ConfiguratorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPhase {
    Idle,
    Playing,
    Paused,
    /// Ran out while playing; the last pose is held.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlaybackState {
    pub phase: ClipPhase,
    pub elapsed_seconds: f32,
    pub time_scale: f32,
}

impl Default for ClipPlaybackState {
    fn default() -> Self {
        Self {
            phase: ClipPhase::Idle,
            elapsed_seconds: 0.0,
            time_scale: 1.0,
        }
    }
}

/// Local time a playing clip should be posed at this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSample {
    pub clip: ClipId,
    pub local_time: f32,
}

#[derive(Debug, Clone)]
struct TrackedClip {
    id: ClipId,
    duration: f32,
    state: ClipPlaybackState,
}

#[derive(Debug, Default)]
pub struct AnimationController {
    clips: Vec<TrackedClip>,
}

impl AnimationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking every clip of the registered asset, all Idle.
    pub fn attach(&mut self, registry: &AssetRegistry) -> Result<()> {
        let clips = registry
            .clip_ids()?
            .into_iter()
            .filter_map(|id| {
                registry.clip(id).map(|clip| TrackedClip {
                    id,
                    duration: clip.duration_seconds,
                    state: ClipPlaybackState::default(),
                })
            })
            .collect();
        self.clips = clips;
        Ok(())
    }

    pub fn detach(&mut self) {
        self.clips.clear();
    }

    fn tracked_mut(&mut self, id: ClipId) -> Result<&mut TrackedClip> {
        self.clips
            .iter_mut()
            .find(|clip| clip.id == id)
            .ok_or_else(|| ConfiguratorError::UnknownClip(id.to_string()))
    }

    /// Single play/pause button per clip.
    ///
    /// Idle or Finished restarts from the beginning at normal speed, Playing
    /// freezes the clip where it is and Paused resumes from that point.
    pub fn toggle(&mut self, id: ClipId) -> Result<ClipPhase> {
        let clip = self.tracked_mut(id)?;
        let state = &mut clip.state;
        state.phase = match state.phase {
            ClipPhase::Idle | ClipPhase::Finished => {
                state.time_scale = 1.0;
                state.elapsed_seconds = 0.0;
                ClipPhase::Playing
            }
            ClipPhase::Playing => ClipPhase::Paused,
            ClipPhase::Paused => ClipPhase::Playing,
        };
        log::debug!(
            "{} -> {:?} at {:.3}s",
            id,
            state.phase,
            state.elapsed_seconds
        );
        Ok(state.phase)
    }

    /// Forces every clip back to Idle at time zero.
    pub fn reset_all(&mut self) {
        for clip in &mut self.clips {
            clip.state = ClipPlaybackState::default();
        }
    }

    /// Advances playing clips by `dt` seconds and reports where each one
    /// should be posed. Clips that reach their end are clamped and finish.
    pub fn advance(&mut self, dt: f32) -> Vec<ClipSample> {
        let dt = dt.max(0.0);
        let mut samples = Vec::new();
        for clip in &mut self.clips {
            let state = &mut clip.state;
            if state.phase != ClipPhase::Playing {
                continue;
            }
            state.elapsed_seconds += dt * state.time_scale;
            if state.elapsed_seconds >= clip.duration {
                state.elapsed_seconds = clip.duration;
                state.phase = ClipPhase::Finished;
                log::debug!("{} finished, holding final pose", clip.id);
            }
            samples.push(ClipSample {
                clip: clip.id,
                local_time: state.elapsed_seconds,
            });
        }
        samples
    }

    pub fn state(&self, id: ClipId) -> Option<ClipPlaybackState> {
        self.clips
            .iter()
            .find(|clip| clip.id == id)
            .map(|clip| clip.state)
    }

    pub fn states(&self) -> impl Iterator<Item = (ClipId, ClipPlaybackState)> + '_ {
        self.clips.iter().map(|clip| (clip.id, clip.state))
    }

    pub fn any_playing(&self) -> bool {
        self.clips
            .iter()
            .any(|clip| clip.state.phase == ClipPhase::Playing)
    }
}
