//! Letter-stagger fade timeline.
//!
//! Every letter fades in after its own start time and all letters fade out together. The
//! overlap factor widens the per-letter budget used for stagger spacing and, by the same factor,
//! shortens each letter's own fade relative to that budget.

use crate::foundation::core::Fps;
use crate::foundation::error::{FadeError, FadeResult};
use crate::foundation::math::clamp01;

/// Longest animation accepted, in seconds (`fade_out_start + fade_out_duration`).
pub const MAX_ANIMATION_SECS: f64 = 600.0;

/// Timing parameters of a title animation, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FadeParams {
    /// Delay before the first letter starts fading in.
    pub initial_delay: f64,
    /// Total fade-in budget shared by all letters (before overlap).
    pub fade_in_duration: f64,
    /// Time at which every letter starts fading out.
    pub fade_out_start: f64,
    /// Length of the collective fade-out.
    pub fade_out_duration: f64,
    /// Stagger compression / fade stretch factor. Must be `> 0`.
    pub overlap_factor: f64,
}

impl FadeParams {
    /// Check the invariants the timeline relies on.
    pub fn validate(&self) -> FadeResult<()> {
        let fields = [
            ("initial_delay", self.initial_delay),
            ("fade_in_duration", self.fade_in_duration),
            ("fade_out_start", self.fade_out_start),
            ("fade_out_duration", self.fade_out_duration),
            ("overlap_factor", self.overlap_factor),
        ];
        for (name, v) in fields {
            if !v.is_finite() {
                return Err(FadeError::validation(format!("{name} must be finite")));
            }
        }
        if self.fade_in_duration < 0.0 {
            return Err(FadeError::validation("fade_in_duration must be >= 0"));
        }
        if self.fade_out_start < 0.0 {
            return Err(FadeError::validation("fade_out_start must be >= 0"));
        }
        if self.fade_out_duration <= 0.0 {
            return Err(FadeError::validation("fade_out_duration must be > 0"));
        }
        if self.overlap_factor <= 0.0 {
            return Err(FadeError::validation("overlap_factor must be > 0"));
        }
        if self.end_secs() > MAX_ANIMATION_SECS {
            return Err(FadeError::validation(format!(
                "fade_out_start + fade_out_duration must be <= {MAX_ANIMATION_SECS}s"
            )));
        }
        Ok(())
    }

    /// End of the animation (`fade_out_start + fade_out_duration`).
    pub fn end_secs(&self) -> f64 {
        self.fade_out_start + self.fade_out_duration
    }
}

/// One animated letter: its position among non-newline characters and its fade-in onset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LetterSlot {
    /// 0-based index among non-newline characters.
    pub index: usize,
    /// Fade-in start, seconds.
    pub start_time: f64,
}

/// Fade timeline bound to a concrete letter count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeTimeline {
    params: FadeParams,
    letters_count: usize,
    fade_in_per_letter: f64,
}

impl FadeTimeline {
    /// Build a timeline for `letters_count` letters.
    ///
    /// Rejects zero letters and parameters violating [`FadeParams::validate`].
    pub fn new(params: FadeParams, letters_count: usize) -> FadeResult<Self> {
        params.validate()?;
        if letters_count == 0 {
            return Err(FadeError::validation("text must contain at least one letter"));
        }
        let fade_in_per_letter =
            (params.fade_in_duration * params.overlap_factor) / letters_count as f64;
        Ok(Self {
            params,
            letters_count,
            fade_in_per_letter,
        })
    }

    /// Parameters this timeline was built from.
    pub fn params(&self) -> &FadeParams {
        &self.params
    }

    /// Number of letters driven by this timeline.
    pub fn letters_count(&self) -> usize {
        self.letters_count
    }

    /// Stagger spacing between consecutive letter onsets.
    pub fn fade_in_per_letter(&self) -> f64 {
        self.fade_in_per_letter
    }

    /// Duration of one letter's own fade-in.
    pub fn letter_fade_window(&self) -> f64 {
        self.fade_in_per_letter / self.params.overlap_factor
    }

    /// Time at which letter `index` starts fading in.
    pub fn letter_start(&self, index: usize) -> f64 {
        self.params.initial_delay + index as f64 * self.fade_in_per_letter
    }

    /// Every letter slot in index order.
    pub fn slots(&self) -> impl Iterator<Item = LetterSlot> + '_ {
        (0..self.letters_count).map(move |index| LetterSlot {
            index,
            start_time: self.letter_start(index),
        })
    }

    /// Fade-in opacity of letter `index` at `t`, in `[0, 1]`.
    pub fn fade_in(&self, t: f64, index: usize) -> f64 {
        let start = self.letter_start(index);
        if t <= start {
            return 0.0;
        }
        clamp01((t - start) / self.letter_fade_window())
    }

    /// Collective fade-out multiplier at `t`, in `[0, 1]`.
    pub fn fade_out(&self, t: f64) -> f64 {
        if t < self.params.fade_out_start {
            return 1.0;
        }
        let progress = (t - self.params.fade_out_start) / self.params.fade_out_duration;
        clamp01(1.0 - progress)
    }

    /// Final opacity of letter `index` at `t`, in `[0, 1]`.
    pub fn opacity(&self, t: f64, index: usize) -> f64 {
        clamp01(self.fade_in(t, index) * self.fade_out(t))
    }

    /// Write the opacity of every letter at `t` into `out`, replacing its contents.
    pub fn fill_opacities(&self, t: f64, out: &mut Vec<f32>) {
        out.clear();
        out.extend(self.slots().map(|slot| self.opacity(t, slot.index) as f32));
    }

    /// Frame count covering the whole animation: `ceil(end_secs * fps)`.
    pub fn total_frames(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_ceil(self.params.end_secs())
    }
}

/// Opacity of one letter at `current_time`, without building a [`FadeTimeline`].
pub fn letter_opacity(
    params: &FadeParams,
    letters_count: usize,
    index: usize,
    current_time: f64,
) -> FadeResult<f64> {
    Ok(FadeTimeline::new(*params, letters_count)?.opacity(current_time, index))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/fade.rs"]
mod tests;
