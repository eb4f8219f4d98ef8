//! Request payloads for the title and snapshot endpoints.
//!
//! Bodies arrive as loose JSON. Presence of every required field is checked first so callers get
//! one message naming all missing fields; typed decoding follows.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::animation::fade::{FadeParams, FadeTimeline};
use crate::foundation::error::{FadeError, FadeResult};

/// Default `max_width` for snapshots.
pub const DEFAULT_MAX_WIDTH: &str = "850px";

/// Fields required by `POST /text/title`.
pub const TITLE_REQUIRED: &[&str] = &[
    "text",
    "initial_delay",
    "fade_in_duration",
    "fade_out_start",
    "fade_out_duration",
    "overlap_factor",
    "output_file_name",
];

/// Fields required by `POST /text/png`.
pub const SNAPSHOT_REQUIRED: &[&str] = &[
    "text",
    "output_file_name",
    "font_size",
    "font_color",
    "letter_spacing",
    "line_height",
    "padding",
    "shadow_size",
    "shadow_opacity",
    "stroke_size",
    "stroke_color",
];

/// A letter-by-letter fade animation request.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AnimationRequest {
    /// Text to animate. `\n` starts a new line.
    pub text: String,
    /// Delay before the first letter, seconds.
    pub initial_delay: f64,
    /// Fade-in budget, seconds.
    pub fade_in_duration: f64,
    /// Start of the collective fade-out, seconds.
    pub fade_out_start: f64,
    /// Length of the fade-out, seconds.
    pub fade_out_duration: f64,
    /// Stagger/fade overlap factor.
    pub overlap_factor: f64,
    /// Object name of the uploaded clip.
    #[serde(alias = "output_name")]
    pub output_file_name: String,
}

impl AnimationRequest {
    /// Decode and validate a title request body.
    pub fn from_json(body: &serde_json::Value) -> FadeResult<Self> {
        let req: Self = decode_required(body, TITLE_REQUIRED)?;
        req.validate()?;
        Ok(req)
    }

    /// Timing parameters of this request.
    pub fn fade_params(&self) -> FadeParams {
        FadeParams {
            initial_delay: self.initial_delay,
            fade_in_duration: self.fade_in_duration,
            fade_out_start: self.fade_out_start,
            fade_out_duration: self.fade_out_duration,
            overlap_factor: self.overlap_factor,
        }
    }

    /// Fade timeline for this request's text.
    pub fn timeline(&self) -> FadeResult<FadeTimeline> {
        FadeTimeline::new(self.fade_params(), letters_count(&self.text))
    }

    /// Check timing, text and destination name.
    pub fn validate(&self) -> FadeResult<()> {
        self.fade_params().validate()?;
        validate_text(&self.text)?;
        validate_output_name(&self.output_file_name)?;
        Ok(())
    }
}

/// Style strings for a static snapshot, forwarded verbatim to the rasterizer.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SnapshotStyle {
    /// CSS-like font size, e.g. `"64px"`.
    #[serde(deserialize_with = "css_value")]
    pub font_size: String,
    /// Fill color.
    #[serde(deserialize_with = "css_value")]
    pub font_color: String,
    /// Extra advance between letters.
    #[serde(deserialize_with = "css_value")]
    pub letter_spacing: String,
    /// Unitless multiplier or absolute length.
    #[serde(deserialize_with = "css_value")]
    pub line_height: String,
    /// Padding around the text block.
    #[serde(deserialize_with = "css_value")]
    pub padding: String,
    /// Shadow offset and blur.
    #[serde(deserialize_with = "css_value")]
    pub shadow_size: String,
    /// Shadow alpha in `[0, 1]`.
    #[serde(deserialize_with = "css_value")]
    pub shadow_opacity: String,
    /// Outline width.
    #[serde(deserialize_with = "css_value")]
    pub stroke_size: String,
    /// Outline color.
    #[serde(deserialize_with = "css_value")]
    pub stroke_color: String,
    /// Maximum text block width before wrapping.
    #[serde(default = "default_max_width", deserialize_with = "css_value")]
    pub max_width: String,
}

fn default_max_width() -> String {
    DEFAULT_MAX_WIDTH.to_owned()
}

/// Accept style values sent either as strings or as bare JSON numbers.
fn css_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Text(s) => s,
        Repr::Number(n) => n.to_string(),
    })
}

/// A static styled text snapshot request.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SnapshotRequest {
    /// Text to render.
    pub text: String,
    /// Object name of the uploaded PNG.
    #[serde(alias = "output_name")]
    pub output_file_name: String,
    /// Styling strings.
    #[serde(flatten)]
    pub style: SnapshotStyle,
}

impl SnapshotRequest {
    /// Decode and validate a snapshot request body.
    pub fn from_json(body: &serde_json::Value) -> FadeResult<Self> {
        let req: Self = decode_required(body, SNAPSHOT_REQUIRED)?;
        req.validate()?;
        Ok(req)
    }

    /// Check text and destination name.
    pub fn validate(&self) -> FadeResult<()> {
        validate_text(&self.text)?;
        validate_output_name(&self.output_file_name)
    }
}

/// Return `true` for characters that structure lines instead of occupying a letter slot.
pub fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Count of letter slots in `text`.
pub fn letters_count(text: &str) -> usize {
    text.chars().filter(|c| !is_line_break(*c)).count()
}

fn validate_text(text: &str) -> FadeResult<()> {
    if text.trim().is_empty() || letters_count(text) == 0 {
        return Err(FadeError::validation(
            "text must contain at least one visible character",
        ));
    }
    Ok(())
}

/// Validate an object name: non-empty, relative, no `..` segments, no empty segments.
pub fn validate_output_name(name: &str) -> FadeResult<()> {
    if name.trim().is_empty() {
        return Err(FadeError::validation("output_file_name must be non-empty"));
    }
    if name.starts_with('/') || name.contains('\\') {
        return Err(FadeError::validation(
            "output_file_name must be a relative object name",
        ));
    }
    for part in name.split('/') {
        if part.is_empty() || part == "." || part == ".." {
            return Err(FadeError::validation(format!(
                "output_file_name has an invalid path segment: \"{name}\""
            )));
        }
    }
    Ok(())
}

fn decode_required<T: DeserializeOwned>(
    body: &serde_json::Value,
    required: &[&str],
) -> FadeResult<T> {
    let obj = body
        .as_object()
        .ok_or_else(|| FadeError::validation("request body must be a JSON object"))?;
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|k| !obj.contains_key(*k))
        .filter(|k| !(*k == "output_file_name" && obj.contains_key("output_name")))
        .collect();
    if !missing.is_empty() {
        return Err(FadeError::validation(format!(
            "missing required parameters: {}",
            missing.join(", ")
        )));
    }
    T::deserialize(body).map_err(|e| FadeError::validation(format!("invalid parameters: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/request.rs"]
mod tests;
