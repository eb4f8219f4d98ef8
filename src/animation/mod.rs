/// Per-letter fade timeline.
pub mod fade;
