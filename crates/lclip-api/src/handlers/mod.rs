//! Request handlers.

pub mod health;
pub mod highlights;
pub mod jobs;
pub mod meta;
pub mod presets;
pub mod render;
