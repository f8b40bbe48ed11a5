//! Small helpers shared by the pipelines.

pub mod date;
pub mod html;
pub mod minify;
pub mod slug;
