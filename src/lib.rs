//! fontsmith
pub mod compile;
pub mod core;
pub mod data;
pub mod features;
pub mod font_source;
pub mod geometry;
pub mod logging;
pub mod merge;
pub mod naming;
pub mod synth;
pub mod variant;
