//! Chord classification and temporal stabilization
//!
//! - Fixed root x quality template table
//! - Cosine scoring against smoothed chroma, with slash-bass attachment
//! - Dwell-time hysteresis and the confirmed-change timeline

pub mod classifier;
pub mod hysteresis;
pub mod templates;
