//! Per-tick DSP stages
//!
//! Stage order within a tick is fixed: whitening, then the harmonic mask,
//! then chroma mapping and smoothing; the whitened bass spectrum feeds the
//! bass tracker; smoothed chroma and the bass pitch class feed chord
//! classification and hysteresis; the time-domain buffer feeds tempo
//! estimation. Later stages always observe outputs of earlier stages from
//! the same tick.

pub mod bass;
pub mod chord;
pub mod chroma;
pub mod hpss;
pub mod tempo;
pub mod whitening;
