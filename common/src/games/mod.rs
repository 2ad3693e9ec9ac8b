mod session_rng;

pub mod match3;

pub use session_rng::{RandomSource, ScriptedRng, SessionRng};
