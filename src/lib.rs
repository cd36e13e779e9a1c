// Kindred: conversational policy engine for an AI companion.
//
// atoms/   pure types, constants, errors, clock/random seams
// engine/  config loading and the policy modules

pub mod atoms;
pub mod engine;

pub use atoms::error::{PolicyError, PolicyResult};
pub use atoms::policy_types::*;
pub use atoms::traits::{
    Clock, FixedClock, FixedRandom, RandomSource, SeededRandom, SystemClock, ThreadRandom,
};
pub use engine::policy::{CompanionSession, InboundAssessment, SessionRegistry};
