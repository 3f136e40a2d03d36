//! Core business logic modules
//!
//! Pure decision logic for a promotion cycle. Nothing here performs I/O
//! directly; rotation reaches storage only through the trait seams.

pub mod cadence;
pub mod message;
pub mod rotation;
pub mod scorer;
pub mod state;

pub use cadence::{CadenceDecision, CadenceGate, CadenceInputs};
pub use message::PromotionMessage;
pub use rotation::{CandidateSet, RotationPolicy};
pub use scorer::{select_top, Jitter, ScoredProduct};
pub use state::{CycleMachine, CycleState};
