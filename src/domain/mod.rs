pub mod attempt;
pub mod equation;
pub mod exercise;
pub mod mastery;
pub mod operation;

pub use attempt::{ExerciseAttempt, ResultDescription, ResultStatus, SessionResult, StarProgress};
pub use equation::{Equation, FactIdError, Slot};
pub use exercise::{Exercise, NOT_RECOGNIZED};
pub use mastery::{FactMastery, MasteryMap, MASTERY_STRENGTH, MAX_STRENGTH};
pub use operation::Operation;
