// 8.0: orchestration layer. owns the plan catalog, the user directory, and
// one independently locked cell per challenge. coordinates trade execution,
// risk evaluation, anchor rollovers, manual overrides, and read-only views.
// deterministic and event-driven with no external I/O.

mod core;
mod evaluation;
mod queries;
mod results;
mod trades;

pub use core::{Engine, EngineConfig};
pub use results::{AdminChallengeRow, ChallengeSummary, EngineError, ValidationError};
