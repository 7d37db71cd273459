/// Time stepper over the configured date range.
pub mod clock;
pub mod engine;

pub use clock::Clock;
pub use engine::{Engine, EngineParams};
