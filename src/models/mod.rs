//! Stochastic per-domain models driven once per tick by the engine.

/// Transmission line flow proxy.
pub mod line_flow;
/// Substation load and overload alert gate.
pub mod load;
/// Generator output by technology.
pub mod generation;
/// Calendar-driven clearing price.
pub mod pricing;
pub mod types;
/// Regional temperature process.
pub mod weather;

pub use generation::{GenerationModel, WindCurve};
pub use line_flow::LineFlowModel;
pub use load::{LoadInput, LoadModel, LoadReading};
pub use pricing::PricingModel;
pub use types::TickContext;
pub use weather::{TemperatureState, WeatherModel, WeatherReading};
