//! Impact Zones - terrain classification, damage zones and affected
//! population for asteroid impact scenarios

pub mod core;
pub mod evacuation;
pub mod pipeline;
pub mod population;
pub mod scenario;
pub mod seismic;
pub mod services;
pub mod terrain;
pub mod zones;
