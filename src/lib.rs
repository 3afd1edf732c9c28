//! embodied-sched - carbon-aware placement with embodied carbon accounting
//!
//! Places short-lived workloads across regions and server age classes,
//! charging each candidate for both the grid carbon it burns and its share
//! of the carbon spent manufacturing the hardware.
//!
//! # Quick Start
//!
//! ```
//! use embodied_sched::prelude::*;
//!
//! let fleet = Fleet::reference();
//! let config = ModelConfig::default();
//! let provider = UniformIntensityProvider(535.0);
//!
//! let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();
//! let decision = selector.select(15.0, 100.0, Strategy::EmbodiedPrioritized).unwrap();
//!
//! let best = decision.best().unwrap();
//! println!("{} / {}: {:.4} g", best.region, best.hardware_class, best.estimate.total_co2_g);
//! ```
//!
//! # Features
//!
//! - **Aging power model**: draw grows linearly with age, capped at +60%
//! - **Carbon debt**: manufacturing carbon amortized by remaining lifetime
//! - **Strategies**: embodied-prioritized, balanced and operational-only scoring
//! - **Replacement analysis**: break-even time for swapping old hardware
//! - **Sensitivity sweeps**: strategy crossover across intensities and aging rates
//! - **Export**: JSON and console reports (optional, default on)

#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod fleet;
pub mod intensity;
pub mod model;
pub mod prelude;
pub mod scheduler;
pub mod sensitivity;

#[cfg(feature = "export")]
pub mod export;

// Re-export key types at crate root
pub use config::{ModelConfig, ModelConfigBuilder};
pub use error::{Error, Result};
pub use fleet::{Fleet, HardwareAgeClass, Region, ServerPool, Workload};
pub use intensity::{blend_intensity, BlendedIntensity, CarbonIntensityProvider};
pub use model::{evaluate_total_carbon, CarbonEstimate};
pub use scheduler::{PlacementDecision, PlacementSelector, ReplacementAnalysis, Strategy};
