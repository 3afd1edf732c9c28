pub use crate::config::{ModelConfig, ModelConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::fleet::{Fleet, HardwareAgeClass, Region, ServerPool, Workload};
pub use crate::intensity::{
    CachedIntensityProvider, CarbonIntensityProvider, HistoryFileProvider, StaticIntensityProvider,
    UniformIntensityProvider,
};
pub use crate::model::{evaluate_total_carbon, CarbonEstimate, InstanceSpec};
pub use crate::scheduler::{
    BreakEvenAnalyzer, Candidate, NoCandidateReason, Placement, PlacementDecision, PlacementSelector,
    ReplacementAnalysis, Strategy,
};
pub use crate::sensitivity::{
    compare_strategies, duration_sweep, find_crossover, find_placement_switch, intensity_sweep,
};

#[cfg(feature = "export")]
pub use crate::export::{ConsoleExporter, JsonExporter, ReportExporter};
