//! Strategy comparisons across grid intensities, aging, and task length.
//!
//! Each comparison places the same workload once per [`Strategy`] and reports
//! how much carbon each choice emits relative to the grid-only baseline. A
//! sweep repeats that over a parameter, and [`find_crossover`] locates the
//! parameter value at which a strategy stops beating the baseline.

use crate::config::ModelConfig;
use crate::error::{ensure_non_negative, Result};
use crate::fleet::{Fleet, HardwareAgeClass, Workload};
use crate::intensity::{CarbonIntensityProvider, UniformIntensityProvider};
use crate::model::CarbonEstimate;
use crate::scheduler::{PlacementSelector, Strategy};
use serde::Serialize;

/// What one strategy chose and what it cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyOutcome {
    pub strategy: Strategy,
    pub region: String,
    pub hardware_class: String,
    pub estimate: CarbonEstimate,
    /// `(total - baseline) / baseline * 100`, baseline being the
    /// `operational_only` selection. `None` when the baseline emits nothing.
    pub percent_vs_operational: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyComparison {
    pub workload: Workload,
    /// One entry per strategy that found a placement, in [`Strategy::ALL`] order.
    pub outcomes: Vec<StrategyOutcome>,
}

impl StrategyComparison {
    pub fn outcome(&self, strategy: Strategy) -> Option<&StrategyOutcome> {
        self.outcomes.iter().find(|o| o.strategy == strategy)
    }

    /// Strategy with the lowest total carbon; the first listed wins ties.
    pub fn lowest_carbon(&self) -> Option<&StrategyOutcome> {
        self.outcomes
            .iter()
            .min_by(|a, b| a.estimate.total_co2_g.total_cmp(&b.estimate.total_co2_g))
    }
}

/// A comparison taken at one value of the swept parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub parameter: f64,
    pub comparison: StrategyComparison,
}

impl SweepPoint {
    pub fn percent_vs_operational(&self, strategy: Strategy) -> Option<f64> {
        self.comparison
            .outcome(strategy)
            .and_then(|o| o.percent_vs_operational)
    }
}

/// Place `workload` under every strategy and compare the totals.
pub fn compare_strategies<P>(
    fleet: &Fleet,
    config: &ModelConfig,
    provider: &P,
    workload: &Workload,
) -> Result<StrategyComparison>
where
    P: CarbonIntensityProvider + ?Sized,
{
    let selector = PlacementSelector::new(fleet, config, provider)?;

    let mut placed = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let decision = selector.select(workload.duration_seconds, workload.sla_latency_ms, strategy)?;
        if let Some(best) = decision.best() {
            placed.push((strategy, best.region.clone(), best.hardware_class.clone(), best.estimate));
        }
    }

    let baseline = placed
        .iter()
        .find(|(strategy, ..)| *strategy == Strategy::OperationalOnly)
        .map(|(.., estimate)| estimate.total_co2_g);

    let outcomes = placed
        .into_iter()
        .map(|(strategy, region, hardware_class, estimate)| StrategyOutcome {
            strategy,
            region,
            hardware_class,
            estimate,
            percent_vs_operational: baseline
                .filter(|b| *b > 0.0)
                .map(|b| (estimate.total_co2_g - b) / b * 100.0),
        })
        .collect();

    Ok(StrategyComparison {
        workload: *workload,
        outcomes,
    })
}

/// Repeat the comparison with every region at each of `intensities`.
pub fn intensity_sweep(
    fleet: &Fleet,
    config: &ModelConfig,
    workload: &Workload,
    intensities: &[f64],
) -> Result<Vec<SweepPoint>> {
    intensities
        .iter()
        .map(|&ci| {
            ensure_non_negative("carbon_intensity", ci)?;
            let provider = UniformIntensityProvider(ci);
            Ok(SweepPoint {
                parameter: ci,
                comparison: compare_strategies(fleet, config, &provider, workload)?,
            })
        })
        .collect()
}

/// Repeat the comparison at a fixed intensity for each degradation rate.
pub fn aging_rate_sweep(
    fleet: &Fleet,
    config: &ModelConfig,
    workload: &Workload,
    carbon_intensity: f64,
    rates: &[f64],
) -> Result<Vec<SweepPoint>> {
    ensure_non_negative("carbon_intensity", carbon_intensity)?;
    let provider = UniformIntensityProvider(carbon_intensity);

    rates
        .iter()
        .map(|&rate| {
            let config = ModelConfig {
                degradation_rate: rate,
                ..config.clone()
            };
            tracing::debug!(rate, carbon_intensity, "aging-rate sweep point");
            Ok(SweepPoint {
                parameter: rate,
                comparison: compare_strategies(fleet, &config, &provider, workload)?,
            })
        })
        .collect()
}

/// Repeat the comparison for each task length in `durations_s`.
///
/// Carbon grows linearly with duration while the debt term of the
/// embodied-prioritized score does not, so long tasks can move that strategy
/// onto newer hardware. [`find_placement_switch`] reports where.
pub fn duration_sweep<P>(
    fleet: &Fleet,
    config: &ModelConfig,
    provider: &P,
    sla_ms: f64,
    durations_s: &[f64],
) -> Result<Vec<SweepPoint>>
where
    P: CarbonIntensityProvider + ?Sized,
{
    durations_s
        .iter()
        .map(|&duration_s| {
            let workload = Workload::new(duration_s, sla_ms)?;
            Ok(SweepPoint {
                parameter: duration_s,
                comparison: compare_strategies(fleet, config, provider, &workload)?,
            })
        })
        .collect()
}

/// Repeat the comparison with every class in the fleet aged by each of
/// `offsets_years`. Ages are floored at zero.
pub fn fleet_aging_sweep(
    fleet: &Fleet,
    config: &ModelConfig,
    workload: &Workload,
    carbon_intensity: f64,
    offsets_years: &[f64],
) -> Result<Vec<SweepPoint>> {
    ensure_non_negative("carbon_intensity", carbon_intensity)?;
    let provider = UniformIntensityProvider(carbon_intensity);

    offsets_years
        .iter()
        .map(|&offset| {
            let aged = fleet.map_classes(|class| HardwareAgeClass {
                age_years: (class.age_years + offset).max(0.0),
                ..class.clone()
            });
            Ok(SweepPoint {
                parameter: offset,
                comparison: compare_strategies(&aged, config, &provider, workload)?,
            })
        })
        .collect()
}

/// First parameter at which `strategy` places on a different
/// (region, hardware class) than at the previous point.
pub fn find_placement_switch(points: &[SweepPoint], strategy: Strategy) -> Option<f64> {
    let placements: Vec<(f64, &str, &str)> = points
        .iter()
        .filter_map(|p| {
            p.comparison
                .outcome(strategy)
                .map(|o| (p.parameter, o.region.as_str(), o.hardware_class.as_str()))
        })
        .collect();

    placements.windows(2).find_map(|w| {
        let (_, region0, class0) = w[0];
        let (x1, region1, class1) = w[1];
        (region0 != region1 || class0 != class1).then_some(x1)
    })
}

/// Parameter at which `strategy` first goes from beating the baseline to
/// losing to it.
///
/// Scans consecutive points for a percentage that moves from below zero to
/// zero or above and interpolates linearly between them. Points where the
/// strategy has no percentage are skipped.
pub fn find_crossover(points: &[SweepPoint], strategy: Strategy) -> Option<f64> {
    let series: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| p.percent_vs_operational(strategy).map(|pct| (p.parameter, pct)))
        .collect();

    series.windows(2).find_map(|w| {
        let (x0, y0) = w[0];
        let (x1, y1) = w[1];
        if y0 < 0.0 && y1 >= 0.0 {
            Some(x0 + (0.0 - y0) * (x1 - x0) / (y1 - y0))
        } else {
            None
        }
    })
}
