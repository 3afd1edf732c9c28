//! SLA-bounded search over (region, hardware class) candidates.

use super::replacement::{BreakEvenAnalyzer, ReplacementAnalysis};
use super::strategy::{ScoreInputs, Strategy};
use super::{Candidate, NoCandidateReason, Placement, PlacementDecision};
use crate::config::ModelConfig;
use crate::error::{ensure_non_negative, Result};
use crate::fleet::Fleet;
use crate::intensity::{blend_intensity, BlendedIntensity, CarbonIntensityProvider};
use crate::model::CarbonEvaluator;
use std::fmt;

/// Every candidate that survived the filters, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub candidates: Vec<Candidate>,
    /// Regions whose latency met the SLA, whether or not they had capacity.
    pub regions_within_sla: usize,
}

impl Ranking {
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// Chooses placements over a fixed fleet.
///
/// Holds only shared references; any number of threads may call
/// [`select`](Self::select) on the same selector.
pub struct PlacementSelector<'a, P: ?Sized> {
    fleet: &'a Fleet,
    config: &'a ModelConfig,
    provider: &'a P,
}

impl<P: ?Sized> fmt::Debug for PlacementSelector<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacementSelector")
            .field("regions", &self.fleet.regions.len())
            .field("classes", &self.fleet.classes.len())
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

impl<'a, P> PlacementSelector<'a, P>
where
    P: CarbonIntensityProvider + ?Sized,
{
    pub fn new(fleet: &'a Fleet, config: &'a ModelConfig, provider: &'a P) -> Result<Self> {
        config.validate()?;
        fleet.validate()?;
        Ok(Self {
            fleet,
            config,
            provider,
        })
    }

    pub fn fleet(&self) -> &Fleet {
        self.fleet
    }

    pub fn config(&self) -> &ModelConfig {
        self.config
    }

    /// Blended intensity for `region`, falling back to the configured default.
    pub fn intensity(&self, region: &str) -> BlendedIntensity {
        blend_intensity(self.provider, region, self.config.default_carbon_intensity)
    }

    /// Score every viable candidate and sort ascending by score.
    pub fn rank(&self, duration_s: f64, sla_ms: f64, strategy: Strategy) -> Result<Ranking> {
        ensure_non_negative("duration_seconds", duration_s)?;
        ensure_non_negative("sla_ms", sla_ms)?;

        let evaluator = CarbonEvaluator::new(self.config);
        let mut candidates = Vec::new();
        let mut regions_within_sla = 0;

        for region in &self.fleet.regions {
            if !region.within_sla(sla_ms) {
                tracing::debug!(region = %region.name, latency_ms = region.latency_ms, sla_ms, "region exceeds SLA");
                continue;
            }
            regions_within_sla += 1;

            let intensity = self.intensity(&region.name);

            for class in &self.fleet.classes {
                let available = match region.pool(&class.name) {
                    Some(pool) if pool.has_capacity() => pool.available,
                    _ => continue,
                };

                let assessment = evaluator.assess(class, duration_s, intensity.value)?;
                let score = strategy.score(&ScoreInputs {
                    estimate: assessment.estimate,
                    debt_ratio: assessment.debt_ratio,
                    latency_ms: region.latency_ms,
                    cost_factor: region.cost_factor,
                });

                tracing::debug!(
                    region = %region.name,
                    class = %class.name,
                    ci = intensity.value,
                    total_g = assessment.estimate.total_co2_g,
                    debt_ratio = assessment.debt_ratio,
                    score,
                    "scored candidate"
                );

                candidates.push(Candidate {
                    region: region.name.clone(),
                    hardware_class: class.name.clone(),
                    age_years: class.age_years,
                    carbon_intensity: intensity,
                    estimate: assessment.estimate,
                    debt_ratio: assessment.debt_ratio,
                    power_w: assessment.power_w,
                    latency_ms: region.latency_ms,
                    cost_factor: region.cost_factor,
                    available_servers: available,
                    score,
                });
            }
        }

        // Stable sort: equal scores keep fleet order, so the first wins ties.
        candidates.sort_by(|a, b| a.score.total_cmp(&b.score));

        Ok(Ranking {
            candidates,
            regions_within_sla,
        })
    }

    pub fn select(&self, duration_s: f64, sla_ms: f64, strategy: Strategy) -> Result<PlacementDecision> {
        let ranking = self.rank(duration_s, sla_ms, strategy)?;
        let candidates_evaluated = ranking.candidates.len();

        let placement = match ranking.best() {
            Some(best) => {
                tracing::debug!(
                    strategy = %strategy,
                    region = %best.region,
                    class = %best.hardware_class,
                    total_g = best.estimate.total_co2_g,
                    score = best.score,
                    "placement selected"
                );
                Placement::Selected(best.clone())
            }
            None => {
                let reason = if ranking.regions_within_sla == 0 {
                    NoCandidateReason::SlaExceeded
                } else {
                    NoCandidateReason::NoCapacity
                };
                tracing::warn!(strategy = %strategy, duration_s, sla_ms, %reason, "no viable placement");
                Placement::NoViableCandidate { reason }
            }
        };

        let mut alternatives = ranking.candidates;
        alternatives.truncate(self.config.alternatives);

        Ok(PlacementDecision {
            strategy,
            duration_s,
            sla_ms,
            placement,
            alternatives,
            candidates_evaluated,
        })
    }

    /// [`select`](Self::select) with the strategy given by name.
    pub fn select_named(&self, duration_s: f64, sla_ms: f64, strategy: &str) -> Result<PlacementDecision> {
        self.select(duration_s, sla_ms, strategy.parse()?)
    }

    /// Should `old_class` servers in `region` be swapped for `new_class` ones?
    pub fn analyze_replacement(
        &self,
        region: &str,
        old_class: &str,
        new_class: &str,
    ) -> Result<ReplacementAnalysis> {
        let region = self.fleet.region(region)?;
        let old = self.fleet.class(old_class)?;
        let new = self.fleet.class(new_class)?;
        let intensity = self.intensity(&region.name);

        BreakEvenAnalyzer::new(self.config).analyze(&region.name, old, new, intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fleet::{HardwareAgeClass, Region, ServerPool};
    use crate::intensity::{StaticIntensityProvider, UniformIntensityProvider};

    fn reference_provider() -> StaticIntensityProvider {
        StaticIntensityProvider::new()
            .with_live("Northern", 535.0)
            .with_live("Southern", 607.0)
            .with_live("Eastern", 813.0)
            .with_live("Western", 712.0)
    }

    #[test]
    fn test_sla_filter_rejects_everything() {
        let fleet = Fleet::reference();
        let config = ModelConfig::default();
        let provider = reference_provider();
        let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();

        let decision = selector.select(15.0, 50.0, Strategy::Balanced).unwrap();
        assert!(!decision.is_placed());
        assert_eq!(decision.no_candidate_reason(), Some(NoCandidateReason::SlaExceeded));
        assert!(decision.alternatives.is_empty());
    }

    #[test]
    fn test_sla_filter_is_hard() {
        let fleet = Fleet::reference();
        let config = ModelConfig::default();
        // Eastern would be cheapest on cost but sits outside the SLA.
        let provider = UniformIntensityProvider(500.0);
        let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();

        let ranking = selector.rank(15.0, 100.0, Strategy::OperationalOnly).unwrap();
        assert_eq!(ranking.regions_within_sla, 3);
        assert!(ranking.candidates.iter().all(|c| c.region != "Eastern"));
        assert_eq!(ranking.candidates.len(), 9);
    }

    #[test]
    fn test_shortlist_sorted_and_truncated() {
        let fleet = Fleet::reference();
        let config = ModelConfig::default();
        let provider = reference_provider();
        let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();

        let decision = selector.select(15.0, 2000.0, Strategy::Balanced).unwrap();
        assert_eq!(decision.candidates_evaluated, 12);
        assert_eq!(decision.alternatives.len(), 3);
        assert!(decision
            .alternatives
            .windows(2)
            .all(|w| w[0].score <= w[1].score));
        assert_eq!(decision.best(), decision.alternatives.first());
    }

    #[test]
    fn test_zero_capacity_is_skipped() {
        let classes = vec![
            HardwareAgeClass::new("new", 0.5, 660.0, 5.0),
            HardwareAgeClass::new("old", 4.0, 660.0, 5.0),
        ];
        let regions = vec![Region::new("Solo", 40.0, 1.0)
            .with_pool("new", ServerPool::new(4))
            .with_pool("old", ServerPool::with_available(10, 0))];
        let fleet = Fleet::new(classes, regions).unwrap();
        let config = ModelConfig::default();
        let provider = UniformIntensityProvider(500.0);
        let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();

        let decision = selector.select(60.0, 100.0, Strategy::EmbodiedPrioritized).unwrap();
        assert_eq!(decision.best().unwrap().hardware_class, "new");
        assert_eq!(decision.candidates_evaluated, 1);
    }

    #[test]
    fn test_no_capacity_reason() {
        let classes = vec![HardwareAgeClass::new("new", 0.5, 660.0, 5.0)];
        let regions = vec![Region::new("Solo", 40.0, 1.0).with_pool("new", ServerPool::with_available(2, 0))];
        let fleet = Fleet::new(classes, regions).unwrap();
        let config = ModelConfig::default();
        let provider = UniformIntensityProvider(500.0);
        let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();

        let decision = selector.select(60.0, 100.0, Strategy::Balanced).unwrap();
        assert_eq!(decision.no_candidate_reason(), Some(NoCandidateReason::NoCapacity));
    }

    #[test]
    fn test_defaulted_intensity_is_visible() {
        let fleet = Fleet::reference();
        let config = ModelConfig::default();
        let provider = StaticIntensityProvider::new().with_live("Northern", 535.0);
        let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();

        let ranking = selector.rank(15.0, 2000.0, Strategy::Balanced).unwrap();
        let western = ranking.candidates.iter().find(|c| c.region == "Western").unwrap();
        assert!(western.carbon_intensity.live_defaulted);
        assert_eq!(western.carbon_intensity.value, 700.0);

        let northern = ranking.candidates.iter().find(|c| c.region == "Northern").unwrap();
        assert!(northern.carbon_intensity.measured());
    }

    #[test]
    fn test_select_named() {
        let fleet = Fleet::reference();
        let config = ModelConfig::default();
        let provider = reference_provider();
        let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();

        assert!(selector.select_named(15.0, 2000.0, "balanced").is_ok());
        let err = selector.select_named(15.0, 2000.0, "cheapest").unwrap_err();
        assert!(matches!(err, Error::UnknownStrategy(ref s) if s == "cheapest"));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let fleet = Fleet::reference();
        let config = ModelConfig::default();
        let provider = reference_provider();
        let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();

        assert!(selector.select(-1.0, 2000.0, Strategy::Balanced).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_embodied_strategy_prefers_older_hardware() {
        let fleet = Fleet::reference();
        let config = ModelConfig::default();
        let provider = reference_provider();
        let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();

        let embodied = selector.select(15.0, 2000.0, Strategy::EmbodiedPrioritized).unwrap();
        let operational = selector.select(15.0, 2000.0, Strategy::OperationalOnly).unwrap();

        let embodied_age = embodied.best().unwrap().age_years;
        let operational_age = operational.best().unwrap().age_years;
        assert!(embodied_age > operational_age);
    }
}
