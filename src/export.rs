//! Report export for placement decisions and replacement analyses.

use crate::error::Result;
use crate::scheduler::{Candidate, Placement, PlacementDecision, ReplacementAnalysis};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Trait for writing scheduler reports to different sinks
pub trait ReportExporter: Send + Sync {
    /// Export a placement decision
    fn export_placement(&self, decision: &PlacementDecision) -> Result<()>;

    /// Export a replacement analysis
    fn export_replacement(&self, analysis: &ReplacementAnalysis) -> Result<()>;
}

/// Pretty-printed JSON written to a file, replaced on every export
#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_path: PathBuf,
}

impl JsonExporter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    fn write<T: Serialize>(&self, report: &T) -> Result<()> {
        let mut writer = BufWriter::new(File::create(&self.output_path)?);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl ReportExporter for JsonExporter {
    fn export_placement(&self, decision: &PlacementDecision) -> Result<()> {
        self.write(decision)
    }

    fn export_replacement(&self, analysis: &ReplacementAnalysis) -> Result<()> {
        self.write(analysis)
    }
}

/// Human-readable summary on stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleExporter {
    verbose: bool,
}

impl ConsoleExporter {
    /// Verbose output lists every alternative, not just the selection.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Render a placement summary into `out`.
    pub fn write_placement(&self, out: &mut impl Write, decision: &PlacementDecision) -> io::Result<()> {
        writeln!(out, "=== Placement ({}) ===", decision.strategy)?;
        writeln!(
            out,
            "Workload: {:.1}s, SLA {:.0}ms, {} candidates evaluated",
            decision.duration_s, decision.sla_ms, decision.candidates_evaluated
        )?;

        match &decision.placement {
            Placement::Selected(best) => {
                writeln!(out, "Selected: {}", describe(best))?;
                writeln!(
                    out,
                    "  Carbon: {:.4}g total ({:.4}g operational, {:.4}g embodied, {:.1}% embodied)",
                    best.estimate.total_co2_g,
                    best.estimate.operational_co2_g,
                    best.estimate.embodied_co2_g,
                    best.estimate.embodied_share()
                )?;
                if best.carbon_intensity.live_defaulted {
                    writeln!(out, "  Note: live intensity unavailable, default substituted")?;
                }
            }
            Placement::NoViableCandidate { reason } => {
                writeln!(out, "No placement: {}", reason)?;
            }
        }

        if self.verbose && !decision.alternatives.is_empty() {
            writeln!(out, "\nAlternatives:")?;
            for (rank, candidate) in decision.alternatives.iter().enumerate() {
                writeln!(out, "  {}. {} (score {:.4})", rank + 1, describe(candidate), candidate.score)?;
            }
        }

        writeln!(out, "======================")
    }

    /// Render a replacement summary into `out`.
    pub fn write_replacement(&self, out: &mut impl Write, analysis: &ReplacementAnalysis) -> io::Result<()> {
        writeln!(
            out,
            "=== Replacement: {} -> {} in {} ===",
            analysis.old_server.class, analysis.new_server.class, analysis.region
        )?;
        writeln!(out, "Carbon intensity: {:.1} gCO2/kWh", analysis.carbon_intensity.value)?;
        if analysis.break_even.is_reachable() {
            writeln!(
                out,
                "Break-even: {:.1} days ({:.2} years)",
                analysis.break_even.days, analysis.break_even.years
            )?;
        } else {
            writeln!(out, "Break-even: never")?;
        }
        writeln!(out, "Recommendation: {}", if analysis.should_replace { "replace" } else { "keep" })?;
        writeln!(out, "{}", analysis.reasoning)?;

        if self.verbose {
            writeln!(out, "\nOld server:")?;
            writeln!(
                out,
                "  Age: {:.1}y, Power: {:.1}W, Remaining life: {:.2}y",
                analysis.old_server.age_years, analysis.old_server.power_w, analysis.old_server.remaining_life_years
            )?;
            writeln!(out, "New server:")?;
            writeln!(
                out,
                "  Age: {:.1}y, Power: {:.1}W, Carbon multiplier: {:.1}x",
                analysis.new_server.age_years, analysis.new_server.power_w, analysis.new_hardware_carbon_multiplier
            )?;
            writeln!(
                out,
                "Over {:.0}h: old {:.1}g, new {:.1}g, difference {:.1}g ({:.1}%)",
                analysis.horizon_hours,
                analysis.old_total_co2_g,
                analysis.new_total_co2_g,
                analysis.carbon_difference_g,
                analysis.carbon_savings_percent
            )?;
        }

        writeln!(out, "======================")
    }
}

fn describe(candidate: &Candidate) -> String {
    format!(
        "{} / {} ({:.1}y, {:.0}ms, {:.0} gCO2/kWh)",
        candidate.region,
        candidate.hardware_class,
        candidate.age_years,
        candidate.latency_ms,
        candidate.carbon_intensity.value
    )
}

impl ReportExporter for ConsoleExporter {
    fn export_placement(&self, decision: &PlacementDecision) -> Result<()> {
        let stdout = io::stdout();
        self.write_placement(&mut stdout.lock(), decision)?;
        Ok(())
    }

    fn export_replacement(&self, analysis: &ReplacementAnalysis) -> Result<()> {
        let stdout = io::stdout();
        self.write_replacement(&mut stdout.lock(), analysis)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::fleet::Fleet;
    use crate::intensity::UniformIntensityProvider;
    use crate::scheduler::{PlacementSelector, Strategy};

    fn decision(sla_ms: f64) -> PlacementDecision {
        let fleet = Fleet::reference();
        let config = ModelConfig::default();
        let provider = UniformIntensityProvider(535.0);
        let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();
        selector.select(15.0, sla_ms, Strategy::Balanced).unwrap()
    }

    fn replacement() -> ReplacementAnalysis {
        let fleet = Fleet::reference();
        let config = ModelConfig::default();
        let provider = UniformIntensityProvider(535.0);
        let selector = PlacementSelector::new(&fleet, &config, &provider).unwrap();
        selector.analyze_replacement("Northern", "old", "new").unwrap()
    }

    #[test]
    fn test_console_placement_summary() {
        let mut out = Vec::new();
        ConsoleExporter::new(true).write_placement(&mut out, &decision(2000.0)).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("=== Placement (balanced) ==="));
        assert!(text.contains("Selected: "));
        assert!(text.contains("Alternatives:"));
        assert!(text.contains("  3. "));
    }

    #[test]
    fn test_console_no_placement() {
        let mut out = Vec::new();
        ConsoleExporter::default().write_placement(&mut out, &decision(50.0)).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("No placement: no candidates met SLA"));
        assert!(!text.contains("Alternatives:"));
    }

    #[test]
    fn test_console_replacement_summary() {
        let mut out = Vec::new();
        ConsoleExporter::new(true).write_replacement(&mut out, &replacement()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("old -> new in Northern"));
        assert!(text.contains("Recommendation: keep"));
        assert!(text.contains("Old server:"));
    }

    #[test]
    fn test_json_exporter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placement.json");
        let exporter = JsonExporter::new(&path);

        exporter.export_placement(&decision(2000.0)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["strategy"], "balanced");
        assert_eq!(value["placement"]["status"], "selected");
        assert!(value["placement"]["total_co2_g"].as_f64().unwrap() > 0.0);
        assert_eq!(value["alternatives"].as_array().unwrap().len(), 3);

        exporter.export_replacement(&replacement()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["should_replace"], false);
        assert_eq!(value["region"], "Northern");
    }

    #[test]
    fn test_json_no_placement_reason() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.json");

        JsonExporter::new(&path).export_placement(&decision(50.0)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["placement"]["status"], "no_viable_candidate");
        assert_eq!(value["placement"]["reason"], "sla_exceeded");
    }
}
