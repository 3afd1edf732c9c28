//! Regional placement example - compares strategies on the reference fleet

use embodied_sched::prelude::*;

fn main() {
    println!("=== Regional Placement Example ===\n");

    let fleet = Fleet::reference();
    let config = ModelConfig::default();
    let provider = CachedIntensityProvider::new(
        StaticIntensityProvider::new()
            .with_live("Northern", 535.0)
            .with_live("Southern", 607.0)
            .with_live("Eastern", 813.0)
            .with_live("Western", 712.0),
    );

    let selector = PlacementSelector::new(&fleet, &config, &provider).expect("Failed to build selector");
    let console = ConsoleExporter::new(true);

    for strategy in Strategy::ALL {
        let decision = selector
            .select(15.0, 100.0, strategy)
            .expect("Placement failed");
        console.export_placement(&decision).expect("Export failed");
        println!();
    }

    // Nothing sits within 50ms of the caller.
    let decision = selector
        .select(15.0, 50.0, Strategy::Balanced)
        .expect("Placement failed");
    console.export_placement(&decision).expect("Export failed");
    println!();

    let analysis = selector
        .analyze_replacement("Eastern", "old", "new")
        .expect("Replacement analysis failed");
    console.export_replacement(&analysis).expect("Export failed");

    println!("\nCrossover sweep (15s task, every region on the same grid):");
    let workload = Workload::new(15.0, 2000.0).expect("Invalid workload");
    let intensities: Vec<f64> = (0..=16).map(|i| 100.0 + 25.0 * i as f64).collect();
    let sweep = intensity_sweep(&fleet, &config, &workload, &intensities).expect("Sweep failed");

    for point in &sweep {
        if let Some(pct) = point.percent_vs_operational(Strategy::EmbodiedPrioritized) {
            println!("  {:>6.1} gCO2/kWh: embodied_prioritized {:+.2}% vs operational_only", point.parameter, pct);
        }
    }

    match find_crossover(&sweep, Strategy::EmbodiedPrioritized) {
        Some(ci) => println!("\nembodied_prioritized stops paying off at ~{:.0} gCO2/kWh", ci),
        None => println!("\nNo crossover in the swept range"),
    }
}
