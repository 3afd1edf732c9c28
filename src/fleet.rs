//! Static description of the compute estate: hardware age classes, regions
//! and the server pools each region offers.
//!
//! A [`Fleet`] is built once (in code or from JSON) and handed to the
//! selector by reference; nothing in the crate mutates it.

use crate::error::{ensure_non_negative, ensure_positive, Error, Result};
use crate::model::inventory::InstanceSpec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// A bucket of servers sharing an age and manufacturing footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareAgeClass {
    pub name: String,
    pub age_years: f64,
    pub total_embodied_carbon_kg: f64,
    pub expected_lifetime_years: f64,
}

impl HardwareAgeClass {
    pub fn new(
        name: impl Into<String>,
        age_years: f64,
        total_embodied_carbon_kg: f64,
        expected_lifetime_years: f64,
    ) -> Self {
        Self {
            name: name.into(),
            age_years,
            total_embodied_carbon_kg,
            expected_lifetime_years,
        }
    }

    /// Class whose footprint is the bill of materials of `spec`.
    pub fn from_instance(
        name: impl Into<String>,
        age_years: f64,
        spec: &InstanceSpec,
        expected_lifetime_years: f64,
    ) -> Self {
        Self::new(name, age_years, spec.total_embodied_kg(), expected_lifetime_years)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("age_years", self.age_years)
            .and_then(|_| ensure_non_negative("total_embodied_carbon_kg", self.total_embodied_carbon_kg))
            .and_then(|_| ensure_positive("expected_lifetime_years", self.expected_lifetime_years))
            .map_err(|e| Error::config(format!("hardware class '{}': {}", self.name, e)))
    }
}

/// Servers of one age class available in a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerPool {
    pub count: u32,
    pub available: u32,
}

impl ServerPool {
    pub fn new(count: u32) -> Self {
        Self {
            count,
            available: count,
        }
    }

    pub fn with_available(count: u32, available: u32) -> Self {
        Self { count, available }
    }

    pub fn has_capacity(&self) -> bool {
        self.available > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub latency_ms: f64,
    pub cost_factor: f64,
    /// Pools keyed by hardware class name.
    #[serde(default)]
    pub servers: BTreeMap<String, ServerPool>,
}

impl Region {
    pub fn new(name: impl Into<String>, latency_ms: f64, cost_factor: f64) -> Self {
        Self {
            name: name.into(),
            latency_ms,
            cost_factor,
            servers: BTreeMap::new(),
        }
    }

    pub fn with_pool(mut self, class: impl Into<String>, pool: ServerPool) -> Self {
        self.servers.insert(class.into(), pool);
        self
    }

    pub fn pool(&self, class: &str) -> Option<&ServerPool> {
        self.servers.get(class)
    }

    pub fn within_sla(&self, sla_ms: f64) -> bool {
        self.latency_ms <= sla_ms
    }
}

/// A unit of work to place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub duration_seconds: f64,
    pub sla_latency_ms: f64,
}

impl Workload {
    pub fn new(duration_seconds: f64, sla_latency_ms: f64) -> Result<Self> {
        ensure_positive("duration_seconds", duration_seconds)?;
        ensure_positive("sla_latency_ms", sla_latency_ms)?;
        Ok(Self {
            duration_seconds,
            sla_latency_ms,
        })
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_seconds / 3600.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    pub classes: Vec<HardwareAgeClass>,
    pub regions: Vec<Region>,
}

impl Fleet {
    pub fn new(classes: Vec<HardwareAgeClass>, regions: Vec<Region>) -> Result<Self> {
        let fleet = Self { classes, regions };
        fleet.validate()?;
        Ok(fleet)
    }

    /// Four-region estate with new / medium / old servers of a 660 kg,
    /// five-year platform.
    pub fn reference() -> Self {
        let classes = vec![
            HardwareAgeClass::new("new", 0.5, 660.0, 5.0),
            HardwareAgeClass::new("medium", 2.5, 660.0, 5.0),
            HardwareAgeClass::new("old", 4.0, 660.0, 5.0),
        ];

        let region = |name: &str, latency: f64, cost: f64, pools: [u32; 3]| {
            Region::new(name, latency, cost)
                .with_pool("new", ServerPool::new(pools[0]))
                .with_pool("medium", ServerPool::new(pools[1]))
                .with_pool("old", ServerPool::new(pools[2]))
        };

        let regions = vec![
            region("Northern", 70.0, 3.0, [10, 20, 30]),
            region("Western", 90.0, 2.8, [15, 15, 20]),
            region("Southern", 80.0, 3.2, [20, 25, 15]),
            region("Eastern", 120.0, 2.5, [8, 12, 40]),
        ];

        Self { classes, regions }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let fleet: Fleet = serde_json::from_str(json)?;
        fleet.validate()?;
        Ok(fleet)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(Error::config("fleet defines no hardware classes"));
        }

        let mut class_names = HashSet::new();
        for class in &self.classes {
            class.validate()?;
            if !class_names.insert(class.name.as_str()) {
                return Err(Error::config(format!("duplicate hardware class '{}'", class.name)));
            }
        }

        let mut region_names = HashSet::new();
        for region in &self.regions {
            if !region_names.insert(region.name.as_str()) {
                return Err(Error::config(format!("duplicate region '{}'", region.name)));
            }
            if !region.latency_ms.is_finite() || region.latency_ms < 0.0 {
                return Err(Error::config(format!("region '{}': latency_ms must be >= 0", region.name)));
            }
            if !region.cost_factor.is_finite() || region.cost_factor < 0.0 {
                return Err(Error::config(format!("region '{}': cost_factor must be >= 0", region.name)));
            }
            for (class, pool) in &region.servers {
                if !class_names.contains(class.as_str()) {
                    return Err(Error::config(format!(
                        "region '{}' lists servers of unknown class '{}'",
                        region.name, class
                    )));
                }
                if pool.available > pool.count {
                    return Err(Error::config(format!(
                        "region '{}': {} available '{}' servers exceeds count {}",
                        region.name, pool.available, class, pool.count
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn class(&self, name: &str) -> Result<&HardwareAgeClass> {
        self.classes
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnknownHardwareClass(name.to_string()))
    }

    pub fn region(&self, name: &str) -> Result<&Region> {
        self.regions
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| Error::UnknownRegion(name.to_string()))
    }

    /// Copy of the fleet with every class rewritten by `f`.
    pub fn map_classes<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&HardwareAgeClass) -> HardwareAgeClass,
    {
        Self {
            classes: self.classes.iter().map(&mut f).collect(),
            regions: self.regions.clone(),
        }
    }
}

impl Default for Fleet {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_fleet_is_valid() {
        let fleet = Fleet::reference();
        assert!(fleet.validate().is_ok());
        assert_eq!(fleet.classes.len(), 3);
        assert_eq!(fleet.regions.len(), 4);
        assert_eq!(fleet.region("Eastern").unwrap().latency_ms, 120.0);
        assert_eq!(fleet.class("old").unwrap().age_years, 4.0);
    }

    #[test]
    fn test_unknown_lookups() {
        let fleet = Fleet::reference();
        assert!(matches!(fleet.class("ancient"), Err(Error::UnknownHardwareClass(_))));
        assert!(matches!(fleet.region("Arctic"), Err(Error::UnknownRegion(_))));
    }

    #[test]
    fn test_rejects_unknown_pool_class() {
        let classes = vec![HardwareAgeClass::new("new", 0.5, 660.0, 5.0)];
        let regions = vec![Region::new("A", 10.0, 1.0).with_pool("old", ServerPool::new(1))];
        assert!(Fleet::new(classes, regions).is_err());
    }

    #[test]
    fn test_rejects_bad_class() {
        let classes = vec![HardwareAgeClass::new("new", 0.5, 660.0, 0.0)];
        let err = Fleet::new(classes, vec![]).unwrap_err();
        assert!(err.to_string().contains("new"));
    }

    #[test]
    fn test_rejects_duplicates() {
        let classes = vec![
            HardwareAgeClass::new("new", 0.5, 660.0, 5.0),
            HardwareAgeClass::new("new", 1.0, 660.0, 5.0),
        ];
        assert!(Fleet::new(classes, vec![]).is_err());
    }

    #[test]
    fn test_json_round_trip_through_validation() {
        let json = r#"{
            "classes": [
                {"name": "new", "age_years": 0.5, "total_embodied_carbon_kg": 660, "expected_lifetime_years": 5}
            ],
            "regions": [
                {"name": "Lab", "latency_ms": 15, "cost_factor": 1.0,
                 "servers": {"new": {"count": 2, "available": 1}}}
            ]
        }"#;

        let fleet = Fleet::from_json_str(json).unwrap();
        assert_eq!(fleet.region("Lab").unwrap().pool("new").unwrap().available, 1);
    }

    #[test]
    fn test_workload_validation() {
        assert!(Workload::new(15.0, 2000.0).is_ok());
        assert!(Workload::new(-1.0, 2000.0).is_err());
        assert!(Workload::new(15.0, 0.0).is_err());
        assert_eq!(Workload::new(7200.0, 100.0).unwrap().duration_hours(), 2.0);
    }
}
