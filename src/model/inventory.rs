//! Manufacturing footprint of a machine from its bill of materials.

use serde::{Deserialize, Serialize};

/// Manufacturing-phase emission factors (kg CO2e).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    CpuServer,
    CpuDesktop,
    CpuMobile,
    GpuDatacenter,
    GpuConsumer,
    GpuMobile,
    /// Per GB.
    RamDdr4,
    /// Per GB.
    RamDdr5,
    /// Per GB.
    SsdNvme,
    /// Per GB.
    SsdSata,
    /// Per GB.
    Hdd,
    Server1u,
    Server2u,
}

impl Component {
    pub fn embodied_kg(self) -> f64 {
        match self {
            Component::CpuServer => 100.0,
            Component::CpuDesktop => 50.0,
            Component::CpuMobile => 20.0,
            Component::GpuDatacenter => 150.0,
            Component::GpuConsumer => 75.0,
            Component::GpuMobile => 30.0,
            Component::RamDdr4 => 5.0,
            Component::RamDdr5 => 6.0,
            Component::SsdNvme => 0.16,
            Component::SsdSata => 0.12,
            Component::Hdd => 0.04,
            Component::Server1u => 500.0,
            Component::Server2u => 800.0,
        }
    }
}

/// Hardware shape of a compute instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub cpu_count: u32,
    pub cpu: Component,
    pub gpu_count: u32,
    pub gpu: Option<Component>,
    pub ram_gb: u32,
    pub ram: Component,
    pub storage_gb: u32,
    pub storage: Component,
}

impl InstanceSpec {
    pub fn cloud_small() -> Self {
        Self {
            cpu_count: 2,
            cpu: Component::CpuServer,
            gpu_count: 0,
            gpu: None,
            ram_gb: 8,
            ram: Component::RamDdr4,
            storage_gb: 100,
            storage: Component::SsdSata,
        }
    }

    pub fn cloud_medium() -> Self {
        Self {
            cpu_count: 4,
            ram_gb: 16,
            storage_gb: 200,
            storage: Component::SsdNvme,
            ..Self::cloud_small()
        }
    }

    pub fn cloud_large() -> Self {
        Self {
            cpu_count: 8,
            ram_gb: 32,
            ram: Component::RamDdr5,
            storage_gb: 500,
            ..Self::cloud_medium()
        }
    }

    pub fn gpu_instance() -> Self {
        Self {
            gpu_count: 1,
            gpu: Some(Component::GpuDatacenter),
            ram_gb: 64,
            storage_gb: 1000,
            ..Self::cloud_large()
        }
    }

    /// Look up a preset by its conventional name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "cloud_small" => Some(Self::cloud_small()),
            "cloud_medium" => Some(Self::cloud_medium()),
            "cloud_large" => Some(Self::cloud_large()),
            "gpu_instance" => Some(Self::gpu_instance()),
            _ => None,
        }
    }

    /// Total manufacturing footprint in kg CO2e.
    pub fn total_embodied_kg(&self) -> f64 {
        let cpu = self.cpu.embodied_kg() * f64::from(self.cpu_count);
        let gpu = match self.gpu {
            Some(gpu) if self.gpu_count > 0 => gpu.embodied_kg() * f64::from(self.gpu_count),
            _ => 0.0,
        };
        let ram = self.ram.embodied_kg() * f64::from(self.ram_gb);
        let storage = self.storage.embodied_kg() * f64::from(self.storage_gb);

        cpu + gpu + ram + storage
    }
}
