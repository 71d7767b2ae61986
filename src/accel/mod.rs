//! Accelerator runtime probe
//!
//! Acquires a Candle compute device and collects whatever metadata the
//! platform exposes: CUDA/Metal availability, GPU name and driver version
//! via `nvidia-smi` when present.

use std::process::Command;

use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::Device;

use crate::errors::{CheckError, Result};

/// Snapshot of the available accelerator runtime
#[derive(Debug, Clone)]
pub struct AcceleratorInfo {
    pub device: Device,
    pub cuda_available: bool,
    pub metal_available: bool,
    pub device_name: Option<String>,
    pub driver_version: Option<String>,
}

impl AcceleratorInfo {
    /// One-line human summary for the capability report
    pub fn summary(&self) -> String {
        if self.cuda_available {
            let name = self.device_name.as_deref().unwrap_or("unknown GPU");
            match &self.driver_version {
                Some(driver) => format!("CUDA ({name}, driver {driver})"),
                None => format!("CUDA ({name})"),
            }
        } else if self.metal_available {
            "Metal".to_string()
        } else {
            "CPU only".to_string()
        }
    }
}

/// Acquire the accelerator runtime, preferring GPU when compiled in
pub fn probe() -> Result<AcceleratorInfo> {
    let device = Device::cuda_if_available(0)
        .map_err(|e| CheckError::capability("accelerator runtime", e))?;

    let cuda_available = cuda_is_available();
    let (device_name, driver_version) = if cuda_available {
        (query_nvidia_smi("name"), query_nvidia_smi("driver_version"))
    } else {
        (None, None)
    };

    Ok(AcceleratorInfo {
        device,
        cuda_available,
        metal_available: metal_is_available(),
        device_name,
        driver_version,
    })
}

/// Query one field of GPU 0 via nvidia-smi, if the tool exists
fn query_nvidia_smi(field: &str) -> Option<String> {
    let output = Command::new("nvidia-smi")
        .arg(format!("--query-gpu={field}"))
        .arg("--format=csv,noheader")
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    first_line(&output.stdout)
}

fn first_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8(bytes.to_vec()).ok()?;
    let line = text.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
