//! Diagnostic runner
//!
//! Runs the two check phases in order: required capability acquisitions
//! (fatal on failure, exit 1) and the pretrained model load (advisory,
//! reported as a warning without changing the exit status).

use candle_core::{DType, Device, Tensor};
use colored::Colorize;
use std::path::Path;
use tokio::sync::oneshot;

use crate::accel;
use crate::errors::{CheckError, Result};
use crate::retrieval::{ColPaliRetriever, HubClient, Operation, RetrievalModel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

impl CheckStatus {
    fn symbol(&self) -> &str {
        match self {
            Self::Pass => "✓",
            Self::Warning => "⚠",
            Self::Fail => "✗",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

impl HealthCheck {
    fn pass(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            message: message.into(),
        }
    }

    fn warn(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.into(),
        }
    }

    fn fail(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            message: message.into(),
        }
    }
}

/// Outcome of the capability phase, discarded at end of run
#[derive(Debug, Clone)]
pub struct CapabilityReport {
    pub checks: Vec<HealthCheck>,
}

impl CapabilityReport {
    /// True when every required acquisition succeeded.
    /// Warnings are advisory and do not make the environment unusable.
    pub fn is_usable(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    /// Process exit code for this report: 1 when unusable, 0 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_usable() {
            0
        } else {
            1
        }
    }

    pub fn print(&self) {
        println!("Testing capabilities...");
        for check in &self.checks {
            let symbol = match check.status {
                CheckStatus::Pass => check.status.symbol().green(),
                CheckStatus::Warning => check.status.symbol().yellow(),
                CheckStatus::Fail => check.status.symbol().red(),
            };
            println!("  {} {:<20} {}", symbol, format!("{}:", check.name), check.message);
        }
        println!();
    }
}

/// Diagnostic runner for the retrieval stack
pub struct Doctor {
    model_id: String,
}

impl Doctor {
    pub fn new(model_id: String) -> Self {
        Self { model_id }
    }

    /// Phase 1: acquire the three required capabilities plus an advisory
    /// disk-space reading. Acquisitions are independent; all are attempted
    /// and reported even when an earlier one fails.
    pub fn run_capability_checks(&self) -> CapabilityReport {
        let mut checks = Vec::new();

        let accelerator = accel::probe();
        checks.push(match &accelerator {
            Ok(info) => HealthCheck::pass("Accelerator", info.summary()),
            Err(e) => HealthCheck::fail("Accelerator", e.to_string()),
        });

        let hub = HubClient::new();
        checks.push(match &hub {
            Ok(client) => HealthCheck::pass(
                "Hub client",
                format!("cache at {}", client.cache_dir().display()),
            ),
            Err(e) => HealthCheck::fail("Hub client", e.to_string()),
        });

        checks.push(match &accelerator {
            Ok(info) => check_compute(&info.device),
            Err(_) => HealthCheck::fail("Compute kernels", "accelerator unavailable"),
        });

        if let Ok(client) = &hub {
            checks.push(check_disk_space(client.cache_dir()));
        }

        CapabilityReport { checks }
    }

    /// Phase 2: download and instantiate the pretrained model, then probe
    /// the handle for the `index` and `search` operations. The blocking
    /// load is raced against Ctrl-C so an interrupt surfaces as its own
    /// advisory outcome.
    pub async fn run_model_check(&self) -> Result<()> {
        let info = accel::probe()?;
        let device = info.device;
        let model_id = self.model_id.clone();

        // The load runs on a plain detached thread, not spawn_blocking:
        // runtime shutdown waits for blocking tasks, so an abandoned
        // multi-GB download would keep the process alive long after the
        // interrupt was reported.
        let (tx, rx) = oneshot::channel();
        std::thread::spawn(move || {
            let _ = tx.send(load_and_probe(&model_id, &device));
        });

        race_interrupt(rx, tokio::signal::ctrl_c()).await
    }
}

/// Wait for the loader result unless the interrupt future fires first
async fn race_interrupt<T>(
    rx: oneshot::Receiver<Result<T>>,
    interrupt: impl std::future::Future<Output = std::io::Result<()>>,
) -> Result<T> {
    tokio::select! {
        received = rx => match received {
            Ok(result) => result,
            Err(_) => Err(CheckError::capability(
                "model loader",
                "loader thread exited without a result",
            )),
        },
        _ = interrupt => Err(CheckError::Interrupted),
    }
}

fn load_and_probe(model_id: &str, device: &Device) -> Result<()> {
    let model = ColPaliRetriever::from_pretrained(model_id, device)?;
    probe_operations(&model)
}

/// Non-invasive probe: the handle must expose both named operations
pub fn probe_operations(handle: &dyn RetrievalModel) -> Result<()> {
    let ops = handle.operations();
    for required in [Operation::Index, Operation::Search] {
        if !ops.contains(&required) {
            return Err(CheckError::MissingOperation(required));
        }
    }
    Ok(())
}

/// Advisory message for a failed model-load phase. Interrupts and interface
/// mismatches get their own wording so triage does not need string-matching.
pub fn advisory_line(err: &CheckError) -> String {
    match err {
        CheckError::Interrupted => "Model loading interrupted by user".to_string(),
        CheckError::MissingOperation(_) => format!("Model interface mismatch: {err}"),
        CheckError::Download(_) => format!("Model download failed: {err}"),
        _ => format!("Model loading failed: {err}"),
    }
}

/// Smoke-test the compute backend with a tiny matmul on the device
fn check_compute(device: &Device) -> HealthCheck {
    let result: Result<f32> = (|| {
        let a = Tensor::ones((2, 3), DType::F32, device)?;
        let product = a.matmul(&a.t()?)?;
        Ok(product.sum_all()?.to_scalar::<f32>()?)
    })();

    match result {
        // ones(2x3) @ ones(3x2) is a 2x2 matrix of 3s
        Ok(total) if (total - 12.0).abs() < 1e-4 => {
            HealthCheck::pass("Compute kernels", "matmul OK")
        }
        Ok(total) => HealthCheck::fail("Compute kernels", format!("matmul returned {total}")),
        Err(e) => HealthCheck::fail("Compute kernels", e.to_string()),
    }
}

/// Advisory: model downloads run multiple GB, warn when the cache disk is low
fn check_disk_space(cache_dir: &Path) -> HealthCheck {
    use sysinfo::Disks;

    let disks = Disks::new_with_refreshed_list();

    let best = disks
        .iter()
        .filter(|d| cache_dir.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len());

    match best {
        Some(disk) => {
            let available_gb = disk.available_space() / 1_000_000_000;
            if available_gb >= 20 {
                HealthCheck::pass("Disk space", format!("{} GB available", available_gb))
            } else {
                HealthCheck::warn(
                    "Disk space",
                    format!("low: {} GB (model weights need ~15GB)", available_gb),
                )
            }
        }
        None => HealthCheck::warn("Disk space", "could not determine"),
    }
}
