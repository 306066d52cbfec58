use std::time::Duration;

/// Runtime configuration for the `strand-nexus` operator binary, assembled
/// from CLI [`crate::Args`].
///
/// Mirrors the teacher's `ServerRuntimeConfig`/`DriverConfig` split: CLI
/// parsing lives in `main`, this struct is the plain, `Default`-implementing
/// value every wired-up component reads from.
#[derive(Debug, Clone)]
pub struct NexusConfig {
    /// Overlay transport bind address (spec.md §4.B, default port 6477).
    pub bind_address: String,
    /// Health reconciler tick interval (spec.md §4.J, default 10s).
    pub health_check_interval: Duration,
    /// Staleness threshold before a node is demoted to unhealthy (default 30s).
    pub unhealthy_after: Duration,
    /// Firmware reconciler tick interval (spec.md §4.J, default 30s).
    pub firmware_reconcile_interval: Duration,
    /// Firmware version the fleet should converge on, if any.
    pub desired_firmware_version: Option<String>,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("0.0.0.0:{}", strand_transport::OVERLAY_PORT),
            health_check_interval: strand_fleet::DEFAULT_CHECK_INTERVAL,
            unhealthy_after: strand_fleet::DEFAULT_UNHEALTHY_AFTER,
            firmware_reconcile_interval: strand_fleet::DEFAULT_RECONCILE_INTERVAL,
            desired_firmware_version: None,
        }
    }
}
