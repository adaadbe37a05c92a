//! Server-side default parity for reconciled workloads
//!
//! Reconcilers build the desired state of a workload from scratch on every
//! pass. Kubernetes then fills in a number of fields server-side, so comparing
//! the locally built object against the persisted one would always show a
//! difference and trigger an update loop. This crate fills in those fields
//! locally so both sides agree.
//!
//! Defaulting is applied by wrapping a reconciler:
//!
//! ```rust,ignore
//! let reconciler = default_deployment(|mut deploy: Deployment| {
//!     deploy.spec = Some(desired_spec());
//!     Ok::<_, MyError>(deploy)
//! });
//!
//! let desired = reconciler(current)?;
//! ```
//!
//! On top of API-server parity, every pod spec gets a `RuntimeDefault`
//! seccomp profile unless it already sets one (see [`DefaultingPolicy`]).
//!
//! Values are passed by ownership: the wrapper consumes the input object and
//! returns the defaulted result, so the same instance can never be defaulted
//! from two places at once.

#![deny(missing_docs)]

pub mod container;
pub mod error;
pub mod pod_spec;
pub mod policy;
pub mod reconciler;
pub mod workload;
mod yaml;

pub use container::default_container;
pub use error::DefaultingError;
pub use pod_spec::default_pod_spec;
pub use policy::DefaultingPolicy;
pub use reconciler::{
    default_cron_job, default_daemon_set, default_deployment, default_stateful_set, defaulted,
    CronJobReconciler, DaemonSetReconciler, Defaulter, DeploymentReconciler, Reconciler,
    StatefulSetReconciler,
};
pub use workload::PodTemplateWorkload;

/// Result type alias using [`DefaultingError`]
pub type Result<T> = std::result::Result<T, DefaultingError>;

// =============================================================================
// Platform defaults
// =============================================================================

/// Image pull policy the API server assigns when none is set
pub const PULL_IF_NOT_PRESENT: &str = "IfNotPresent";

/// Termination message path the API server assigns when none is set
pub const TERMINATION_MESSAGE_PATH_DEFAULT: &str = "/dev/termination-log";

/// Termination message policy the API server assigns when none is set
pub const TERMINATION_MESSAGE_READ_FILE: &str = "File";

/// API version assigned to `fieldRef` env sources without one
pub const FIELD_REF_API_VERSION: &str = "v1";

/// Default file mode for secret volumes (0644)
pub const SECRET_VOLUME_DEFAULT_MODE: i32 = 0o644;

/// Default file mode for ConfigMap volumes (0644)
pub const CONFIG_MAP_VOLUME_DEFAULT_MODE: i32 = 0o644;

/// Deployment strategy type assigned when none is set
pub const ROLLING_UPDATE_STRATEGY: &str = "RollingUpdate";

/// Seccomp profile type using the container runtime's default profile
pub const SECCOMP_RUNTIME_DEFAULT: &str = "RuntimeDefault";

/// Seccomp profile type disabling seccomp filtering
pub const SECCOMP_UNCONFINED: &str = "Unconfined";

/// Seccomp profile type loading a profile from the node
pub const SECCOMP_LOCALHOST: &str = "Localhost";

/// Returns true when an optional string field counts as unset.
///
/// The API server treats an empty string the same as an absent field.
pub(crate) fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Fill an optional string field with `default` when it is unset.
pub(crate) fn fill_unset(value: &mut Option<String>, default: &str) {
    if is_unset(value) {
        *value = Some(default.to_string());
    }
}
