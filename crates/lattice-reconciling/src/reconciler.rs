//! Reconciler wrappers
//!
//! A reconciler turns the current object into the desired one. Wrapping it
//! with [`Defaulter::wrap`] yields a function of the same shape that also
//! applies server-side defaults to the result, so the wrapped reconciler can
//! be dropped in wherever the plain one was used.
//!
//! Errors from the inner reconciler are returned unchanged and skip
//! defaulting entirely.

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::PodSpec;
use kube::ResourceExt;
use tracing::debug;

use crate::error::DefaultingError;
use crate::pod_spec::default_pod_spec;
use crate::policy::DefaultingPolicy;
use crate::workload::PodTemplateWorkload;

/// A boxed reconciler for objects of kind `K`
pub type Reconciler<K, E> = Box<dyn Fn(K) -> Result<K, E> + Send + Sync>;

/// Reconciler for Deployments
pub type DeploymentReconciler<E> = Reconciler<Deployment, E>;

/// Reconciler for StatefulSets
pub type StatefulSetReconciler<E> = Reconciler<StatefulSet, E>;

/// Reconciler for DaemonSets
pub type DaemonSetReconciler<E> = Reconciler<DaemonSet, E>;

/// Reconciler for CronJobs
pub type CronJobReconciler<E> = Reconciler<CronJob, E>;

/// Applies server-side defaults to workloads under a [`DefaultingPolicy`].
#[derive(Clone, Debug, Default)]
pub struct Defaulter {
    policy: DefaultingPolicy,
}

impl Defaulter {
    /// Create a defaulter, rejecting policies the API server would refuse.
    pub fn new(policy: DefaultingPolicy) -> Result<Self, DefaultingError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// The policy in effect
    pub fn policy(&self) -> &DefaultingPolicy {
        &self.policy
    }

    /// Default `new` against the previous revision `old`.
    ///
    /// Applies the kind's top-level defaults, then defaults the embedded pod
    /// spec. A missing pod spec on `old` counts as empty.
    pub fn default_workload<K: PodTemplateWorkload>(
        &self,
        old: &K,
        mut new: K,
    ) -> Result<K, DefaultingError> {
        new.apply_kind_defaults(&self.policy);

        let empty = PodSpec::default();
        let old_spec = old.pod_spec().unwrap_or(&empty);
        let new_spec = std::mem::take(new.pod_spec_mut());
        *new.pod_spec_mut() = default_pod_spec(old_spec, new_spec, &self.policy)?;

        debug!(
            kind = %K::kind(&()),
            name = %new.name_any(),
            "applied workload defaults"
        );
        Ok(new)
    }

    /// Wrap a reconciler so its result gets defaulted.
    ///
    /// The input object is cloned before the reconciler runs; the clone is
    /// the baseline that `procMount` values are carried over from.
    pub fn wrap<K, E, F>(&self, reconciler: F) -> impl Fn(K) -> Result<K, E>
    where
        K: PodTemplateWorkload,
        E: From<DefaultingError>,
        F: Fn(K) -> Result<K, E>,
    {
        let defaulter = self.clone();
        move |obj: K| {
            let old = obj.clone();
            let new = reconciler(obj).map_err(|e| {
                debug!(
                    kind = %K::kind(&()),
                    name = %old.name_any(),
                    "reconciler failed, skipping defaults"
                );
                e
            })?;
            defaulter.default_workload(&old, new).map_err(E::from)
        }
    }
}

/// Wrap a reconciler for any workload kind with the default policy.
pub fn defaulted<K, E, F>(reconciler: F) -> Reconciler<K, E>
where
    K: PodTemplateWorkload + 'static,
    E: From<DefaultingError> + 'static,
    F: Fn(K) -> Result<K, E> + Send + Sync + 'static,
{
    Box::new(Defaulter::default().wrap(reconciler))
}

/// Wrap a Deployment reconciler with the default policy.
///
/// Besides pod spec defaults, an unset rollout strategy becomes
/// `RollingUpdate` with maxSurge 1 and maxUnavailable 0.
pub fn default_deployment<E, F>(reconciler: F) -> DeploymentReconciler<E>
where
    E: From<DefaultingError> + 'static,
    F: Fn(Deployment) -> Result<Deployment, E> + Send + Sync + 'static,
{
    defaulted(reconciler)
}

/// Wrap a StatefulSet reconciler with the default policy.
pub fn default_stateful_set<E, F>(reconciler: F) -> StatefulSetReconciler<E>
where
    E: From<DefaultingError> + 'static,
    F: Fn(StatefulSet) -> Result<StatefulSet, E> + Send + Sync + 'static,
{
    defaulted(reconciler)
}

/// Wrap a DaemonSet reconciler with the default policy.
pub fn default_daemon_set<E, F>(reconciler: F) -> DaemonSetReconciler<E>
where
    E: From<DefaultingError> + 'static,
    F: Fn(DaemonSet) -> Result<DaemonSet, E> + Send + Sync + 'static,
{
    defaulted(reconciler)
}

/// Wrap a CronJob reconciler with the default policy.
pub fn default_cron_job<E, F>(reconciler: F) -> CronJobReconciler<E>
where
    E: From<DefaultingError> + 'static,
    F: Fn(CronJob) -> Result<CronJob, E> + Send + Sync + 'static,
{
    defaulted(reconciler)
}
