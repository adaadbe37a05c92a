//! Pod spec defaulting
//!
//! Defaults every container of a pod spec, carries `procMount` values over
//! from the previous revision, fills volume file modes and injects the
//! pod-level seccomp profile from the [`DefaultingPolicy`].
//!
//! Reconcilers usually replace the whole pod spec, so `procMount` values are
//! correlated by container name against the previous revision rather than
//! read from the new spec. Init containers and main containers are looked up
//! separately.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Container, PodSecurityContext, PodSpec};
use tracing::trace;

use crate::container::default_container;
use crate::error::DefaultingError;
use crate::policy::DefaultingPolicy;
use crate::{CONFIG_MAP_VOLUME_DEFAULT_MODE, SECRET_VOLUME_DEFAULT_MODE};

/// `procMount` per container name, for containers with a security context
type ProcMounts<'a> = BTreeMap<&'a str, Option<&'a str>>;

/// Default `new` against the previous revision `old`.
///
/// Takes ownership of the new spec and returns it defaulted. The error is
/// reserved for field combinations the platform would reject; no such check
/// currently fails.
pub fn default_pod_spec(
    old: &PodSpec,
    mut new: PodSpec,
    policy: &DefaultingPolicy,
) -> Result<PodSpec, DefaultingError> {
    let init_proc_mounts = proc_mounts(old.init_containers.iter().flatten());
    let proc_mounts = proc_mounts(old.containers.iter());

    for container in new.init_containers.iter_mut().flatten() {
        default_with_inherited(container, &init_proc_mounts);
    }
    for container in new.containers.iter_mut() {
        default_with_inherited(container, &proc_mounts);
    }

    for volume in new.volumes.iter_mut().flatten() {
        if let Some(secret) = volume.secret.as_mut() {
            secret.default_mode.get_or_insert(SECRET_VOLUME_DEFAULT_MODE);
        }
        if let Some(config_map) = volume.config_map.as_mut() {
            config_map
                .default_mode
                .get_or_insert(CONFIG_MAP_VOLUME_DEFAULT_MODE);
        }
    }

    let security_context = new
        .security_context
        .get_or_insert_with(PodSecurityContext::default);
    if security_context.seccomp_profile.is_none() {
        security_context.seccomp_profile = Some(policy.seccomp_profile.clone());
    }

    Ok(new)
}

fn proc_mounts<'a>(containers: impl Iterator<Item = &'a Container>) -> ProcMounts<'a> {
    containers
        .filter_map(|c| {
            c.security_context
                .as_ref()
                .map(|sc| (c.name.as_str(), sc.proc_mount.as_deref()))
        })
        .collect()
}

fn default_with_inherited(container: &mut Container, inherited: &ProcMounts<'_>) {
    let proc_mount = inherited.get(container.name.as_str()).copied().flatten();
    if let Some(proc_mount) = proc_mount {
        trace!(container = %container.name, proc_mount, "carrying procMount from previous revision");
    }
    default_container(container, proc_mount);
}
