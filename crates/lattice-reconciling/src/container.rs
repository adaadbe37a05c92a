//! Container defaulting
//!
//! Fills the container fields the API server defaults, so a freshly built
//! container compares equal to the persisted one.

use k8s_openapi::api::core::v1::Container;

use crate::{
    fill_unset, FIELD_REF_API_VERSION, PULL_IF_NOT_PRESENT, TERMINATION_MESSAGE_PATH_DEFAULT,
    TERMINATION_MESSAGE_READ_FILE,
};

/// Default a single container in place.
///
/// `proc_mount` is the value this container had in the previous revision. It
/// is written to the security context unconditionally, including `None`:
/// `procMount` has no platform-wide default, so the previous revision is the
/// only source for it. Containers without a security context are left
/// without one.
pub fn default_container(container: &mut Container, proc_mount: Option<&str>) {
    fill_unset(&mut container.image_pull_policy, PULL_IF_NOT_PRESENT);
    fill_unset(
        &mut container.termination_message_path,
        TERMINATION_MESSAGE_PATH_DEFAULT,
    );
    fill_unset(
        &mut container.termination_message_policy,
        TERMINATION_MESSAGE_READ_FILE,
    );

    for var in container.env.iter_mut().flatten() {
        if let Some(field_ref) = var.value_from.as_mut().and_then(|src| src.field_ref.as_mut()) {
            fill_unset(&mut field_ref.api_version, FIELD_REF_API_VERSION);
        }
    }

    if let Some(security_context) = container.security_context.as_mut() {
        security_context.proc_mount = proc_mount.map(str::to_string);
    }
}
