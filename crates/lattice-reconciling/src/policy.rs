//! Defaulting policy
//!
//! Values the defaulting layer injects beyond plain API-server parity: the
//! pod-level seccomp profile and the rolling-update bounds given to
//! Deployments without a strategy. Everything else the layer fills in is
//! dictated by the platform and not configurable.
//!
//! A policy can be built in code, deserialized with serde, or loaded from
//! YAML:
//!
//! ```yaml
//! seccompProfile:
//!   type: RuntimeDefault
//! maxSurge: 1
//! maxUnavailable: 0
//! ```

use k8s_openapi::api::apps::v1::RollingUpdateDeployment;
use k8s_openapi::api::core::v1::SeccompProfile;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::{Deserialize, Serialize};

use crate::error::DefaultingError;
use crate::yaml::parse_yaml;
use crate::{SECCOMP_LOCALHOST, SECCOMP_RUNTIME_DEFAULT, SECCOMP_UNCONFINED};

/// Values injected into workloads that do not set them
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefaultingPolicy {
    /// Pod-level seccomp profile for pod specs without one
    pub seccomp_profile: SeccompProfile,
    /// Absolute maxSurge for Deployments without a strategy
    pub max_surge: i32,
    /// Absolute maxUnavailable for Deployments without a strategy
    pub max_unavailable: i32,
}

impl Default for DefaultingPolicy {
    fn default() -> Self {
        Self {
            seccomp_profile: SeccompProfile {
                type_: SECCOMP_RUNTIME_DEFAULT.to_string(),
                localhost_profile: None,
            },
            max_surge: 1,
            max_unavailable: 0,
        }
    }
}

impl DefaultingPolicy {
    /// Load and validate a policy from a YAML document.
    ///
    /// Missing fields keep their defaults; an empty document yields the
    /// default policy.
    pub fn from_yaml(input: &str) -> Result<Self, DefaultingError> {
        let value = parse_yaml(input)?;
        let policy = if value.is_null() {
            Self::default()
        } else {
            serde_json::from_value(value)
                .map_err(|e| DefaultingError::invalid_policy(e.to_string()))?
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check the policy against the combinations the API server accepts.
    pub fn validate(&self) -> Result<(), DefaultingError> {
        if self.max_surge < 0 {
            return Err(DefaultingError::rejected(
                "maxSurge",
                "must be greater than or equal to 0",
            ));
        }
        if self.max_unavailable < 0 {
            return Err(DefaultingError::rejected(
                "maxUnavailable",
                "must be greater than or equal to 0",
            ));
        }
        if self.max_surge == 0 && self.max_unavailable == 0 {
            return Err(DefaultingError::rejected(
                "maxUnavailable",
                "may not be 0 when maxSurge is 0",
            ));
        }

        let profile = &self.seccomp_profile;
        let has_localhost_profile = !crate::is_unset(&profile.localhost_profile);
        match profile.type_.as_str() {
            SECCOMP_LOCALHOST if !has_localhost_profile => Err(DefaultingError::rejected(
                "seccompProfile.localhostProfile",
                "must be set when seccomp type is Localhost",
            )),
            SECCOMP_LOCALHOST => Ok(()),
            SECCOMP_RUNTIME_DEFAULT | SECCOMP_UNCONFINED if has_localhost_profile => {
                Err(DefaultingError::rejected(
                    "seccompProfile.localhostProfile",
                    "can only be set when seccomp type is Localhost",
                ))
            }
            SECCOMP_RUNTIME_DEFAULT | SECCOMP_UNCONFINED => Ok(()),
            other => Err(DefaultingError::rejected(
                "seccompProfile.type",
                format!(
                    "unsupported value {:?}, expected one of {}, {}, {}",
                    other, SECCOMP_RUNTIME_DEFAULT, SECCOMP_UNCONFINED, SECCOMP_LOCALHOST
                ),
            )),
        }
    }

    /// Rolling-update bounds for a Deployment without a strategy
    pub fn rolling_update(&self) -> RollingUpdateDeployment {
        RollingUpdateDeployment {
            max_surge: Some(IntOrString::Int(self.max_surge)),
            max_unavailable: Some(IntOrString::Int(self.max_unavailable)),
        }
    }
}
