//! Workload kinds that embed a pod template
//!
//! [`PodTemplateWorkload`] is the one capability the generic wrapper needs:
//! reach the embedded pod spec, and apply whatever top-level defaults the
//! kind has. Deployment, StatefulSet and DaemonSet hold the template one level
//! down; CronJob holds it inside its job template.

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::PodSpec;
use kube::Resource;

use crate::policy::DefaultingPolicy;
use crate::{is_unset, ROLLING_UPDATE_STRATEGY};

/// A workload resource with an embedded pod template.
pub trait PodTemplateWorkload: Resource<DynamicType = ()> + Clone {
    /// The embedded pod spec, if the path to it exists
    fn pod_spec(&self) -> Option<&PodSpec>;

    /// The embedded pod spec, allocating every missing level on the way
    fn pod_spec_mut(&mut self) -> &mut PodSpec;

    /// Apply kind-specific top-level defaults. No-op unless overridden.
    fn apply_kind_defaults(&mut self, _policy: &DefaultingPolicy) {}
}

impl PodTemplateWorkload for Deployment {
    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref()?.template.spec.as_ref()
    }

    fn pod_spec_mut(&mut self) -> &mut PodSpec {
        self.spec
            .get_or_insert_with(Default::default)
            .template
            .spec
            .get_or_insert_with(Default::default)
    }

    /// An unset strategy becomes `RollingUpdate`, with the policy's bounds
    /// when no bounds are given. A set strategy type is left alone even
    /// without bounds.
    fn apply_kind_defaults(&mut self, policy: &DefaultingPolicy) {
        let strategy = self
            .spec
            .get_or_insert_with(Default::default)
            .strategy
            .get_or_insert_with(Default::default);

        if is_unset(&strategy.type_) {
            strategy.type_ = Some(ROLLING_UPDATE_STRATEGY.to_string());
            if strategy.rolling_update.is_none() {
                strategy.rolling_update = Some(policy.rolling_update());
            }
        }
    }
}

impl PodTemplateWorkload for StatefulSet {
    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref()?.template.spec.as_ref()
    }

    fn pod_spec_mut(&mut self) -> &mut PodSpec {
        self.spec
            .get_or_insert_with(Default::default)
            .template
            .spec
            .get_or_insert_with(Default::default)
    }
}

impl PodTemplateWorkload for DaemonSet {
    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref()?.template.spec.as_ref()
    }

    fn pod_spec_mut(&mut self) -> &mut PodSpec {
        self.spec
            .get_or_insert_with(Default::default)
            .template
            .spec
            .get_or_insert_with(Default::default)
    }
}

impl PodTemplateWorkload for CronJob {
    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec
            .as_ref()?
            .job_template
            .spec
            .as_ref()?
            .template
            .spec
            .as_ref()
    }

    fn pod_spec_mut(&mut self) -> &mut PodSpec {
        self.spec
            .get_or_insert_with(Default::default)
            .job_template
            .spec
            .get_or_insert_with(Default::default)
            .template
            .spec
            .get_or_insert_with(Default::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use k8s_openapi::api::apps::v1::{
        DeploymentSpec, DeploymentStrategy, RollingUpdateDeployment,
    };
    use k8s_openapi::api::batch::v1::{CronJobSpec, JobSpec, JobTemplateSpec};
    use k8s_openapi::api::core::v1::{Container, PodTemplateSpec};
    use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
    use rstest::rstest;

    fn pod_spec(container: &str) -> PodSpec {
        PodSpec {
            containers: vec![Container {
                name: container.to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn deployment_with_strategy(strategy: Option<DeploymentStrategy>) -> Deployment {
        Deployment {
            spec: Some(DeploymentSpec {
                strategy,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn strategy_of(deploy: &Deployment) -> DeploymentStrategy {
        deploy
            .spec
            .as_ref()
            .and_then(|s| s.strategy.clone())
            .unwrap()
    }

    #[test]
    fn cron_job_pod_spec_is_two_levels_down() {
        let cron_job = CronJob {
            spec: Some(CronJobSpec {
                schedule: "*/5 * * * *".to_string(),
                job_template: JobTemplateSpec {
                    spec: Some(JobSpec {
                        template: PodTemplateSpec {
                            spec: Some(pod_spec("backup")),
                            ..Default::default()
                        },
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(cron_job.pod_spec(), Some(&pod_spec("backup")));
    }

    #[test]
    fn missing_levels_read_as_none() {
        assert!(Deployment::default().pod_spec().is_none());
        assert!(StatefulSet::default().pod_spec().is_none());
        assert!(DaemonSet::default().pod_spec().is_none());
        assert!(CronJob::default().pod_spec().is_none());

        let no_job_spec = CronJob {
            spec: Some(CronJobSpec::default()),
            ..Default::default()
        };
        assert!(no_job_spec.pod_spec().is_none());
    }

    #[test]
    fn pod_spec_mut_allocates_missing_levels() {
        let mut cron_job = CronJob::default();
        *cron_job.pod_spec_mut() = pod_spec("backup");
        assert_eq!(cron_job.pod_spec(), Some(&pod_spec("backup")));

        let mut daemon_set = DaemonSet::default();
        daemon_set.pod_spec_mut().containers.push(Container {
            name: "agent".to_string(),
            ..Default::default()
        });
        assert_eq!(daemon_set.pod_spec(), Some(&pod_spec("agent")));
    }

    #[test]
    fn unset_strategy_becomes_rolling_update_with_bounds() {
        let mut deploy = deployment_with_strategy(None);
        deploy.apply_kind_defaults(&DefaultingPolicy::default());

        let strategy = strategy_of(&deploy);
        assert_eq!(strategy.type_.as_deref(), Some(ROLLING_UPDATE_STRATEGY));
        let bounds = strategy.rolling_update.unwrap();
        assert_eq!(bounds.max_surge, Some(IntOrString::Int(1)));
        assert_eq!(bounds.max_unavailable, Some(IntOrString::Int(0)));
    }

    #[test]
    fn deployment_without_spec_gets_strategy() {
        let mut deploy = Deployment::default();
        deploy.apply_kind_defaults(&DefaultingPolicy::default());
        assert_eq!(
            strategy_of(&deploy).type_.as_deref(),
            Some(ROLLING_UPDATE_STRATEGY)
        );
    }

    #[test]
    fn unset_type_keeps_given_bounds() {
        let bounds = RollingUpdateDeployment {
            max_surge: Some(IntOrString::String("25%".to_string())),
            max_unavailable: None,
        };
        let mut deploy = deployment_with_strategy(Some(DeploymentStrategy {
            type_: Some(String::new()),
            rolling_update: Some(bounds.clone()),
        }));
        deploy.apply_kind_defaults(&DefaultingPolicy::default());

        let strategy = strategy_of(&deploy);
        assert_eq!(strategy.type_.as_deref(), Some(ROLLING_UPDATE_STRATEGY));
        assert_eq!(strategy.rolling_update, Some(bounds));
    }

    #[rstest]
    #[case::recreate("Recreate")]
    #[case::rolling_update("RollingUpdate")]
    fn set_strategy_type_is_untouched(#[case] type_: &str) {
        let strategy = DeploymentStrategy {
            type_: Some(type_.to_string()),
            rolling_update: None,
        };
        let mut deploy = deployment_with_strategy(Some(strategy.clone()));
        deploy.apply_kind_defaults(&DefaultingPolicy::default());

        assert_eq!(strategy_of(&deploy), strategy);
    }

    #[test]
    fn bounds_come_from_policy() {
        let policy = DefaultingPolicy {
            max_surge: 3,
            max_unavailable: 1,
            ..Default::default()
        };
        let mut deploy = deployment_with_strategy(None);
        deploy.apply_kind_defaults(&policy);

        let bounds = strategy_of(&deploy).rolling_update.unwrap();
        assert_eq!(bounds.max_surge, Some(IntOrString::Int(3)));
        assert_eq!(bounds.max_unavailable, Some(IntOrString::Int(1)));
    }

    #[test]
    fn other_kinds_have_no_top_level_defaults() {
        let mut stateful_set = StatefulSet::default();
        stateful_set.apply_kind_defaults(&DefaultingPolicy::default());
        assert_eq!(stateful_set, StatefulSet::default());

        let mut cron_job = CronJob::default();
        cron_job.apply_kind_defaults(&DefaultingPolicy::default());
        assert_eq!(cron_job, CronJob::default());
    }
}
