//! Translates a task request into an isolated Kubernetes `Job` spec
//! (spec §4.9 step 2).

use std::collections::BTreeMap;
use std::time::Duration;

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{
    Capabilities, Container, EnvVar, HostPathVolumeSource, PodSecurityContext, PodSpec,
    PodTemplateSpec, ResourceRequirements, SeccompProfile, SecurityContext, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::mount::MountGrant;
use crate::TaskMode;

/// Non-root uid every task pod runs as. Arbitrary but fixed, so the
/// toolbox image must not require root.
const TASK_UID: i64 = 65532;

/// Post-finish time-to-live before Kubernetes garbage-collects the Job
/// (spec §4.9 step 2).
const TTL_SECONDS_AFTER_FINISHED: i32 = 300;

fn job_name(task_id: &str) -> String {
    format!("brain-task-{task_id}")
}

fn resource_limits(cpu: &str, memory: &str) -> ResourceRequirements {
    let mut limits = BTreeMap::new();
    limits.insert("cpu".to_string(), Quantity(cpu.to_string()));
    limits.insert("memory".to_string(), Quantity(memory.to_string()));
    ResourceRequirements {
        limits: Some(limits),
        ..Default::default()
    }
}

/// Build the isolated workload spec for one task. `cpu_limit`/`mem_limit`
/// follow Kubernetes quantity syntax (e.g. `"1"`, `"512Mi"`).
#[allow(clippy::too_many_arguments)]
pub fn build_job(
    task_id: &str,
    toolbox: &str,
    mode: TaskMode,
    goal: &str,
    grants: &[MountGrant],
    timeout: Duration,
    cpu_limit: &str,
    mem_limit: &str,
) -> Job {
    let name = job_name(task_id);

    let volumes: Vec<Volume> = grants
        .iter()
        .enumerate()
        .map(|(index, grant)| Volume {
            name: format!("mount-{index}"),
            host_path: Some(HostPathVolumeSource {
                path: grant.path.clone(),
                type_: None,
            }),
            ..Default::default()
        })
        .collect();

    let volume_mounts: Vec<VolumeMount> = grants
        .iter()
        .enumerate()
        .map(|(index, grant)| VolumeMount {
            name: format!("mount-{index}"),
            mount_path: grant.path.clone(),
            read_only: Some(grant.read_only),
            ..Default::default()
        })
        .collect();

    let container = Container {
        name: "task".to_string(),
        image: Some(toolbox.to_string()),
        env: Some(vec![
            EnvVar {
                name: "BRAIN_TASK_MODE".to_string(),
                value: Some(mode.as_str().to_string()),
                ..Default::default()
            },
            EnvVar {
                name: "BRAIN_TASK_GOAL".to_string(),
                value: Some(goal.to_string()),
                ..Default::default()
            },
        ]),
        volume_mounts: Some(volume_mounts),
        resources: Some(resource_limits(cpu_limit, mem_limit)),
        security_context: Some(SecurityContext {
            read_only_root_filesystem: Some(true),
            run_as_non_root: Some(true),
            run_as_user: Some(TASK_UID),
            allow_privilege_escalation: Some(false),
            capabilities: Some(Capabilities {
                drop: Some(vec!["ALL".to_string()]),
                add: None,
            }),
            ..Default::default()
        }),
        ..Default::default()
    };

    let pod_spec = PodSpec {
        containers: vec![container],
        volumes: Some(volumes),
        restart_policy: Some("Never".to_string()),
        security_context: Some(PodSecurityContext {
            run_as_non_root: Some(true),
            run_as_user: Some(TASK_UID),
            seccomp_profile: Some(SeccompProfile {
                type_: "RuntimeDefault".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        active_deadline_seconds: Some(timeout.as_secs() as i64),
        ..Default::default()
    };

    Job {
        metadata: ObjectMeta {
            name: Some(name),
            labels: Some(BTreeMap::from([(
                "app.kubernetes.io/managed-by".to_string(),
                "brain-task".to_string(),
            )])),
            ..Default::default()
        },
        spec: Some(JobSpec {
            backoff_limit: Some(0),
            ttl_seconds_after_finished: Some(TTL_SECONDS_AFTER_FINISHED),
            template: PodTemplateSpec {
                spec: Some(pod_spec),
                ..Default::default()
            },
            ..Default::default()
        }),
        status: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_carries_no_restart_and_ttl() {
        let job = build_job("t1", "image:latest", TaskMode::Script, "goal", &[], Duration::from_secs(60), "1", "512Mi");
        let spec = job.spec.unwrap();
        assert_eq!(spec.backoff_limit, Some(0));
        assert_eq!(spec.ttl_seconds_after_finished, Some(TTL_SECONDS_AFTER_FINISHED));
        assert_eq!(spec.template.spec.unwrap().restart_policy, Some("Never".to_string()));
    }

    #[test]
    fn job_pins_active_deadline_to_the_requested_timeout() {
        let job = build_job("t1", "image:latest", TaskMode::Agent, "goal", &[], Duration::from_secs(1800), "1", "512Mi");
        let pod_spec = job.spec.unwrap().template.spec.unwrap();
        assert_eq!(pod_spec.active_deadline_seconds, Some(1800));
    }

    #[test]
    fn container_drops_all_capabilities_and_uses_readonly_root() {
        let job = build_job("t1", "image:latest", TaskMode::Script, "goal", &[], Duration::from_secs(60), "1", "512Mi");
        let container = &job.spec.unwrap().template.spec.unwrap().containers[0];
        let security = container.security_context.as_ref().unwrap();
        assert_eq!(security.read_only_root_filesystem, Some(true));
        assert_eq!(security.capabilities.as_ref().unwrap().drop, Some(vec!["ALL".to_string()]));
    }

    #[test]
    fn volume_mount_read_only_matches_the_grant() {
        let grants = vec![MountGrant {
            path: "/data".to_string(),
            read_only: false,
        }];
        let job = build_job("t1", "image:latest", TaskMode::Script, "goal", &grants, Duration::from_secs(60), "1", "512Mi");
        let pod_spec = job.spec.unwrap().template.spec.unwrap();
        assert_eq!(pod_spec.containers[0].volume_mounts.as_ref().unwrap()[0].read_only, Some(false));
    }
}
