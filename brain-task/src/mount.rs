//! Mount request validation (spec §4.9 step 1 and 3).

use crate::error::TaskError;

/// One requested bind mount. `write`/`delete` default to `false`, which
/// grants a read-only volume.
#[derive(Debug, Clone)]
pub struct MountRequest {
    /// Host-side path, checked against the allowlist.
    pub path: String,
    /// Whether the task may write to this mount.
    pub write: bool,
    /// Whether the task may delete within this mount.
    pub delete: bool,
}

impl MountRequest {
    /// A read-only mount request.
    pub fn read_only(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            write: false,
            delete: false,
        }
    }
}

/// A validated mount, ready to become a volume in the workload spec.
#[derive(Debug, Clone)]
pub struct MountGrant {
    /// The path being mounted.
    pub path: String,
    /// `true` unless the request asked for write or delete access.
    pub read_only: bool,
}

/// Validate every requested mount against `allowlist`. An empty allowlist
/// denies all mounts, including an empty request list against an empty
/// allowlist is trivially fine (produces no grants).
pub fn validate_mounts(requested: &[MountRequest], allowlist: &[String]) -> Result<Vec<MountGrant>, TaskError> {
    requested
        .iter()
        .map(|request| {
            if allowlist.iter().any(|allowed| allowed == &request.path) {
                Ok(MountGrant {
                    path: request.path.clone(),
                    read_only: !(request.write || request.delete),
                })
            } else {
                Err(TaskError::MountDenied(request.path.clone()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allowlist_denies_any_mount() {
        let requested = vec![MountRequest::read_only("/data")];
        assert!(validate_mounts(&requested, &[]).is_err());
    }

    #[test]
    fn allowed_path_without_write_or_delete_is_read_only() {
        let requested = vec![MountRequest::read_only("/data")];
        let allowlist = vec!["/data".to_string()];
        let grants = validate_mounts(&requested, &allowlist).unwrap();
        assert!(grants[0].read_only);
    }

    #[test]
    fn write_flag_grants_a_writable_mount() {
        let requested = vec![MountRequest {
            path: "/data".into(),
            write: true,
            delete: false,
        }];
        let allowlist = vec!["/data".to_string()];
        let grants = validate_mounts(&requested, &allowlist).unwrap();
        assert!(!grants[0].read_only);
    }

    #[test]
    fn disallowed_path_is_rejected_even_with_other_allowed_mounts() {
        let requested = vec![MountRequest::read_only("/etc/secrets")];
        let allowlist = vec!["/data".to_string()];
        assert!(validate_mounts(&requested, &allowlist).is_err());
    }
}
