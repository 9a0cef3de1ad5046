//! Runtime permission checks consumed by the controller.

use std::collections::HashSet;
use std::sync::RwLock;

/// Runtime permissions the controller requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Permission {
    Camera,
    RecordAudio,
    WriteStorage,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Camera => write!(f, "camera"),
            Permission::RecordAudio => write!(f, "record_audio"),
            Permission::WriteStorage => write!(f, "write_storage"),
        }
    }
}

/// Permissions checked before any hardware is touched.
pub const REQUIRED_PERMISSIONS: [Permission; 3] = [
    Permission::Camera,
    Permission::RecordAudio,
    Permission::WriteStorage,
];

/// Permission status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PermissionStatus {
    /// Permission granted
    Granted,
    /// Permission denied
    Denied,
    /// Permission not determined (user hasn't been asked yet)
    NotDetermined,
    /// Permission restricted (parental controls, etc)
    Restricted,
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::NotDetermined => write!(f, "not_determined"),
            PermissionStatus::Restricted => write!(f, "restricted"),
        }
    }
}

/// Source of truth for runtime permissions (OS prompt state lives outside).
pub trait PermissionChecker: Send + Sync {
    fn status(&self, permission: Permission) -> PermissionStatus;

    fn has_all(&self, required: &[Permission]) -> bool {
        required
            .iter()
            .all(|p| self.status(*p) == PermissionStatus::Granted)
    }

    /// Permissions from `required` that are not granted, in order.
    fn missing(&self, required: &[Permission]) -> Vec<Permission> {
        required
            .iter()
            .copied()
            .filter(|p| self.status(*p) != PermissionStatus::Granted)
            .collect()
    }
}

/// Checker backed by an in-memory granted set; the UI updates it after
/// its own prompts complete.
#[derive(Debug, Default)]
pub struct StaticPermissions {
    granted: RwLock<HashSet<Permission>>,
}

impl StaticPermissions {
    pub fn all_granted() -> Self {
        Self::with(&REQUIRED_PERMISSIONS)
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(granted: &[Permission]) -> Self {
        Self {
            granted: RwLock::new(granted.iter().copied().collect()),
        }
    }

    pub fn grant(&self, permission: Permission) {
        if let Ok(mut g) = self.granted.write() {
            g.insert(permission);
        }
    }

    pub fn revoke(&self, permission: Permission) {
        if let Ok(mut g) = self.granted.write() {
            g.remove(&permission);
        }
    }
}

impl PermissionChecker for StaticPermissions {
    fn status(&self, permission: Permission) -> PermissionStatus {
        match self.granted.read() {
            Ok(g) if g.contains(&permission) => PermissionStatus::Granted,
            Ok(_) => PermissionStatus::Denied,
            Err(_) => PermissionStatus::NotDetermined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_granted() {
        let checker = StaticPermissions::all_granted();
        assert!(checker.has_all(&REQUIRED_PERMISSIONS));
        assert!(checker.missing(&REQUIRED_PERMISSIONS).is_empty());
    }

    #[test]
    fn test_missing_preserves_order() {
        let checker = StaticPermissions::with(&[Permission::RecordAudio]);
        assert!(!checker.has_all(&REQUIRED_PERMISSIONS));
        assert_eq!(
            checker.missing(&REQUIRED_PERMISSIONS),
            vec![Permission::Camera, Permission::WriteStorage]
        );
    }

    #[test]
    fn test_grant_and_revoke() {
        let checker = StaticPermissions::none();
        assert_eq!(checker.status(Permission::Camera), PermissionStatus::Denied);
        checker.grant(Permission::Camera);
        assert_eq!(checker.status(Permission::Camera), PermissionStatus::Granted);
        checker.revoke(Permission::Camera);
        assert_eq!(checker.status(Permission::Camera), PermissionStatus::Denied);
    }
}
