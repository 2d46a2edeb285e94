use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Feature toggles applied to the `user` role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturePermissions {
    pub notes: bool,
}

impl Default for FeaturePermissions {
    fn default() -> Self {
        Self { notes: true }
    }
}

/// Default permissions document for non-admin users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPermissions {
    pub features: FeaturePermissions,
}

/// Installation settings that may change while the process runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Installation-wide switch for notes, independent of role.
    pub enable_notes: bool,
    pub user_permissions: UserPermissions,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            enable_notes: true,
            user_permissions: UserPermissions::default(),
        }
    }
}

/// Process-wide handle to [`AppSettings`].
///
/// Clones share the same underlying settings. Readers always observe the
/// latest completed write.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<AppSettings>>,
}

impl SharedSettings {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> AppSettings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the settings wholesale; returns the previous value.
    pub fn replace(&self, settings: AppSettings) -> AppSettings {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, settings)
    }

    /// Applies an in-place edit under the write lock.
    pub fn update(&self, edit: impl FnOnce(&mut AppSettings)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        edit(&mut guard);
    }

    pub(crate) fn with<T>(&self, read: impl FnOnce(&AppSettings) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        read(&guard)
    }
}
