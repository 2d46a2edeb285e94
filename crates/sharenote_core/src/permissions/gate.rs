use crate::model::identity::{Identity, Role};
use crate::permissions::feature::Feature;
use crate::permissions::settings::{AppSettings, SharedSettings};

/// Answers whether a feature is available to an identity.
pub trait PermissionGate {
    fn is_feature_enabled(&self, identity: &Identity, feature: Feature) -> bool;
}

/// Applies the gating rules to one settings value.
///
/// 1. An installation-wide switch that is off closes the feature for every role.
/// 2. Admins are otherwise always allowed.
/// 3. Users follow the default permissions document.
pub fn feature_enabled(settings: &AppSettings, role: Role, feature: Feature) -> bool {
    match feature {
        Feature::Notes => {
            if !settings.enable_notes {
                return false;
            }
            match role {
                Role::Admin => true,
                Role::User => settings.user_permissions.features.notes,
            }
        }
    }
}

impl PermissionGate for SharedSettings {
    fn is_feature_enabled(&self, identity: &Identity, feature: Feature) -> bool {
        self.with(|settings| feature_enabled(settings, identity.role, feature))
    }
}

impl PermissionGate for AppSettings {
    fn is_feature_enabled(&self, identity: &Identity, feature: Feature) -> bool {
        feature_enabled(self, identity.role, feature)
    }
}
