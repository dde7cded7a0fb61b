//! Account plans and the operations each one offers

use serde::{Deserialize, Serialize};

use crate::errors::{EmoPlatformError, Result};
use crate::impl_domain_status_conversions;

/// Account tier a client is created for.
///
/// Business plans authenticate every request with an additional API key
/// header and expose broadcast messaging instead of account deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Personal,
    BizBasic,
    BizAdvanced,
}

impl_domain_status_conversions!(Plan {
    Personal => "personal",
    BizBasic => "biz_basic",
    BizAdvanced => "biz_advanced",
});

/// Operations whose availability depends on the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    DeleteAccount,
    ChangeAccount,
    Broadcast,
    MotionsList,
    Webhook,
    SensorValues,
    OriginalMotion,
    LedColor,
    MoveTo,
    PresetMotion,
}

impl Feature {
    /// Client method name reported in [`EmoPlatformError::Unavailable`].
    pub const fn operation(self) -> &'static str {
        match self {
            Self::DeleteAccount => "delete_account_info",
            Self::ChangeAccount => "change_account_info",
            Self::Broadcast => "broadcast_messages",
            Self::MotionsList => "get_motions_list",
            Self::Webhook => "webhook",
            Self::SensorValues => "get_sensor_values",
            Self::OriginalMotion => "send_original_motion",
            Self::LedColor => "change_led_color",
            Self::MoveTo => "move_to",
            Self::PresetMotion => "send_motion",
        }
    }
}

impl Plan {
    /// Human-readable plan name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::BizBasic => "Business Basic",
            Self::BizAdvanced => "Business Advanced",
        }
    }

    pub const fn is_business(self) -> bool {
        matches!(self, Self::BizBasic | Self::BizAdvanced)
    }

    pub const fn supports(self, feature: Feature) -> bool {
        match (self, feature) {
            (Self::Personal, Feature::ChangeAccount | Feature::Broadcast)
            | (Self::BizBasic | Self::BizAdvanced, Feature::DeleteAccount)
            | (
                Self::BizBasic,
                Feature::MotionsList
                | Feature::Webhook
                | Feature::SensorValues
                | Feature::OriginalMotion
                | Feature::LedColor
                | Feature::MoveTo
                | Feature::PresetMotion,
            ) => false,
            _ => true,
        }
    }

    /// Fail with [`EmoPlatformError::Unavailable`] when the plan lacks `feature`.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` naming this plan and the feature's operation.
    pub fn ensure(self, feature: Feature) -> Result<()> {
        if self.supports(feature) {
            Ok(())
        } else {
            Err(EmoPlatformError::Unavailable { plan: self, operation: feature.operation().to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn personal_plan_has_no_business_operations() {
        assert!(Plan::Personal.supports(Feature::DeleteAccount));
        assert!(Plan::Personal.supports(Feature::Webhook));
        assert!(!Plan::Personal.supports(Feature::Broadcast));
        assert!(!Plan::Personal.supports(Feature::ChangeAccount));
    }

    #[test]
    fn biz_basic_rejects_device_control() {
        for feature in [
            Feature::MotionsList,
            Feature::Webhook,
            Feature::SensorValues,
            Feature::OriginalMotion,
            Feature::LedColor,
            Feature::MoveTo,
            Feature::PresetMotion,
            Feature::DeleteAccount,
        ] {
            let err = Plan::BizBasic.ensure(feature).unwrap_err();
            assert!(matches!(err, EmoPlatformError::Unavailable { plan: Plan::BizBasic, .. }));
        }
        assert!(Plan::BizBasic.ensure(Feature::Broadcast).is_ok());
    }

    #[test]
    fn biz_advanced_only_lacks_account_deletion() {
        assert!(Plan::BizAdvanced.ensure(Feature::MoveTo).is_ok());
        assert!(Plan::BizAdvanced.ensure(Feature::Webhook).is_ok());
        assert!(Plan::BizAdvanced.ensure(Feature::DeleteAccount).is_err());
    }

    #[test]
    fn plan_string_forms() {
        assert_eq!(Plan::from_str("BIZ_ADVANCED").unwrap(), Plan::BizAdvanced);
        assert_eq!(Plan::BizBasic.to_string(), "biz_basic");
        assert_eq!(serde_json::to_string(&Plan::BizBasic).unwrap(), "\"biz_basic\"");
        assert_eq!(Plan::default(), Plan::Personal);
    }
}
