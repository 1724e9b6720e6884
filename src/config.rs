//! Picker configuration.

use serde::Deserialize;

use crate::fill::FillType;
use crate::placement::PlacementOptions;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Lock the picker to one fill type; the type switcher is hidden.
    pub mode: Option<FillType>,
    /// Show opacity controls for solid fills.
    pub alpha: bool,
    /// The trigger does not open the panel.
    pub disabled: bool,
    pub placement: PlacementOptions,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            mode: None,
            alpha: true,
            disabled: false,
            placement: PlacementOptions::default(),
        }
    }
}

impl PickerConfig {
    /// Build from string attributes. An unrecognized `mode` leaves the
    /// picker unlocked; `alpha` is on unless it reads `"false"`. A present
    /// `disabled` attribute disables the picker unless it reads `"false"`.
    pub fn from_attributes(
        mode: Option<&str>,
        alpha: Option<&str>,
        disabled: Option<&str>,
    ) -> Self {
        let mode = mode.and_then(|m| m.trim().parse().ok());
        let alpha = alpha.map_or(true, |a| a.trim() != "false");
        let disabled = disabled.is_some_and(|d| d.trim() != "false");
        Self {
            mode,
            alpha,
            disabled,
            ..Self::default()
        }
    }

    pub fn locked(mode: FillType) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn with_alpha(mut self, alpha: bool) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Whether `kind` may be selected under this configuration.
    pub fn allows(&self, kind: FillType) -> bool {
        self.mode.map_or(true, |locked| locked == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_attributes() {
        let config = PickerConfig::from_attributes(Some("gradient"), None, None);
        assert_eq!(config.mode, Some(FillType::Gradient));
        assert!(config.alpha);
        assert!(!config.disabled);
        assert!(!config.allows(FillType::Solid));

        let config = PickerConfig::from_attributes(Some("plaid"), Some("false"), Some(""));
        assert_eq!(config.mode, None);
        assert!(!config.alpha);
        assert!(config.disabled);
        assert!(config.allows(FillType::Webcam));

        let config = PickerConfig::from_attributes(None, None, Some("false"));
        assert!(!config.disabled);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: PickerConfig =
            serde_json::from_str(r#"{"mode":"video","placement":{"viewportPadding":4}}"#)
                .unwrap();
        assert_eq!(config.mode, Some(FillType::Video));
        assert!(config.alpha);
        assert!(!config.disabled);
        assert_eq!(config.placement.viewport_padding, 4.0);
        assert_eq!(config.placement.padding, 8.0);
    }
}
