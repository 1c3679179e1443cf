#![forbid(unsafe_code)]

//! Declarative settings for simulated coordinators.
//!
//! [`DndConfig`] captures the timing and suppression knobs of a
//! [`SimulatedDnd`] so they can be loaded from TOML or JSON at startup.
//!
//! ```toml
//! modality = "touch"
//! delay_ms = 150
//! drag_interval_ms = 50
//! over_interval_ms = 50
//!
//! [suppress]
//! events = ["click", "contextmenu", "mouseover"]
//! prevent_default = true
//! stop_propagation = true
//! stop_immediate_propagation = true
//! ```
//!
//! ```rust,ignore
//! let config = DndConfig::from_toml_file("dnd.toml")?;
//! let dnd = SimulatedDnd::from_config(container, options, &config)?;
//! ```
//!
//! # Defaults
//!
//! `DndConfig::default()` reproduces the built-in constants exactly, so a
//! coordinator built from it behaves like one built with
//! [`SimulatedSettings::default`].

#[cfg(feature = "config")]
use std::path::Path;

use core::fmt;
use core::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use dndkit_core::dom::NodeId;
use dndkit_core::event::EventKind;

use crate::coordinator::{DEFAULT_EMIT_INTERVAL, DndOptions, SimulatedDnd, SimulatedSettings};
use crate::simulator::{DEFAULT_TOUCH_DELAY, Modality};
use crate::suppress::{DEFAULT_SUPPRESSED_KINDS, EventSuppressor, SuppressBehavior};

/// Interval ceiling accepted by [`DndConfig::validate`].
const MAX_INTERVAL_MS: u64 = 10_000;

// ---------------------------------------------------------------------------
// DndConfig
// ---------------------------------------------------------------------------

/// Settings for a simulated coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DndConfig {
    /// Raw input driving the gesture.
    pub modality: Modality,
    /// Touch hold delay before a gesture may start (default: 100).
    pub delay_ms: u64,
    /// Period of synthesized `drag` events (default: 50).
    pub drag_interval_ms: u64,
    /// Period of synthesized `drag:over` events (default: 50).
    pub over_interval_ms: u64,
    /// Event suppression while dragging.
    pub suppress: SuppressConfig,
}

impl Default for DndConfig {
    fn default() -> Self {
        Self {
            modality: Modality::Mouse,
            delay_ms: whole_millis(DEFAULT_TOUCH_DELAY),
            drag_interval_ms: whole_millis(DEFAULT_EMIT_INTERVAL),
            over_interval_ms: whole_millis(DEFAULT_EMIT_INTERVAL),
            suppress: SuppressConfig::default(),
        }
    }
}

fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Which events are suppressed and how.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SuppressConfig {
    /// DOM event type names.
    pub events: Vec<String>,
    pub prevent_default: bool,
    pub stop_propagation: bool,
    pub stop_immediate_propagation: bool,
}

impl Default for SuppressConfig {
    fn default() -> Self {
        Self {
            events: DEFAULT_SUPPRESSED_KINDS
                .iter()
                .map(|k| k.name().to_owned())
                .collect(),
            prevent_default: true,
            stop_propagation: true,
            stop_immediate_propagation: true,
        }
    }
}

impl SuppressConfig {
    #[must_use]
    pub fn behavior(&self) -> SuppressBehavior {
        let mut behavior = SuppressBehavior::empty();
        behavior.set(SuppressBehavior::PREVENT_DEFAULT, self.prevent_default);
        behavior.set(SuppressBehavior::STOP_PROPAGATION, self.stop_propagation);
        behavior.set(
            SuppressBehavior::STOP_IMMEDIATE_PROPAGATION,
            self.stop_immediate_propagation,
        );
        behavior
    }

    /// Parse the configured event names.
    pub fn kinds(&self) -> Result<Vec<EventKind>, ConfigError> {
        let mut unknown = Vec::new();
        let mut kinds = Vec::with_capacity(self.events.len());
        for name in &self.events {
            match name.parse::<EventKind>() {
                Ok(kind) => kinds.push(kind),
                Err(err) => unknown.push(err.to_string()),
            }
        }
        if unknown.is_empty() {
            Ok(kinds)
        } else {
            Err(ConfigError::Validation(unknown))
        }
    }
}

impl DndConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to pretty TOML.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSer)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, value) in [
            ("drag_interval_ms", self.drag_interval_ms),
            ("over_interval_ms", self.over_interval_ms),
        ] {
            if value == 0 || value > MAX_INTERVAL_MS {
                errors.push(format!(
                    "{name} must be in 1..={MAX_INTERVAL_MS}, got {value}"
                ));
            }
        }

        if self.delay_ms > MAX_INTERVAL_MS {
            errors.push(format!(
                "delay_ms must be <= {MAX_INTERVAL_MS}, got {}",
                self.delay_ms
            ));
        }

        if let Err(ConfigError::Validation(unknown)) = self.suppress.kinds() {
            for msg in unknown {
                errors.push(format!("suppress.events: {msg}"));
            }
        }

        errors
    }

    /// Convert into coordinator settings, rejecting invalid values.
    pub fn to_settings(&self) -> Result<SimulatedSettings, ConfigError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }
        let kinds = self.suppress.kinds()?;
        Ok(SimulatedSettings {
            modality: self.modality,
            delay: Duration::from_millis(self.delay_ms),
            drag_interval: Duration::from_millis(self.drag_interval_ms),
            over_interval: Duration::from_millis(self.over_interval_ms),
            suppressor: EventSuppressor::new(kinds, self.suppress.behavior()),
        })
    }
}

impl SimulatedDnd {
    /// Build a coordinator from declarative settings.
    pub fn from_config(
        container: NodeId,
        options: DndOptions,
        config: &DndConfig,
    ) -> Result<Self, ConfigError> {
        let settings = config.to_settings()?;
        tracing::debug!(
            modality = ?settings.modality,
            delay_ms = config.delay_ms,
            "simulated coordinator configured"
        );
        Ok(Self::new(container, options, settings))
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from loading or applying a [`DndConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "config")]
    TomlSer(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::TomlSer(e) => write!(f, "TOML serialize error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::TomlSer(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
