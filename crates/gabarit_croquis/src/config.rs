//! Scope engine configuration.
//!
//! [`ScopeOptions`] holds the plain, serializable knobs. [`ScopeConfig`]
//! adds the descriptor providers and is shared read-only (behind an `Arc`)
//! by every scope of every render.

use std::fmt;
use std::sync::Arc;

use gabarit_carton::{CaseSensitivity, MapLayout};
use serde::{Deserialize, Serialize};

use crate::object::ObjectDescriptorProvider;
use crate::value::UndefinedBinding;

/// Default layout of block parameters and context data.
///
/// Any eight keys fit regardless of how their hashes collide.
pub const DEFAULT_DATA_LAYOUT: MapLayout = MapLayout::new(16, 8);

/// Layout of the per-scope helper extension slots
pub const EXTENSIONS_LAYOUT: MapLayout = MapLayout::new(8, 7);

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Layout cannot be probed
    #[error("invalid data layout: capacity {capacity}, max probe {max_probe}")]
    InvalidLayout { capacity: usize, max_probe: usize },

    /// Layout cannot even hold the bindings every scope makes
    #[error("data layout probe depth {max_probe} is below the {required} slots every scope binds")]
    LayoutTooSmall { max_probe: usize, required: usize },
}

/// Serializable scope options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeOptions {
    /// Layout shared by block parameters, root data and context data
    pub data_layout: MapLayout,
    /// Case policy of data and block-parameter names
    pub data_case: CaseSensitivity,
    /// Case policy of inline partial names
    pub partial_case: CaseSensitivity,
    /// Text rendered for unresolved bindings, `{0}` standing for the name
    pub undefined_format: Option<String>,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            data_layout: DEFAULT_DATA_LAYOUT,
            data_case: CaseSensitivity::Sensitive,
            partial_case: CaseSensitivity::Insensitive,
            undefined_format: None,
        }
    }
}

impl ScopeOptions {
    /// Check the layout before any scope is built from it
    pub fn validate(&self) -> Result<(), ConfigError> {
        let MapLayout {
            capacity,
            max_probe,
        } = self.data_layout;

        if capacity == 0 || max_probe == 0 || max_probe > capacity {
            return Err(ConfigError::InvalidLayout {
                capacity,
                max_probe,
            });
        }

        // @root and @parent are bound in every scope
        let required = 2;
        if max_probe < required {
            return Err(ConfigError::LayoutTooSmall {
                max_probe,
                required,
            });
        }

        Ok(())
    }
}

/// Shared configuration of the scope engine.
///
/// Options are only reachable through [`ScopeConfig::from_options`] or the
/// defaults, so every config has a usable layout.
#[derive(Clone, Default)]
pub struct ScopeConfig {
    options: ScopeOptions,
    descriptor_providers: Vec<Arc<dyn ObjectDescriptorProvider>>,
}

impl ScopeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from validated options
    pub fn from_options(options: ScopeOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            options,
            descriptor_providers: Vec::new(),
        })
    }

    #[inline]
    pub fn options(&self) -> &ScopeOptions {
        &self.options
    }

    /// Add a descriptor provider, consulted before the built-in classifier
    pub fn with_descriptor_provider(mut self, provider: Arc<dyn ObjectDescriptorProvider>) -> Self {
        self.descriptor_providers.push(provider);
        self
    }

    /// Providers in consultation order
    #[inline]
    pub fn descriptor_providers(&self) -> &[Arc<dyn ObjectDescriptorProvider>] {
        &self.descriptor_providers
    }

    /// Render an unresolved binding with the configured format
    pub fn format_undefined(&self, binding: &UndefinedBinding) -> String {
        binding.format(self.options.undefined_format.as_deref())
    }
}

impl fmt::Debug for ScopeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeConfig")
            .field("options", &self.options)
            .field("descriptor_providers", &self.descriptor_providers.len())
            .finish()
    }
}
