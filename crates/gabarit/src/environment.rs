//! Render environment.
//!
//! An [`Environment`] owns the configuration every scope tree of a render is
//! built from. Hosts normally create one explicitly; [`Environment::shared`]
//! offers a process-wide default for callers that never customize it.

use std::sync::Arc;

use gabarit_carton::Lazy;
use gabarit_croquis::{
    ObjectDescriptorProvider, ScopeConfig, ScopeOptions, ScopeTree, UndefinedBinding, Value,
};

use crate::error::RenderResult;

static SHARED: Lazy<Environment> = Lazy::new(Environment::default);

/// Configuration shared by all renders of one host
#[derive(Debug, Clone, Default)]
pub struct Environment {
    config: Arc<ScopeConfig>,
}

impl Environment {
    pub fn new(config: ScopeConfig) -> Self {
        tracing::debug!(options = ?config.options(), "created environment");
        Self {
            config: Arc::new(config),
        }
    }

    /// Build from options, rejecting unusable layouts
    pub fn from_options(options: ScopeOptions) -> RenderResult<Self> {
        Ok(Self::new(ScopeConfig::from_options(options)?))
    }

    /// Process-wide default environment
    pub fn shared() -> &'static Environment {
        &SHARED
    }

    /// Copy of this environment with one more descriptor provider
    pub fn with_descriptor_provider(&self, provider: Arc<dyn ObjectDescriptorProvider>) -> Self {
        let config = (*self.config).clone().with_descriptor_provider(provider);
        Self {
            config: Arc::new(config),
        }
    }

    #[inline]
    pub fn config(&self) -> &Arc<ScopeConfig> {
        &self.config
    }

    /// Create the root scope of a render and register `data` as root data.
    ///
    /// Fails when `data` has more members than the data layout can hold.
    pub fn begin_render(
        &self,
        value: Value,
        data: Option<&Value>,
        template_path: Option<&str>,
    ) -> RenderResult<ScopeTree> {
        let mut tree = ScopeTree::new(Arc::clone(&self.config), value, template_path);
        tree.root_mut().set_data_object(data)?;
        Ok(tree)
    }

    /// Text for an unresolved binding
    pub fn format_undefined(&self, binding: &UndefinedBinding) -> String {
        self.config.format_undefined(binding)
    }
}
