//! In-process plugins — tool sources that live in the same binary as the Brain.

use crate::ToolDyn;
use std::sync::Arc;

/// A source of tools and triggers that runs in-process, as opposed to an
/// MCP skill (separate process/endpoint) or a hard-coded built-in.
///
/// Plugins are registered at startup and contribute their tools to the
/// [`crate::UnifiedRegistry`] under the plugin's own namespace. `on_trigger`
/// lets a plugin react to lifecycle events (tool registered, skill enabled)
/// without being polled.
pub trait Plugin: Send + Sync {
    /// Stable identifier for this plugin, used to namespace its tools.
    fn id(&self) -> &str;

    /// The tools this plugin contributes.
    fn tools(&self) -> Vec<Arc<dyn ToolDyn>>;

    /// Called when something the plugin might care about happens.
    /// Default implementation does nothing — most plugins are pure tool
    /// sources with no reactive behavior.
    fn on_trigger(&self, _event: &str) {}
}
