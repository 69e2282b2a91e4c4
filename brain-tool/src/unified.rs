//! The unified tool registry — the one lookup surface the agent loop sees.
//!
//! Composes four tool sources, in precedence order: self-management skill
//! CRUD tools, MCP-discovered skill tools (namespaced `<skill_id>__<tool_name>`),
//! in-process plugins, and the built-ins. Precedence only matters when two
//! sources register the same name; it resolves in registration order below,
//! self-management first so a misbehaving skill can never shadow
//! `manage_skill`-style tools.

use crate::{Plugin, ToolDyn, ToolRegistry};
use std::collections::HashMap;
use std::sync::Arc;

/// Composes self-management, MCP, plugin, and built-in tools into a single
/// name-addressable registry for the agent loop.
pub struct UnifiedRegistry {
    self_mgmt: ToolRegistry,
    mcp: HashMap<String, ToolRegistry>,
    plugins: Vec<Arc<dyn Plugin>>,
    builtins: ToolRegistry,
}

impl UnifiedRegistry {
    /// Create an empty unified registry.
    pub fn new() -> Self {
        Self {
            self_mgmt: ToolRegistry::new(),
            mcp: HashMap::new(),
            plugins: Vec::new(),
            builtins: ToolRegistry::new(),
        }
    }

    /// Register a self-management tool (skill/secret/schedule CRUD).
    pub fn register_self_mgmt(&mut self, tool: Arc<dyn ToolDyn>) {
        self.self_mgmt.register(tool);
    }

    /// Register a built-in tool (e.g. `dispatch_companion`).
    pub fn register_builtin(&mut self, tool: Arc<dyn ToolDyn>) {
        self.builtins.register(tool);
    }

    /// Register the tools discovered from one MCP skill connection.
    ///
    /// `tools` are wrapped so their exposed name is `<skill_id>__<tool_name>`,
    /// preventing two skills that both expose e.g. `search` from colliding.
    pub fn register_mcp_skill(&mut self, skill_id: &str, tools: Vec<Arc<dyn ToolDyn>>) {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(Arc::new(NamespacedTool::new(skill_id, tool)));
        }
        self.mcp.insert(skill_id.to_owned(), registry);
    }

    /// Remove a previously-registered MCP skill's tools (skill disabled/removed).
    pub fn unregister_mcp_skill(&mut self, skill_id: &str) {
        self.mcp.remove(skill_id);
    }

    /// Register an in-process plugin. Its tools become part of the lookup
    /// surface immediately.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Look up a tool by its exposed name, checking sources in precedence
    /// order: self-management, MCP skills, plugins, built-ins.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolDyn>> {
        if let Some(t) = self.self_mgmt.get(name) {
            return Some(Arc::clone(t));
        }
        for registry in self.mcp.values() {
            if let Some(t) = registry.get(name) {
                return Some(Arc::clone(t));
            }
        }
        for plugin in &self.plugins {
            if let Some(t) = plugin.tools().into_iter().find(|t| t.name() == name) {
                return Some(t);
            }
        }
        self.builtins.get(name).cloned()
    }

    /// All tools currently visible, across every source, for building the
    /// model-facing tool schema list.
    pub fn list(&self) -> Vec<Arc<dyn ToolDyn>> {
        let mut out: Vec<Arc<dyn ToolDyn>> = Vec::new();
        out.extend(self.self_mgmt.iter().cloned());
        for registry in self.mcp.values() {
            out.extend(registry.iter().cloned());
        }
        for plugin in &self.plugins {
            out.extend(plugin.tools());
        }
        out.extend(self.builtins.iter().cloned());
        out
    }

    /// Total number of tools visible across every source.
    pub fn len(&self) -> usize {
        self.list().len()
    }

    /// Whether no tools are registered anywhere.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for UnifiedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a tool so it's addressed as `<skill_id>__<tool_name>` while
/// delegating description, schema, and execution to the inner tool.
struct NamespacedTool {
    namespaced_name: String,
    inner: Arc<dyn ToolDyn>,
}

impl NamespacedTool {
    fn new(skill_id: &str, inner: Arc<dyn ToolDyn>) -> Self {
        Self {
            namespaced_name: format!("{skill_id}__{}", inner.name()),
            inner,
        }
    }
}

impl ToolDyn for NamespacedTool {
    fn name(&self) -> &str {
        &self.namespaced_name
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn input_schema(&self) -> serde_json::Value {
        self.inner.input_schema()
    }

    fn call(
        &self,
        input: serde_json::Value,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<serde_json::Value, crate::ToolError>> + Send + '_>,
    > {
        self.inner.call(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NamedEcho(&'static str);

    impl ToolDyn for NamedEcho {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "echoes"
        }
        fn input_schema(&self) -> serde_json::Value {
            json!({"type": "object"})
        }
        fn call(
            &self,
            input: serde_json::Value,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<serde_json::Value, crate::ToolError>> + Send + '_>,
        > {
            Box::pin(async move { Ok(input) })
        }
    }

    #[test]
    fn precedence_self_mgmt_beats_builtin() {
        let mut reg = UnifiedRegistry::new();
        reg.register_builtin(Arc::new(NamedEcho("search")));
        reg.register_self_mgmt(Arc::new(NamedEcho("search")));

        // Both are named "search"; self-mgmt must win the lookup.
        assert!(reg.get("search").is_some());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn mcp_tools_are_namespaced() {
        let mut reg = UnifiedRegistry::new();
        reg.register_mcp_skill("weather", vec![Arc::new(NamedEcho("forecast"))]);

        assert!(reg.get("weather__forecast").is_some());
        assert!(reg.get("forecast").is_none());
    }

    #[test]
    fn unregister_mcp_skill_removes_its_tools() {
        let mut reg = UnifiedRegistry::new();
        reg.register_mcp_skill("weather", vec![Arc::new(NamedEcho("forecast"))]);
        reg.unregister_mcp_skill("weather");

        assert!(reg.get("weather__forecast").is_none());
        assert!(reg.is_empty());
    }

    struct EchoPlugin;

    impl Plugin for EchoPlugin {
        fn id(&self) -> &str {
            "echo-plugin"
        }
        fn tools(&self) -> Vec<Arc<dyn ToolDyn>> {
            vec![Arc::new(NamedEcho("plugin_tool"))]
        }
    }

    #[test]
    fn plugin_tools_are_visible() {
        let mut reg = UnifiedRegistry::new();
        reg.register_plugin(Arc::new(EchoPlugin));

        assert!(reg.get("plugin_tool").is_some());
        assert_eq!(reg.len(), 1);
    }

    #[tokio::test]
    async fn namespaced_tool_delegates_call() {
        let mut reg = UnifiedRegistry::new();
        reg.register_mcp_skill("weather", vec![Arc::new(NamedEcho("forecast"))]);

        let tool = reg.get("weather__forecast").unwrap();
        let result = tool.call(json!({"city": "nyc"})).await.unwrap();
        assert_eq!(result, json!({"city": "nyc"}));
    }
}
