use async_trait::async_trait;

use crate::Result;

/// A function/tool definition handed to the AI gateway when a structured
/// tool-call response is required instead of freeform text.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool arguments.
    pub parameters: serde_json::Value,
}

/// Chat-completion seam. Implementations own the wire format; callers only
/// see text or the parsed tool-call arguments.
#[async_trait]
pub trait AiGateway: Send + Sync {
    fn name(&self) -> &str;

    /// Freeform completion: system persona plus user prompt, returns the
    /// assistant text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Forced tool call: returns the tool's JSON arguments.
    async fn complete_with_tool(
        &self,
        system: &str,
        user: &str,
        tool: &ToolSpec,
    ) -> Result<serde_json::Value>;
}
