use schemars::gen::SchemaGenerator;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

/// Trait for structured responses parsed out of LLM output.
///
/// The generated schema is embedded in prompts so the model knows the exact
/// shape to produce; the same type then drives deserialization. Parsing has
/// no fallback value: callers get a `Result` and decide what a failure means.
pub trait LlmResponse: DeserializeOwned + JsonSchema {
    /// Generate JSON schema string for use in LLM prompts
    fn json_schema_string() -> String {
        let mut gen = SchemaGenerator::default();
        let schema = gen.root_schema_for::<Self>();
        serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
    }
}
