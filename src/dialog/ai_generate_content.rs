use serde::Serialize;

use crate::{
    dialog::{NodeConfig, Seed},
    model::NodeKind,
};

/// Configuration of an `aiGenerateContent` node.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiGenerateContentConfig {
    /// email, sms, social_post, blog_intro, ...
    pub content_type: String,
    pub prompt: String,
    /// context field the generated text is written to
    pub output_field: String,
}

impl Default for AiGenerateContentConfig {
    fn default() -> Self {
        Self {
            content_type: "email".to_string(),
            prompt: String::new(),
            output_field: "generated_content".to_string(),
        }
    }
}

impl NodeConfig for AiGenerateContentConfig {
    const NODE_KIND: NodeKind = NodeKind::AiGenerateContent;

    fn seed(seed: &mut Seed<'_>) -> Self {
        let default = Self::default();
        Self {
            content_type: seed.field("contentType", default.content_type),
            prompt: seed.field("prompt", default.prompt),
            output_field: seed.field("outputField", default.output_field),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::common::Vars;

    #[test]
    fn test_seed_from_partial_data() {
        let data = Vars::from(json!({"label": "AI Generate Content", "prompt": "Say hi"}));
        let config = AiGenerateContentConfig::from_data(&data);
        assert_eq!(config.prompt, "Say hi");
        assert_eq!(config.content_type, "email");
    }

    #[test]
    fn test_patch_keys_are_camel_case() {
        let patch = AiGenerateContentConfig::default().to_patch().unwrap();
        assert_eq!(patch.get_str("outputField"), Some("generated_content"));
        assert!(patch.get("label").is_none());
    }
}
