use serde::Serialize;
use serde_json::Number;

use crate::{
    dialog::{NodeConfig, Seed},
    model::NodeKind,
};

/// Configuration of an `aiScoreLead` node.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiScoreLeadConfig {
    pub scoring_model: String,
    /// contact/context fields fed to the scoring model
    pub context_fields: Vec<String>,
    /// score at or above which the lead counts as qualified; integer or fractional
    pub threshold: Number,
    pub output_field: String,
}

impl Default for AiScoreLeadConfig {
    fn default() -> Self {
        Self {
            scoring_model: "engagement".to_string(),
            context_fields: Vec::new(),
            threshold: Number::from(50),
            output_field: "lead_score".to_string(),
        }
    }
}

impl NodeConfig for AiScoreLeadConfig {
    const NODE_KIND: NodeKind = NodeKind::AiScoreLead;

    fn seed(seed: &mut Seed<'_>) -> Self {
        let default = Self::default();
        Self {
            scoring_model: seed.field("scoringModel", default.scoring_model),
            context_fields: seed.field("contextFields", default.context_fields),
            threshold: seed.field("threshold", default.threshold),
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
    fn test_bad_key_falls_back_alone() {
        let data = Vars::from(json!({"scoringModel": "custom_b2b", "threshold": "high", "outputField": "b2b_score"}));
        let mut seed = Seed::new(&data);
        let config = AiScoreLeadConfig::seed(&mut seed);

        assert_eq!(config.scoring_model, "custom_b2b");
        assert_eq!(config.output_field, "b2b_score");
        assert_eq!(config.threshold, Number::from(50));
        assert_eq!(seed.unreadable(), ["threshold".to_string()]);
    }

    #[test]
    fn test_fractional_threshold_is_kept() {
        let data = Vars::from(json!({"threshold": 0.75}));
        let config = AiScoreLeadConfig::from_data(&data);
        assert_eq!(config.threshold.as_f64(), Some(0.75));
        assert_eq!(config.to_patch().unwrap().get("threshold"), Some(&json!(0.75)));
    }

    #[test]
    fn test_context_fields_seeded() {
        let data = Vars::from(json!({"contextFields": ["email_opens"], "threshold": 80}));
        let config = AiScoreLeadConfig::from_data(&data);
        assert_eq!(config.context_fields, vec!["email_opens".to_string()]);
        assert_eq!(config.threshold, Number::from(80));
    }
}
