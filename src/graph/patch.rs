//! Field-level partial updates to node data
//!
//! Editing a node from a form produces a patch, not a whole replacement:
//! `Some` fields overwrite, `None` fields are preserved. Keeping the
//! merge explicit makes the partial-update contract testable.

use serde::Deserialize;

use crate::graph::types::{AgentData, InputData};

/// Partial update for an agent node's data
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "systemPrompt")]
    pub system_prompt: Option<String>,
    pub temperature: Option<f64>,
    #[serde(rename = "maxTokens")]
    pub max_tokens: Option<u32>,
}

/// Partial update for the input node's data
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputPatch {
    pub label: Option<String>,
    pub description: Option<String>,
}

/// Patch for either node kind. Applying a patch of the wrong kind to a
/// node is a no-op.
#[derive(Debug, Clone)]
pub enum NodePatch {
    Agent(AgentPatch),
    Input(InputPatch),
}

impl AgentData {
    /// Merge a patch into this data, field by field.
    pub fn apply(&mut self, patch: AgentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(provider) = patch.provider {
            self.provider = provider;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(system_prompt) = patch.system_prompt {
            self.system_prompt = system_prompt;
        }
        if let Some(temperature) = patch.temperature {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = patch.max_tokens {
            self.max_tokens = max_tokens;
        }
    }
}

impl InputData {
    /// Merge a patch into this data, field by field.
    pub fn apply(&mut self, patch: InputPatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_patch_overwrites_only_given_fields() {
        let mut data = AgentData {
            name: "Writer".to_string(),
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            system_prompt: "Write well.".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
        };

        data.apply(AgentPatch {
            model: Some("gpt-4o-mini".to_string()),
            temperature: Some(0.2),
            ..Default::default()
        });

        assert_eq!(data.model, "gpt-4o-mini");
        assert_eq!(data.temperature, 0.2);
        // Untouched fields are preserved
        assert_eq!(data.name, "Writer");
        assert_eq!(data.provider, "openai");
        assert_eq!(data.system_prompt, "Write well.");
        assert_eq!(data.max_tokens, 2048);
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let mut data = AgentData::default();
        let before = data.clone();
        data.apply(AgentPatch::default());
        assert_eq!(data, before);
    }

    #[test]
    fn test_input_patch() {
        let mut data = InputData {
            label: "Start".to_string(),
            description: "Initial input".to_string(),
        };

        data.apply(InputPatch {
            label: Some("Trigger".to_string()),
            description: None,
        });

        assert_eq!(data.label, "Trigger");
        assert_eq!(data.description, "Initial input");
    }

    #[test]
    fn test_patch_deserializes_wire_names() {
        let patch: AgentPatch =
            serde_json::from_str(r#"{"systemPrompt": "Be brief.", "maxTokens": 512}"#).unwrap();
        assert_eq!(patch.system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(patch.max_tokens, Some(512));
        assert!(patch.name.is_none());
    }
}
