//! Model registry: static display-name to identifier mapping.

use crate::config::CustomModel;

/// A registry entry
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Display name shown in the selector
    pub name: String,
    /// Identifier sent to the endpoint
    pub id: String,
}

/// Built-in models
const BUILTIN_MODELS: &[(&str, &str)] = &[
    ("OpenRouter: Auto (Free)", "openrouter/free"),
    ("Aurora Alpha", "openrouter/aurora-alpha"),
    ("StepFun: Step 3.5 Flash", "stepfun/step-3.5-flash:free"),
    ("Arcee AI: Trinity Large Preview", "arcee-ai/trinity-large-preview:free"),
];

/// Assemble the registry: built-in models plus config additions.
pub fn registry(extra: &[CustomModel]) -> Vec<ModelInfo> {
    let mut models: Vec<ModelInfo> = BUILTIN_MODELS
        .iter()
        .map(|(name, id)| ModelInfo {
            name: name.to_string(),
            id: id.to_string(),
        })
        .collect();

    for custom in extra {
        if !models.iter().any(|m| m.id == custom.id) {
            models.push(ModelInfo {
                name: custom.name.clone(),
                id: custom.id.clone(),
            });
        }
    }

    models
}

/// Look up a model by display name or identifier.
///
/// Unknown names fall through as raw identifiers, so any endpoint model
/// can be used without registering it first.
pub fn resolve<'a>(models: &'a [ModelInfo], name_or_id: &str) -> Option<&'a ModelInfo> {
    models
        .iter()
        .find(|m| m.name == name_or_id || m.id == name_or_id)
}
