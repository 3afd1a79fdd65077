use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;

/// One model currently open in the host session.
///
/// The host owns the full model zoo; the panel only needs to tell
/// atomic structures apart from everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Model {
    AtomicStructure(AtomicStructure),
    Volume(Volume),
}

/// A loaded molecular structure, addressable by its atomspec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicStructure {
    pub id: u32,
    pub name: String,
}

impl AtomicStructure {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }

    /// The host reference spec for this structure, e.g. `#1`.
    pub fn atomspec(&self) -> String {
        format!("#{}", self.id)
    }
}

/// A density map. Not selectable in the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: u32,
    pub name: String,
}

/// (value, label) pair for one `<option>` in the structure picker.
/// Enumerated fresh on every refresh, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureOption {
    pub value: String,
    pub label: String,
}

impl StructureOption {
    pub fn for_structure(structure: &AtomicStructure) -> Self {
        Self {
            value: structure.atomspec(),
            label: structure.name.clone(),
        }
    }
}

/// Load a model list from a JSON file, for driving the panel without a
/// live host session.
pub fn models_from_json_file(path: &str) -> Result<Vec<Model>> {
    let text =
        fs::read_to_string(path).map_err(|e| anyhow!("Could not read models file '{path}': {e}"))?;
    serde_json::from_str(&text).map_err(|e| anyhow!("Could not parse models file '{path}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomspec_renders_hash_id() {
        assert_eq!(AtomicStructure::new(3, "ribosome").atomspec(), "#3");
    }

    #[test]
    fn option_pairs_atomspec_with_name() {
        let option = StructureOption::for_structure(&AtomicStructure::new(1, "model#1"));
        assert_eq!(option.value, "#1");
        assert_eq!(option.label, "model#1");
    }

    #[test]
    fn model_kind_round_trips_through_serde() {
        let model = Model::AtomicStructure(AtomicStructure::new(2, "apoferritin"));
        let text = serde_json::to_string(&model).unwrap();
        assert!(text.contains("\"kind\":\"AtomicStructure\""));
        let back: Model = serde_json::from_str(&text).unwrap();
        assert_eq!(back, model);
    }
}
