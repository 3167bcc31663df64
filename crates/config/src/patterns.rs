//! Name-pattern table mapping shader property names onto semantics

use serde::{Deserialize, Serialize};

use crate::ParameterSemantic;

/// One row of the property lookup table
///
/// A property whose lowercased name contains `pattern` resolves to `semantic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyPattern {
    pub pattern: String,
    pub semantic: ParameterSemantic,
}

impl PropertyPattern {
    pub fn new(pattern: impl Into<String>, semantic: ParameterSemantic) -> Self {
        Self {
            pattern: pattern.into().to_lowercase(),
            semantic,
        }
    }

    /// Case-insensitive substring match
    pub fn matches(&self, property_name: &str) -> bool {
        property_name.to_lowercase().contains(&self.pattern)
    }
}

/// Default table for common PBR shaders
///
/// Order matters: rows are tried top to bottom, so the more specific
/// patterns (emission, metallic...) come before the generic color ones.
pub fn default_property_patterns() -> Vec<PropertyPattern> {
    use ParameterSemantic::*;

    [
        ("emission", Emission),
        ("emissive", Emission),
        ("metallic", Metallic),
        ("roughness", Roughness),
        ("occlusion", Occlusion),
        ("opacity", Opacity),
        ("alpha", Opacity),
        ("basecolor", BaseColor),
        ("basemap", BaseColor),
        ("maintex", BaseColor),
        ("albedo", BaseColor),
        ("diffuse", BaseColor),
    ]
    .into_iter()
    .map(|(pattern, semantic)| PropertyPattern::new(pattern, semantic))
    .collect()
}
