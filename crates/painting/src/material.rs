//! Reference material and shader property discovery
//!
//! The painter never hard-codes shader slot names. A host-supplied pattern
//! table maps each declared texture property onto a [`ParameterSemantic`];
//! everything downstream works on the resolved semantics only.

use painter_config::{default_property_patterns, PropertyPattern};
use painter_ipc::ReferenceMaterialInfo;
use tracing::debug;

use crate::types::ParameterSemantic;

/// Material whose shader decides which canvases a layer has
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceMaterial {
    pub name: String,
    pub shader: String,
    /// Declared texture properties, in shader order
    pub texture_properties: Vec<String>,
}

impl ReferenceMaterial {
    pub fn new(
        name: impl Into<String>,
        shader: impl Into<String>,
        texture_properties: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            shader: shader.into(),
            texture_properties: texture_properties.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ReferenceMaterialInfo> for ReferenceMaterial {
    fn from(info: ReferenceMaterialInfo) -> Self {
        Self {
            name: info.name,
            shader: info.shader,
            texture_properties: info.texture_properties,
        }
    }
}

/// A shader texture slot resolved to a semantic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderTextureProperty {
    pub property_name: String,
    pub semantic: ParameterSemantic,
}

/// Name-pattern lookup table
#[derive(Debug, Clone)]
pub struct PropertyMatcher {
    patterns: Vec<PropertyPattern>,
}

impl Default for PropertyMatcher {
    fn default() -> Self {
        Self::new(default_property_patterns())
    }
}

impl PropertyMatcher {
    pub fn new(patterns: Vec<PropertyPattern>) -> Self {
        Self { patterns }
    }

    /// Semantic of one property name: the first matching row wins
    pub fn classify(&self, property_name: &str) -> Option<ParameterSemantic> {
        self.patterns
            .iter()
            .find(|p| p.matches(property_name))
            .map(|p| p.semantic)
    }

    /// Resolve a material's texture properties
    ///
    /// At most one property per semantic is kept: the first one in shader
    /// order. Unrecognized properties are skipped.
    pub fn discover(&self, material: &ReferenceMaterial) -> Vec<ShaderTextureProperty> {
        let mut found: Vec<ShaderTextureProperty> = Vec::new();
        for name in &material.texture_properties {
            let Some(semantic) = self.classify(name) else {
                debug!("'{}': property '{}' not recognized", material.name, name);
                continue;
            };
            if found.iter().any(|p| p.semantic == semantic) {
                debug!("'{}': {} already bound, skipping '{}'", material.name, semantic, name);
                continue;
            }
            found.push(ShaderTextureProperty {
                property_name: name.clone(),
                semantic,
            });
        }
        found
    }
}

/// Semantics of a resolved property list, in canonical order
pub fn required_semantics(properties: &[ShaderTextureProperty]) -> Vec<ParameterSemantic> {
    let mut semantics: Vec<_> = properties.iter().map(|p| p.semantic).collect();
    semantics.sort();
    semantics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit() -> ReferenceMaterial {
        ReferenceMaterial::new(
            "Bronze",
            "Universal Render Pipeline/Lit",
            ["_BaseMap", "_MetallicGlossMap", "_BumpMap", "_OcclusionMap", "_EmissionMap", "_MainTex"],
        )
    }

    #[test]
    fn test_discover_lit_shader() {
        let found = PropertyMatcher::default().discover(&lit());
        let pairs: Vec<_> = found
            .iter()
            .map(|p| (p.property_name.as_str(), p.semantic))
            .collect();
        assert_eq!(
            pairs,
            [
                ("_BaseMap", ParameterSemantic::BaseColor),
                ("_MetallicGlossMap", ParameterSemantic::Metallic),
                ("_OcclusionMap", ParameterSemantic::Occlusion),
                ("_EmissionMap", ParameterSemantic::Emission),
            ]
        );
    }

    #[test]
    fn test_first_match_wins_per_semantic() {
        let material = ReferenceMaterial::new("m", "s", ["_MainTex", "_BaseColorMap"]);
        let found = PropertyMatcher::default().discover(&material);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].property_name, "_MainTex");
    }

    #[test]
    fn test_custom_table() {
        let matcher = PropertyMatcher::new(vec![PropertyPattern::new("rough", ParameterSemantic::Roughness)]);
        assert_eq!(matcher.classify("_RoughMap"), Some(ParameterSemantic::Roughness));
        assert_eq!(matcher.classify("_BaseMap"), None);
    }

    #[test]
    fn test_no_texture_properties() {
        let material = ReferenceMaterial::new("m", "Unlit/Color", ["_Color"]);
        assert!(PropertyMatcher::default().discover(&material).is_empty());
    }

    #[test]
    fn test_required_semantics_sorted() {
        let found = PropertyMatcher::default().discover(&lit());
        assert_eq!(
            required_semantics(&found),
            vec![
                ParameterSemantic::BaseColor,
                ParameterSemantic::Metallic,
                ParameterSemantic::Occlusion,
                ParameterSemantic::Emission,
            ]
        );
    }
}
