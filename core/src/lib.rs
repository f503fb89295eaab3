use indexmap::IndexMap;
use serde::{Deserialize, Serializer};

pub mod color;
pub mod error;
pub mod ident;
pub mod payload;
mod reference;

pub use color::{hex_to_rgba, Rgba};
pub use error::ValidationError;
pub use ident::{CollectionId, ModeId, VariableId};
pub use payload::{build_payload, PayloadCounts, VariablesPayload};
pub use reference::ColorRef;

/// Step key (`"50"`, `"950"`, ...) to `#RRGGBB`, in declaration order.
pub type ColorScale = IndexMap<String, String>;

/// The palette and scales that become Figma variables.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenDocument {
    /// Prefix of every collection name, e.g. `CarbonS` gives `CarbonS/Primitives`.
    pub name: String,
    pub colors: IndexMap<String, ColorScale>,
    pub spacing: IndexMap<String, f64>,
    pub radius: IndexMap<String, f64>,
    pub semantic: SemanticAliases,
}

/// Semantic path (`bg/primary`) to a color reference, once per appearance mode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SemanticAliases {
    pub light: IndexMap<String, ColorRef>,
    pub dark: IndexMap<String, ColorRef>,
}

impl TokenDocument {
    /// The CarbonS palette bundled with the crate.
    pub fn builtin() -> Result<Self, serde_json::Error> {
        Self::from_json(include_str!("../../tokens/carbons.json"))
    }
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
    pub fn color_count(&self) -> usize {
        self.colors.values().map(|scale| scale.len()).sum()
    }
    pub fn variable_count(&self) -> usize {
        self.color_count() + self.semantic.light.len() + self.spacing.len() + self.radius.len()
    }

    /// Checks the invariants that hold between tables: light and dark aliases
    /// share the same keys and every dimension is a finite, non-negative number.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(path) = self
            .semantic
            .light
            .keys()
            .find(|path| !self.semantic.dark.contains_key(*path))
        {
            return Err(ValidationError::MissingDarkAlias { path: path.clone() });
        }
        if let Some(path) = self
            .semantic
            .dark
            .keys()
            .find(|path| !self.semantic.light.contains_key(*path))
        {
            return Err(ValidationError::MissingLightAlias { path: path.clone() });
        }
        let dimensions = self
            .spacing
            .iter()
            .map(|(key, value)| (format!("space/{key}"), *value))
            .chain(
                self.radius
                    .iter()
                    .map(|(key, value)| (format!("radius/{key}"), *value)),
            );
        for (token, value) in dimensions {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidDimension { token, value });
            }
        }
        Ok(())
    }
}

/// Writes whole numbers as JSON integers (`1`, `9999`) and everything else as floats.
pub(crate) fn serialize_compact<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
pub(crate) fn fixture() -> TokenDocument {
    TokenDocument::from_json(
        r##"{
            "name": "Tiny",
            "colors": {
                "ink": { "100": "#EEEEEE", "900": "#111111" },
                "accent": { "500": "#FF8800" }
            },
            "spacing": { "0": 0, "0.5": 2, "1": 4 },
            "radius": { "sm": 4, "full": 9999 },
            "semantic": {
                "light": { "bg/primary": "ink/100", "fg/brand": "accent/500" },
                "dark": { "bg/primary": "ink/900", "fg/brand": "accent/500" }
            }
        }"##,
    )
    .unwrap()
}

#[test]
fn test() {
    let tokens = TokenDocument::builtin().unwrap();
    assert_eq!(tokens.name, "CarbonS");
    assert_eq!(
        tokens.colors.keys().collect::<Vec<_>>(),
        ["carbon", "ember", "sage", "clay", "success", "warning", "error", "info"]
    );
    assert_eq!(tokens.color_count(), 84);
    assert_eq!(tokens.semantic.light.len(), 20);
    assert_eq!(tokens.spacing.len(), 18);
    assert_eq!(tokens.radius.len(), 8);
    assert_eq!(tokens.variable_count(), 130);
    assert_eq!(tokens.spacing.get_index(1), Some((&"0.5".to_string(), &2.0)));
    assert_eq!(tokens.radius.get("full"), Some(&9999.0));
    tokens.validate().unwrap();
}

#[test]
fn unbalanced_semantic_tables_are_rejected() {
    let mut tokens = fixture();
    tokens.semantic.dark.shift_remove("fg/brand");
    assert_eq!(
        tokens.validate(),
        Err(ValidationError::MissingDarkAlias {
            path: "fg/brand".to_string()
        })
    );

    let mut tokens = fixture();
    tokens
        .semantic
        .dark
        .insert("fg/extra".to_string(), ColorRef::new("ink", "900"));
    assert_eq!(
        tokens.validate(),
        Err(ValidationError::MissingLightAlias {
            path: "fg/extra".to_string()
        })
    );
}

#[test]
fn negative_dimensions_are_rejected() {
    let mut tokens = fixture();
    tokens.radius.insert("weird".to_string(), -1.0);
    assert_eq!(
        tokens.validate(),
        Err(ValidationError::InvalidDimension {
            token: "radius/weird".to_string(),
            value: -1.0
        })
    );
}

#[test]
fn malformed_references_fail_to_load() {
    let err = TokenDocument::from_json(
        r#"{
            "name": "Broken",
            "colors": {},
            "spacing": {},
            "radius": {},
            "semantic": { "light": { "bg/primary": "carbon" }, "dark": {} }
        }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid reference"), "{err}");
}
