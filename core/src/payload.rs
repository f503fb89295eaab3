//! Builds the body of a bulk variables request from a [`TokenDocument`].
//!
//! Four collections are produced, in this order: color primitives, semantic
//! aliases (light and dark modes), spacing and radius. Within a collection
//! variables follow the declaration order of the source table.

use std::collections::HashSet;

use convert_case::{Case, Casing};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::{
    color::{hex_to_rgba, Rgba},
    error::ValidationError,
    ident::{CollectionId, ModeId, VariableId},
    serialize_compact, TokenDocument,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    /// Used for the mode every new collection starts with, which can only be renamed.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedType {
    Color,
    Float,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionAction {
    pub action: Action,
    pub id: CollectionId,
    pub name: String,
    pub initial_mode_id: ModeId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeAction {
    pub action: Action,
    pub id: ModeId,
    pub name: String,
    pub variable_collection_id: CollectionId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableAction {
    pub action: Action,
    pub id: VariableId,
    pub name: String,
    pub variable_collection_id: CollectionId,
    pub resolved_type: ResolvedType,
    pub values_by_mode: IndexMap<ModeId, VariableValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    Color(Rgba),
    Float(#[serde(serialize_with = "serialize_compact")] f64),
    Alias(VariableAlias),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AliasKind {
    #[serde(rename = "VARIABLE_ALIAS")]
    VariableAlias,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableAlias {
    #[serde(rename = "type")]
    pub type_: AliasKind,
    pub id: VariableId,
}
impl VariableAlias {
    pub fn to(id: VariableId) -> Self {
        Self {
            type_: AliasKind::VariableAlias,
            id,
        }
    }
}

/// Number of variables created per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayloadCounts {
    pub primitives: usize,
    pub semantic: usize,
    pub spacing: usize,
    pub radius: usize,
}
impl PayloadCounts {
    pub fn total(&self) -> usize {
        self.primitives + self.semantic + self.spacing + self.radius
    }
}

/// Request body for `POST /files/{file_key}/variables`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablesPayload {
    pub variable_collections: Vec<CollectionAction>,
    pub variable_modes: Vec<ModeAction>,
    pub variables: Vec<VariableAction>,
    #[serde(skip)]
    pub counts: PayloadCounts,
}
impl VariablesPayload {
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.variable_collections.iter().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Primitives,
    Semantic,
    Spacing,
    Radius,
}
impl CollectionKind {
    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::Primitives => "Primitives",
            CollectionKind::Semantic => "Semantic",
            CollectionKind::Spacing => "Spacing",
            CollectionKind::Radius => "Radius",
        }
    }
    fn id(self) -> Result<CollectionId, ValidationError> {
        CollectionId::allocate("coll", &[self.label().to_case(Case::Snake).as_str()])
    }
    /// The single mode of a one-mode collection.
    fn default_mode(self) -> Result<ModeId, ValidationError> {
        let stem = match self {
            CollectionKind::Primitives => "primitive",
            CollectionKind::Spacing => "spacing",
            CollectionKind::Radius => "radius",
            CollectionKind::Semantic => "semantic",
        };
        ModeId::allocate("mode", &[stem, "default"])
    }
}

/// Validates `tokens` and turns them into one bulk-create request.
///
/// Building is pure: the same document always gives an equal payload.
pub fn build_payload(tokens: &TokenDocument) -> Result<VariablesPayload, ValidationError> {
    tokens.validate()?;
    let mut builder = PayloadBuilder::new(&tokens.name);
    let primitives = builder.primitives(tokens)?;
    builder.semantic(tokens, &primitives)?;
    builder.payload.counts.spacing =
        builder.dimensions(CollectionKind::Spacing, "space", &tokens.spacing)?;
    builder.payload.counts.radius =
        builder.dimensions(CollectionKind::Radius, "radius", &tokens.radius)?;
    Ok(builder.payload)
}

struct PayloadBuilder<'a> {
    prefix: &'a str,
    payload: VariablesPayload,
    claimed: HashSet<String>,
}

impl<'a> PayloadBuilder<'a> {
    fn new(prefix: &'a str) -> Self {
        Self {
            prefix,
            payload: VariablesPayload::default(),
            claimed: HashSet::new(),
        }
    }

    fn claim(&mut self, id: &str, name: &str) -> Result<(), ValidationError> {
        if self.claimed.insert(id.to_string()) {
            Ok(())
        } else {
            Err(ValidationError::DuplicateIdentifier {
                id: id.to_string(),
                name: name.to_string(),
            })
        }
    }

    /// Adds a collection whose first mode is its initial mode (renamed, not created).
    fn collection(
        &mut self,
        kind: CollectionKind,
        modes: &[(ModeId, &str)],
    ) -> Result<CollectionId, ValidationError> {
        let id = kind.id()?;
        let name = format!("{}/{}", self.prefix, kind.label());
        self.claim(id.as_str(), &name)?;
        let Some((initial_mode_id, _)) = modes.first() else {
            return Err(ValidationError::InvalidIdentifier { source_key: name });
        };
        self.payload.variable_collections.push(CollectionAction {
            action: Action::Create,
            id: id.clone(),
            name,
            initial_mode_id: initial_mode_id.clone(),
        });
        for (i, (mode_id, mode_name)) in modes.iter().enumerate() {
            self.claim(mode_id.as_str(), mode_name)?;
            self.payload.variable_modes.push(ModeAction {
                action: if i == 0 { Action::Update } else { Action::Create },
                id: mode_id.clone(),
                name: mode_name.to_string(),
                variable_collection_id: id.clone(),
            });
        }
        Ok(id)
    }

    fn variable(
        &mut self,
        id: VariableId,
        name: String,
        collection: &CollectionId,
        resolved_type: ResolvedType,
        values_by_mode: IndexMap<ModeId, VariableValue>,
    ) -> Result<(), ValidationError> {
        self.claim(id.as_str(), &name)?;
        self.payload.variables.push(VariableAction {
            action: Action::Create,
            id,
            name,
            variable_collection_id: collection.clone(),
            resolved_type,
            values_by_mode,
        });
        Ok(())
    }

    /// Returns the identifiers of every primitive color, for alias resolution.
    fn primitives(&mut self, tokens: &TokenDocument) -> Result<IndexSet<VariableId>, ValidationError> {
        let kind = CollectionKind::Primitives;
        let mode = kind.default_mode()?;
        let collection = self.collection(kind, &[(mode.clone(), "Default")])?;
        let mut ids = IndexSet::new();
        for (scale, steps) in &tokens.colors {
            for (step, hex) in steps {
                let name = format!("{scale}/{step}");
                let id = VariableId::allocate("var", &[scale.as_str(), step.as_str()])?;
                let value = VariableValue::Color(hex_to_rgba(&name, hex)?);
                ids.insert(id.clone());
                self.variable(
                    id,
                    name,
                    &collection,
                    ResolvedType::Color,
                    IndexMap::from([(mode.clone(), value)]),
                )?;
                self.payload.counts.primitives += 1;
            }
        }
        Ok(ids)
    }

    fn semantic(
        &mut self,
        tokens: &TokenDocument,
        primitives: &IndexSet<VariableId>,
    ) -> Result<(), ValidationError> {
        let light = ModeId::allocate("mode", &["light"])?;
        let dark = ModeId::allocate("mode", &["dark"])?;
        let collection = self.collection(
            CollectionKind::Semantic,
            &[(light.clone(), "Light"), (dark.clone(), "Dark")],
        )?;
        for (path, light_ref) in &tokens.semantic.light {
            let dark_ref = tokens
                .semantic
                .dark
                .get(path)
                .ok_or_else(|| ValidationError::MissingDarkAlias { path: path.clone() })?;
            let mut values_by_mode = IndexMap::new();
            for (mode, reference) in [(&light, light_ref), (&dark, dark_ref)] {
                let target =
                    VariableId::allocate("var", &[reference.scale.as_str(), reference.step.as_str()])?;
                if !primitives.contains(&target) {
                    return Err(ValidationError::DanglingAlias {
                        path: path.clone(),
                        target: reference.to_string(),
                    });
                }
                values_by_mode.insert(mode.clone(), VariableValue::Alias(VariableAlias::to(target)));
            }
            let id = VariableId::allocate("var_sem", &[path.as_str()])?;
            self.variable(
                id,
                path.clone(),
                &collection,
                ResolvedType::Color,
                values_by_mode,
            )?;
            self.payload.counts.semantic += 1;
        }
        Ok(())
    }

    /// Spacing and radius: one FLOAT per entry, named `<stem>/<key>`. Returns how many were added.
    fn dimensions(
        &mut self,
        kind: CollectionKind,
        stem: &str,
        table: &IndexMap<String, f64>,
    ) -> Result<usize, ValidationError> {
        let mode = kind.default_mode()?;
        let collection = self.collection(kind, &[(mode.clone(), "Default")])?;
        let prefix = format!("var_{stem}");
        for (key, value) in table {
            let id = VariableId::allocate(&prefix, &[key.as_str()])?;
            self.variable(
                id,
                format!("{stem}/{key}"),
                &collection,
                ResolvedType::Float,
                IndexMap::from([(mode.clone(), VariableValue::Float(*value))]),
            )?;
        }
        Ok(table.len())
    }
}
