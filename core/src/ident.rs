//! Identifiers the variables API accepts for entities created in one request.
//!
//! Every identifier is `<prefix>_<segment>_<segment>...` where each segment is
//! derived from a table key and only contains `[A-Za-z0-9_-]`.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::error::ValidationError;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);
        impl $name {
            /// Builds `<prefix>_<parts...>`, sanitizing each part.
            pub fn allocate(prefix: &str, parts: &[&str]) -> Result<Self, ValidationError> {
                allocate(prefix, parts).map(Self)
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Identifier of a variable, e.g. `var_carbon_50`.
    VariableId
);
identifier!(
    /// Identifier of a variable collection, e.g. `coll_primitives`.
    CollectionId
);
identifier!(
    /// Identifier of a mode inside a collection, e.g. `mode_light`.
    ModeId
);

fn allocate(prefix: &str, parts: &[&str]) -> Result<String, ValidationError> {
    let segments = parts.iter().map(|part| sanitize(part)).collect::<Vec<_>>();
    if prefix.is_empty() || segments.iter().any(|segment| segment.is_empty()) {
        return Err(ValidationError::InvalidIdentifier {
            source_key: parts.join("/"),
        });
    }
    Ok(std::iter::once(sanitize(prefix)).chain(segments).join("_"))
}

/// Transliterates to ASCII, then replaces anything outside `[A-Za-z0-9_-]` with `_`.
pub(crate) fn sanitize(s: &str) -> String {
    deunicode::deunicode(s)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
