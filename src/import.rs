//! The import sequence: scope check, build, publish, report.

use std::{fmt, io::Write};

use figma_tokens_core::{build_payload, PayloadCounts, TokenDocument};
use itertools::Itertools;

use crate::{
    api::VariablesApi,
    config::{Cli, Credentials},
    error::ImportError,
};

/// What a successful import created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub prefix: String,
    pub counts: PayloadCounts,
    pub acknowledged: bool,
    /// Collections that already existed in the file under the same name.
    pub conflicts: Vec<String>,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = &self.prefix;
        writeln!(f, "  Variables created in your Figma file:")?;
        let counts = &self.counts;
        writeln!(f, "    ✓ {prefix}/Primitives — {} colors across all scales", counts.primitives)?;
        writeln!(f, "    ✓ {prefix}/Semantic   — {} Light + Dark mode aliases", counts.semantic)?;
        writeln!(f, "    ✓ {prefix}/Spacing    — {} spacing values", counts.spacing)?;
        writeln!(f, "    ✓ {prefix}/Radius     — {} radius values", counts.radius)?;
        writeln!(f)?;
        writeln!(
            f,
            "  Open your Figma file and check the Variables panel (⌘/Ctrl + Click the diamond icon)."
        )?;
        writeln!(f)?;
        writeln!(f, "  Next steps:")?;
        writeln!(f, "    1. Apply variables to your component library")?;
        writeln!(f, "    2. Toggle Light/Dark mode in the Semantic collection")?;
        writeln!(f, "    3. Create text styles manually referencing the type scale")?;
        if !self.conflicts.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "  Note: the file already had {}; delete the older copies if they are no longer used.",
                self.conflicts.iter().join(", ")
            )?;
        }
        if self.acknowledged {
            writeln!(f)?;
            writeln!(f, "  API response: Success")?;
        }
        Ok(())
    }
}

/// Checks configuration, connects with `connect`, then imports the configured tokens.
///
/// Nothing is sent when credentials are missing; `connect` is not even called.
pub async fn run<A, F>(cli: &Cli, connect: F, out: &mut impl Write) -> Result<ImportSummary, ImportError>
where
    A: VariablesApi,
    F: FnOnce(Credentials) -> A,
{
    let credentials = cli.credentials()?;
    let tokens = cli.load_tokens()?;
    tracing::debug!(?credentials, tokens = %tokens.name, "starting import");
    let api = connect(credentials);
    import(&api, &tokens, out).await
}

pub async fn import<A: VariablesApi>(
    api: &A,
    tokens: &TokenDocument,
    out: &mut impl Write,
) -> Result<ImportSummary, ImportError> {
    writeln!(out, "\n  {} → Figma Variables Import", tokens.name)?;
    writeln!(out, "  ─────────────────────────────────\n")?;

    writeln!(out, "  [1/4] Reading existing variables...")?;
    let existing = api
        .fetch_existing_variables()
        .await
        .map_err(ImportError::ScopeCheck)?;
    tracing::debug!(
        collections = existing.meta.variable_collections.len(),
        variables = existing.meta.variables.len(),
        "existing local variables"
    );

    writeln!(out, "  [2/4] Building variable definitions...")?;
    let payload = build_payload(tokens)?;
    let conflicts = payload
        .collection_names()
        .filter(|name| existing.collection_names().any(|e| e == *name))
        .map(str::to_string)
        .collect::<Vec<_>>();
    for name in &conflicts {
        tracing::warn!(collection = %name, "collection already exists in the file");
    }

    let counts = payload.counts;
    writeln!(out, "  [3/4] Pushing to Figma...")?;
    writeln!(out, "         {} primitive colors", counts.primitives)?;
    writeln!(out, "         {} semantic aliases (Light + Dark)", counts.semantic)?;
    writeln!(out, "         {} spacing values", counts.spacing)?;
    writeln!(out, "         {} radius values", counts.radius)?;
    writeln!(out, "         {} total variables\n", counts.total())?;
    let response = api
        .publish_variables(&payload)
        .await
        .map_err(ImportError::Publish)?;
    tracing::info!(variables = counts.total(), "variables published");

    writeln!(out, "  [4/4] Done!\n")?;
    let summary = ImportSummary {
        prefix: tokens.name.clone(),
        counts,
        acknowledged: response.acknowledged(),
        conflicts,
    };
    write!(out, "{summary}")?;
    Ok(summary)
}

/// Builds and validates the payload, then writes it as pretty JSON without sending it.
pub fn dry_run(cli: &Cli, out: &mut impl Write) -> Result<PayloadCounts, ImportError> {
    let tokens = cli.load_tokens()?;
    let payload = build_payload(&tokens)?;
    serde_json::to_writer_pretty(&mut *out, &payload).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(payload.counts)
}
