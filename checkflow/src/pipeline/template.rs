//! Argument template expansion.
//!
//! Stage argument templates reference the case and earlier stages
//! through `{...}` placeholders:
//!
//! - `{input}`: the case input path
//! - `{stdin}`: the case stdin path
//! - `{work_dir}`: the case scratch directory
//! - `{case}`: the sanitized case identifier
//! - `{artifact}`: the current stage's declared artifact path
//! - `{artifact:<stage>}`: the artifact produced by an earlier stage

use crate::core::TestCase;
use crate::errors::TemplateError;
use crate::utils::sanitize_component;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[allow(clippy::expect_used)]
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([a-z_]+)(?::([^{}:]+))?\}").expect("placeholder pattern is valid")
});

/// Everything a template can reference while a stage is prepared.
#[derive(Debug)]
pub(crate) struct TemplateContext<'a> {
    /// The case being run.
    pub case: &'a TestCase,
    /// The case scratch directory.
    pub work_dir: &'a Path,
    /// Artifacts recorded by earlier stages, keyed by stage name.
    pub artifacts: &'a HashMap<String, PathBuf>,
    /// The current stage's own declared artifact path, if any.
    pub current_artifact: Option<&'a Path>,
}

/// Expands one template against the context.
pub(crate) fn expand(template: &str, ctx: &TemplateContext<'_>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for captures in PLACEHOLDER.captures_iter(template) {
        #[allow(clippy::expect_used)]
        let whole = captures.get(0).expect("capture 0 always present");
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        let name = &captures[1];
        let param = captures.get(2).map(|m| m.as_str());
        out.push_str(&resolve(name, param, ctx)?);
    }

    out.push_str(&template[last..]);
    Ok(out)
}

fn resolve(
    name: &str,
    param: Option<&str>,
    ctx: &TemplateContext<'_>,
) -> Result<String, TemplateError> {
    match (name, param) {
        ("input", None) => Ok(ctx.case.input.to_string_lossy().into_owned()),
        ("stdin", None) => ctx
            .case
            .stdin
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .ok_or(TemplateError::NoStdin),
        ("work_dir", None) => Ok(ctx.work_dir.to_string_lossy().into_owned()),
        ("case", None) => Ok(sanitize_component(&ctx.case.id)),
        ("artifact", None) => ctx
            .current_artifact
            .map(|p| p.to_string_lossy().into_owned())
            .ok_or_else(|| TemplateError::UnknownStage {
                stage: "<self>".to_string(),
            }),
        ("artifact", Some(stage)) => ctx
            .artifacts
            .get(stage)
            .map(|p| p.to_string_lossy().into_owned())
            .ok_or_else(|| TemplateError::UnknownStage {
                stage: stage.to_string(),
            }),
        (other, _) => Err(TemplateError::UnknownPlaceholder {
            name: other.to_string(),
        }),
    }
}

/// Lists the placeholders a template references, for validation.
pub(crate) fn placeholders(template: &str) -> Vec<(String, Option<String>)> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|c| (c[1].to_string(), c.get(2).map(|m| m.as_str().to_string())))
        .collect()
}
