//! `${VAR}` and `${VAR:-default}` expansion for configuration text.
//!
//! Expansion runs on the raw TOML before parsing, so a reference may appear
//! anywhere in the file. `${VAR}` fails when VAR is unset; `${VAR:-default}`
//! falls back when VAR is unset or empty. A `$` not followed by `{` is kept.

use std::borrow::Cow;

use anyhow::{bail, Result};

/// Expands references against the process environment.
pub fn expand_env_vars(text: &str) -> Result<Cow<'_, str>> {
    expand_with(text, |name| std::env::var(name).ok())
}

/// Expands references, resolving names through `lookup`.
pub fn expand_with<F>(text: &str, lookup: F) -> Result<Cow<'_, str>>
where
    F: Fn(&str) -> Option<String>,
{
    if !text.contains("${") {
        return Ok(Cow::Borrowed(text));
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let Some(end) = body.find('}') else {
            let preview: String = body.chars().take(20).collect();
            bail!(
                "unclosed environment variable reference at byte {}: ${{{preview}",
                text.len() - rest.len() + start
            );
        };
        out.push_str(&resolve(&body[..end], &lookup)?);
        rest = &body[end + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

fn resolve<F>(reference: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match reference.split_once(":-") {
        Some((name, default)) => {
            check_name(name)?;
            Ok(lookup(name)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string()))
        }
        None => {
            check_name(reference)?;
            match lookup(reference) {
                Some(value) => Ok(value),
                None => bail!(
                    "environment variable '{reference}' is not set \
                     (use ${{{reference}:-default}} to provide a fallback)"
                ),
            }
        }
    }
}

fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    match chars.next() {
        None => bail!("empty environment variable name in ${{}}"),
        Some(first) if !(first.is_ascii_alphabetic() || first == '_') => {
            bail!("invalid environment variable name '{name}': must start with a letter or underscore")
        }
        Some(_) => {}
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        bail!("invalid environment variable name '{name}': contains '{bad}'");
    }
    Ok(())
}
