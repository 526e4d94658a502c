//! SARIF (Static Analysis Results Interchange Format) output renderer.
//!
//! Converts a Report to SARIF 2.1.0 for code scanning tools. OK entries are
//! omitted, unreachable code becomes a `note`, and calling contexts become
//! `stacks`. Each result's `ruleId` is its check kind, and the driver lists
//! one rule for every kind that has a result.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use checkreport_types::{CheckKind, Statement, Status};

use crate::error::ReportError;
use crate::message::generate_message;
use crate::names::{call_chain, call_context_path};
use crate::render::{single_line, RenderContext};
use crate::report::{Report, StatementReport};
use crate::store::CheckStore;

/// SARIF schema URL
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

/// SARIF version
const SARIF_VERSION: &str = "2.1.0";

const TOOL_NAME: &str = "checkreport";

const TOOL_INFO_URI: &str = "https://github.com/NASA-SW-VnV/ikos";

/// Root SARIF document structure.
#[derive(Debug, Clone, Serialize)]
pub struct SarifReport {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

/// A single SARIF run (analysis execution).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRun {
    pub tool: SarifTool,
    pub artifacts: Vec<SarifArtifact>,
    pub results: Vec<SarifResult>,
}

/// Tool information (driver).
#[derive(Debug, Clone, Serialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

/// Tool driver with rules.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

/// Rule definition, one per reported check kind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    pub short_description: SarifMessage,
    pub full_description: SarifMessage,
    pub properties: SarifRuleProperties,
}

/// The analysis behind a rule.
#[derive(Debug, Clone, Serialize)]
pub struct SarifRuleProperties {
    pub analysis: String,
}

/// A source file referenced by the results.
#[derive(Debug, Clone, Serialize)]
pub struct SarifArtifact {
    pub location: SarifArtifactLocation,
}

/// SARIF result (diagnostic).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub rule_index: usize,
    pub level: SarifLevel,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stacks: Vec<SarifStack>,
}

/// SARIF severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SarifLevel {
    Error,
    Warning,
    Note,
}

impl SarifLevel {
    /// SARIF has no level for safe results.
    fn from_status(status: Status) -> Option<Self> {
        match status {
            Status::Error => Some(SarifLevel::Error),
            Status::Warning => Some(SarifLevel::Warning),
            Status::Unreachable => Some(SarifLevel::Note),
            Status::Ok => None,
        }
    }
}

/// Message with text.
#[derive(Debug, Clone, Serialize)]
pub struct SarifMessage {
    pub text: String,
}

/// Location of a result or stack frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<SarifMessage>,
}

/// Physical location with file and region.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<SarifRegion>,
}

/// Artifact (file) location.
#[derive(Debug, Clone, Serialize)]
pub struct SarifArtifactLocation {
    pub uri: String,
}

/// Region within a file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
}

/// Call stack of one calling context, innermost call first.
#[derive(Debug, Clone, Serialize)]
pub struct SarifStack {
    pub message: SarifMessage,
    pub frames: Vec<SarifStackFrame>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifStackFrame {
    pub location: SarifLocation,
}

/// Renders a Report as a SARIF 2.1.0 document.
///
/// Entries whose statement lacks a file, a positive line or a positive
/// column are skipped: SARIF results need a physical location.
pub fn render_sarif_for_report(
    report: &Report<'_>,
    ctx: &RenderContext,
) -> Result<SarifReport, ReportError> {
    let store = report.store();
    let mut artifacts = BTreeSet::new();
    let mut rule_indices: BTreeMap<CheckKind, usize> = BTreeMap::new();
    let mut rules = Vec::new();
    let mut results = Vec::new();

    for entry in report.ordered()? {
        let Some(level) = SarifLevel::from_status(entry.status) else {
            continue;
        };
        let statement = store.statement(entry.statement_id)?;
        let Some(uri) = ctx.statement_path(store, statement)? else {
            continue;
        };
        let (Some(line), Some(column)) = (statement.line, statement.column) else {
            continue;
        };
        if line == 0 || column == 0 {
            continue;
        }

        let message = generate_message(store, entry, ctx.options.verbosity)?;
        artifacts.insert(uri.clone());
        let rule_index = match rule_indices.entry(entry.kind) {
            Entry::Occupied(slot) => *slot.get(),
            Entry::Vacant(slot) => {
                rules.push(rule(entry.kind));
                *slot.insert(rules.len() - 1)
            }
        };
        results.push(SarifResult {
            rule_id: entry.kind.short_name().to_string(),
            rule_index,
            level,
            message: SarifMessage {
                text: single_line(&message),
            },
            locations: vec![SarifLocation {
                physical_location: physical_location(uri, statement),
                message: None,
            }],
            stacks: stacks(store, entry, ctx)?,
        });
    }

    Ok(SarifReport {
        schema: SARIF_SCHEMA.to_string(),
        version: SARIF_VERSION.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: TOOL_INFO_URI.to_string(),
                    rules,
                },
            },
            artifacts: artifacts
                .into_iter()
                .map(|uri| SarifArtifact {
                    location: SarifArtifactLocation { uri },
                })
                .collect(),
            results,
        }],
    })
}

/// Renders a SARIF report as a JSON string.
pub fn render_sarif_json(report: &Report<'_>, ctx: &RenderContext) -> Result<String, ReportError> {
    let sarif = render_sarif_for_report(report, ctx)?;
    let mut out = serde_json::to_string_pretty(&sarif)?;
    out.push('\n');
    Ok(out)
}

fn rule(kind: CheckKind) -> SarifRule {
    let checker = kind.checker();
    SarifRule {
        id: kind.short_name().to_string(),
        name: kind.long_name().to_string(),
        short_description: SarifMessage {
            text: kind.long_name().to_string(),
        },
        full_description: SarifMessage {
            text: format!("{}: {}", checker.long_name(), checker.rule_description()),
        },
        properties: SarifRuleProperties {
            analysis: checker.short_name().to_string(),
        },
    }
}

fn physical_location(uri: String, statement: &Statement) -> SarifPhysicalLocation {
    SarifPhysicalLocation {
        artifact_location: SarifArtifactLocation { uri },
        region: statement.line.map(|start_line| SarifRegion {
            start_line,
            start_column: statement.column,
        }),
    }
}

fn stacks(
    store: &dyn CheckStore,
    entry: &StatementReport,
    ctx: &RenderContext,
) -> Result<Vec<SarifStack>, ReportError> {
    let mut stacks = Vec::new();
    for &context_id in &entry.call_context_ids {
        let context = store.call_context(context_id)?;
        let mut frames = Vec::new();
        for frame in call_chain(store, context)?.into_iter().rev() {
            let Some(call_id) = frame.call_id else {
                continue;
            };
            let call = store.statement(call_id)?;
            let caller = store.function(call.function_id)?;
            let uri = ctx
                .statement_path(store, call)?
                .unwrap_or_else(|| "?".to_string());
            frames.push(SarifStackFrame {
                location: SarifLocation {
                    physical_location: physical_location(uri, call),
                    message: Some(SarifMessage {
                        text: format!("Call from {}", caller.pretty_name()),
                    }),
                },
            });
        }
        if !frames.is_empty() {
            stacks.push(SarifStack {
                message: SarifMessage {
                    text: call_context_path(store, context)?,
                },
                frames,
            });
        }
    }
    Ok(stacks)
}
