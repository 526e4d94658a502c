//! Common test fixtures for checkreport.
//!
//! Sample store dumps and configuration files shared by the unit, property
//! and CLI tests across the workspace.

use checkreport_types::{ConfigFile, Defaults, ReportFormat};

// =============================================================================
// Sample Stores
// =============================================================================

/// Collection of sample analyzer stores for testing.
pub mod sample_stores {
    use checkreport_types::{
        CheckKind, Checker, MemoryLocationInfo, MemoryLocationKind, Status, StoreDump, ValueKind,
        ANALYZER_PASS,
    };
    use serde_json::json;

    use crate::store_builder::StoreBuilder;

    /// A store with no rows at all.
    pub fn empty() -> StoreDump {
        StoreDump::default()
    }

    /// One null dereference observed in two calling contexts.
    ///
    /// `main` calls `use` twice (lines 10 and 11); `use` dereferences `p`
    /// at line 4. Both contexts report the same error.
    pub fn null_deref_two_contexts() -> StoreDump {
        StoreBuilder::new()
            .file(1, "src/main.c")
            .function(1, "main", Some(1))
            .function(2, "use", Some(1))
            .call_statement(1, 1, Some(1), 10, 3)
            .call_statement(2, 1, Some(1), 11, 3)
            .statement(3, 2, Some(1), 4, 10)
            .operand(1, ValueKind::LocalVariable, "use.p")
            .root_context(1, 1)
            .call_context(2, 1, 1, 1)
            .call_context(3, 2, 1, 1)
            .check(3, 2, CheckKind::NullPointerDereference, Status::Error)
            .operands(&[(0, 1)])
            .check(3, 3, CheckKind::NullPointerDereference, Status::Error)
            .operands(&[(0, 1)])
            .timing(ANALYZER_PASS, 0.25)
            .build()
    }

    /// A single division whose divisor ranges over `[-5, 5]`.
    pub fn division_warning() -> StoreDump {
        StoreBuilder::new()
            .file(1, "src/div.c")
            .function(1, "main", Some(1))
            .statement(1, 1, Some(1), 7, 14)
            .operand(1, ValueKind::LocalVariable, "main.divisor")
            .root_context(1, 1)
            .check(1, 1, CheckKind::DivisionByZero, Status::Warning)
            .operands(&[(1, 1)])
            .info(json!({"type": "s32", "lb": -5, "ub": 5}))
            .build()
    }

    /// Every outcome at least once: safe, warning, error, unreachable, plus
    /// a statement without source location and an ignored-store warning.
    pub fn mixed() -> StoreDump {
        StoreBuilder::new()
            .file(1, "src/mixed.c")
            .function(1, "main", Some(1))
            .statement(1, 1, Some(1), 3, 5)
            .statement(2, 1, Some(1), 4, 5)
            .statement(3, 1, Some(1), 5, 9)
            .statement(4, 1, Some(1), 8, 1)
            .synthetic_statement(5, 1)
            .operand(1, ValueKind::LocalVariable, "main.p")
            .operand(2, ValueKind::LocalVariable, "main.n")
            .operand(3, ValueKind::IntegerConstant, "1")
            .memory_location(
                1,
                MemoryLocationKind::Local,
                Some(MemoryLocationInfo {
                    name: Some("main.buf".to_string()),
                    ..MemoryLocationInfo::default()
                }),
            )
            .root_context(1, 1)
            .check(1, 1, CheckKind::NullPointerDereference, Status::Ok)
            .operands(&[(0, 1)])
            .check(2, 1, CheckKind::UninitializedVariable, Status::Error)
            .operands(&[(0, 2)])
            .check(3, 1, CheckKind::SignedIntOverflow, Status::Warning)
            .operands(&[(0, 2), (1, 3)])
            .info(json!({
                "left": {"type": "s32", "lb": 0, "ub": 2147483647},
                "right": {"type": "s32", "lb": 1, "ub": 1}
            }))
            .check(4, 1, CheckKind::Unreachable, Status::Unreachable)
            .check(5, 1, CheckKind::IgnoredStore, Status::Warning)
            .operands(&[(1, 1)])
            .timing(ANALYZER_PASS, 1.5)
            .timing("ikos-analyzer.value", 1.25)
            .timing("clang", 0.125)
            .build()
    }

    /// A statement that is unreachable in every context, and one that the
    /// dead-code checker never looked at.
    pub fn unreachable() -> StoreDump {
        StoreBuilder::new()
            .file(1, "src/dead.c")
            .function(1, "main", Some(1))
            .statement(1, 1, Some(1), 12, 3)
            .statement(2, 1, Some(1), 13, 3)
            .root_context(1, 1)
            .check(1, 1, CheckKind::Unreachable, Status::Unreachable)
            .check_by(2, 1, CheckKind::Assert, Checker::AssertionProver, Status::Unreachable)
            .build()
    }

    /// All sample stores with their names.
    pub fn all() -> Vec<(&'static str, StoreDump)> {
        vec![
            ("empty", empty()),
            ("null_deref_two_contexts", null_deref_two_contexts()),
            ("division_warning", division_warning()),
            ("mixed", mixed()),
            ("unreachable", unreachable()),
        ]
    }
}

// =============================================================================
// Sample Configs
// =============================================================================

/// Collection of sample configuration files for testing.
pub mod sample_configs {
    use super::*;

    /// The built-in defaults.
    pub fn built_in() -> ConfigFile {
        ConfigFile::default()
    }

    /// A config that only sets some defaults; the rest fall back.
    pub fn partial() -> ConfigFile {
        ConfigFile {
            defaults: Defaults {
                format: Some(ReportFormat::Csv),
                verbosity: None,
                status_filter: Some("error".to_string()),
                analyses_filter: None,
                max_call_depth: None,
                auto_threshold: None,
            },
        }
    }

    /// TOML text of a config selecting SARIF at verbosity 2.
    pub fn sarif_toml() -> &'static str {
        r#"[defaults]
format = "sarif"
verbosity = 2
analyses_filter = "nullity,boa"
"#
    }

    /// TOML text whose status filter comes from the environment.
    pub fn env_toml() -> &'static str {
        r#"[defaults]
format = "text"
status_filter = "${CHECKREPORT_STATUS:-error}"
"#
    }
}
