//! Static script heuristics for resume support.
//!
//! Each rule is a literal substring looked up in script sources. Only rules
//! flagged `implies_resume` affect the classification; the rest are
//! reported as diagnostics.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRule {
    pub pattern: &'static str,
    pub finding: &'static str,
    pub implies_resume: bool,
}

pub const SCRIPT_RULES: &[ScriptRule] = &[
    ScriptRule {
        pattern: "cmi.suspend_data",
        finding: "suspend data persistence (cmi.suspend_data)",
        implies_resume: true,
    },
    ScriptRule {
        pattern: "cmi.core.lesson_location",
        finding: "bookmark location persistence (cmi.core.lesson_location)",
        implies_resume: true,
    },
    ScriptRule {
        pattern: "cmi.location",
        finding: "bookmark location persistence (cmi.location)",
        implies_resume: true,
    },
    ScriptRule {
        pattern: "cmi.core.lesson_status",
        finding: "lesson status reporting (cmi.core.lesson_status)",
        implies_resume: false,
    },
    ScriptRule {
        pattern: "cmi.completion_status",
        finding: "completion status reporting (cmi.completion_status)",
        implies_resume: false,
    },
    ScriptRule {
        pattern: "LMSInitialize",
        finding: "LMS initialization call (LMSInitialize)",
        implies_resume: false,
    },
    ScriptRule {
        pattern: ".Initialize(",
        finding: "LMS initialization call (Initialize)",
        implies_resume: false,
    },
];

/// Rules whose pattern occurs in `source`, in table order.
pub fn matching_rules(source: &str) -> impl Iterator<Item = &'static ScriptRule> + '_ {
    SCRIPT_RULES
        .iter()
        .filter(move |rule| source.contains(rule.pattern))
}

/// Aggregated outcome of scanning a bounded set of scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptScan {
    pub files_scanned: Vec<String>,
    /// Distinct finding labels, in first-seen order.
    pub findings: Vec<&'static str>,
    pub resume_evidence: bool,
}

impl ScriptScan {
    pub fn record(&mut self, file_name: &str, source: &str) {
        self.files_scanned.push(file_name.to_string());
        for rule in matching_rules(source) {
            if rule.implies_resume {
                self.resume_evidence = true;
            }
            if !self.findings.contains(&rule.finding) {
                self.findings.push(rule.finding);
            }
        }
    }
}

/// Whether an archive entry is a script worth scanning.
pub fn is_script_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".js")
}
