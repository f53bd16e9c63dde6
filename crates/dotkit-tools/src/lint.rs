//! PreToolUse hook that nudges shell commands toward better tools.
//!
//! Reads the hook payload from stdin. Exit code 2 blocks the command and
//! shows the suggestions to the agent; 1 reports a malformed payload.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use dotkit_core::{DotkitError, Result};

struct Rule {
    pattern: Regex,
    message: &'static str,
    /// Only fire when no pipe follows the match on the same line.
    unless_piped: bool,
}

fn rule(pattern: &str, message: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(&format!("(?i){pattern}")).expect("valid regex"),
        message,
        unless_piped: false,
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule {
            unless_piped: true,
            ..rule(
                r"^grep\b",
                "Use 'rg' (ripgrep) instead of 'grep' for better performance and features",
            )
        },
        rule(r"\bgrep -r\b", "Use 'rg' instead of 'grep -r' for recursive search (much faster)"),
        rule(
            r"^find\s+.*-name\b",
            "Use 'fd pattern' instead of 'find -name' for better performance and simpler syntax",
        ),
        rule(
            r"^find\s+.*-type\s+f",
            "Use 'fd --type f pattern' instead of 'find -type f' for finding files",
        ),
        rule(
            r"^find\s+.*-type\s+d",
            "Use 'fd --type d pattern' instead of 'find -type d' for finding directories",
        ),
        rule(r"^find\s+\.", "Use 'fd' instead of 'find .' for better performance and cleaner output"),
        rule(
            r"^cat\s+.*\.(py|js|ts|lua|rs|go|cpp|c|java|rb|sh|bash|zsh|fish|vim|yaml|yml|json|toml|md|markdown)(\s|$)",
            "Consider 'bat' instead of 'cat' for syntax highlighting (if available)",
        ),
        rule(r"^ps aux.*grep", "Use 'pgrep' or 'pidof' for finding processes by name"),
        rule(
            r"^kill -9\b",
            "Try 'kill' (SIGTERM) first before 'kill -9' (SIGKILL) to allow graceful shutdown",
        ),
        rule(
            r"^tar -?[cxz].*f\s+",
            "Consider using 'atool' for unified archive handling (works with tar, zip, rar, etc.)",
        ),
        rule(
            r"^curl\s+-X\s+POST.*-H.*application/json",
            "Consider using 'httpie' (http) for more readable JSON API interactions",
        ),
        rule(r"^du -sh\b", "Consider 'dust' or 'duf' for better disk usage visualization"),
        rule(r"^df -h\b", "Consider 'duf' for better disk free space visualization"),
        rule(r"cat.*\|.*grep", "Use 'rg pattern file' directly instead of 'cat file | grep pattern'"),
        rule(r"grep.*\|.*wc -l", "Use 'rg -c pattern' instead of 'grep pattern | wc -l' to count matches"),
        rule(
            r"find.*-exec.*rm",
            "Use 'fd pattern --exec rm {}' or 'fd pattern -X rm' for safer deletion",
        ),
    ]
});

const INSTALL_HINTS: &[(&str, &str)] = &[
    ("rg", "Install with: cargo install ripgrep OR apt install ripgrep"),
    ("fd", "Install with: cargo install fd-find OR apt install fd-find"),
    ("bat", "Install with: cargo install bat OR apt install bat"),
    ("dust", "Install with: cargo install du-dust"),
    ("duf", "Install with: go install github.com/muesli/duf@latest OR apt install duf"),
    ("httpie", "Install with: pip install httpie OR apt install httpie"),
    ("jq", "Install with: apt install jq"),
    ("atool", "Install with: apt install atool"),
    ("pgrep", "Usually pre-installed (part of procps)"),
];

static SUGGESTED_TOOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Use|Consider)\s+'(\w+)").expect("valid regex"));

/// Probes such as `which grep` are always fine.
static ALLOWED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^which\s+(grep|find|ls|cat|ps|tar|curl|du|df)\b",
        r"^command\s+-v\s+(grep|find|ls|cat|ps|tar|curl|du|df)\b",
        r"^type\s+(grep|find|ls|cat|ps|tar|curl|du|df)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

fn install_hint(message: &str) -> Option<&'static str> {
    let tool = SUGGESTED_TOOL.captures(message)?.get(1)?.as_str();
    INSTALL_HINTS
        .iter()
        .find(|(name, _)| *name == tool)
        .map(|(_, hint)| *hint)
}

impl Rule {
    fn matches(&self, command: &str) -> bool {
        let Some(m) = self.pattern.find(command) else {
            return false;
        };
        if !self.unless_piped {
            return true;
        }
        let rest_of_line = command[m.end()..].split('\n').next().unwrap_or("");
        !rest_of_line.contains('|')
    }
}

/// Suggestions for `command`, each followed by an install hint when the
/// suggested tool has one.
pub fn validate_command(command: &str) -> Vec<String> {
    let mut issues = Vec::new();
    for rule in RULES.iter().filter(|r| r.matches(command)) {
        issues.push(rule.message.to_string());
        if let Some(hint) = install_hint(rule.message) {
            issues.push(format!("  → {hint}"));
        }
    }
    issues
}

pub fn is_allowed_probe(command: &str) -> bool {
    ALLOWED.iter().any(|re| re.is_match(command))
}

#[derive(Debug, Default, Deserialize)]
struct HookPayload {
    #[serde(default)]
    tool_name: String,
    #[serde(default)]
    tool_input: ToolInput,
}

#[derive(Debug, Default, Deserialize)]
struct ToolInput {
    #[serde(default)]
    command: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    /// Not a shell command, empty, or an allowed probe.
    Ignored,
    Clean,
    Suggestions(Vec<String>),
}

impl LintOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            LintOutcome::Suggestions(_) => 2,
            _ => 0,
        }
    }

    /// Text for stderr, empty unless there are suggestions.
    pub fn report(&self) -> String {
        let LintOutcome::Suggestions(issues) = self else {
            return String::new();
        };
        let mut out = String::from("Command improvement suggestions:\n");
        for issue in issues {
            out.push_str(&format!("• {issue}\n"));
        }
        out
    }
}

/// Lint a raw hook payload. Invalid JSON is an [`DotkitError::InvalidInput`].
pub fn lint_hook_payload(raw: &str) -> Result<LintOutcome> {
    let payload: HookPayload = serde_json::from_str(raw)
        .map_err(|e| DotkitError::InvalidInput(format!("Invalid JSON input: {e}")))?;

    let command = payload.tool_input.command.as_str();
    if payload.tool_name != "Bash" || command.is_empty() || is_allowed_probe(command) {
        return Ok(LintOutcome::Ignored);
    }
    let issues = validate_command(command);
    Ok(if issues.is_empty() {
        LintOutcome::Clean
    } else {
        LintOutcome::Suggestions(issues)
    })
}
