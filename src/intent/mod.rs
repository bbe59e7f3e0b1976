//! Intent classification - map a tool invocation to intent tokens.
//!
//! The classifier is a pure total function: every (tool name, params) pair
//! yields a non-empty sequence of intents from the fixed vocabulary. Tools
//! that operate on a file get their `write`/`edit` intent refined by the
//! target path; shell commands are split on separators and classified per
//! segment. Anything unrecognized classifies as `run`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A classified tool action.
///
/// This is the wire-visible vocabulary: catalogs may gate any of these
/// names but may not coin new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Write,
    Edit,
    Commit,
    Push,
    Deploy,
    Delete,
    WriteTest,
    WriteImpl,
    WriteDocs,
    WriteConfig,
    EditTest,
    EditImpl,
    EditDocs,
    EditConfig,
    Read,
    Run,
}

impl Intent {
    /// Every intent, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::Write,
        Self::Edit,
        Self::Commit,
        Self::Push,
        Self::Deploy,
        Self::Delete,
        Self::WriteTest,
        Self::WriteImpl,
        Self::WriteDocs,
        Self::WriteConfig,
        Self::EditTest,
        Self::EditImpl,
        Self::EditDocs,
        Self::EditConfig,
        Self::Read,
        Self::Run,
    ];

    /// Wire name of the intent (snake_case, as used in catalogs).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Edit => "edit",
            Self::Commit => "commit",
            Self::Push => "push",
            Self::Deploy => "deploy",
            Self::Delete => "delete",
            Self::WriteTest => "write_test",
            Self::WriteImpl => "write_impl",
            Self::WriteDocs => "write_docs",
            Self::WriteConfig => "write_config",
            Self::EditTest => "edit_test",
            Self::EditImpl => "edit_impl",
            Self::EditDocs => "edit_docs",
            Self::EditConfig => "edit_config",
            Self::Read => "read",
            Self::Run => "run",
        }
    }

    /// Parse a wire name back into an intent.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|i| i.as_str() == name)
    }

    /// Intents retained under `soft` tier enforcement.
    #[must_use]
    pub const fn is_high_impact(&self) -> bool {
        matches!(
            self,
            Self::WriteImpl | Self::Commit | Self::Push | Self::Deploy | Self::Delete
        )
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File category used to refine `write`/`edit` intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathKind {
    Test,
    Docs,
    Config,
    Impl,
}

/// Filenames that always classify as config, regardless of extension.
const CONFIG_FILENAMES: [&str; 7] = [
    "package.json",
    "Cargo.toml",
    "go.mod",
    "pyproject.toml",
    "vercel.json",
    "netlify.toml",
    "Dockerfile",
];

/// Extensions that classify as docs.
const DOCS_EXTENSIONS: [&str; 5] = ["md", "mdx", "rst", "adoc", "txt"];

/// Extensions that classify as config.
const CONFIG_EXTENSIONS: [&str; 4] = ["yaml", "yml", "toml", "ini"];

/// Classify a tool invocation into a non-empty sequence of intents.
#[must_use]
pub fn classify(tool_name: &str, tool_input: &Value) -> Vec<Intent> {
    let intents = match tool_name {
        "Write" => vec![file_intent(tool_input, true)],
        "Edit" | "MultiEdit" | "NotebookEdit" => vec![file_intent(tool_input, false)],
        "Read" | "Glob" | "Grep" => vec![Intent::Read],
        "Bash" | "Shell" => tool_input
            .get("command")
            .and_then(Value::as_str)
            .map_or_else(|| vec![Intent::Run], classify_command),
        _ => vec![Intent::Run],
    };
    debug_assert!(!intents.is_empty());
    intents
}

/// Refine a file-tool invocation via its target path.
fn file_intent(tool_input: &Value, write: bool) -> Intent {
    let path = tool_input
        .get("file_path")
        .or_else(|| tool_input.get("path"))
        .or_else(|| tool_input.get("notebook_path"))
        .and_then(Value::as_str);

    let Some(path) = path else {
        return if write { Intent::Write } else { Intent::Edit };
    };

    match classify_path(path) {
        PathKind::Test => {
            if write {
                Intent::WriteTest
            } else {
                Intent::EditTest
            }
        }
        PathKind::Docs => {
            if write {
                Intent::WriteDocs
            } else {
                Intent::EditDocs
            }
        }
        PathKind::Config => {
            if write {
                Intent::WriteConfig
            } else {
                Intent::EditConfig
            }
        }
        PathKind::Impl => {
            if write {
                Intent::WriteImpl
            } else {
                Intent::EditImpl
            }
        }
    }
}

/// Classify a file path; first match wins: test, docs, config, impl.
fn classify_path(path: &str) -> PathKind {
    let normalized = path.replace('\\', "/");
    let components: Vec<&str> = normalized.split('/').filter(|c| !c.is_empty()).collect();
    let filename = components.last().copied().unwrap_or("");
    let extension = filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

    let dir_components = &components[..components.len().saturating_sub(1)];
    let in_test_dir = dir_components
        .iter()
        .any(|c| matches!(*c, "test" | "tests" | "__tests__"));
    let test_filename = filename.contains(".test.")
        || filename.contains(".spec.")
        || filename.contains("_test.");
    if in_test_dir || test_filename {
        return PathKind::Test;
    }

    if DOCS_EXTENSIONS.contains(&extension) || dir_components.contains(&"docs") {
        return PathKind::Docs;
    }

    let config_filename = CONFIG_FILENAMES.contains(&filename)
        || (filename.starts_with("tsconfig") && filename.ends_with(".json"))
        || filename.starts_with("wrangler.")
        || filename.starts_with("docker-compose.");
    if config_filename || CONFIG_EXTENSIONS.contains(&extension) {
        return PathKind::Config;
    }

    PathKind::Impl
}

/// Classify a shell command by splitting on `;`, `&&`, `||`, `|` and
/// examining each segment's leading tokens.
fn classify_command(command: &str) -> Vec<Intent> {
    let mut intents = Vec::new();
    for segment in split_segments(command) {
        let intent = classify_segment(&segment);
        if !intents.contains(&intent) {
            intents.push(intent);
        }
    }
    if intents.is_empty() {
        intents.push(Intent::Run);
    }
    intents
}

/// Split a command line on shell separators. No quote awareness: the
/// classifier only needs the leading token of each segment, and a quoted
/// separator at worst yields an extra `run`.
fn split_segments(command: &str) -> Vec<String> {
    command
        .replace("&&", ";")
        .replace("||", ";")
        .replace('|', ";")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn classify_segment(segment: &str) -> Intent {
    let mut tokens = segment
        .split_whitespace()
        .skip_while(|t| t.contains('=') && !t.starts_with('='));
    let Some(first) = tokens.next() else {
        return Intent::Run;
    };
    let program = first.rsplit('/').next().unwrap_or(first);
    // Subcommand = first token that is not a flag or a flag's path/value
    // argument (`git -C /repo commit` must still see `commit`).
    let sub = tokens.find(|t| !t.starts_with('-') && !t.contains('/') && !t.contains('='));

    match (program, sub) {
        ("git", Some("commit")) => Intent::Commit,
        ("git", Some("push")) => Intent::Push,
        ("rm" | "rmdir", _) => Intent::Delete,
        ("kubectl" | "terraform", Some("apply")) => Intent::Deploy,
        ("fly" | "flyctl" | "vercel" | "netlify" | "wrangler", Some("deploy" | "publish")) => {
            Intent::Deploy
        }
        ("npm" | "yarn" | "pnpm" | "cargo", Some("publish")) => Intent::Deploy,
        _ => Intent::Run,
    }
}
