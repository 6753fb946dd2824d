pub mod validator;

pub use validator::{pipeline_stages, CommandValidator, ValidatedCommand, ValidationError};

use std::collections::HashSet;
use std::fmt;

/// Executables permitted as the leading token of any pipeline stage
///
/// This list is used both as the compiled-in default for `AllowList` and as
/// the default value of `security.allowed_commands` in the config file.
///
/// Adding a new executable requires careful security review: anything listed
/// here can run with arbitrary arguments.
pub const DEFAULT_ALLOWED_COMMANDS: &[&str] = &[
    // Cluster inspection
    "kubectl",
    "k",
    // Output filtering
    "grep",
    "cat",
    "tail",
    "head",
    "less",
];

/// Immutable set of executable names a command may invoke
///
/// There is no way to add an entry once the list is built, and building an
/// empty list fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    commands: HashSet<String>,
}

impl AllowList {
    /// Build an allow-list from executable names
    ///
    /// Entries are trimmed and blank entries dropped. Fails with
    /// `ValidationError::EmptyAllowList` if nothing is left.
    pub fn new<I, S>(commands: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let commands: HashSet<String> = commands
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if commands.is_empty() {
            return Err(ValidationError::EmptyAllowList);
        }

        Ok(Self { commands })
    }

    /// Exact-match membership check
    pub fn contains(&self, executable: &str) -> bool {
        self.commands.contains(executable)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Entries in sorted order, for display
    pub fn sorted(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = self.commands.iter().map(String::as_str).collect();
        entries.sort_unstable();
        entries
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self {
            commands: DEFAULT_ALLOWED_COMMANDS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl fmt::Display for AllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sorted().join(", "))
    }
}
