// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

pub const ENV_PEERBENCH_LOG_LEVEL: &str = "PEERBENCH_LOG_LEVEL";
pub const ENV_PEERBENCH_LOG_JSON: &str = "PEERBENCH_LOG_JSON";
pub const ENV_PEERBENCH_POLICY_PATH: &str = "PEERBENCH_POLICY_PATH";

pub const WORKSPACE_POLICY_PATH: &str = ".peerbench/policy.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigPathScope {
    /// `PEERBENCH_POLICY_PATH`, then `$XDG_CONFIG_HOME/peerbench/policy.json`, then `~/.config`.
    User,
    Workspace,
}

#[must_use]
pub fn resolve_policy_path(scope: ConfigPathScope) -> PathBuf {
    match scope {
        ConfigPathScope::User => {
            if let Some(explicit) = non_empty_env(ENV_PEERBENCH_POLICY_PATH) {
                return PathBuf::from(explicit);
            }
            if let Some(xdg_config_home) = non_empty_env("XDG_CONFIG_HOME") {
                return PathBuf::from(xdg_config_home)
                    .join("peerbench")
                    .join("policy.json");
            }
            if let Some(home) = non_empty_env("HOME") {
                return PathBuf::from(home)
                    .join(".config")
                    .join("peerbench")
                    .join("policy.json");
            }
            PathBuf::from(WORKSPACE_POLICY_PATH)
        }
        ConfigPathScope::Workspace => PathBuf::from(WORKSPACE_POLICY_PATH),
    }
}

#[must_use]
pub fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn non_empty_env(name: &str) -> Option<String> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
