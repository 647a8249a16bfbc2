// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Shared determinism and error primitives for peerbench crates.

pub mod canonical;
mod errors;
mod paths;

pub use errors::{ExitCode, MachineError};
pub use paths::{
    env_bool, resolve_policy_path, ConfigPathScope, ENV_PEERBENCH_LOG_JSON,
    ENV_PEERBENCH_LOG_LEVEL, ENV_PEERBENCH_POLICY_PATH, WORKSPACE_POLICY_PATH,
};

pub const CRATE_NAME: &str = "peerbench-core";
