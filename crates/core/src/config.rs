// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed configuration for the router. Loading it from a file or CLI flag is the host's
//! responsibility; this crate only defines and validates the shape.

use serde::{Deserialize, Serialize};

/// Configuration handed to [`crate::Clock`]-generic router components on `bind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Node count forwarded to node-aware listeners on attach.
    pub max_node_count: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { max_node_count: 1 }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
