// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Slicing configuration system

use crate::io::ExportFormat;
use crate::slice::SliceOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up by [`SliceConfig::load`]
pub const CONFIG_FILE: &str = "meshslice.toml";

/// Slicing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// Directory receiving exported halves
    pub output_dir: PathBuf,
    /// Format used when an output path has no recognised extension
    pub format: ExportFormat,
    /// Verbose output
    pub verbose: bool,
    /// Kernel options
    pub options: SliceOptions,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: ExportFormat::Stl,
            verbose: false,
            options: SliceOptions::default(),
        }
    }
}

impl SliceConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: SliceConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `meshslice.toml` from the working directory if present, then
    /// apply environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if Path::new(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `MESHSLICE_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(close_holes) = lookup("MESHSLICE_CLOSE_HOLES") {
            self.options.close_holes = close_holes
                .parse()
                .with_context(|| format!("MESHSLICE_CLOSE_HOLES is not a boolean: {}", close_holes))?;
        }

        if let Some(tolerance) = lookup("MESHSLICE_TOLERANCE") {
            self.options.on_plane_tolerance = tolerance
                .parse()
                .with_context(|| format!("MESHSLICE_TOLERANCE is not a number: {}", tolerance))?;
        }

        if let Some(output_dir) = lookup("MESHSLICE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(output_dir);
        }

        if let Some(format) = lookup("MESHSLICE_FORMAT") {
            self.format = <ExportFormat as clap::ValueEnum>::from_str(&format, true)
                .map_err(|e| anyhow::anyhow!("MESHSLICE_FORMAT: {}", e))?;
        }

        if let Some(verbose) = lookup("MESHSLICE_VERBOSE") {
            self.verbose = verbose
                .parse()
                .with_context(|| format!("MESHSLICE_VERBOSE is not a boolean: {}", verbose))?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
