//! Tracing configuration for hosts embedding the engine.
//!
//! Supports three output formats controlled by `TGEN_LOG_FORMAT`:
//!
//! - `text` (default): standard `tracing-subscriber` flat output
//! - `tree`: hierarchical indented output via `tracing-tree`, handy for
//!   following one inhabitation search or inference walk
//! - `json`: one JSON object per span/event, for log pipelines
//!
//! ## Quick start
//!
//! ```bash
//! # Solver decisions as an indented tree
//! TGEN_LOG=tgen_solver=trace TGEN_LOG_FORMAT=tree my-inference-server
//!
//! # JSON, everything at debug
//! TGEN_LOG=debug TGEN_LOG_FORMAT=json my-inference-server
//!
//! # Fine-grained filtering
//! TGEN_LOG="tgen_constraints=debug,tgen_lang=trace" my-inference-server
//! ```
//!
//! The subscriber is only initialised when `TGEN_LOG` (or `RUST_LOG`) is
//! set, so hosts that configure tracing themselves are left alone.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "TGEN_LOG";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "TGEN_LOG_FORMAT";

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Standard flat text lines.
    #[default]
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a format name; unrecognised names fall back to `Text`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var(LOG_FORMAT_ENV).unwrap_or_default())
    }
}

/// Build an `EnvFilter` from `TGEN_LOG`, falling back to `RUST_LOG`.
///
/// `TGEN_LOG` takes precedence when both are set.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var(LOG_ENV) {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `TGEN_LOG` nor `RUST_LOG` is set, or when
/// the host already installed a global subscriber. Output goes to stderr
/// so it never mixes with generated text on stdout.
pub fn init_tracing() {
    let has_tgen_log = std::env::var(LOG_ENV).is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_tgen_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    let installed = match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).try_init().is_ok()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).try_init().is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    };
    if !installed {
        tracing::debug!("global subscriber already set, keeping it");
    }
}
