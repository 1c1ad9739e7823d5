//! Constants shared across the engine.

/// Environment variable name prefixes collected into the info document's `env` subset.
pub const ENV_PREFIXES: [&str; 3] = ["PBS_", "SLURM_", "OSG"];

/// File suffixes appended to a formatted output prefix to derive each log path.
pub struct Suffixes;

impl Suffixes {
    pub const STDOUT: &'static str = "stdout";
    pub const STDERR: &'static str = "stderr";
    pub const USAGE: &'static str = "usage.jsonl";
    /// Superseded by [`Suffixes::USAGE`]; kept only so readers of old prefixes
    /// recognize the legacy single-JSON-document usage format.
    pub const USAGE_LEGACY: &'static str = "usage.json";
    pub const INFO: &'static str = "info.json";
}

/// Schema version of the info/usage JSON documents (semver).
pub const SCHEMA_VERSION: &str = "0.2.2";

/// Version string embedded in the info document.
pub const DUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default output prefix template, honoring `{datetime}` and `{pid}` placeholders.
pub const DEFAULT_OUTPUT_PREFIX: &str = ".duct/logs/{datetime}-{pid}_";
