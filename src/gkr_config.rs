//! Environment-driven tuning for the GKR prover.
//!
//! Every knob has a static entry in `GKR_PARAMS`; `GkrConfig::from_env` parses
//! them with bounds checks and falls back to defaults for absent variables.

use crate::gkr_error::GkrError;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const GKR_SUMCHECK_JOB_SIZE: &str = "GKR_SUMCHECK_JOB_SIZE";
pub const GKR_SUMCHECK_MAX_WORKERS: &str = "GKR_SUMCHECK_MAX_WORKERS";
pub const GKR_SUMCHECK_PARALLEL: &str = "GKR_SUMCHECK_PARALLEL";
pub const GKR_POOL_CAPACITY: &str = "GKR_POOL_CAPACITY";

pub const DEFAULT_JOB_SIZE: usize = 1024;
pub const DEFAULT_POOL_CAPACITY: usize = 1 << 11;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GkrParamType {
    Bool,
    U64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GkrValue {
    Bool(bool),
    U64(u64),
}

#[derive(Clone, Debug, Serialize)]
pub struct GkrParam {
    pub name: &'static str,
    pub kind: GkrParamType,
    pub min: Option<u64>,
    pub max: Option<u64>,
}

const GKR_PARAMS: &[GkrParam] = &[
    GkrParam { name: GKR_SUMCHECK_JOB_SIZE, kind: GkrParamType::U64, min: Some(1), max: None },
    GkrParam { name: GKR_SUMCHECK_MAX_WORKERS, kind: GkrParamType::U64, min: Some(1), max: Some(1024) },
    GkrParam { name: GKR_SUMCHECK_PARALLEL, kind: GkrParamType::Bool, min: None, max: None },
    GkrParam { name: GKR_POOL_CAPACITY, kind: GkrParamType::U64, min: Some(0), max: None },
];

/// Resolved prover settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GkrConfig {
    /// Hypercube rows handled by one round-polynomial job.
    pub job_size: usize,
    /// Upper bound on round-polynomial workers; `None` means available parallelism.
    pub max_workers: Option<usize>,
    /// Run round-polynomial jobs on the worker pool.
    pub parallel: bool,
    /// Idle buffers retained by a scratch pool built during setup.
    pub pool_capacity: usize,
}

impl Default for GkrConfig {
    fn default() -> Self {
        Self {
            job_size: DEFAULT_JOB_SIZE,
            max_workers: None,
            parallel: true,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("invalid bool: {raw}")),
    }
}

fn parse_param(param: &GkrParam, raw: &str) -> Result<GkrValue, String> {
    match param.kind {
        GkrParamType::Bool => Ok(GkrValue::Bool(parse_bool(raw)?)),
        GkrParamType::U64 => {
            let value = raw.trim().parse::<u64>().map_err(|_| format!("invalid u64: {raw}"))?;
            if let Some(min) = param.min {
                if value < min {
                    return Err(format!("value below min {min}: {raw}"));
                }
            }
            if let Some(max) = param.max {
                if value > max {
                    return Err(format!("value above max {max}: {raw}"));
                }
            }
            Ok(GkrValue::U64(value))
        }
    }
}

fn to_usize(name: &str, value: u64) -> Result<usize, GkrError> {
    usize::try_from(value).map_err(|_| GkrError::Config(format!("{name}: value {value} exceeds usize")))
}

impl GkrConfig {
    /// Builds a config from `(name, raw value)` pairs; unknown names are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, GkrError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (name, raw) in pairs {
            let Some(param) = GKR_PARAMS.iter().find(|p| p.name == name) else {
                continue;
            };
            let value = parse_param(param, raw).map_err(|e| GkrError::Config(format!("{name}: {e}")))?;
            match (param.name, value) {
                (GKR_SUMCHECK_JOB_SIZE, GkrValue::U64(v)) => config.job_size = to_usize(name, v)?,
                (GKR_SUMCHECK_MAX_WORKERS, GkrValue::U64(v)) => {
                    config.max_workers = Some(to_usize(name, v)?)
                }
                (GKR_SUMCHECK_PARALLEL, GkrValue::Bool(v)) => config.parallel = v,
                (GKR_POOL_CAPACITY, GkrValue::U64(v)) => config.pool_capacity = to_usize(name, v)?,
                _ => {}
            }
        }
        Ok(config)
    }

    /// Reads every `GKR_*` variable of the parameter table from the process environment.
    pub fn from_env() -> Result<Self, GkrError> {
        let mut present = Vec::new();
        for param in GKR_PARAMS {
            match std::env::var(param.name) {
                Ok(raw) => present.push((param.name, raw)),
                Err(std::env::VarError::NotPresent) => {}
                Err(err) => {
                    return Err(GkrError::Config(format!("{}: env error: {err}", param.name)));
                }
            }
        }
        Self::from_pairs(present.iter().map(|(name, raw)| (*name, raw.as_str())))
    }

    /// Process-wide config, read from the environment once.
    pub fn global() -> Result<&'static GkrConfig, GkrError> {
        static CONFIG: OnceLock<Result<GkrConfig, GkrError>> = OnceLock::new();
        match CONFIG.get_or_init(Self::from_env) {
            Ok(cfg) => Ok(cfg),
            Err(err) => Err(err.clone()),
        }
    }

    pub fn snapshot_json(&self) -> Result<String, GkrError> {
        let report = serde_json::json!({
            "config": self,
            "params": GKR_PARAMS,
        });
        serde_json::to_string_pretty(&report).map_err(|e| GkrError::Config(format!("snapshot serialize failed: {e}")))
    }
}
