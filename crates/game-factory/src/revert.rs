//! Decoding of revert payloads returned by simulation and estimation.

use std::path::{Path, PathBuf};

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::hex;
use serde::Deserialize;
use tracing::debug;

/// Error types for loading a contract ABI
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Failed to read file
    #[error("Failed to read ABI artifact {}: {source}", .path.display())]
    Read {
        /// Artifact path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The file is neither a compiler artifact nor a bare ABI array
    #[error("Failed to parse ABI artifact {}: {source}", .path.display())]
    Parse {
        /// Artifact path
        path: PathBuf,
        /// Underlying JSON failure
        source: serde_json::Error,
    },
}

/// Compiler output layout, as written by `forge build` to `out/<File>.sol/<Contract>.json`.
#[derive(Deserialize)]
struct Artifact {
    abi: JsonAbi,
}

/// Turns revert payloads into readable reasons.
///
/// Custom errors declared in the loaded ABI are tried first, then the built-in `Error(string)`
/// and `Panic(uint256)` shapes.
#[derive(Debug, Clone, Default)]
pub struct RevertDecoder {
    abi: Option<JsonAbi>,
}

impl RevertDecoder {
    /// A decoder that only knows the built-in revert shapes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A decoder that also knows the custom errors of `abi`.
    pub fn with_abi(abi: JsonAbi) -> Self {
        Self { abi: Some(abi) }
    }

    /// Parses either a compiler artifact (object with an `abi` field) or a bare ABI array.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let abi = if json.trim_start().starts_with('[') {
            serde_json::from_str::<JsonAbi>(json)?
        } else {
            serde_json::from_str::<Artifact>(json)?.abi
        };
        Ok(Self::with_abi(abi))
    }

    /// Loads the ABI from an artifact file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let json = std::fs::read_to_string(path)
            .map_err(|source| ArtifactError::Read { path: path.to_path_buf(), source })?;
        let decoder = Self::from_json(&json)
            .map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })?;
        debug!(
            path = %path.display(),
            errors = decoder.abi.as_ref().map_or(0, |abi| abi.errors().count()),
            "Loaded contract ABI"
        );
        Ok(decoder)
    }

    /// Decodes `data` into a reason, or `None` if no known shape matches.
    pub fn decode(&self, data: &[u8]) -> Option<String> {
        if data.is_empty() {
            return None;
        }
        self.decode_custom(data).or_else(|| alloy_sol_types::decode_revert_reason(data))
    }

    fn decode_custom(&self, data: &[u8]) -> Option<String> {
        let abi = self.abi.as_ref()?;
        let (selector, args) = data.split_first_chunk::<4>()?;
        let error = abi.errors().find(|error| error.selector().0 == *selector)?;
        let values = error.abi_decode_input(args).ok()?;
        Some(format!("{}({})", error.name, format_values(&values)))
    }
}

fn format_values(values: &[DynSolValue]) -> String {
    values.iter().map(format_value).collect::<Vec<_>>().join(", ")
}

fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Address(address) => address.to_string(),
        DynSolValue::Bool(flag) => flag.to_string(),
        DynSolValue::Int(int, _) => int.to_string(),
        DynSolValue::Uint(uint, _) => uint.to_string(),
        DynSolValue::String(string) => format!("{string:?}"),
        DynSolValue::Bytes(bytes) => hex::encode_prefixed(bytes),
        DynSolValue::FixedBytes(word, size) => hex::encode_prefixed(&word[..*size]),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            format!("[{}]", format_values(items))
        }
        DynSolValue::Tuple(items) => format!("({})", format_values(items)),
        other => format!("{other:?}"),
    }
}
