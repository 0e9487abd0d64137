//! Add parameters
//!
//! [`AddParams`] is built once by the caller and read-only afterwards. It
//! deserializes from a query string (`?layout=trickle&raw-leaves=true`), with
//! every missing option falling back to its default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cid::{HashFunction, Prefix};
use crate::error::{AddError, Result};

/// Default chunker: fixed 256 KiB blocks
pub const DEFAULT_CHUNKER: &str = "size-262144";

/// Default hash function name
pub const DEFAULT_HASH_FUN: &str = "sha2-256";

/// Shape of the DAG built for each file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Layout {
    #[default]
    Balanced,
    Trickle,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Trickle => "trickle",
        }
    }
}

impl FromStr for Layout {
    type Err = AddError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "balanced" => Ok(Self::Balanced),
            "trickle" => Ok(Self::Trickle),
            other => Err(AddError::config_error(format!("unknown layout: {other}"))),
        }
    }
}

impl TryFrom<String> for Layout {
    type Error = AddError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Layout> for String {
    fn from(layout: Layout) -> Self {
        layout.as_str().to_string()
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options recognized by the adder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AddParams {
    /// Include dotfiles
    pub hidden: bool,
    pub layout: Layout,
    /// Store leaf data without wrapper framing
    pub raw_leaves: bool,
    /// Wrap the result in a directory node
    pub wrap: bool,
    /// Chunking algorithm descriptor, interpreted by the DAG builder
    pub chunker: String,
    /// Emit progress events
    pub progress: bool,
    pub cid_version: u64,
    /// Hash function name, matched case-insensitively
    pub hash_fun: String,
}

impl Default for AddParams {
    fn default() -> Self {
        Self {
            hidden: false,
            layout: Layout::Balanced,
            raw_leaves: false,
            wrap: false,
            chunker: DEFAULT_CHUNKER.to_string(),
            progress: false,
            cid_version: 0,
            hash_fun: DEFAULT_HASH_FUN.to_string(),
        }
    }
}

impl AddParams {
    /// Resolve the identifier version and hash function into the prefix
    /// every node of the add will use.
    pub fn prefix(&self) -> Result<Prefix> {
        let prefix = Prefix::for_cid_version(self.cid_version)?;

        let hash = HashFunction::from_name(&self.hash_fun).ok_or_else(|| {
            AddError::config_error(format!("unrecognized hash function: {}", self.hash_fun))
        })?;

        prefix.with_hash(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cid::Version;

    #[test]
    fn test_defaults() {
        let params = AddParams::default();
        assert_eq!(params.layout, Layout::Balanced);
        assert_eq!(params.chunker, "size-262144");
        assert_eq!(params.cid_version, 0);
        assert_eq!(params.hash_fun, "sha2-256");
        assert!(!params.progress);
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("".parse::<Layout>().unwrap(), Layout::Balanced);
        assert_eq!("trickle".parse::<Layout>().unwrap(), Layout::Trickle);
        assert!("spiral".parse::<Layout>().is_err());
    }

    #[test]
    fn test_prefix_resolution_ignores_case() {
        let params = AddParams {
            cid_version: 1,
            hash_fun: "BLAKE3".to_string(),
            ..Default::default()
        };

        let prefix = params.prefix().unwrap();
        assert_eq!(prefix.version, Version::V1);
        assert_eq!(prefix.hash, HashFunction::Blake3);
        assert_eq!(prefix.length, None);
    }

    #[test]
    fn test_unknown_hash_function() {
        let params = AddParams {
            hash_fun: "md4".to_string(),
            ..Default::default()
        };

        let err = params.prefix().unwrap_err();
        assert!(matches!(err, AddError::ConfigError(_)));
        assert!(err.to_string().contains("unrecognized hash function: md4"));
    }

    #[test]
    fn test_bad_cid_version() {
        let params = AddParams {
            cid_version: 2,
            ..Default::default()
        };
        assert!(matches!(params.prefix(), Err(AddError::ConfigError(_))));
    }

    #[test]
    fn test_deserialize_partial() {
        let params: AddParams =
            serde_json::from_str(r#"{"layout":"trickle","raw-leaves":true,"cid-version":1}"#)
                .unwrap();

        assert_eq!(params.layout, Layout::Trickle);
        assert!(params.raw_leaves);
        assert_eq!(params.cid_version, 1);
        assert_eq!(params.hash_fun, "sha2-256");
    }
}
