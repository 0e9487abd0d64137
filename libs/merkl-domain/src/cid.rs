//! Content identifiers
//!
//! A [`Cid`] names an immutable block by a digest of its encoded bytes. It is
//! self-describing: the identifier carries its format version, the codec of
//! the block and the hash function used, so any holder can verify a block
//! against its name.
//!
//! ## Binary layout
//!
//! - Version 0: the bare multihash, `sha2-256` only, structured codec implied
//! - Version 1: `varint(1) varint(codec) multihash`
//!
//! A multihash is `varint(hash code) varint(digest length) digest`.
//!
//! ## Text form
//!
//! Identifiers are rendered as base16 multibase: an `f` followed by the
//! lowercase hex of the binary layout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256, Sha512};

use crate::error::{AddError, Result};

/// Multibase prefix for lowercase base16
const BASE16_PREFIX: char = 'f';

/// Hash functions known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashFunction {
    Identity,
    Sha2_256,
    Sha2_512,
    Blake3,
}

impl HashFunction {
    /// Every registered hash function
    pub const ALL: [HashFunction; 4] = [
        HashFunction::Identity,
        HashFunction::Sha2_256,
        HashFunction::Sha2_512,
        HashFunction::Blake3,
    ];

    /// Look up a hash function by name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    /// Look up a hash function by its multihash code
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.code() == code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Sha2_256 => "sha2-256",
            Self::Sha2_512 => "sha2-512",
            Self::Blake3 => "blake3",
        }
    }

    pub fn code(&self) -> u64 {
        match self {
            Self::Identity => 0x00,
            Self::Sha2_256 => 0x12,
            Self::Sha2_512 => 0x13,
            Self::Blake3 => 0x1e,
        }
    }

    /// Natural digest length, `None` for the identity function
    pub fn default_length(&self) -> Option<usize> {
        match self {
            Self::Identity => None,
            Self::Sha2_256 => Some(32),
            Self::Sha2_512 => Some(64),
            Self::Blake3 => Some(32),
        }
    }

    /// Compute the full-length digest of `data`
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Identity => data.to_vec(),
            Self::Sha2_256 => Sha256::digest(data).to_vec(),
            Self::Sha2_512 => Sha512::digest(data).to_vec(),
            Self::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Block codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Codec {
    /// Leaf data stored without framing
    Raw,
    /// Structured nodes (file trees, directories)
    DagJson,
}

impl Codec {
    pub fn code(&self) -> u64 {
        match self {
            Self::Raw => 0x55,
            Self::DagJson => 0x0129,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0x55 => Some(Self::Raw),
            0x0129 => Some(Self::DagJson),
            _ => None,
        }
    }
}

/// Identifier format version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {
    V0,
    V1,
}

impl Version {
    pub fn from_u64(version: u64) -> Option<Self> {
        match version {
            0 => Some(Self::V0),
            1 => Some(Self::V1),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> u64 {
        match self {
            Self::V0 => 0,
            Self::V1 => 1,
        }
    }
}

/// A digest tagged with the function that produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Multihash {
    function: HashFunction,
    digest: Vec<u8>,
}

impl Multihash {
    /// Hash `data`, truncating to `length` bytes when given
    pub fn sum(function: HashFunction, data: &[u8], length: Option<usize>) -> Self {
        let mut digest = function.digest(data);
        if let Some(length) = length {
            digest.truncate(length);
        }
        Self { function, digest }
    }

    pub fn function(&self) -> HashFunction {
        self.function
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Check that `data` hashes to this multihash
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::sum(self.function, data, Some(self.digest.len())).digest == self.digest
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        write_varint(buf, self.function.code());
        write_varint(buf, self.digest.len() as u64);
        buf.extend_from_slice(&self.digest);
    }

    fn read_from(bytes: &[u8]) -> Result<(Self, usize)> {
        let (code, mut pos) = read_varint(bytes)?;
        let function = HashFunction::from_code(code)
            .ok_or_else(|| AddError::config_error(format!("unknown multihash code 0x{code:x}")))?;
        let (len, n) = read_varint(&bytes[pos..])?;
        pos += n;
        let end = usize::try_from(len)
            .ok()
            .and_then(|len| pos.checked_add(len))
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| AddError::internal_error("multihash digest is truncated"))?;
        let digest = bytes[pos..end].to_vec();
        Ok((Self { function, digest }, end))
    }
}

/// A content identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid {
    version: Version,
    codec: Codec,
    hash: Multihash,
}

impl Cid {
    /// Assemble an identifier, enforcing the version 0 restrictions
    pub fn new(version: Version, codec: Codec, hash: Multihash) -> Result<Self> {
        if version == Version::V0
            && (codec != Codec::DagJson || hash.function != HashFunction::Sha2_256)
        {
            return Err(AddError::config_error(
                "version 0 identifiers only support sha2-256 structured nodes",
            ));
        }
        Ok(Self {
            version,
            codec,
            hash,
        })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn hash(&self) -> &Multihash {
        &self.hash
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.hash.digest.len() + 8);
        if self.version == Version::V1 {
            write_varint(&mut buf, 1);
            write_varint(&mut buf, self.codec.code());
        }
        self.hash.write_to(&mut buf);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() == 34 && bytes[0] == 0x12 && bytes[1] == 0x20 {
            let (hash, _) = Multihash::read_from(bytes)?;
            return Self::new(Version::V0, Codec::DagJson, hash);
        }

        let (version, mut pos) = read_varint(bytes)?;
        if version != 1 {
            return Err(AddError::config_error(format!(
                "invalid cid version {version}"
            )));
        }
        let (code, n) = read_varint(&bytes[pos..])?;
        pos += n;
        let codec = Codec::from_code(code)
            .ok_or_else(|| AddError::config_error(format!("unknown codec 0x{code:x}")))?;
        let (hash, n) = Multihash::read_from(&bytes[pos..])?;
        if pos + n != bytes.len() {
            return Err(AddError::internal_error("trailing bytes after identifier"));
        }
        Self::new(Version::V1, codec, hash)
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", BASE16_PREFIX, hex::encode(self.to_bytes()))
    }
}

impl FromStr for Cid {
    type Err = AddError;

    fn from_str(s: &str) -> Result<Self> {
        let encoded = s
            .strip_prefix(BASE16_PREFIX)
            .ok_or_else(|| AddError::config_error(format!("unsupported multibase in '{s}'")))?;
        let bytes = hex::decode(encoded)
            .map_err(|e| AddError::config_error(format!("invalid identifier '{s}': {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for Cid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Version, codec and hash settings shared by every node of one add
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefix {
    pub version: Version,
    pub codec: Codec,
    pub hash: HashFunction,
    /// Digest length, `None` for the function's default
    pub length: Option<usize>,
}

impl Prefix {
    /// Default prefix for an identifier version: structured codec, sha2-256
    pub fn for_cid_version(version: u64) -> Result<Self> {
        let version = Version::from_u64(version)
            .ok_or_else(|| AddError::config_error(format!("bad CID version: {version}")))?;
        Ok(Self {
            version,
            codec: Codec::DagJson,
            hash: HashFunction::Sha2_256,
            length: None,
        })
    }

    /// Replace the hash function, keeping the default digest length
    pub fn with_hash(self, hash: HashFunction) -> Result<Self> {
        if self.version == Version::V0 && hash != HashFunction::Sha2_256 {
            return Err(AddError::config_error(format!(
                "CID version 0 does not support hash function {hash}"
            )));
        }
        Ok(Self {
            hash,
            length: None,
            ..self
        })
    }

    /// Same settings for another codec. Raw blocks cannot be named with
    /// version 0, so those are upgraded to version 1.
    pub fn with_codec(self, codec: Codec) -> Self {
        let version = if codec != Codec::DagJson {
            Version::V1
        } else {
            self.version
        };
        Self {
            version,
            codec,
            ..self
        }
    }

    /// Hash `data` and name it under this prefix
    pub fn sum(&self, data: &[u8]) -> Cid {
        Cid {
            version: self.version,
            codec: self.codec,
            hash: Multihash::sum(self.hash, data, self.length),
        }
    }
}

fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

fn read_varint(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, byte) in bytes.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(AddError::internal_error("invalid varint"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_lookup_ignores_case() {
        assert_eq!(
            HashFunction::from_name("SHA2-256"),
            Some(HashFunction::Sha2_256)
        );
        assert_eq!(HashFunction::from_name("Blake3"), Some(HashFunction::Blake3));
        assert_eq!(HashFunction::from_name("md5"), None);
    }

    #[test]
    fn test_sha256_digest() {
        let digest = HashFunction::Sha2_256.digest(b"hello");
        assert_eq!(
            hex::encode(digest),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_prefix_rejects_unknown_version() {
        let err = Prefix::for_cid_version(7).unwrap_err();
        assert!(err.to_string().contains("bad CID version"));
    }

    #[test]
    fn test_v0_prefix_requires_sha256() {
        let prefix = Prefix::for_cid_version(0).unwrap();
        assert!(prefix.with_hash(HashFunction::Blake3).is_err());
        assert!(prefix.with_hash(HashFunction::Sha2_256).is_ok());
    }

    #[test]
    fn test_v0_identifier_is_bare_multihash() {
        let cid = Prefix::for_cid_version(0).unwrap().sum(b"hello");
        let bytes = cid.to_bytes();
        assert_eq!(bytes.len(), 34);
        assert_eq!(&bytes[..2], &[0x12, 0x20]);
        assert_eq!(Cid::from_bytes(&bytes).unwrap(), cid);
    }

    #[test]
    fn test_v1_text_form_parses_back() {
        let prefix = Prefix::for_cid_version(1)
            .unwrap()
            .with_hash(HashFunction::Blake3)
            .unwrap();
        let cid = prefix.with_codec(Codec::Raw).sum(b"world");
        let text = cid.to_string();

        assert!(text.starts_with("f0155"));
        assert_eq!(text.parse::<Cid>().unwrap(), cid);
    }

    #[test]
    fn test_raw_codec_upgrades_v0() {
        let prefix = Prefix::for_cid_version(0).unwrap().with_codec(Codec::Raw);
        assert_eq!(prefix.version, Version::V1);
    }

    #[test]
    fn test_multihash_verify() {
        let cid = Prefix::for_cid_version(1).unwrap().sum(b"block");
        assert!(cid.hash().verify(b"block"));
        assert!(!cid.hash().verify(b"blocc"));
    }

    #[test]
    fn test_parse_rejects_other_multibase() {
        assert!("zQmSomething".parse::<Cid>().is_err());
        assert!("fnothex".parse::<Cid>().is_err());
    }

    #[test]
    fn test_parse_rejects_oversized_digest_length() {
        // v1, raw, sha2-256, digest length near u64::MAX
        let err = "f015512ffffffffffffffffff01".parse::<Cid>().unwrap_err();
        assert!(err.to_string().contains("truncated"));

        let mut bytes = vec![0x01, 0x55, 0x12];
        write_varint(&mut bytes, u64::MAX);
        assert!(Cid::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_varint_multi_byte() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 0x0129);
        assert_eq!(buf, vec![0xa9, 0x02]);
        assert_eq!(read_varint(&buf).unwrap(), (0x0129, 2));
    }
}
