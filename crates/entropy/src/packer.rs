//! Lossless packing of `i32` streams.

use ebcloud_core::{CodecError, PackerChoice, Result};

/// Strategy for turning an integer stream into bytes and back.
pub trait IntegerPacker {
    /// Identifier stored in blob headers.
    fn id(&self) -> u8;

    fn pack(&self, values: &[i32]) -> Result<Vec<u8>>;

    fn unpack(&self, bytes: &[u8]) -> Result<Vec<i32>>;
}

fn to_le_bytes(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn from_le_bytes(bytes: &[u8]) -> Result<Vec<i32>> {
    if bytes.len() % 4 != 0 {
        return Err(CodecError::malformed(format!(
            "integer stream of {} bytes is not a whole number of i32 words",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Raw little-endian words.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPacker;

impl IntegerPacker for PlainPacker {
    fn id(&self) -> u8 {
        PackerKind::Plain.id()
    }

    fn pack(&self, values: &[i32]) -> Result<Vec<u8>> {
        Ok(to_le_bytes(values))
    }

    fn unpack(&self, bytes: &[u8]) -> Result<Vec<i32>> {
        from_le_bytes(bytes)
    }
}

pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Little-endian words run through zstd.
#[derive(Debug, Clone, Copy)]
pub struct ZstdPacker {
    level: i32,
}

impl ZstdPacker {
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdPacker {
    fn default() -> Self {
        Self::new(DEFAULT_ZSTD_LEVEL)
    }
}

impl IntegerPacker for ZstdPacker {
    fn id(&self) -> u8 {
        PackerKind::Zstd.id()
    }

    fn pack(&self, values: &[i32]) -> Result<Vec<u8>> {
        zstd::encode_all(to_le_bytes(values).as_slice(), self.level)
            .map_err(|e| CodecError::Packer(format!("zstd compression failed: {}", e)))
    }

    fn unpack(&self, bytes: &[u8]) -> Result<Vec<i32>> {
        let raw = zstd::decode_all(bytes)
            .map_err(|e| CodecError::Packer(format!("zstd decompression failed: {}", e)))?;
        from_le_bytes(&raw)
    }
}

/// Packer identified by its header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackerKind {
    Plain,
    Zstd,
}

impl PackerKind {
    pub fn id(self) -> u8 {
        match self {
            PackerKind::Plain => 0,
            PackerKind::Zstd => 1,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(PackerKind::Plain),
            1 => Some(PackerKind::Zstd),
            _ => None,
        }
    }

    pub fn packer(self) -> Box<dyn IntegerPacker + Send + Sync> {
        match self {
            PackerKind::Plain => Box::new(PlainPacker),
            PackerKind::Zstd => Box::new(ZstdPacker::default()),
        }
    }
}

impl From<PackerChoice> for PackerKind {
    fn from(choice: PackerChoice) -> Self {
        match choice {
            PackerChoice::Plain => PackerKind::Plain,
            PackerChoice::Zstd => PackerKind::Zstd,
        }
    }
}
