#![forbid(unsafe_code)]

pub mod bitio;
pub mod bytes;
pub mod huffman;
pub mod packer;

pub use bitio::{BitReader, BitWriter};
pub use bytes::ByteReader;
pub use huffman::{
    decode, encode, frequency_table, Codeword, CodingEfficiency, EncodedSymbols, HuffmanCode,
    Symbol, MAX_CODE_LEN,
};
pub use packer::{IntegerPacker, PackerKind, PlainPacker, ZstdPacker, DEFAULT_ZSTD_LEVEL};
