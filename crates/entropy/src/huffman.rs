//! Canonical-order Huffman coding over generic symbols.
//!
//! The tree lives in an index-addressed arena. Construction is fully
//! deterministic: leaves enter the queue in ascending symbol order and ties on
//! frequency are broken by arena index, so merged nodes (which always receive a
//! higher index) lose ties against leaves and older merges.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt::Debug;
use std::hash::Hash;

use ebcloud_core::{CodecError, Result};

use crate::bitio::{BitReader, BitWriter};
use crate::bytes::ByteReader;

/// Longest code the coder will emit or accept.
pub const MAX_CODE_LEN: u8 = 64;

/// A value that can be Huffman coded and stored in a code table.
pub trait Symbol: Copy + Ord + Hash + Debug + Send + Sync + 'static {
    /// Bytes used by [`Symbol::write_le`].
    const WIDTH: usize;

    fn write_le(self, out: &mut Vec<u8>);

    /// Inverse of [`Symbol::write_le`]. `bytes` is exactly `WIDTH` long.
    fn read_le(bytes: &[u8]) -> Self;
}

impl Symbol for u8 {
    const WIDTH: usize = 1;

    fn write_le(self, out: &mut Vec<u8>) {
        out.push(self);
    }

    fn read_le(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl Symbol for i32 {
    const WIDTH: usize = 4;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        i32::from_le_bytes(buf)
    }
}

/// Symbol counts, ordered so iteration is deterministic.
pub fn frequency_table<S: Symbol>(symbols: &[S]) -> BTreeMap<S, u64> {
    let mut table = BTreeMap::new();
    for &s in symbols {
        *table.entry(s).or_insert(0u64) += 1;
    }
    table
}

/// A prefix code: the low `len` bits of `bits`, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codeword {
    pub bits: u64,
    pub len: u8,
}

#[derive(Debug, Clone)]
enum Node<S> {
    Leaf(S),
    Internal { zero: Option<u32>, one: Option<u32> },
}

/// Huffman tree plus the per-symbol codes derived from it.
#[derive(Debug, Clone)]
pub struct HuffmanCode<S: Symbol> {
    nodes: Vec<Node<S>>,
    root: Option<u32>,
    codes: BTreeMap<S, Codeword>,
}

impl<S: Symbol> HuffmanCode<S> {
    /// Code with no symbols; encodes and decodes only the empty sequence.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            codes: BTreeMap::new(),
        }
    }

    fn single(symbol: S) -> Self {
        let mut codes = BTreeMap::new();
        codes.insert(symbol, Codeword { bits: 0, len: 1 });
        Self {
            nodes: vec![Node::Leaf(symbol)],
            root: Some(0),
            codes,
        }
    }

    pub fn from_symbols(symbols: &[S]) -> Result<Self> {
        Self::from_frequencies(&frequency_table(symbols))
    }

    /// Build the code with the standard two-minimum merge.
    ///
    /// Zero-count entries are ignored. Fails with `InvalidInput` when a code
    /// would exceed [`MAX_CODE_LEN`] bits.
    pub fn from_frequencies(frequencies: &BTreeMap<S, u64>) -> Result<Self> {
        let leaves: Vec<(S, u64)> = frequencies
            .iter()
            .filter(|(_, &freq)| freq > 0)
            .map(|(&s, &freq)| (s, freq))
            .collect();

        match leaves.as_slice() {
            [] => return Ok(Self::empty()),
            [(symbol, _)] => return Ok(Self::single(*symbol)),
            _ => {}
        }

        let mut nodes = Vec::with_capacity(2 * leaves.len() - 1);
        let mut heap = BinaryHeap::with_capacity(leaves.len());
        for (symbol, freq) in leaves {
            let idx = nodes.len() as u32;
            nodes.push(Node::Leaf(symbol));
            heap.push(Reverse((freq, idx)));
        }

        let mut root = 0;
        while let Some(Reverse((freq_a, a))) = heap.pop() {
            let Some(Reverse((freq_b, b))) = heap.pop() else {
                root = a;
                break;
            };
            let idx = nodes.len() as u32;
            nodes.push(Node::Internal {
                zero: Some(a),
                one: Some(b),
            });
            heap.push(Reverse((freq_a.saturating_add(freq_b), idx)));
        }

        let codes = derive_codes(&nodes, root)?;
        Ok(Self {
            nodes,
            root: Some(root),
            codes,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn codeword(&self, symbol: &S) -> Option<Codeword> {
        self.codes.get(symbol).copied()
    }

    /// Codes in ascending symbol order.
    pub fn codes(&self) -> impl Iterator<Item = (S, Codeword)> + '_ {
        self.codes.iter().map(|(&s, &c)| (s, c))
    }

    pub fn max_code_len(&self) -> u8 {
        self.codes.values().map(|c| c.len).max().unwrap_or(0)
    }

    /// Bit-pack `symbols` with this code. Returns `(bytes, bit_len)`.
    pub fn encode_symbols(&self, symbols: &[S]) -> Result<(Vec<u8>, u64)> {
        let mut writer = BitWriter::with_capacity_bits(symbols.len());
        self.encode_into(symbols, &mut writer)?;
        Ok(writer.finish())
    }

    /// Append the codes for `symbols` to an existing bit stream.
    pub fn encode_into(&self, symbols: &[S], writer: &mut BitWriter) -> Result<()> {
        for symbol in symbols {
            let code = self.codes.get(symbol).ok_or_else(|| {
                CodecError::invalid_input(format!("symbol {:?} has no code", symbol))
            })?;
            writer.write_bits(code.bits, code.len);
        }
        Ok(())
    }

    /// Decode every symbol in the first `bit_len` bits of `bits`.
    pub fn decode(&self, bits: &[u8], bit_len: u64) -> Result<Vec<S>> {
        if bit_len > bits.len() as u64 * 8 {
            return Err(CodecError::malformed(format!(
                "bit length {} exceeds the {} bytes present",
                bit_len,
                bits.len()
            )));
        }
        self.decode_reader(BitReader::new(bits, bit_len))
    }

    /// Decode symbols until `reader` is drained.
    ///
    /// Ending in the middle of a code is `DecodeStreamExhausted`; a bit path
    /// with no leaf is `MalformedBlob`.
    pub fn decode_reader(&self, mut reader: BitReader<'_>) -> Result<Vec<S>> {
        let Some(root) = self.root else {
            if reader.remaining() == 0 {
                return Ok(Vec::new());
            }
            return Err(CodecError::malformed("bits present but the code is empty"));
        };

        if let Node::Leaf(symbol) = self.nodes[root as usize] {
            // The only codeword is a single 0 bit.
            let mut out = Vec::new();
            while let Some(bit) = reader.read_bit() {
                if bit {
                    return Err(CodecError::malformed(
                        "set bit in a single-symbol stream",
                    ));
                }
                out.push(symbol);
            }
            return Ok(out);
        }

        let mut out = Vec::new();
        let mut node = root;
        while let Some(bit) = reader.read_bit() {
            let next = match self.nodes[node as usize] {
                Node::Internal { zero, one } => {
                    if bit {
                        one
                    } else {
                        zero
                    }
                }
                Node::Leaf(_) => None,
            };
            let Some(next) = next else {
                return Err(CodecError::malformed("bit path leaves the code tree"));
            };
            match self.nodes[next as usize] {
                Node::Leaf(symbol) => {
                    out.push(symbol);
                    node = root;
                }
                Node::Internal { .. } => node = next,
            }
        }

        if node != root {
            return Err(CodecError::exhausted("huffman"));
        }
        Ok(out)
    }

    /// Serialize as `count: u32`, then per symbol in ascending order the
    /// symbol bytes, `len: u8` and the code bits packed MSB-first.
    pub fn write_table(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.codes.len() as u32).to_le_bytes());
        for (&symbol, code) in &self.codes {
            symbol.write_le(out);
            out.push(code.len);
            let mut writer = BitWriter::new();
            writer.write_bits(code.bits, code.len);
            out.extend_from_slice(&writer.finish().0);
        }
    }

    /// Parse a table written by [`HuffmanCode::write_table`].
    ///
    /// Returns the code and the number of bytes consumed. Tables that are not
    /// prefix-free, repeat a symbol or carry an impossible length are
    /// `MalformedBlob`; a short buffer is `DecodeStreamExhausted`.
    pub fn read_table(bytes: &[u8]) -> Result<(Self, usize)> {
        let mut reader = ByteReader::new(bytes, "code table");
        let count = reader.u32()?;

        let mut entries = Vec::new();
        for _ in 0..count {
            let symbol = S::read_le(reader.take(S::WIDTH)?);
            let len = reader.u8()?;
            if len == 0 || len > MAX_CODE_LEN {
                return Err(CodecError::malformed(format!(
                    "code length {} out of range",
                    len
                )));
            }
            let packed = reader.take((len as usize).div_ceil(8))?;
            let mut reader = BitReader::new(packed, len as u64);
            let mut bits = 0u64;
            while let Some(bit) = reader.read_bit() {
                bits = (bits << 1) | bit as u64;
            }
            entries.push((symbol, Codeword { bits, len }));
        }

        let code = Self::from_codewords(entries)?;
        Ok((code, reader.position()))
    }

    fn from_codewords(entries: Vec<(S, Codeword)>) -> Result<Self> {
        match entries.as_slice() {
            [] => return Ok(Self::empty()),
            [(symbol, code)] => {
                if code.len != 1 {
                    return Err(CodecError::malformed(
                        "single-symbol code must be one bit long",
                    ));
                }
                return Ok(Self::single(*symbol));
            }
            _ => {}
        }

        let mut nodes = vec![Node::Internal {
            zero: None,
            one: None,
        }];
        let mut codes = BTreeMap::new();

        for (symbol, code) in entries {
            if codes.insert(symbol, code).is_some() {
                return Err(CodecError::malformed(format!(
                    "symbol {:?} appears twice in the code table",
                    symbol
                )));
            }

            let mut cur = 0usize;
            for shift in (0..code.len).rev() {
                let bit = (code.bits >> shift) & 1 == 1;
                let last = shift == 0;
                let child = match &nodes[cur] {
                    Node::Internal { zero, one } => {
                        if bit {
                            *one
                        } else {
                            *zero
                        }
                    }
                    Node::Leaf(_) => None,
                };
                let is_leaf = matches!(nodes[cur], Node::Leaf(_));
                if is_leaf || (last && child.is_some()) {
                    return Err(CodecError::malformed("code table is not prefix-free"));
                }

                cur = match child {
                    Some(next) => next as usize,
                    None => {
                        let idx = nodes.len() as u32;
                        nodes.push(if last {
                            Node::Leaf(symbol)
                        } else {
                            Node::Internal {
                                zero: None,
                                one: None,
                            }
                        });
                        if let Node::Internal { zero, one } = &mut nodes[cur] {
                            if bit {
                                *one = Some(idx);
                            } else {
                                *zero = Some(idx);
                            }
                        }
                        idx as usize
                    }
                };
            }
        }

        Ok(Self {
            nodes,
            root: Some(0),
            codes,
        })
    }
}

fn derive_codes<S: Symbol>(nodes: &[Node<S>], root: u32) -> Result<BTreeMap<S, Codeword>> {
    let mut codes = BTreeMap::new();
    let mut stack = vec![(root, 0u64, 0u8)];
    while let Some((idx, bits, len)) = stack.pop() {
        match nodes[idx as usize] {
            Node::Leaf(symbol) => {
                codes.insert(symbol, Codeword { bits, len });
            }
            Node::Internal { zero, one } => {
                if len >= MAX_CODE_LEN {
                    return Err(CodecError::invalid_input(format!(
                        "huffman code would exceed {} bits",
                        MAX_CODE_LEN
                    )));
                }
                if let Some(one) = one {
                    stack.push((one, (bits << 1) | 1, len + 1));
                }
                if let Some(zero) = zero {
                    stack.push((zero, bits << 1, len + 1));
                }
            }
        }
    }
    Ok(codes)
}

/// How close a code came to the order-0 entropy of the data it coded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodingEfficiency {
    /// Shannon entropy in bits per symbol.
    pub entropy_bits: f64,
    pub average_code_len: f64,
    /// `entropy_bits / average_code_len`, 1.0 for an empty input.
    pub efficiency: f64,
}

impl CodingEfficiency {
    pub fn measure<S: Symbol>(code: &HuffmanCode<S>, frequencies: &BTreeMap<S, u64>) -> Self {
        let total: u64 = frequencies.values().sum();
        if total == 0 {
            return Self {
                entropy_bits: 0.0,
                average_code_len: 0.0,
                efficiency: 1.0,
            };
        }

        let mut entropy_bits = 0.0;
        let mut average_code_len = 0.0;
        for (symbol, &freq) in frequencies {
            if freq == 0 {
                continue;
            }
            let p = freq as f64 / total as f64;
            entropy_bits -= p * p.log2();
            let len = code.codeword(symbol).map_or(0, |c| c.len);
            average_code_len += p * len as f64;
        }

        let efficiency = if average_code_len > 0.0 {
            entropy_bits / average_code_len
        } else {
            1.0
        };
        Self {
            entropy_bits,
            average_code_len,
            efficiency,
        }
    }
}

/// Output of [`encode`].
#[derive(Debug, Clone)]
pub struct EncodedSymbols<S: Symbol> {
    pub code: HuffmanCode<S>,
    pub bits: Vec<u8>,
    pub bit_len: u64,
    pub efficiency: CodingEfficiency,
}

/// Build a code for `symbols` and bit-pack them with it.
pub fn encode<S: Symbol>(symbols: &[S]) -> Result<EncodedSymbols<S>> {
    let frequencies = frequency_table(symbols);
    let code = HuffmanCode::from_frequencies(&frequencies)?;
    let (bits, bit_len) = code.encode_symbols(symbols)?;
    let efficiency = CodingEfficiency::measure(&code, &frequencies);

    log::debug!(
        "huffman: {} symbols, {} distinct, {} bits, {:.3} bits/symbol (entropy {:.3}, efficiency {:.3})",
        symbols.len(),
        code.len(),
        bit_len,
        efficiency.average_code_len,
        efficiency.entropy_bits,
        efficiency.efficiency
    );

    Ok(EncodedSymbols {
        code,
        bits,
        bit_len,
        efficiency,
    })
}

pub fn decode<S: Symbol>(encoded: &EncodedSymbols<S>) -> Result<Vec<S>> {
    encoded.code.decode(&encoded.bits, encoded.bit_len)
}
