//! MSB-first bit packing.
//!
//! The first bit written lands in the most significant bit of the first byte.
//! The final byte is zero-padded; the exact bit length travels separately so
//! padding is never mistaken for data.

/// Accumulates bits into a byte buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    buffer: Vec<u8>,
    current: u8,
    filled: u8,
    bit_len: u64,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_bits(bits: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(bits.div_ceil(8)),
            ..Self::default()
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.current = (self.current << 1) | bit as u8;
        self.filled += 1;
        self.bit_len += 1;
        if self.filled == 8 {
            self.buffer.push(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }

    /// Write the low `len` bits of `value`, most significant first.
    ///
    /// # Panics
    ///
    /// Panics if `len > 64`.
    pub fn write_bits(&mut self, value: u64, len: u8) {
        assert!(len <= 64, "cannot write more than 64 bits at once");
        for shift in (0..len).rev() {
            self.write_bit((value >> shift) & 1 == 1);
        }
    }

    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    /// Flush the partial byte and return `(bytes, bit_len)`.
    pub fn finish(mut self) -> (Vec<u8>, u64) {
        if self.filled > 0 {
            self.buffer.push(self.current << (8 - self.filled));
        }
        (self.buffer, self.bit_len)
    }
}

/// Reads bits back in the order [`BitWriter`] wrote them.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: u64,
    end: u64,
}

impl<'a> BitReader<'a> {
    /// `bit_len` is clamped to the bits physically present in `data`.
    pub fn new(data: &'a [u8], bit_len: u64) -> Self {
        let available = data.len() as u64 * 8;
        Self {
            data,
            pos: 0,
            end: bit_len.min(available),
        }
    }

    pub fn read_bit(&mut self) -> Option<bool> {
        if self.pos >= self.end {
            return None;
        }
        let byte = self.data[(self.pos / 8) as usize];
        let bit = (byte >> (7 - (self.pos % 8))) & 1 == 1;
        self.pos += 1;
        Some(bit)
    }

    /// Detach the next `n` bits as their own reader.
    ///
    /// Returns `None` without advancing when fewer than `n` bits remain.
    pub fn split_off(&mut self, n: u64) -> Option<BitReader<'a>> {
        if n > self.remaining() {
            return None;
        }
        let head = BitReader {
            data: self.data,
            pos: self.pos,
            end: self.pos + n,
        };
        self.pos += n;
        Some(head)
    }

    pub fn remaining(&self) -> u64 {
        self.end - self.pos
    }

    pub fn position(&self) -> u64 {
        self.pos
    }
}
