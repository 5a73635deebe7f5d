//! Buffered bit I/O for the payload encoder/decoder.
//!
//! `spec.md` §9 asks for this to be factored out of the encoder as a
//! dedicated bit-writer/bit-reader pair, shaped like the teacher's
//! `AdaptiveHuffman::put_code`/`get_bit` (accumulate into a register, flush
//! when full) but built directly on a `u64` accumulator rather than
//! `bit_vec::BitVec`, since the container format pins down the flush
//! arithmetic bit-for-bit (`spec.md` §4.5).

/// Packs variable-length codes (1..=64 bits) MSB-first into 64-bit words.
pub struct BitWriter {
    acc: u64,
    nbits: u8,
    pub words: Vec<u64>,
}

impl BitWriter {
    pub fn new() -> Self {
        Self { acc: 0, nbits: 0, words: Vec::new() }
    }

    /// Push `length` bits of `code` (right-aligned in `code`'s low
    /// `length` bits) into the accumulator, flushing whole words to
    /// `self.words` as they fill.
    ///
    /// The one shift that could legally reach 64 is guarded explicitly:
    /// when the accumulator is completely full (`nbits == 64`) and a
    /// 64-bit code arrives, the "bits that fit in the old word" shift
    /// amount is exactly 64, which `u64` shr/shl panic on. That case
    /// contributes zero bits to the old word (there's no room) and the
    /// entire code becomes the next word, which is exactly what the
    /// `shift >= 64` branch below computes without ever performing a
    /// shift by 64.
    pub fn push(&mut self, length: u8, code: u64) {
        debug_assert!((1..=64).contains(&length));
        let avail = 64 - self.nbits;
        if avail >= length {
            self.acc |= code << (avail - length);
            self.nbits += length;
        } else {
            let shift = length - avail;
            self.acc |= if shift >= 64 { 0 } else { code >> shift };
            self.words.push(self.acc);
            if shift > 0 {
                self.acc = if shift == 64 { code } else { code << (64 - shift) };
            } else {
                self.acc = 0;
            }
            self.nbits = shift;
        }
    }

    /// Flush a final partial word if any bits are pending. Exactly one
    /// flush happens for a given set of pending bits: after this call
    /// `nbits` is reset to 0, so a second call is a no-op.
    pub fn finish(&mut self) {
        if self.nbits > 0 {
            self.words.push(self.acc);
            self.acc = 0;
            self.nbits = 0;
        }
    }

    /// Serialize accumulated words as little-endian bytes, per `spec.md`
    /// §6's container format.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.words.len() * 8);
        for w in self.words {
            out.extend_from_slice(&w.to_le_bytes());
        }
        out
    }
}

/// Reads a byte slice as a stream of little-endian 64-bit words, bit by
/// bit, MSB first within each word — the mirror image of `BitWriter`.
pub struct BitReader<'a> {
    data: &'a [u8],
    word_index: usize,
    bit_index: u8, // 0..=63, counts down from 63
    current: u64,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        let mut r = Self { data, word_index: 0, bit_index: 0, current: 0 };
        r.load_word();
        r
    }

    fn load_word(&mut self) {
        let start = self.word_index * 8;
        if start + 8 <= self.data.len() {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&self.data[start..start + 8]);
            self.current = u64::from_le_bytes(buf);
            self.bit_index = 63;
        }
    }

    /// Next bit, MSB first. Returns `None` once the underlying slice is
    /// exhausted (the payload decoder never needs this, since it stops
    /// after `original_size` emitted symbols, but it keeps the reader
    /// honest about padding).
    pub fn next_bit(&mut self) -> Option<bool> {
        let start = self.word_index * 8;
        if start + 8 > self.data.len() {
            return None;
        }
        let bit = (self.current >> self.bit_index) & 1 == 1;
        if self.bit_index == 0 {
            self.word_index += 1;
            self.load_word();
        } else {
            self.bit_index -= 1;
        }
        Some(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_mixed_lengths() {
        let mut w = BitWriter::new();
        w.push(3, 0b101);
        w.push(5, 0b00011);
        w.push(8, 0xAB);
        w.finish();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 8);
        let mut r = BitReader::new(&bytes);
        let mut bits = Vec::new();
        for _ in 0..16 {
            bits.push(r.next_bit().unwrap() as u8);
        }
        let expected = [1, 0, 1, 0, 0, 0, 1, 1, 1, 0, 1, 0, 1, 0, 1, 1];
        assert_eq!(bits, expected);
    }

    #[test]
    fn handles_exact_64_bit_code_on_full_accumulator() {
        let mut w = BitWriter::new();
        w.push(64, u64::MAX);
        w.push(64, 0);
        w.finish();
        assert_eq!(w.words, vec![u64::MAX, 0]);
    }

    #[test]
    fn finish_is_idempotent_with_no_pending_bits() {
        let mut w = BitWriter::new();
        w.push(64, 0x1234);
        assert_eq!(w.words.len(), 1);
        w.finish();
        assert_eq!(w.words.len(), 1);
    }
}
