/*
    esqimg

    Copyright 2025 esqimg contributors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/mfm.rs

    The MFM modulation layer: bit-stuffed data cells, out-of-band sync cells,
    and raw bitstream scanning.

*/

//! MFM records each data bit as a (clock, data) cell pair. The clock cell is
//! set only between two zero data bits, which bounds flux transition spacing.
//! Sync marks are written as raw 16-cell words with a deliberately missing
//! clock bit (`0x4489` for the A1 sync byte, `0x5224` for C2), so no sequence
//! of encoded data bytes can reproduce them. That clock violation is what
//! makes them unambiguously locatable when scanning a raw bitstream.

use bit_vec::BitVec;

/// The A1 sync byte as raw cells, with a missing clock bit.
pub const A1_SYNC_CELLS: u16 = 0x4489;
/// The C2 sync byte as raw cells, used by the index mark preamble.
pub const C2_SYNC_CELLS: u16 = 0x5224;

/// Index address mark byte, following a C2 sync run.
pub const IAM_MARK: u8 = 0xFC;
/// Identification (sector header) address mark byte, following an A1 sync run.
pub const IDAM_MARK: u8 = 0xFE;
/// Data address mark byte, following an A1 sync run.
pub const DAM_MARK: u8 = 0xFB;

/// Number of bit cells in one MFM-encoded byte.
pub const CELLS_PER_BYTE: usize = 16;

/// An MFM encoder writing bit cells into a growing `BitVec`.
///
/// The trailing data bit is carried across calls so clock generation is
/// correct over gap, field and sync boundaries.
pub struct MfmWriter {
    bits: BitVec,
    last_data_bit: bool,
}

impl MfmWriter {
    pub fn with_capacity(cells: usize) -> Self {
        MfmWriter {
            bits: BitVec::with_capacity(cells),
            last_data_bit: false,
        }
    }

    /// Number of bit cells written so far.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Encode one data byte as 16 bit cells with standard MFM clocking.
    pub fn write_byte(&mut self, byte: u8) {
        for i in (0..8).rev() {
            let data = (byte >> i) & 1 != 0;
            self.bits.push(!(self.last_data_bit || data));
            self.bits.push(data);
            self.last_data_bit = data;
        }
    }

    /// Write a 16-bit cell word verbatim, bypassing clock generation.
    pub fn write_raw_u16(&mut self, word: u16) {
        for i in (0..16).rev() {
            self.bits.push((word >> i) & 1 != 0);
        }
        self.last_data_bit = word & 1 != 0;
    }

    pub fn into_inner(self) -> BitVec {
        self.bits
    }
}

/// Extract the data bits of a raw cell word: `0x4489` decodes to `0xA1`,
/// `0x5224` to `0xC2`. Checksum regions fold sync marks in by their decoded
/// byte value, the same view the controller's CRC logic sees.
pub fn raw_data_byte(word: u16) -> u8 {
    let mut byte = 0u8;
    for i in 0..8 {
        byte = (byte << 1) | ((word >> (14 - i * 2)) & 1) as u8;
    }
    byte
}

/// Find the next A1 sync cell pattern at or after cell `start`, returning the
/// cell index just past the matched word.
pub fn find_sync(bits: &BitVec, start: usize) -> Option<usize> {
    let mut shift_reg: u16 = 0;
    for i in start..bits.len() {
        shift_reg = (shift_reg << 1) | bits[i] as u16;
        if i >= start + 15 && shift_reg == A1_SYNC_CELLS {
            return Some(i + 1);
        }
    }
    None
}

/// Read a 16-cell word verbatim starting at cell `pos`.
pub fn read_raw_u16(bits: &BitVec, pos: usize) -> Option<u16> {
    if pos + 16 > bits.len() {
        return None;
    }
    let mut word: u16 = 0;
    for i in 0..16 {
        word = (word << 1) | bits[pos + i] as u16;
    }
    Some(word)
}

/// Read the MFM-decoded byte whose first (clock) cell is at `pos`, taking
/// only the data cells.
pub fn read_decoded_byte(bits: &BitVec, pos: usize) -> Option<u8> {
    if pos + 16 > bits.len() {
        return None;
    }
    let mut byte = 0u8;
    for i in 0..8 {
        byte = (byte << 1) | bits[pos + i * 2 + 1] as u8;
    }
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_data_bytes_of_sync_words() {
        assert_eq!(raw_data_byte(A1_SYNC_CELLS), 0xA1);
        assert_eq!(raw_data_byte(C2_SYNC_CELLS), 0xC2);
    }

    #[test]
    fn zero_fill_encodes_as_alternating_clock() {
        let mut w = MfmWriter::with_capacity(64);
        w.write_byte(0x00);
        w.write_byte(0x00);
        let bits = w.into_inner();
        // First clock is set (no preceding data bit), then every clock cell
        // between two zero data bits is set.
        assert_eq!(read_raw_u16(&bits, 0), Some(0xAAAA));
        assert_eq!(read_raw_u16(&bits, 16), Some(0xAAAA));
    }

    #[test]
    fn byte_round_trips_through_cells() {
        let mut w = MfmWriter::with_capacity(16 * 4);
        for byte in [0x4E, 0x00, 0xFE, 0xC3] {
            w.write_byte(byte);
        }
        let bits = w.into_inner();
        for (i, byte) in [0x4E, 0x00, 0xFE, 0xC3].iter().enumerate() {
            assert_eq!(read_decoded_byte(&bits, i * 16), Some(*byte));
        }
    }

    #[test]
    fn stuffed_data_never_contains_sync_cells() {
        // Even the data byte 0xA1 encodes with all clock bits in place, so it
        // cannot collide with the raw sync word.
        let mut w = MfmWriter::with_capacity(16 * 3);
        for _ in 0..3 {
            w.write_byte(0xA1);
        }
        let bits = w.into_inner();
        assert_eq!(find_sync(&bits, 0), None);
    }

    #[test]
    fn find_sync_locates_raw_marker_after_gap() {
        let mut w = MfmWriter::with_capacity(16 * 8);
        for _ in 0..4 {
            w.write_byte(0x4E);
        }
        w.write_raw_u16(A1_SYNC_CELLS);
        w.write_byte(0xFE);
        let bits = w.into_inner();
        let pos = find_sync(&bits, 0).expect("sync mark not found");
        assert_eq!(pos, 5 * 16);
        assert_eq!(read_decoded_byte(&bits, pos), Some(0xFE));
    }
}
