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

    src/crc.rs

    CRC-16/CCITT over declared byte regions: the checksum used by the
    identification and data fields of MFM sector formats.

*/

//! The checksum is CRC-16/CCITT: polynomial 0x1021, initial value 0xFFFF,
//! bytes fed most significant bit first, no final xor. Each checksummed field
//! is a *region*, opened before the bytes that contribute to it and closed
//! where its stored value begins; regions are keyed by small ids so more than
//! one can accumulate at once.

/// Number of concurrently trackable CRC regions.
const REGION_COUNT: usize = 4;

const CRC_INIT: u16 = 0xFFFF;
const CRC_POLY: u16 = 0x1021;

fn crc_step(crc: u16, byte: u8) -> u16 {
    let mut crc = crc ^ (byte as u16) << 8;
    for _ in 0..8 {
        crc = if crc & 0x8000 != 0 { (crc << 1) ^ CRC_POLY } else { crc << 1 };
    }
    crc
}

/// One-shot CRC-16/CCITT of a byte slice.
pub fn crc_ccitt(data: &[u8]) -> u16 {
    data.iter().fold(CRC_INIT, |crc, &byte| crc_step(crc, byte))
}

/// A bank of CRC accumulators keyed by region id.
///
/// `feed` advances every open region at once, so a caller streaming bytes
/// does not need to know which regions each byte belongs to. Lifecycle misuse
/// (ending or taking a region that was never started) is a caller bug and
/// panics.
#[derive(Debug, Default)]
pub struct CrcBank {
    open:   [Option<u16>; REGION_COUNT],
    closed: [Option<u16>; REGION_COUNT],
}

impl CrcBank {
    pub fn new() -> Self {
        Default::default()
    }

    /// Open a region, resetting any previous accumulation under this id.
    pub fn start(&mut self, id: usize) {
        self.open[id] = Some(CRC_INIT);
        self.closed[id] = None;
    }

    /// Feed one byte into every open region.
    pub fn feed(&mut self, byte: u8) {
        for region in self.open.iter_mut().flatten() {
            *region = crc_step(*region, byte);
        }
    }

    /// Close a region. Subsequent bytes no longer affect its value.
    pub fn end(&mut self, id: usize) {
        match self.open[id].take() {
            Some(crc) => self.closed[id] = Some(crc),
            None => panic!("CRC region {} ended without start", id),
        }
    }

    /// Take the value of a closed region, consuming it.
    pub fn take(&mut self, id: usize) -> u16 {
        match self.closed[id].take() {
            Some(crc) => crc,
            None => panic!("CRC region {} taken without end", id),
        }
    }

    /// Close an open region and take its value in one step.
    pub fn finalize(&mut self, id: usize) -> u16 {
        self.end(id);
        self.take(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        // The standard CRC-16/CCITT-FALSE check value.
        assert_eq!(crc_ccitt(b"123456789"), 0x29B1);
        assert_eq!(crc_ccitt(&[]), 0xFFFF);
        assert_eq!(crc_ccitt(&[0xA1, 0xA1, 0xA1]), crc_ccitt(&[0xA1, 0xA1, 0xA1]));
    }

    #[test]
    fn bank_matches_one_shot() {
        let mut bank = CrcBank::new();
        bank.start(0);
        for byte in b"123456789" {
            bank.feed(*byte);
        }
        assert_eq!(bank.finalize(0), 0x29B1);
    }

    #[test]
    fn overlapping_regions_accumulate_independently() {
        let mut bank = CrcBank::new();
        bank.start(0);
        bank.feed(b'1');
        bank.start(1);
        for byte in b"23456789" {
            bank.feed(*byte);
        }
        bank.end(0);
        // Region 1 missed the first byte; region 0 saw all nine.
        bank.feed(0xFF); // closed region 0 must not move
        assert_eq!(bank.take(0), 0x29B1);
        assert_ne!(bank.finalize(1), 0x29B1);
    }

    #[test]
    fn restart_resets_accumulation() {
        let mut bank = CrcBank::new();
        bank.start(2);
        bank.feed(0xDE);
        bank.feed(0xAD);
        bank.start(2);
        for byte in b"123456789" {
            bank.feed(*byte);
        }
        assert_eq!(bank.finalize(2), 0x29B1);
    }

    #[test]
    #[should_panic(expected = "ended without start")]
    fn end_without_start_panics() {
        let mut bank = CrcBank::new();
        bank.end(3);
    }

    #[test]
    #[should_panic(expected = "taken without end")]
    fn take_without_end_panics() {
        let mut bank = CrcBank::new();
        bank.start(1);
        bank.take(1);
    }
}
