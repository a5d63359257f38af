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

    src/track_layout.rs

    The declarative layout program describing the physical structure of one
    track, and the sector payload buffers it is instantiated with.

*/

//! A track's physical structure is declared as a small instruction program
//! rather than hard-coded into the encoder and decoder. Both walkers share
//! the same instruction vocabulary, so a future layout is a new program, not
//! new walker logic.

use crate::{
    mfm::{A1_SYNC_CELLS, C2_SYNC_CELLS, DAM_MARK, IAM_MARK, IDAM_MARK},
    LARGE_SECTOR_SIZE,
    SECTORS_PER_TRACK,
    SMALL_SECTOR_SIZE,
};

/// CRC region id covering a sector's identification field.
pub const CRC_ID_FIELD: usize = 1;
/// CRC region id covering a sector's data field.
pub const CRC_DATA_FIELD: usize = 2;

/// One instruction of a track layout program.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutInstruction {
    /// Write `count` copies of `value` through normal MFM bit-stuffing.
    Mfm { value: u8, count: usize },
    /// Write `count` copies of a 16-bit cell word verbatim, bypassing
    /// bit-stuffing. Only sync marks use this.
    Raw { value: u16, count: usize },
    /// Substitute the cylinder id of the track being encoded.
    TrackId,
    /// Substitute the head id of the track being encoded.
    HeadId,
    /// Substitute the id of the current sector.
    SectorId,
    /// Substitute the size code of the current sector (size = 128 << n).
    SizeId,
    /// Open CRC accumulation under a region id.
    CrcStart(usize),
    /// Close CRC accumulation under a region id.
    CrcEnd(usize),
    /// Emit the closed region's 16-bit CRC, big-endian.
    Crc(usize),
    /// Copy the current sector's payload bytes verbatim.
    SectorData,
    /// Repeat the enclosed body once per sector. Loops do not nest.
    SectorLoopStart { count: usize },
    SectorLoopEnd,
    End,
}

/// An immutable layout program, shared read-only across every track and head
/// of a format.
#[derive(Clone, Debug)]
pub struct TrackLayout {
    instructions: Vec<LayoutInstruction>,
}

impl TrackLayout {
    pub fn new(instructions: Vec<LayoutInstruction>) -> Self {
        Self { instructions }
    }

    pub fn instructions(&self) -> &[LayoutInstruction] {
        &self.instructions
    }
}

/// Payload and addressing for one sector of a track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectorSpec {
    pub sector_id: u8,
    pub data: Vec<u8>,
}

impl SectorSpec {
    pub fn new(sector_id: u8, data: Vec<u8>) -> Self {
        Self { sector_id, data }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The fixed size policy for this family: the first five sectors of a
    /// track are 1024 bytes, the sixth is 512.
    pub fn expected_size(sector_id: u8) -> usize {
        if (sector_id as usize) < SECTORS_PER_TRACK - 1 {
            LARGE_SECTOR_SIZE
        } else {
            SMALL_SECTOR_SIZE
        }
    }

    /// The identification-field size code `n`, where size = 128 << n.
    pub fn size_code(&self) -> u8 {
        (self.data.len() / 128).trailing_zeros() as u8
    }
}

/// The canonical track program for Ensoniq 8-bit floppies, parameterized only
/// by sector count. Per-sector sizes come from the [`SectorSpec`] array
/// supplied at encode time, not from the program.
///
/// Structure: 0x4E/0x00 pre-gaps and an index mark, then one identification
/// field (A1 sync run, IDAM, c/h/s/n, CRC) and one data field (A1 sync run,
/// DAM, payload, CRC) per sector with inter-field gaps, then a closing gap.
pub fn esq_track_layout(sector_count: usize) -> TrackLayout {
    use LayoutInstruction::*;
    TrackLayout::new(vec![
        Mfm { value: 0x4E, count: 80 },
        Mfm { value: 0x00, count: 12 },
        Raw { value: C2_SYNC_CELLS, count: 3 },
        Mfm { value: IAM_MARK, count: 1 },
        Mfm { value: 0x4E, count: 50 },
        Mfm { value: 0x00, count: 12 },
        SectorLoopStart { count: sector_count },
        CrcStart(CRC_ID_FIELD),
        Raw { value: A1_SYNC_CELLS, count: 3 },
        Mfm { value: IDAM_MARK, count: 1 },
        TrackId,
        HeadId,
        SectorId,
        SizeId,
        CrcEnd(CRC_ID_FIELD),
        Crc(CRC_ID_FIELD),
        Mfm { value: 0x4E, count: 22 },
        Mfm { value: 0x00, count: 12 },
        CrcStart(CRC_DATA_FIELD),
        Raw { value: A1_SYNC_CELLS, count: 3 },
        Mfm { value: DAM_MARK, count: 1 },
        SectorData,
        CrcEnd(CRC_DATA_FIELD),
        Crc(CRC_DATA_FIELD),
        Mfm { value: 0x4E, count: 84 },
        Mfm { value: 0x00, count: 12 },
        SectorLoopEnd,
        Mfm { value: 0x4E, count: 170 },
        End,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_policy() {
        assert_eq!(SectorSpec::expected_size(0), 1024);
        assert_eq!(SectorSpec::expected_size(4), 1024);
        assert_eq!(SectorSpec::expected_size(5), 512);
    }

    #[test]
    fn size_codes() {
        assert_eq!(SectorSpec::new(0, vec![0; 1024]).size_code(), 3);
        assert_eq!(SectorSpec::new(5, vec![0; 512]).size_code(), 2);
    }
}
