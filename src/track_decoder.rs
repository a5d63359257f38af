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

    src/track_decoder.rs

    Recovers sector payloads from the raw bit cells of one physical track,
    validating identification and data field checksums.

*/

use bit_vec::BitVec;

use crate::{
    crc::CrcBank,
    mfm::{find_sync, read_decoded_byte, read_raw_u16, A1_SYNC_CELLS, CELLS_PER_BYTE, DAM_MARK, IDAM_MARK},
    track_layout::{CRC_DATA_FIELD, CRC_ID_FIELD},
    MAXIMUM_SECTOR_SIZE,
};

/// Maximum number of decoded bytes a data mark may trail its identification
/// field by before the header is considered orphaned. The canonical layout
/// puts 34 gap/sync bytes between the two fields.
const DAM_SCAN_WINDOW_BYTES: usize = 64;

/// The identification field recovered from a sector header.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SectorIdHeader {
    pub c: u8,
    pub h: u8,
    pub s: u8,
    pub n: u8,
}

impl SectorIdHeader {
    /// Payload size declared by the size code (128 << n), capped.
    pub fn size(&self) -> usize {
        std::cmp::min(MAXIMUM_SECTOR_SIZE, 128usize << self.n)
    }
}

/// Per-slot integrity after scanning a track.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SectorStatus {
    /// Header and data field both present with valid checksums.
    Good,
    /// Header valid, but the data field checksum did not match. Payload bytes
    /// are still available.
    DataCrcError,
    /// No validated header claimed this sector id.
    Missing,
}

/// One sector recovered from the bitstream.
#[derive(Clone, Debug)]
pub struct ScannedSector {
    pub id:          SectorIdHeader,
    pub data:        Vec<u8>,
    pub data_crc_ok: bool,
}

/// The result of scanning one track: recovered sectors indexed by the sector
/// id read from their identification field, not by physical order.
#[derive(Clone, Debug, Default)]
pub struct TrackScan {
    slots: Vec<Option<ScannedSector>>,
    id_errors: usize,
}

impl TrackScan {
    pub fn new(sector_count: usize) -> Self {
        Self {
            slots: vec![None; sector_count],
            id_errors: 0,
        }
    }

    pub fn status(&self, sector: usize) -> SectorStatus {
        match self.slots.get(sector) {
            Some(Some(s)) if s.data_crc_ok => SectorStatus::Good,
            Some(Some(_)) => SectorStatus::DataCrcError,
            _ => SectorStatus::Missing,
        }
    }

    pub fn sector(&self, sector: usize) -> Option<&ScannedSector> {
        self.slots.get(sector).and_then(|s| s.as_ref())
    }

    /// Payload bytes for a sector slot, present even when the data checksum
    /// failed. `None` only when no validated header claimed the slot.
    pub fn sector_data(&self, sector: usize) -> Option<&[u8]> {
        self.sector(sector).map(|s| s.data.as_slice())
    }

    /// Number of identification fields whose checksum failed. Such headers
    /// never claim a slot; their sector id cannot be trusted.
    pub fn id_errors(&self) -> usize {
        self.id_errors
    }

    /// Number of slots holding a recovered sector.
    pub fn present(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// True when the track produced no sector evidence at all, valid or
    /// corrupt. Callers use this to tell unformatted media from damage.
    pub fn is_unformatted(&self) -> bool {
        self.present() == 0 && self.id_errors == 0
    }
}

/// Scan the raw bit cells of one track for sector identification and data
/// fields, validating both checksums.
///
/// Sync marks are located by their out-of-band cell pattern, so scanning is
/// self-resynchronizing: malformed regions are skipped, and per-sector
/// failures never abort the remainder of the track. A track with no sync
/// marks at all decodes to an empty scan, not an error.
pub fn scan_track(bits: &BitVec, sector_count: usize) -> TrackScan {
    let mut scan = TrackScan::new(sector_count);
    let mut crc = CrcBank::new();
    let mut pos = 0;
    // A validated header waiting for its data field, and the cell position
    // where its CRC ended.
    let mut pending: Option<(SectorIdHeader, usize)> = None;

    while let Some(sync_end) = find_sync(bits, pos) {
        let mut cursor = sync_end;
        // Swallow the rest of the sync run.
        while read_raw_u16(bits, cursor) == Some(A1_SYNC_CELLS) {
            cursor += CELLS_PER_BYTE;
        }

        let Some(mark) = read_decoded_byte(bits, cursor) else {
            break;
        };
        cursor += CELLS_PER_BYTE;

        match mark {
            IDAM_MARK => {
                let mut field = [0u8; 6];
                if !read_bytes(bits, &mut cursor, &mut field) {
                    break;
                }
                let stored_crc = u16::from_be_bytes([field[4], field[5]]);
                crc.start(CRC_ID_FIELD);
                for byte in [0xA1, 0xA1, 0xA1, IDAM_MARK, field[0], field[1], field[2], field[3]] {
                    crc.feed(byte);
                }
                let computed = crc.finalize(CRC_ID_FIELD);
                if computed == stored_crc {
                    let header = SectorIdHeader {
                        c: field[0],
                        h: field[1],
                        s: field[2],
                        n: field[3],
                    };
                    log::trace!("scan_track: header c:{} h:{} s:{} n:{}", header.c, header.h, header.s, header.n);
                    pending = Some((header, cursor));
                } else {
                    log::debug!(
                        "scan_track: header CRC mismatch at cell {} (stored {:04X}, computed {:04X})",
                        sync_end,
                        stored_crc,
                        computed
                    );
                    scan.id_errors += 1;
                    pending = None;
                }
            }
            DAM_MARK => {
                let Some((header, id_end)) = pending.take() else {
                    log::debug!("scan_track: orphan data mark at cell {}", sync_end);
                    pos = cursor;
                    continue;
                };
                if cursor.saturating_sub(id_end) > DAM_SCAN_WINDOW_BYTES * CELLS_PER_BYTE {
                    log::debug!("scan_track: data mark outside scan window of header s:{}", header.s);
                    pos = cursor;
                    continue;
                }

                let mut data = vec![0u8; header.size()];
                let mut trailer = [0u8; 2];
                if !read_bytes(bits, &mut cursor, &mut data) || !read_bytes(bits, &mut cursor, &mut trailer) {
                    break;
                }
                let stored_crc = u16::from_be_bytes(trailer);
                crc.start(CRC_DATA_FIELD);
                for byte in [0xA1, 0xA1, 0xA1, DAM_MARK] {
                    crc.feed(byte);
                }
                for byte in &data {
                    crc.feed(*byte);
                }
                let data_crc_ok = crc.finalize(CRC_DATA_FIELD) == stored_crc;
                if !data_crc_ok {
                    log::debug!("scan_track: data CRC mismatch for sector {}", header.s);
                }

                let slot = header.s as usize;
                if slot >= sector_count {
                    log::warn!("scan_track: sector id {} outside expected range", header.s);
                } else if scan.slots[slot].is_some() {
                    log::warn!("scan_track: duplicate sector id {}", header.s);
                } else {
                    scan.slots[slot] = Some(ScannedSector {
                        id: header,
                        data,
                        data_crc_ok,
                    });
                }
            }
            _ => {
                // A1 sync run followed by a mark this layout does not use.
                log::trace!("scan_track: unhandled mark {:02X} at cell {}", mark, sync_end);
            }
        }
        pos = cursor;
    }

    scan
}

fn read_bytes(bits: &BitVec, pos: &mut usize, buf: &mut [u8]) -> bool {
    for byte in buf.iter_mut() {
        match read_decoded_byte(bits, *pos) {
            Some(value) => {
                *byte = value;
                *pos += CELLS_PER_BYTE;
            }
            None => return false,
        }
    }
    true
}
