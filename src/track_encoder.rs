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

    src/track_encoder.rs

    Interprets a track layout program against a set of sector payloads to
    produce the raw bit cells of one physical track.

*/

use crate::{
    chs::DiskCh,
    crc::CrcBank,
    diskimage::TrackImage,
    mfm::{raw_data_byte, MfmWriter},
    track_layout::{LayoutInstruction, SectorSpec, TrackLayout},
    EsqImageError,
};

/// Encode one physical track.
///
/// Walks the layout once, left to right, with a cell write cursor and a CRC
/// bank. Field placeholders substitute `ch` and the current sector's id and
/// size code; `SectorData` copies the payload verbatim while feeding any open
/// CRC regions. The finished image must be exactly `cell_count` cells or the
/// layout and sector sizes disagree with the declared track capacity.
pub fn generate_track(
    layout: &TrackLayout,
    ch: DiskCh,
    sectors: &[SectorSpec],
    cell_count: usize,
) -> Result<TrackImage, EsqImageError> {
    let prog = layout.instructions();
    let mut writer = MfmWriter::with_capacity(cell_count);
    let mut crc = CrcBank::new();

    let mut pc = 0;
    let mut loop_head: Option<usize> = None;
    let mut loop_remaining = 0;
    let mut sector_index = 0;

    while pc < prog.len() {
        match prog[pc] {
            LayoutInstruction::Mfm { value, count } => {
                for _ in 0..count {
                    write_data_byte(&mut writer, &mut crc, value);
                }
            }
            LayoutInstruction::Raw { value, count } => {
                for _ in 0..count {
                    writer.write_raw_u16(value);
                    crc.feed(raw_data_byte(value));
                }
            }
            LayoutInstruction::TrackId => write_data_byte(&mut writer, &mut crc, ch.c() as u8),
            LayoutInstruction::HeadId => write_data_byte(&mut writer, &mut crc, ch.h()),
            LayoutInstruction::SectorId => {
                let sector = current_sector(sectors, sector_index, loop_head)?;
                write_data_byte(&mut writer, &mut crc, sector.sector_id);
            }
            LayoutInstruction::SizeId => {
                let sector = current_sector(sectors, sector_index, loop_head)?;
                write_data_byte(&mut writer, &mut crc, sector.size_code());
            }
            LayoutInstruction::CrcStart(id) => crc.start(id),
            LayoutInstruction::CrcEnd(id) => crc.end(id),
            LayoutInstruction::Crc(id) => {
                let value = crc.take(id);
                write_data_byte(&mut writer, &mut crc, (value >> 8) as u8);
                write_data_byte(&mut writer, &mut crc, value as u8);
            }
            LayoutInstruction::SectorData => {
                let sector = current_sector(sectors, sector_index, loop_head)?;
                for &byte in &sector.data {
                    write_data_byte(&mut writer, &mut crc, byte);
                }
            }
            LayoutInstruction::SectorLoopStart { count } => {
                if loop_head.is_some() {
                    return Err(EsqImageError::LayoutError("nested sector loops"));
                }
                if count == 0 {
                    // Empty loop: skip straight past the matching end marker.
                    pc += prog[pc..]
                        .iter()
                        .position(|i| matches!(i, LayoutInstruction::SectorLoopEnd))
                        .ok_or(EsqImageError::LayoutError("unterminated sector loop"))?;
                } else {
                    loop_head = Some(pc);
                    loop_remaining = count;
                    sector_index = 0;
                }
            }
            LayoutInstruction::SectorLoopEnd => match loop_head {
                Some(head) if loop_remaining > 1 => {
                    loop_remaining -= 1;
                    sector_index += 1;
                    pc = head;
                }
                Some(_) => loop_head = None,
                None => return Err(EsqImageError::LayoutError("sector loop end without start")),
            },
            LayoutInstruction::End => break,
        }
        pc += 1;
    }

    let bits = writer.into_inner();
    if bits.len() != cell_count {
        return Err(EsqImageError::TrackCapacityMismatch {
            expected: cell_count,
            actual:   bits.len(),
        });
    }

    log::trace!("generate_track: encoded {} with {} sectors", ch, sectors.len());
    Ok(TrackImage::new(ch, bits))
}

#[inline]
fn write_data_byte(writer: &mut MfmWriter, crc: &mut CrcBank, byte: u8) {
    writer.write_byte(byte);
    crc.feed(byte);
}

fn current_sector<'a>(
    sectors: &'a [SectorSpec],
    sector_index: usize,
    loop_head: Option<usize>,
) -> Result<&'a SectorSpec, EsqImageError> {
    if loop_head.is_none() {
        return Err(EsqImageError::LayoutError("sector field outside sector loop"));
    }
    sectors
        .get(sector_index)
        .ok_or(EsqImageError::LayoutError("sector loop exceeds supplied sectors"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track_layout::esq_track_layout;
    use crate::{ESQ_TRACK_CELLS, SECTORS_PER_TRACK};

    fn test_sectors() -> Vec<SectorSpec> {
        (0..SECTORS_PER_TRACK as u8)
            .map(|s| SectorSpec::new(s, vec![s; SectorSpec::expected_size(s)]))
            .collect()
    }

    #[test]
    fn canonical_layout_fills_track_capacity_exactly() {
        let layout = esq_track_layout(SECTORS_PER_TRACK);
        let track = generate_track(&layout, DiskCh::new(0, 0), &test_sectors(), ESQ_TRACK_CELLS).unwrap();
        assert_eq!(track.len(), ESQ_TRACK_CELLS);
    }

    #[test]
    fn wrong_payload_size_breaks_capacity() {
        let layout = esq_track_layout(SECTORS_PER_TRACK);
        let mut sectors = test_sectors();
        sectors[5].data = vec![0; 1024];
        let err = generate_track(&layout, DiskCh::new(0, 0), &sectors, ESQ_TRACK_CELLS).unwrap_err();
        assert!(matches!(err, EsqImageError::TrackCapacityMismatch { .. }));
    }

    #[test]
    fn loop_needs_enough_sectors() {
        let layout = esq_track_layout(SECTORS_PER_TRACK);
        let err = generate_track(&layout, DiskCh::new(0, 0), &test_sectors()[..4], ESQ_TRACK_CELLS).unwrap_err();
        assert!(matches!(err, EsqImageError::LayoutError(_)));
    }
}
