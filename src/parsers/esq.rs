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

    src/parsers/esq.rs

    The Ensoniq Mirage/SQ-80 raw sector container: a headerless file of
    80 track-records, each five 1024-byte sectors followed by one 512-byte
    sector in ascending sector-id order.

*/

use std::io::SeekFrom;

use crate::{
    chs::DiskCh,
    diskimage::DiskImage,
    geometry::Geometry,
    io::{stream_length, ReadSeek, ReadWriteSeek},
    parsers::ImageFormatParser,
    track_decoder::{scan_track, TrackScan},
    track_encoder::generate_track,
    track_layout::{esq_track_layout, SectorSpec},
    EsqImageError,
    ESQ_TRACK_CELLS,
};

pub struct EsqImageFormat;

impl ImageFormatParser for EsqImageFormat {
    fn name(&self) -> &'static str {
        "esq8"
    }

    fn description(&self) -> &'static str {
        "Ensoniq Mirage/SQ-80 floppy disk image"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["img"]
    }

    fn supports_save(&self) -> bool {
        true
    }

    fn detect<RWS: ReadSeek>(&self, image_buf: &mut RWS) -> bool {
        stream_length(image_buf).is_ok_and(|len| Geometry::from_raw_size(len).is_some())
    }

    fn load_image<RWS: ReadSeek>(&self, image_buf: &mut RWS) -> Result<DiskImage, EsqImageError> {
        let len = stream_length(image_buf)?;
        let geometry = Geometry::from_raw_size(len).ok_or(EsqImageError::UnrecognizedGeometry(len))?;

        // One shared layout program for every track of the image.
        let layout = esq_track_layout(geometry.sector_count);

        image_buf.seek(SeekFrom::Start(0))?;
        let mut image = DiskImage::new();
        let mut record = vec![0u8; geometry.track_record_size()];

        for c in 0..geometry.track_count {
            for h in 0..geometry.head_count {
                image_buf.read_exact(&mut record)?;

                let mut offset = 0;
                let mut sectors = Vec::with_capacity(geometry.sector_count);
                for (s, &size) in geometry.sector_sizes.iter().enumerate() {
                    sectors.push(SectorSpec::new(s as u8, record[offset..offset + size].to_vec()));
                    offset += size;
                }

                let track = generate_track(&layout, DiskCh::new(c, h), &sectors, ESQ_TRACK_CELLS)?;
                image.add_track(track);
            }
        }

        log::debug!(
            "load_image: generated {} tracks x {} heads",
            geometry.track_count,
            geometry.head_count
        );
        Ok(image)
    }

    fn save_image<RWS: ReadWriteSeek>(&self, image: &DiskImage, image_buf: &mut RWS) -> Result<(), EsqImageError> {
        let geometry = Geometry::canonical(&image.probe_geometry());

        image_buf.seek(SeekFrom::Start(0))?;
        for c in 0..geometry.track_count {
            for h in 0..geometry.head_count {
                let ch = DiskCh::new(c, h);
                let scan = match image.track(ch) {
                    Some(track) => scan_track(track.bits(), geometry.sector_count),
                    None => TrackScan::new(geometry.sector_count),
                };

                // Sector payloads land at ascending offsets in id order.
                for (s, &expected) in geometry.sector_sizes.iter().enumerate() {
                    let data = scan.sector_data(s).unwrap_or(&[]);
                    if data.len() != expected {
                        return Err(EsqImageError::SectorSizeMismatch {
                            track: c,
                            head: h,
                            sector: s as u8,
                            expected,
                            actual: data.len(),
                        });
                    }
                    image_buf.write_all(data)?;
                }
            }
        }

        Ok(())
    }
}
