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

    src/diskimage.rs

    The in-memory physical disk image: one raw track bitstream per
    (cylinder, head), plus empirical geometry probing.

*/

use bit_vec::BitVec;

use crate::{
    chs::DiskCh,
    geometry::Geometry,
    track_decoder::scan_track,
    SECTORS_PER_TRACK,
};

/// The raw bit cells of exactly one (cylinder, head).
#[derive(Clone, Debug)]
pub struct TrackImage {
    ch:   DiskCh,
    bits: BitVec,
}

impl TrackImage {
    pub fn new(ch: DiskCh, bits: BitVec) -> Self {
        Self { ch, bits }
    }

    pub fn ch(&self) -> DiskCh {
        self.ch
    }

    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    pub fn bits_mut(&mut self) -> &mut BitVec {
        &mut self.bits
    }

    /// Track length in bit cells.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

/// An in-memory physical medium image holding the formatted tracks of a disk.
#[derive(Clone, Debug, Default)]
pub struct DiskImage {
    tracks: Vec<TrackImage>,
}

impl DiskImage {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_track(&mut self, track: TrackImage) {
        self.tracks.push(track);
    }

    pub fn track(&self, ch: DiskCh) -> Option<&TrackImage> {
        self.tracks.iter().find(|t| t.ch() == ch)
    }

    pub fn track_mut(&mut self, ch: DiskCh) -> Option<&mut TrackImage> {
        self.tracks.iter_mut().find(|t| t.ch() == ch)
    }

    pub fn tracks(&self) -> &[TrackImage] {
        &self.tracks
    }

    /// Empirically probe the geometry of the tracks actually present. The
    /// sector count hypothesis comes from scanning the first track. A fully
    /// unformatted image reports zero for every count.
    pub fn probe_geometry(&self) -> Geometry {
        let track_count = self.tracks.iter().map(|t| t.ch().c() + 1).max().unwrap_or(0);
        let head_count = self.tracks.iter().map(|t| t.ch().h() + 1).max().unwrap_or(0);

        let (sector_count, sector_sizes) = match self.tracks.first() {
            Some(track) => {
                let scan = scan_track(track.bits(), SECTORS_PER_TRACK);
                let sizes: Vec<usize> = (0..SECTORS_PER_TRACK)
                    .filter_map(|s| scan.sector_data(s).map(|d| d.len()))
                    .collect();
                (scan.present(), sizes)
            }
            None => (0, Vec::new()),
        };

        Geometry {
            track_count,
            head_count,
            sector_count,
            sector_sizes,
        }
    }
}
