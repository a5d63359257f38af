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

    src/geometry.rs

    Medium geometry: recognition from container length and canonicalization
    of probed geometry for the save direction.

*/

use crate::{LARGE_SECTOR_SIZE, SECTORS_PER_TRACK, SMALL_SECTOR_SIZE, TRACK_RECORD_SIZE};

/// Track count of the one supported geometry.
pub const ESQ_TRACK_COUNT: u16 = 80;
/// Head count of the one supported geometry.
pub const ESQ_HEAD_COUNT: u8 = 1;

/// The (track count, head count, sector count, sector sizes) tuple describing
/// a medium's addressable capacity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Geometry {
    pub track_count:  u16,
    pub head_count:   u8,
    pub sector_count: usize,
    pub sector_sizes: Vec<usize>,
}

impl Geometry {
    /// The one supported geometry: 80 tracks, 1 head, six sectors of which
    /// the first five are 1024 bytes and the sixth 512.
    pub fn esq() -> Geometry {
        let mut sector_sizes = vec![LARGE_SECTOR_SIZE; SECTORS_PER_TRACK - 1];
        sector_sizes.push(SMALL_SECTOR_SIZE);
        Geometry {
            track_count: ESQ_TRACK_COUNT,
            head_count: ESQ_HEAD_COUNT,
            sector_count: SECTORS_PER_TRACK,
            sector_sizes,
        }
    }

    /// Recognize a flat container by length alone. `None` means "not this
    /// format" to a format-selection caller, not a failure.
    pub fn from_raw_size(len: u64) -> Option<Geometry> {
        let expected = ESQ_TRACK_COUNT as u64 * ESQ_HEAD_COUNT as u64 * TRACK_RECORD_SIZE as u64;
        (len == expected).then(Geometry::esq)
    }

    /// Correct an empirically probed geometry to the canonical one for
    /// extraction. Track and sector counts are forced; the head count is only
    /// raised to one, since a fully unformatted medium probes as zero heads.
    pub fn canonical(probed: &Geometry) -> Geometry {
        Geometry {
            head_count: probed.head_count.max(ESQ_HEAD_COUNT),
            ..Geometry::esq()
        }
    }

    /// Payload bytes of one track record in the flat container.
    pub fn track_record_size(&self) -> usize {
        self.sector_sizes.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_the_supported_length_only() {
        let geometry = Geometry::from_raw_size(80 * 5632).expect("geometry not recognized");
        assert_eq!(geometry.track_count, 80);
        assert_eq!(geometry.head_count, 1);
        assert_eq!(geometry.sector_sizes, [1024, 1024, 1024, 1024, 1024, 512]);
        assert_eq!(geometry.track_record_size(), 5632);

        assert_eq!(Geometry::from_raw_size(80 * 5632 - 1), None);
        assert_eq!(Geometry::from_raw_size(80 * 5632 + 1), None);
        assert_eq!(Geometry::from_raw_size(0), None);
        // A standard 360k PC image must not be claimed.
        assert_eq!(Geometry::from_raw_size(368_640), None);
    }

    #[test]
    fn canonical_fixes_unformatted_probe() {
        let probed = Geometry::default();
        let fixed = Geometry::canonical(&probed);
        assert_eq!(fixed, Geometry::esq());
    }

    #[test]
    fn canonical_keeps_extra_heads() {
        let mut probed = Geometry::esq();
        probed.head_count = 2;
        probed.track_count = 40;
        let fixed = Geometry::canonical(&probed);
        assert_eq!(fixed.head_count, 2);
        assert_eq!(fixed.track_count, 80);
        assert_eq!(fixed.sector_count, 6);
    }
}
