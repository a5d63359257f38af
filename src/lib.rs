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
*/

//! Encode and decode the physical track layout used by the floppy disk
//! controllers of 8-bit Ensoniq samplers and synthesizers (Mirage, SQ-80).
//!
//! Disks are PC-style MFM with six sectors per track: sectors 0-4 are
//! 1024 bytes and sector 5 is 512 bytes. A declarative layout program
//! ([`track_layout`]) drives both directions: [`track_encoder`] turns sector
//! payloads into a bit-accurate track image, and [`track_decoder`] recovers
//! payloads from a raw bitstream, locating sectors by their out-of-band sync
//! marks and validating both field checksums. The flat `.img` container is
//! read and written through [`parsers::EsqImageFormat`].

pub mod chs;
pub mod crc;
pub mod diskimage;
pub mod geometry;
pub mod io;
pub mod mfm;
pub mod parsers;
pub mod track_decoder;
pub mod track_encoder;
pub mod track_layout;

use thiserror::Error;

/// Bit cells of one physical track at double density, 300 RPM.
pub const ESQ_TRACK_CELLS: usize = 109_376;

/// Sectors per track of the supported geometry.
pub const SECTORS_PER_TRACK: usize = 6;
/// Payload size of sectors 0-4.
pub const LARGE_SECTOR_SIZE: usize = 1024;
/// Payload size of sector 5.
pub const SMALL_SECTOR_SIZE: usize = 512;
/// Payload bytes of one track record in the flat container.
pub const TRACK_RECORD_SIZE: usize = 5 * LARGE_SECTOR_SIZE + SMALL_SECTOR_SIZE;
/// Upper bound on a sector size decoded from an identification field.
pub const MAXIMUM_SECTOR_SIZE: usize = 8192;

#[derive(Debug, Error)]
pub enum EsqImageError {
    #[error("An IO error occurred reading or writing the disk image: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Container length {0} does not match a supported geometry")]
    UnrecognizedGeometry(u64),
    #[error("Track {track}, head {head}, sector {sector}: invalid size: {actual} (expected {expected})")]
    SectorSizeMismatch {
        track:    u16,
        head:     u8,
        sector:   u8,
        expected: usize,
        actual:   usize,
    },
    #[error("Generated track is {actual} cells (expected {expected})")]
    TrackCapacityMismatch { expected: usize, actual: usize },
    #[error("Malformed track layout: {0}")]
    LayoutError(&'static str),
}

pub use crate::{
    chs::DiskCh,
    diskimage::{DiskImage, TrackImage},
    geometry::Geometry,
    parsers::{EsqImageFormat, ImageFormatParser},
    track_decoder::{scan_track, ScannedSector, SectorIdHeader, SectorStatus, TrackScan},
    track_encoder::generate_track,
    track_layout::{esq_track_layout, LayoutInstruction, SectorSpec, TrackLayout},
};
