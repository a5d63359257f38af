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

    src/parsers/mod.rs

    Container format parsers mapping flat image files to physical disk images.

*/

use crate::{
    io::{ReadSeek, ReadWriteSeek},
    DiskImage,
    EsqImageError,
};

pub mod esq;

pub use esq::EsqImageFormat;

/// A trait implemented by container format parsers.
pub trait ImageFormatParser {
    /// The format's identification string.
    fn name(&self) -> &'static str;
    /// Human-readable display name of the format.
    fn description(&self) -> &'static str;
    /// File extensions conventionally carrying this format.
    fn extensions(&self) -> &'static [&'static str];
    /// Whether the parser can write a physical image back to a container.
    fn supports_save(&self) -> bool;
    /// Detect and return true if the container is of a format the parser can
    /// read. Detection is heuristic, used to rank format candidates.
    fn detect<RWS: ReadSeek>(&self, image_buf: &mut RWS) -> bool;
    /// Build a physical [`DiskImage`] from the container.
    fn load_image<RWS: ReadSeek>(&self, image_buf: &mut RWS) -> Result<DiskImage, EsqImageError>;
    /// Extract sector payloads from a physical [`DiskImage`] back into the
    /// container layout.
    fn save_image<RWS: ReadWriteSeek>(&self, image: &DiskImage, image_buf: &mut RWS) -> Result<(), EsqImageError>;
}
