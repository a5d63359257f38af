//! Container-level tests: detection, load/save round trips and geometry
//! canonicalization through the `esq8` raw sector image parser.

use std::io::Cursor;

use esqimg::{
    DiskCh,
    DiskImage,
    EsqImageError,
    EsqImageFormat,
    ImageFormatParser,
    LARGE_SECTOR_SIZE,
    TRACK_RECORD_SIZE,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_container() -> Vec<u8> {
    (0..80 * TRACK_RECORD_SIZE).map(|i| (i % 251) as u8).collect()
}

#[test]
fn detect_accepts_only_the_supported_length() {
    init();
    let parser = EsqImageFormat;
    assert!(parser.detect(&mut Cursor::new(test_container())));
    assert!(!parser.detect(&mut Cursor::new(vec![0u8; 368_640])));
    assert!(!parser.detect(&mut Cursor::new(vec![0u8; 80 * TRACK_RECORD_SIZE - 1])));
    assert!(!parser.detect(&mut Cursor::new(Vec::new())));
}

#[test]
fn load_rejects_unrecognized_lengths() {
    init();
    let err = EsqImageFormat
        .load_image(&mut Cursor::new(vec![0u8; 1024]))
        .unwrap_err();
    assert!(matches!(err, EsqImageError::UnrecognizedGeometry(1024)));
}

#[test]
fn container_round_trip() {
    init();
    let parser = EsqImageFormat;
    let raw = test_container();

    let image = parser.load_image(&mut Cursor::new(&raw)).unwrap();
    assert_eq!(image.tracks().len(), 80);

    let mut out = Cursor::new(Vec::new());
    parser.save_image(&image, &mut out).unwrap();
    assert_eq!(out.into_inner(), raw);
}

#[test]
fn probed_geometry_matches_container() {
    init();
    let image = EsqImageFormat.load_image(&mut Cursor::new(test_container())).unwrap();
    let geometry = image.probe_geometry();
    assert_eq!(geometry.track_count, 80);
    assert_eq!(geometry.head_count, 1);
    assert_eq!(geometry.sector_count, 6);
    assert_eq!(geometry.sector_sizes, [1024, 1024, 1024, 1024, 1024, 512]);
}

#[test]
fn damaged_payload_still_extracts() {
    init();
    let parser = EsqImageFormat;
    let raw = test_container();
    let mut image = parser.load_image(&mut Cursor::new(&raw)).unwrap();

    // Flip one payload data cell on track 10; extraction tolerates the data
    // CRC error and writes the damaged byte through.
    let track = image.track_mut(DiskCh::new(10, 0)).unwrap();
    let cell = 2528 + 768 + 1;
    let value = track.bits()[cell];
    track.bits_mut().set(cell, !value);

    let mut out = Cursor::new(Vec::new());
    parser.save_image(&image, &mut out).unwrap();
    let saved = out.into_inner();

    let offset = 10 * TRACK_RECORD_SIZE;
    assert_ne!(saved[offset], raw[offset]);
    assert_eq!(saved[..offset], raw[..offset]);
    assert_eq!(saved[offset + 1..], raw[offset + 1..]);
}

#[test]
fn save_of_unformatted_image_reports_first_missing_sector() {
    init();
    // No formatted tracks at all; canonical geometry is still forced, so the
    // very first sector comes up empty.
    let err = EsqImageFormat
        .save_image(&DiskImage::new(), &mut Cursor::new(Vec::new()))
        .unwrap_err();
    match err {
        EsqImageError::SectorSizeMismatch {
            track,
            head,
            sector,
            expected,
            actual,
        } => {
            assert_eq!((track, head, sector), (0, 0, 0));
            assert_eq!(expected, LARGE_SECTOR_SIZE);
            assert_eq!(actual, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}
