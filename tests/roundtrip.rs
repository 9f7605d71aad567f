/// Property tests: encoding then decoding reproduces the image

use imdmanager::*;
use proptest::prelude::*;

fn record_strategy(sector_size: usize) -> impl Strategy<Value = SectorDataRecord> {
    (0u8..=8).prop_flat_map(move |code| {
        let record_type = SectorDataRecordType::from_code(code).unwrap();
        proptest::collection::vec(any::<u8>(), record_type.payload_len(sector_size))
            .prop_map(move |data| SectorDataRecord::new(record_type, data))
    })
}

fn track_strategy() -> impl Strategy<Value = Track> {
    (0u8..6, any::<u8>(), 0u8..2, 0u8..3, 0usize..5, any::<bool>(), any::<bool>()).prop_flat_map(
        |(mode, cylinder, head, size_code, count, cyl_map, head_map)| {
            let sector_size = SectorSize::from_code(size_code).unwrap();
            let bytes = sector_size.bytes();
            (
                proptest::collection::vec(any::<u8>(), count),
                proptest::collection::vec(any::<u8>(), count),
                proptest::collection::vec(0u8..2, count),
                proptest::collection::vec(record_strategy(bytes), count),
            )
                .prop_map(move |(numbers, cylinders, heads, records)| {
                    Track::new(
                        TrackMode::from_code(mode).unwrap(),
                        cylinder,
                        head,
                        sector_size,
                        numbers,
                        cyl_map.then_some(cylinders),
                        head_map.then_some(heads),
                        records,
                    )
                    .unwrap()
                })
        },
    )
}

fn disk_strategy() -> impl Strategy<Value = Disk> {
    (
        0u8..10,
        0u8..100,
        1u8..32,
        1u8..13,
        1980u16..2100,
        0u8..24,
        0u8..60,
        0u8..60,
        proptest::collection::vec(0u8..0x1A, 0..40),
        proptest::collection::vec(track_strategy(), 0..4),
    )
        .prop_map(
            |(major, minor, day, month, year, hour, minute, second, comment, tracks)| {
                let header = ImdHeader::new(
                    ImdVersion::new(major, minor),
                    ImdDate::new(day, month, year),
                    ImdTime::new(hour, minute, second),
                )
                .unwrap();
                Disk::new(header, comment, tracks).unwrap()
            },
        )
}

proptest! {
    #[test]
    fn decode_of_encode_is_identity(disk in disk_strategy()) {
        let bytes = disk.to_bytes();
        prop_assert_eq!(bytes.len(), disk.size());
        let decoded = Disk::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&decoded, &disk);
        prop_assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn track_size_matches_encoding(track in track_strategy()) {
        prop_assert_eq!(track.to_bytes().len(), track.size());
        prop_assert_eq!(Track::from_bytes(&track.to_bytes()).unwrap(), track);
    }

    #[test]
    fn truncated_images_never_decode(disk in disk_strategy(), cut in any::<prop::sample::Index>()) {
        prop_assume!(!disk.is_empty());
        let bytes = disk.to_bytes();
        let last_len = disk.tracks()[disk.track_count() - 1].size();
        // Cut strictly inside the last track
        let end = bytes.len() - last_len + 1 + cut.index(last_len - 1);
        prop_assert!(Disk::from_bytes(&bytes[..end]).is_err());
    }
}

#[test]
fn record_type_codes_are_a_bijection() {
    for code in 0u8..=8 {
        let record_type = SectorDataRecordType::try_from(code).unwrap();
        assert_eq!(u8::from(record_type), code);
    }
    assert!(SectorDataRecordType::try_from(9).is_err());
    assert!(SectorDataRecordType::try_from(0xFF).is_err());
}
