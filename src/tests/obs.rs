#[cfg(test)]
mod test {
    use crate::{
        prelude::*,
        tests::toolkit::{epoch_line, gpst, obs_header, observables},
    };
    use std::io::{BufReader, Cursor, ErrorKind, Read};
    use std::path::PathBuf;

    const OBSERVABLES: [&str; 5] = ["L1", "L2", "C1", "P1", "P2"];

    fn receiver() -> GroundPosition {
        GroundPosition::from_ecef_wgs84((1441876.787, -4456613.201, 4284620.341))
    }

    /// L1 L2 C1 P1 P2, all valid
    fn valid(shift: f64) -> String {
        observables(&[
            Some(110_000_000.125 + shift),
            Some(85_700_000.250 + shift),
            Some(20_000_000.500),
            Some(20_000_000.750),
            Some(20_000_003.250),
        ])
    }

    fn parse(content: &str, density: usize) -> Result<ObservationSet, Error> {
        ObservationSet::from_reader(Cursor::new(content.to_string()), density)
    }

    fn temp_file(name: &str, content: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("gnss-tec-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn header_position() {
        let mut content = obs_header(&OBSERVABLES, &receiver());
        content.push_str(&epoch_line((21, 1, 1, 0, 0, 0.0), 0, &["G01"]));
        content.push_str(&valid(0.0));

        let set = parse(&content, 1).unwrap();
        assert_eq!(set.receiver_position, Some(receiver()));
        assert_eq!(set.observations.len(), 1);

        let obs = set.observations[0];
        assert_eq!(obs.sv, SV::new(Constellation::GPS, 1));
        assert_eq!(obs.epoch, gpst((21, 1, 1, 0, 0, 0.0)));
        let expected = Observation::from_measurements(
            obs.sv,
            obs.epoch,
            110_000_000.125,
            85_700_000.250,
            20_000_003.250,
            20_000_000.750,
        );
        assert_eq!(obs, expected);
        assert!(obs.elevation.is_none());
        assert!(obs.slant_tec.is_none());
        assert!(obs.tec_error.is_none());
        assert!(obs.vertical_tec.is_none());

        let null = obs_header(&OBSERVABLES, &GroundPosition::default());
        let set = parse(&null, 1).unwrap();
        assert!(set.receiver_position.is_none());
        assert!(set.observations.is_empty());
    }

    #[test]
    fn epoch_density() {
        let mut content = obs_header(&OBSERVABLES, &receiver());
        for minute in 0..5 {
            content.push_str(&epoch_line((21, 1, 1, 0, minute, 0.0), 0, &["G01", "G02"]));
            content.push_str(&valid(minute as f64));
            content.push_str(&valid(minute as f64));
        }

        let set = parse(&content, 1).unwrap();
        assert_eq!(set.observations.len(), 10);
        assert_eq!(
            set.satellites(),
            vec![SV::new(Constellation::GPS, 1), SV::new(Constellation::GPS, 2)]
        );
        assert_eq!(set.epochs().len(), 5);

        let set = parse(&content, 2).unwrap();
        let epochs = set.observations.iter().map(|obs| obs.epoch).collect::<Vec<_>>();
        assert_eq!(
            epochs,
            vec![
                gpst((21, 1, 1, 0, 1, 0.0)),
                gpst((21, 1, 1, 0, 1, 0.0)),
                gpst((21, 1, 1, 0, 3, 0.0)),
                gpst((21, 1, 1, 0, 3, 0.0)),
            ]
        );

        let set = parse(&content, 5).unwrap();
        assert_eq!(set.observations.len(), 2);
        assert!(set
            .observations
            .iter()
            .all(|obs| obs.epoch == gpst((21, 1, 1, 0, 4, 0.0))));

        // null density is treated as 1
        let set = parse(&content, 0).unwrap();
        assert_eq!(set.observations.len(), 10);
    }

    #[test]
    fn special_events() {
        let mut content = obs_header(&OBSERVABLES, &receiver());
        content.push_str(&epoch_line((21, 1, 1, 0, 0, 0.0), 0, &["G01"]));
        content.push_str(&valid(0.0));
        // new header information follows
        content.push_str(&epoch_line((21, 1, 1, 0, 0, 30.0), 4, &["G01", "G02"]));
        content.push_str(&format!("{:<60}COMMENT\n", "receiver reset"));
        content.push_str(&format!("{:<60}COMMENT\n", "antenna swapped"));
        // cycle slip records
        content.push_str(&epoch_line((21, 1, 1, 0, 0, 30.0), 6, &["G01"]));
        content.push_str(&valid(0.0));
        content.push_str(&epoch_line((21, 1, 1, 0, 1, 0.0), 0, &["G01"]));
        content.push_str(&valid(1.0));

        let set = parse(&content, 1).unwrap();
        let epochs = set.observations.iter().map(|obs| obs.epoch).collect::<Vec<_>>();
        assert_eq!(
            epochs,
            vec![gpst((21, 1, 1, 0, 0, 0.0)), gpst((21, 1, 1, 0, 1, 0.0))]
        );

        // special records do not count as data epochs
        let set = parse(&content, 2).unwrap();
        assert_eq!(set.observations.len(), 1);
        assert_eq!(set.observations[0].epoch, gpst((21, 1, 1, 0, 1, 0.0)));
    }

    #[test]
    fn satellite_continuation() {
        let svnn = (1..=14).map(|prn| format!("G{:02}", prn)).collect::<Vec<_>>();
        let svnn = svnn.iter().map(|sv| sv.as_str()).collect::<Vec<_>>();

        let mut content = obs_header(&OBSERVABLES, &receiver());
        content.push_str(&epoch_line((21, 1, 1, 0, 0, 0.0), 0, &svnn));
        for _ in 0..svnn.len() {
            content.push_str(&valid(0.0));
        }
        content.push_str(&epoch_line((21, 1, 1, 0, 0, 30.0), 0, &["G14"]));
        content.push_str(&valid(0.0));

        let set = parse(&content, 1).unwrap();
        assert_eq!(set.observations.len(), 15);
        for (prn, obs) in (1..=14).zip(set.observations.iter()) {
            assert_eq!(obs.sv, SV::new(Constellation::GPS, prn));
        }
        assert_eq!(set.observations[14].epoch, gpst((21, 1, 1, 0, 0, 30.0)));
    }

    #[test]
    fn other_constellations() {
        let mut content = obs_header(&OBSERVABLES, &receiver());
        content.push_str(&epoch_line(
            (21, 1, 1, 0, 0, 0.0),
            0,
            &["G01", "R05", "E11", " 2"],
        ));
        for _ in 0..4 {
            content.push_str(&valid(0.0));
        }
        let set = parse(&content, 1).unwrap();
        let svnn = set.observations.iter().map(|obs| obs.sv).collect::<Vec<_>>();
        assert_eq!(
            svnn,
            vec![
                SV::new(Constellation::GPS, 1),
                SV::new(Constellation::GPS, 2)
            ]
        );
    }

    #[test]
    fn invalid_measurements() {
        let mut content = obs_header(&OBSERVABLES, &receiver());
        content.push_str(&epoch_line(
            (21, 1, 1, 0, 0, 0.0),
            0,
            &["G01", "G02", "G03", "G04", "G05"],
        ));
        // loss of lock
        content.push_str(&observables(&[
            Some(0.0),
            Some(85_700_000.250),
            Some(20_000_000.500),
            Some(20_000_000.750),
            Some(20_000_003.250),
        ]));
        // P1 missing: P2 - C1
        content.push_str(&observables(&[
            Some(110_000_000.125),
            Some(85_700_000.250),
            Some(20_000_000.500),
            None,
            Some(20_000_003.250),
        ]));
        // no range on second frequency
        content.push_str(&observables(&[
            Some(110_000_000.125),
            Some(85_700_000.250),
            Some(20_000_000.500),
            Some(20_000_000.750),
            None,
        ]));
        // blank L2
        content.push_str(&observables(&[
            Some(110_000_000.125),
            None,
            Some(20_000_000.500),
            Some(20_000_000.750),
            Some(20_000_003.250),
        ]));
        content.push_str(&valid(0.0));

        let set = parse(&content, 1).unwrap();
        assert_eq!(set.observations.len(), 2);

        let g02 = set.observations[0];
        assert_eq!(g02.sv, SV::new(Constellation::GPS, 2));
        let expected = Observation::from_measurements(
            g02.sv,
            g02.epoch,
            110_000_000.125,
            85_700_000.250,
            20_000_003.250,
            20_000_000.500,
        );
        assert_eq!(g02.differential_range, expected.differential_range);
        assert_eq!(set.observations[1].sv, SV::new(Constellation::GPS, 5));
    }

    #[test]
    fn second_frequency_code() {
        // C1 and C2 only, on two lines per satellite
        let codes = ["L1", "L2", "C1", "S1", "S2", "C2"];
        let mut content = obs_header(&codes, &receiver());
        content.push_str(&epoch_line((21, 1, 1, 0, 0, 0.0), 0, &["G07"]));
        content.push_str(&observables(&[
            Some(110_000_000.125),
            Some(85_700_000.250),
            Some(20_000_000.500),
            Some(45.0),
            Some(38.0),
            Some(20_000_004.000),
        ]));
        let set = parse(&content, 1).unwrap();
        assert_eq!(set.observations.len(), 1);
        let obs = set.observations[0];
        let expected = Observation::from_measurements(
            obs.sv,
            obs.epoch,
            110_000_000.125,
            85_700_000.250,
            20_000_004.000,
            20_000_000.500,
        );
        assert_eq!(obs.differential_range, expected.differential_range);
    }

    #[test]
    fn truncated_body() {
        let mut content = obs_header(&OBSERVABLES, &receiver());
        content.push_str(&epoch_line((21, 1, 1, 0, 0, 0.0), 0, &["G01"]));
        content.push_str(&valid(0.0));
        content.push_str(&epoch_line((21, 1, 1, 0, 0, 30.0), 0, &["G01", "G02"]));
        content.push_str(&valid(0.0));
        let set = parse(&content, 1).unwrap();
        // complete satellite records are preserved
        assert_eq!(set.observations.len(), 2);
    }

    #[test]
    fn latin1_comments() {
        let mut content = obs_header(&OBSERVABLES, &receiver()).into_bytes();
        content.extend_from_slice(epoch_line((21, 1, 1, 0, 0, 0.0), 0, &["G01"]).as_bytes());
        content.extend_from_slice(valid(0.0).as_bytes());
        content.extend_from_slice(epoch_line((21, 1, 1, 0, 0, 30.0), 4, &["G01"]).as_bytes());
        content.extend_from_slice(b"antenne d\xe9plac\xe9e");
        content.extend_from_slice(format!("{:<46}COMMENT\n", "").as_bytes());
        content.extend_from_slice(epoch_line((21, 1, 1, 0, 1, 0.0), 0, &["G01"]).as_bytes());
        content.extend_from_slice(valid(1.0).as_bytes());
        content.extend_from_slice(epoch_line((21, 1, 1, 0, 2, 0.0), 0, &["G01"]).as_bytes());
        content.extend_from_slice(valid(2.0).as_bytes());

        let set = ObservationSet::from_reader(Cursor::new(content), 1).unwrap();
        let epochs = set.observations.iter().map(|obs| obs.epoch).collect::<Vec<_>>();
        assert_eq!(
            epochs,
            vec![
                gpst((21, 1, 1, 0, 0, 0.0)),
                gpst((21, 1, 1, 0, 1, 0.0)),
                gpst((21, 1, 1, 0, 2, 0.0)),
            ]
        );
    }

    /// Fails every read
    struct Unreadable;

    impl Read for Unreadable {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::InvalidData, "corrupt stream"))
        }
    }

    #[test]
    fn read_failures() {
        let mut content = obs_header(&OBSERVABLES, &receiver());
        content.push_str(&epoch_line((21, 1, 1, 0, 0, 0.0), 0, &["G01"]));
        content.push_str(&valid(0.0));

        let reader = BufReader::new(Cursor::new(content.clone()).chain(Unreadable));
        assert!(matches!(
            ObservationSet::from_reader(reader, 1),
            Err(Error::IoError(_))
        ));

        // within the header
        let reader = BufReader::new(Cursor::new(content[..200].to_string()).chain(Unreadable));
        assert!(matches!(
            ObservationSet::from_reader(reader, 1),
            Err(Error::IoError(_))
        ));
    }

    #[test]
    fn unrecoverable_headers() {
        let content = obs_header(&["L1", "C1", "P2"], &receiver());
        assert!(matches!(
            parse(&content, 1),
            Err(Error::ParsingError(ParsingError::MissingPhase))
        ));

        let content = obs_header(&["L1", "L2", "P2"], &receiver());
        assert!(matches!(
            parse(&content, 1),
            Err(Error::ParsingError(ParsingError::MissingFirstRange))
        ));

        let content = obs_header(&["L1", "L2", "P1"], &receiver());
        assert!(matches!(
            parse(&content, 1),
            Err(Error::ParsingError(ParsingError::MissingSecondRange))
        ));

        let mut content = obs_header(&OBSERVABLES, &receiver());
        content = content.replace("END OF HEADER", "COMMENT");
        assert!(matches!(
            parse(&content, 1),
            Err(Error::ParsingError(ParsingError::MissingHeaderTerminator))
        ));

        let path = temp_file("missing.21o", obs_header(&["L1", "L2"], &receiver()).as_bytes());
        assert!(parse_observations(&path, 1).is_none());
        assert!(parse_observations("/does/not/exist.21o", 1).is_none());
    }

    #[test]
    fn multiple_files() {
        let mut first = obs_header(&OBSERVABLES, &GroundPosition::default());
        first.push_str(&epoch_line((21, 1, 1, 0, 0, 0.0), 0, &["G01"]));
        first.push_str(&valid(0.0));

        let mut second = obs_header(&OBSERVABLES, &receiver());
        second.push_str(&epoch_line((21, 1, 1, 0, 0, 30.0), 0, &["G02"]));
        second.push_str(&valid(0.0));

        let paths = [
            temp_file("first.21o", first.as_bytes()),
            temp_file("second.21o", second.as_bytes()),
            PathBuf::from("/does/not/exist.21o"),
        ];

        let set = parse_observation_files(&paths, 1, 2).unwrap();
        assert_eq!(set.receiver_position, Some(receiver()));
        assert_eq!(set.observations.len(), 2);
        assert_eq!(set.observations[0].sv, SV::new(Constellation::GPS, 1));
        assert_eq!(set.observations[1].sv, SV::new(Constellation::GPS, 2));

        let product = Product::from_file(FileKind::guess(&paths[1]).unwrap(), &paths[1], 1).unwrap();
        assert_eq!(product.kind(), FileKind::Observation);
        assert_eq!(
            product.as_observation().map(|set| set.observations.len()),
            Some(1)
        );

        assert!(parse_observation_files(&paths[2..], 1, 1).is_none());
    }

    #[test]
    #[cfg(feature = "flate2")]
    fn gzip_compressed() {
        use flate2::{write::GzEncoder, Compression};
        use std::io::Write;

        let mut content = obs_header(&OBSERVABLES, &receiver());
        content.push_str(&epoch_line((21, 1, 1, 0, 0, 0.0), 0, &["G01"]));
        content.push_str(&valid(0.0));

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        let path = temp_file("compressed.21o.gz", &encoder.finish().unwrap());

        let set = parse_observations(&path, 1).unwrap();
        assert_eq!(set.observations.len(), 1);
        assert_eq!(FileKind::guess(&path).unwrap(), FileKind::Observation);
    }
}
