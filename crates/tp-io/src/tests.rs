//! Unit tests for tp-io.

#[cfg(test)]
mod record_tests {
    use std::io::Cursor;

    use crate::{IoError, load_cars_reader, load_crosses_reader, load_presets_reader, load_roads_reader};

    #[test]
    fn roads_skip_comments_and_blank_lines() {
        let text = "#(id,length,speed,channel,from,to,isDuplex)\n\
                    (5000, 10, 5, 1, 1, 2, 1)\n\
                    \n\
                    (5001, 8, 4, 2, 2, 3, 0)\n";
        let roads = load_roads_reader(Cursor::new(text)).unwrap();
        assert_eq!(roads.len(), 2);
        assert_eq!(roads[0].id, 5000);
        assert_eq!(roads[0].length, 10);
        assert!(roads[0].duplex);
        assert_eq!(roads[1].lanes, 2);
        assert_eq!((roads[1].from, roads[1].to), (2, 3));
        assert!(!roads[1].duplex);
    }

    #[test]
    fn crosses_map_minus_one_to_empty_slots() {
        let text = "#(id,roadId,roadId,roadId,roadId)\n(1, 5000, 5005, -1, -1)\n";
        let crosses = load_crosses_reader(Cursor::new(text)).unwrap();
        assert_eq!(crosses[0].id, 1);
        assert_eq!(crosses[0].roads, [Some(5000), Some(5005), None, None]);
    }

    #[test]
    fn cars_read_flags() {
        let text = "(10000, 15, 35, 6, 1, 1, 0)\n(10001, 8, 3, 4, 7, 0, 1)\n";
        let cars = load_cars_reader(Cursor::new(text)).unwrap();
        assert_eq!(cars[0].max_speed, 6);
        assert!(cars[0].priority && !cars[0].preset);
        assert_eq!(cars[1].plan_time, 7);
        assert!(!cars[1].priority && cars[1].preset);
    }

    #[test]
    fn presets_are_variable_length() {
        let text = "#(carId,StartTime,RoadId...)\n(10001, 9, 5000, 5001, 5007)\n(10002, 3, 5100)\n";
        let presets = load_presets_reader(Cursor::new(text)).unwrap();
        assert_eq!(presets[0].roads, vec![5000, 5001, 5007]);
        assert_eq!(presets[1].start_time, 3);
        assert_eq!(presets[1].roads, vec![5100]);
    }

    #[test]
    fn malformed_lines_report_their_line() {
        let text = "#header\n(1, 2, 3, 4, 5, 6, 1)\n(2, 2, x, 4, 5, 6, 1)\n";
        match load_roads_reader(Cursor::new(text)) {
            Err(IoError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a parse error, got {other:?}"),
        }

        let short = "(1, 2, 3)\n";
        assert!(matches!(load_cars_reader(Cursor::new(short)), Err(IoError::Parse { .. })));

        let bad_flag = "(1, 2, 3, 4, 5, 6, 2)\n";
        assert!(matches!(load_roads_reader(Cursor::new(bad_flag)), Err(IoError::Parse { .. })));

        let negative = "(1, -5, 3, 4, 5, 6, 1)\n";
        assert!(matches!(load_roads_reader(Cursor::new(negative)), Err(IoError::Parse { .. })));

        let no_roads = "(10001, 9)\n";
        assert!(matches!(load_presets_reader(Cursor::new(no_roads)), Err(IoError::Parse { .. })));
    }
}

#[cfg(test)]
mod file_tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::{IoError, load_roads};

    #[test]
    fn loads_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("road.txt");
        fs::write(&path, "(7, 3, 2, 1, 1, 2, 0)\n").unwrap();
        let roads = load_roads(&path).unwrap();
        assert_eq!(roads.len(), 1);
        assert_eq!(roads[0].id, 7);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(load_roads(&dir.path().join("absent.txt")), Err(IoError::Io(_))));
    }
}

#[cfg(test)]
mod answer_tests {
    use std::fs;

    use tempfile::TempDir;
    use tp_core::Tick;
    use tp_fleet::{PresetRecord, VehicleRecord, VehicleRegistry};
    use tp_network::{CrossRecord, RoadNetwork, RoadNetworkBuilder, RoadRecord};

    use crate::{IoError, write_answer, write_answer_file};

    /// `1 -30- 2 -31- 3`.
    fn chain() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        for (id, from, to) in [(30, 1, 2), (31, 2, 3)] {
            b.add_road(RoadRecord { id, length: 6, speed_limit: 6, lanes: 1, from, to, duplex: true });
        }
        b.add_cross(CrossRecord { id: 1, roads: [None, Some(30), None, None] });
        b.add_cross(CrossRecord { id: 2, roads: [None, Some(31), None, Some(30)] });
        b.add_cross(CrossRecord { id: 3, roads: [None, None, None, Some(31)] });
        b.build().unwrap()
    }

    fn car(id: u32, preset: bool) -> VehicleRecord {
        VehicleRecord { id, src: 1, dest: 3, max_speed: 6, plan_time: 0, priority: false, preset }
    }

    /// A dynamic car, a fixed preset, and a released preset, all finished.
    fn finished_fleet(net: &RoadNetwork) -> VehicleRegistry {
        let mut fleet = VehicleRegistry::from_records(vec![car(1, false), car(2, true), car(3, true)], net).unwrap();
        let presets = [
            PresetRecord { vehicle: 2, start_time: 0, roads: vec![30, 31] },
            PresetRecord { vehicle: 3, start_time: 1, roads: vec![30, 31] },
        ];
        fleet.apply_presets(&presets, net).unwrap();
        let route = vec![net.road_id(30).unwrap(), net.road_id(31).unwrap()];
        for (ext, entry) in [(1, 4), (2, 0), (3, 5)] {
            let v = fleet.id_of(ext).unwrap();
            let j = fleet.journey_mut(v);
            j.route = route.clone();
            j.entry_time = Some(Tick(entry));
            j.arrival_time = Some(Tick(entry + 2));
        }
        let released = fleet.id_of(3).unwrap();
        fleet.journey_mut(released).released = true;
        fleet
    }

    #[test]
    fn answer_lists_planner_routed_vehicles() {
        let net = chain();
        let fleet = finished_fleet(&net);
        let mut buf = Vec::new();
        assert_eq!(write_answer(&mut buf, &fleet, &net).unwrap(), 2);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "#(carId,StartTime,RoadId...)\n(1,4,30,31)\n(3,5,30,31)\n");
    }

    #[test]
    fn undeparted_vehicle_is_an_error() {
        let net = chain();
        let mut fleet = finished_fleet(&net);
        let v = fleet.id_of(1).unwrap();
        fleet.journey_mut(v).entry_time = None;
        let result = write_answer(Vec::new(), &fleet, &net);
        assert!(matches!(result, Err(IoError::Unplanned { vehicle: 1 })));
    }

    #[test]
    fn answer_file_is_written() {
        let net = chain();
        let fleet = finished_fleet(&net);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("answer.txt");
        write_answer_file(&path, &fleet, &net).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("#(carId"));
    }
}
