//! Unit tests for tp-network.
//!
//! All tests use hand-built networks.

#[cfg(test)]
pub(crate) mod helpers {
    use crate::{CrossRecord, RoadNetwork, RoadNetworkBuilder, RoadRecord};

    pub fn road(id: u32, from: u32, to: u32, duplex: bool) -> RoadRecord {
        RoadRecord { id, length: 10, speed_limit: 5, lanes: 2, from, to, duplex }
    }

    /// Two intersections joined by one duplex road 100 (length 6, speed 6,
    /// one lane).  Cross 1 sees it to the east, cross 2 to the west.
    pub fn line_network() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        b.add_cross(CrossRecord { id: 1, roads: [None, Some(100), None, None] });
        b.add_cross(CrossRecord { id: 2, roads: [None, None, None, Some(100)] });
        b.add_road(RoadRecord { id: 100, length: 6, speed_limit: 6, lanes: 1, from: 1, to: 2, duplex: true });
        b.build().unwrap()
    }

    /// 3×3 grid of duplex roads (length 10, speed 5, two lanes), north up:
    ///
    /// ```text
    ///  1 -501- 2 -502- 3
    ///  |507    |508    |509
    ///  4 -503- 5 -504- 6
    ///  |510    |511    |512
    ///  7 -505- 8 -506- 9
    /// ```
    ///
    /// Horizontal roads run west→east, vertical roads north→south.  Roads in
    /// `skip` are left out.
    pub fn grid_network(skip: &[u32]) -> RoadNetwork {
        let roads = [
            (501, 1, 2), (502, 2, 3), (503, 4, 5), (504, 5, 6), (505, 7, 8), (506, 8, 9),
            (507, 1, 4), (508, 2, 5), (509, 3, 6), (510, 4, 7), (511, 5, 8), (512, 6, 9),
        ];
        let crosses: [(u32, [u32; 4]); 9] = [
            (1, [0, 501, 507, 0]),
            (2, [0, 502, 508, 501]),
            (3, [0, 0, 509, 502]),
            (4, [507, 503, 510, 0]),
            (5, [508, 504, 511, 503]),
            (6, [509, 0, 512, 504]),
            (7, [510, 505, 0, 0]),
            (8, [511, 506, 0, 505]),
            (9, [512, 0, 0, 506]),
        ];
        let mut b = RoadNetworkBuilder::new();
        for (id, from, to) in roads {
            if !skip.contains(&id) {
                b.add_road(road(id, from, to, true));
            }
        }
        for (id, slots) in crosses {
            let slots = slots.map(|r| (r != 0 && !skip.contains(&r)).then_some(r));
            b.add_cross(CrossRecord { id, roads: slots });
        }
        b.build().unwrap()
    }
}

// ── Builder & network structure ───────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use tp_core::{Approach, Direction};

    use crate::{CrossRecord, NetworkError, RoadNetworkBuilder, RoadRecord};

    #[test]
    fn ids_are_dense_in_ascending_order() {
        let net = super::helpers::grid_network(&[]);
        assert_eq!(net.cross_count(), 9);
        assert_eq!(net.road_count(), 12);
        assert_eq!(net.road_id(501).unwrap().index(), 0);
        assert_eq!(net.road_id(512).unwrap().index(), 11);
        assert_eq!(net.cross_id(9).unwrap().index(), 8);
        assert!(matches!(net.road_id(999), Err(NetworkError::UnknownRoad(999))));
    }

    #[test]
    fn duplex_road_gives_an_option_at_both_ends() {
        let net = super::helpers::line_network();
        let a = net.cross_id(1).unwrap();
        let b = net.cross_id(2).unwrap();
        let from_a: Vec<_> = net.out_roads(a).collect();
        let from_b: Vec<_> = net.out_roads(b).collect();
        assert_eq!(from_a.len(), 1);
        assert_eq!(from_a[0].1, Direction::Forward);
        assert_eq!(from_a[0].2, b);
        assert_eq!(from_b[0].1, Direction::Backward);
        assert_eq!(net.pair_road(a, b), net.pair_road(b, a));
    }

    #[test]
    fn one_way_road_has_no_return_option() {
        let mut b = RoadNetworkBuilder::new();
        b.add_cross(CrossRecord { id: 1, roads: [None, Some(7), None, None] });
        b.add_cross(CrossRecord { id: 2, roads: [None, None, None, Some(7)] });
        b.add_road(RoadRecord { id: 7, length: 4, speed_limit: 2, lanes: 1, from: 1, to: 2, duplex: false });
        let net = b.build().unwrap();
        let two = net.cross_id(2).unwrap();
        assert_eq!(net.out_roads(two).count(), 0);
        assert!(net.pair_road(two, net.cross_id(1).unwrap()).is_none());
    }

    #[test]
    fn approaches_and_visit_order() {
        let net = super::helpers::grid_network(&[]);
        let five = net.cross(net.cross_id(5).unwrap());
        assert_eq!(five.approach_count(), 4);
        let r511 = net.road_id(511).unwrap();
        assert_eq!(five.approach_of(r511), Some(Approach::South));
        let ids: Vec<u32> = five.by_road_id.iter().map(|&r| net.road(r).id).collect();
        assert_eq!(ids, vec![503, 504, 508, 511]);
    }

    #[test]
    fn dangling_road_reference_rejected() {
        let mut b = RoadNetworkBuilder::new();
        b.add_cross(CrossRecord { id: 1, roads: [Some(42), None, None, None] });
        assert!(matches!(b.build(), Err(NetworkError::UnknownRoad(42))));
    }

    #[test]
    fn zero_length_road_rejected() {
        let mut b = RoadNetworkBuilder::new();
        b.add_cross(CrossRecord { id: 1, roads: [None, Some(7), None, None] });
        b.add_cross(CrossRecord { id: 2, roads: [None, None, None, Some(7)] });
        b.add_road(RoadRecord { id: 7, length: 0, speed_limit: 2, lanes: 1, from: 1, to: 2, duplex: true });
        assert!(matches!(b.build(), Err(NetworkError::Malformed(_))));
    }

    #[test]
    fn road_missing_from_endpoint_rejected() {
        let mut b = RoadNetworkBuilder::new();
        b.add_cross(CrossRecord { id: 1, roads: [None, Some(7), None, None] });
        b.add_cross(CrossRecord { id: 2, roads: [None; 4] });
        b.add_road(RoadRecord { id: 7, length: 4, speed_limit: 2, lanes: 1, from: 1, to: 2, duplex: true });
        assert!(matches!(b.build(), Err(NetworkError::Malformed(_))));
    }

    #[test]
    fn disconnected_network_rejected() {
        let mut b = RoadNetworkBuilder::new();
        b.add_cross(CrossRecord { id: 1, roads: [None, Some(7), None, None] });
        b.add_cross(CrossRecord { id: 2, roads: [None, None, None, Some(7)] });
        b.add_cross(CrossRecord { id: 3, roads: [None; 4] });
        b.add_road(RoadRecord { id: 7, length: 4, speed_limit: 2, lanes: 1, from: 1, to: 2, duplex: true });
        assert!(matches!(
            b.build(),
            Err(NetworkError::Disconnected { reached: 2, total: 3 })
        ));
    }

    #[test]
    fn penalties_decay_to_zero() {
        let mut net = super::helpers::line_network();
        let r = net.road_id(100).unwrap();
        net.add_penalty(r, 0.15);
        net.decay_penalties(0.1);
        assert!((net.road(r).penalty - 0.05).abs() < 1e-12);
        net.decay_penalties(0.1);
        assert_eq!(net.road(r).penalty, 0.0);
    }
}

// ── Embedding ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod embedding {
    #[test]
    fn grid_positions_follow_headings() {
        let net = super::helpers::grid_network(&[]);
        let pos = |id: u32| {
            let c = net.cross(net.cross_id(id).unwrap());
            (c.x, c.y)
        };
        assert_eq!(pos(1), (0, 0));
        assert_eq!(pos(2), (1, 0));
        assert_eq!(pos(3), (2, 0));
        assert_eq!(pos(4), (0, -1));
        assert_eq!(pos(5), (1, -1));
        assert_eq!(pos(9), (2, -2));
    }

    #[test]
    fn only_the_centre_is_interior() {
        let net = super::helpers::grid_network(&[]);
        for c in &net.crosses {
            assert_eq!(c.boundary, c.id != 5, "cross {}", c.id);
        }
    }

    #[test]
    fn rotated_local_slots_embed_consistently() {
        use crate::{CrossRecord, RoadNetworkBuilder, RoadRecord};

        // Cross 2 lists road 1 at its north slot although it lies to the
        // east of cross 1.  Its local slots are rotated a quarter turn, so
        // its east slot points absolute north.
        let mut b = RoadNetworkBuilder::new();
        b.add_cross(CrossRecord { id: 1, roads: [None, Some(1), None, None] });
        b.add_cross(CrossRecord { id: 2, roads: [Some(1), Some(2), None, None] });
        b.add_cross(CrossRecord { id: 3, roads: [Some(2), None, None, None] });
        b.add_road(RoadRecord { id: 1, length: 5, speed_limit: 5, lanes: 1, from: 1, to: 2, duplex: true });
        b.add_road(RoadRecord { id: 2, length: 5, speed_limit: 5, lanes: 1, from: 2, to: 3, duplex: true });
        let net = b.build().unwrap();
        let c3 = net.cross(net.cross_id(3).unwrap());
        assert_eq!((c3.x, c3.y), (1, 1));
    }
}

// ── Weights ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod weight {
    use tp_core::{Direction, WeightConfig};

    use crate::{IntersectionKind, NetworkError, VehicleProfile};

    const EPS: f64 = 1e-9;

    #[test]
    fn free_road_costs_travel_time() {
        let net = super::helpers::grid_network(&[]);
        let r = net.road_id(501).unwrap();
        let slow = net.edge_weight(r, Direction::Forward, VehicleProfile::new(2, false)).unwrap();
        let fast = net.edge_weight(r, Direction::Forward, VehicleProfile::new(9, false)).unwrap();
        assert!((slow - 5.0).abs() < EPS);
        assert!((fast - 2.0).abs() < EPS);
    }

    #[test]
    fn light_occupancy_uses_base_k() {
        let mut net = super::helpers::grid_network(&[]);
        let r = net.road_id(501).unwrap();
        net.set_occupancy(r, Direction::Forward, 4, 0);
        let w = net.edge_weight(r, Direction::Forward, VehicleProfile::TABLE).unwrap();
        assert!((w - (2.0 + 100.0 * 4.0 / 20.0)).abs() < EPS);
        // The other direction is unaffected.
        let back = net.edge_weight(r, Direction::Backward, VehicleProfile::TABLE).unwrap();
        assert!((back - 2.0).abs() < EPS);
    }

    #[test]
    fn jammed_road_scales_k() {
        let mut net = super::helpers::grid_network(&[]);
        let r = net.road_id(501).unwrap();
        net.set_occupancy(r, Direction::Forward, 17, 0);
        let w = net.edge_weight(r, Direction::Forward, VehicleProfile::TABLE).unwrap();
        assert!((w - (2.0 + 600.0 * 17.0 / 20.0)).abs() < EPS);
    }

    #[test]
    fn preset_traffic_counts_toward_jam() {
        let mut net = super::helpers::grid_network(&[]);
        let r = net.road_id(501).unwrap();
        net.set_occupancy(r, Direction::Forward, 10, 7);
        let w = net.edge_weight(r, Direction::Forward, VehicleProfile::TABLE).unwrap();
        assert!((w - (2.0 + 600.0 * 17.0 / 20.0)).abs() < EPS);
    }

    #[test]
    fn priority_ignores_penalty_and_presets() {
        let mut net = super::helpers::grid_network(&[]);
        let r = net.road_id(501).unwrap();
        net.set_occupancy(r, Direction::Forward, 4, 9);
        net.add_penalty(r, 30.0);
        let w = net.edge_weight(r, Direction::Forward, VehicleProfile::new(5, true)).unwrap();
        assert!((w - (2.0 + 10.0 * 4.0 / 20.0)).abs() < EPS);
        let regular = net.edge_weight(r, Direction::Forward, VehicleProfile::new(5, false)).unwrap();
        assert!(regular > w + 30.0);
    }

    #[test]
    fn merge_doubles_k() {
        // Without road 508 the centre cross has three approaches and nothing
        // north of it: arriving from the south (511 travelled backward) is a
        // merge, arriving from the west is not.
        let mut net = super::helpers::grid_network(&[508]);
        let five = net.cross_id(5).unwrap();
        let r511 = net.road_id(511).unwrap();
        let r503 = net.road_id(503).unwrap();
        assert_eq!(net.intersection_kind(five, r511), IntersectionKind::Merge);
        assert_eq!(net.intersection_kind(five, r503), IntersectionKind::Interior);
        assert_eq!(net.intersection_kind(net.cross_id(1).unwrap(), r503), IntersectionKind::Boundary);

        net.set_occupancy(r511, Direction::Backward, 4, 0);
        let w = net.edge_weight(r511, Direction::Backward, VehicleProfile::TABLE).unwrap();
        assert!((w - (2.0 + 200.0 * 4.0 / 20.0)).abs() < EPS);

        net.set_occupancy(r511, Direction::Backward, 17, 0);
        let w = net.edge_weight(r511, Direction::Backward, VehicleProfile::TABLE).unwrap();
        assert!((w - (2.0 + 800.0 * 17.0 / 20.0)).abs() < EPS);
    }

    #[test]
    fn congestion_threshold() {
        let mut net = super::helpers::line_network();
        let r = net.road_id(100).unwrap();
        net.add_penalty(r, 15.0);
        assert!(!net.is_congested(r));
        net.add_penalty(r, 0.1);
        assert!(net.is_congested(r));
    }

    #[test]
    fn non_positive_k_is_an_invariant_violation() {
        let mut net = super::helpers::line_network();
        net.weights = WeightConfig { congestion_k: 0.0, ..WeightConfig::default() };
        let r = net.road_id(100).unwrap();
        let err = net.edge_weight(r, Direction::Forward, VehicleProfile::TABLE).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidWeight { .. }));
        assert!(err.is_invariant());
    }

    #[test]
    fn zero_jam_factor_fails_only_when_jammed() {
        let mut net = super::helpers::grid_network(&[]);
        net.weights = WeightConfig { preset_jam_factor: 0.0, ..WeightConfig::default() };
        let r = net.road_id(501).unwrap();
        net.set_occupancy(r, Direction::Forward, 4, 0);
        assert!(net.edge_weight(r, Direction::Forward, VehicleProfile::TABLE).is_ok());

        net.set_occupancy(r, Direction::Forward, 17, 0);
        let err = net.edge_weight(r, Direction::Forward, VehicleProfile::TABLE).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidWeight { .. }));
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use crate::{DijkstraRouter, NetworkError, Router, VehicleProfile};

    #[test]
    fn trivial_route() {
        let net = super::helpers::grid_network(&[]);
        let c = net.cross_id(5).unwrap();
        let route = DijkstraRouter.route(&net, c, c, VehicleProfile::TABLE, None).unwrap();
        assert!(route.is_trivial());
        assert!(matches!(
            DijkstraRouter.next_hop(&net, c, c, VehicleProfile::TABLE, None),
            Err(NetworkError::NoRoute { .. })
        ));
    }

    #[test]
    fn straight_line_route() {
        let net = super::helpers::grid_network(&[]);
        let (a, b) = (net.cross_id(1).unwrap(), net.cross_id(3).unwrap());
        let route = DijkstraRouter.route(&net, a, b, VehicleProfile::new(5, false), None).unwrap();
        let ids: Vec<u32> = route.roads.iter().map(|&r| net.road(r).id).collect();
        assert_eq!(ids, vec![501, 502]);
        assert!((route.cost - 4.0).abs() < 1e-9);
    }

    #[test]
    fn penalty_steers_around_road() {
        let mut net = super::helpers::grid_network(&[]);
        let r502 = net.road_id(502).unwrap();
        net.add_penalty(r502, 50.0);
        let (a, b) = (net.cross_id(2).unwrap(), net.cross_id(3).unwrap());
        let hop = DijkstraRouter.next_hop(&net, a, b, VehicleProfile::new(5, false), None).unwrap();
        assert_eq!(net.road(hop).id, 508);
        // Priority vehicles do not see the penalty.
        let hop = DijkstraRouter.next_hop(&net, a, b, VehicleProfile::new(5, true), None).unwrap();
        assert_eq!(hop, r502);
    }

    #[test]
    fn excluded_road_only_forbidden_as_first_hop() {
        let net = super::helpers::grid_network(&[]);
        let (two, one) = (net.cross_id(2).unwrap(), net.cross_id(1).unwrap());
        let r501 = net.road_id(501).unwrap();
        let route = DijkstraRouter
            .route(&net, two, one, VehicleProfile::TABLE, Some(r501))
            .unwrap();
        let ids: Vec<u32> = route.roads.iter().map(|&r| net.road(r).id).collect();
        assert_eq!(ids.len(), 3);
        assert_ne!(ids[0], 501);
        assert!(ids.iter().all(|&id| id != 501));
    }

    #[test]
    fn one_way_dead_end_is_unreachable() {
        use crate::{CrossRecord, RoadNetworkBuilder, RoadRecord};

        let mut b = RoadNetworkBuilder::new();
        b.add_cross(CrossRecord { id: 1, roads: [None, Some(7), None, None] });
        b.add_cross(CrossRecord { id: 2, roads: [None, None, None, Some(7)] });
        b.add_road(RoadRecord { id: 7, length: 4, speed_limit: 2, lanes: 1, from: 1, to: 2, duplex: false });
        let net = b.build().unwrap();
        let (a, c) = (net.cross_id(1).unwrap(), net.cross_id(2).unwrap());
        assert!(DijkstraRouter.route(&net, a, c, VehicleProfile::TABLE, None).is_ok());
        assert!(matches!(
            DijkstraRouter.route(&net, c, a, VehicleProfile::TABLE, None),
            Err(NetworkError::NoRoute { .. })
        ));
    }
}

// ── All pairs ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod all_pairs {
    use tp_core::{CrossId, Direction};

    use crate::{AllPairs, DijkstraRouter, NetworkError, Router, VehicleProfile};

    #[test]
    fn matches_dijkstra_on_every_pair() {
        let mut net = super::helpers::grid_network(&[]);
        let r = net.road_id(504).unwrap();
        net.set_occupancy(r, Direction::Forward, 6, 2);
        let table = AllPairs::compute(&net).unwrap();
        for i in 0..net.cross_count() {
            for j in 0..net.cross_count() {
                let (a, b) = (CrossId(i as u32), CrossId(j as u32));
                let route = DijkstraRouter.route(&net, a, b, VehicleProfile::TABLE, None).unwrap();
                assert!((table.dist(a, b) - route.cost).abs() < 1e-9, "{a} -> {b}");
            }
        }
    }

    #[test]
    fn diagonal_and_next_hops() {
        let net = super::helpers::grid_network(&[]);
        let table = AllPairs::compute(&net).unwrap();
        let (one, two, three) = (
            net.cross_id(1).unwrap(),
            net.cross_id(2).unwrap(),
            net.cross_id(3).unwrap(),
        );
        assert_eq!(table.dist(one, one), 0.0);
        assert_eq!(table.next(one, one), one);
        assert_eq!(table.next(one, three), two);
        assert_eq!(net.road(table.next_road(&net, one, three).unwrap()).id, 501);
        assert!(table.next_road(&net, one, one).is_err());
    }

    #[test]
    fn refresh_is_idempotent() {
        let mut net = super::helpers::grid_network(&[]);
        let r = net.road_id(503).unwrap();
        net.set_occupancy(r, Direction::Backward, 12, 3);
        net.add_penalty(r, 2.5);
        let first = AllPairs::compute(&net).unwrap();
        let second = AllPairs::compute(&net).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unreachable_pair_is_an_error() {
        use crate::{CrossRecord, RoadNetworkBuilder, RoadRecord};

        let mut b = RoadNetworkBuilder::new();
        b.add_cross(CrossRecord { id: 1, roads: [None, Some(7), None, None] });
        b.add_cross(CrossRecord { id: 2, roads: [None, None, None, Some(7)] });
        b.add_road(RoadRecord { id: 7, length: 4, speed_limit: 2, lanes: 1, from: 1, to: 2, duplex: false });
        let net = b.build().unwrap();
        assert!(matches!(AllPairs::compute(&net), Err(NetworkError::NoRoute { .. })));
    }

    #[test]
    fn key_roads_are_the_busiest_first_hops() {
        let mut net = super::helpers::grid_network(&[]);
        let table = AllPairs::compute(&net).unwrap();
        let flagged = net.mark_key_roads(&table);
        assert_eq!(flagged, 1);
        assert_eq!(net.key_roads().count(), 1);
    }
}
