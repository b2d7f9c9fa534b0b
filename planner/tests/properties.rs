//! Property-based tests for grid generation, coverage planning and missions.

use std::collections::BTreeSet;

use proptest::prelude::*;
use sprayplan_planner::{
    coverage::{path_length, SprayPattern},
    mission::{mission_to_string, read_mission},
    *,
};
use sprayplan_structs::{
    problem::{FieldQuadrilateral, FitMode, ParcelSpec},
    ColorId, GeoPoint,
};

fn field() -> FieldQuadrilateral {
    FieldQuadrilateral {
        top_left: GeoPoint::new(37.325, -6.029),
        top_right: GeoPoint::new(37.325, -6.028),
        bottom_right: GeoPoint::new(37.324, -6.028),
        bottom_left: GeoPoint::new(37.324, -6.029),
    }
}

fn fit_mode() -> impl Strategy<Value = FitMode> {
    prop_oneof![
        Just(FitMode::NoFit),
        Just(FitMode::FitScaleBoth),
        Just(FitMode::FitPreserveParcelSize),
    ]
}

fn parcel_spec(count_x: usize, count_y: usize, colors: usize, fit: FitMode) -> ParcelSpec {
    ParcelSpec {
        parcel_width: 3.0,
        parcel_height: 5.0,
        gap_x: 0.3,
        gap_y: 1.0,
        count_x,
        count_y,
        fit,
        colors: ColorId::default_palette().into_iter().take(colors).collect(),
    }
}

// ============================================================================
// GEODESY PROPERTIES
// ============================================================================

mod geodesy_properties {
    use super::*;

    proptest! {
        #[test]
        fn haversine_is_symmetric(
            lat1 in -80.0_f64..80.0,
            lon1 in -179.0_f64..179.0,
            lat2 in -80.0_f64..80.0,
            lon2 in -179.0_f64..179.0,
        ) {
            let a = GeoPoint::new(lat1, lon1);
            let b = GeoPoint::new(lat2, lon2);
            let ab = a.haversine_m(&b);
            prop_assert!(ab >= 0.0 && ab.is_finite());
            prop_assert!((ab - b.haversine_m(&a)).abs() < 1e-6);
        }

        #[test]
        fn destination_travels_requested_distance(
            lat in -60.0_f64..60.0,
            lon in -170.0_f64..170.0,
            distance in 0.0_f64..5000.0,
            bearing in 0.0_f64..std::f64::consts::TAU,
        ) {
            let start = GeoPoint::new(lat, lon);
            let end = start.destination(distance, bearing);
            prop_assert!((start.haversine_m(&end) - distance).abs() < 1e-3);
        }
    }
}

// ============================================================================
// GRID PROPERTIES
// ============================================================================

mod grid_properties {
    use super::*;

    proptest! {
        #[test]
        fn ids_are_row_major_and_colors_cycle(
            count_x in 0usize..10,
            count_y in 0usize..10,
            colors in 1usize..=6,
            fit in fit_mode(),
        ) {
            let spec = parcel_spec(count_x, count_y, colors, fit);
            let grid = generate(&field(), &spec, None).unwrap();
            prop_assert_eq!(grid.parcels.len(), count_x * count_y);
            for (i, p) in grid.parcels.iter().enumerate() {
                prop_assert_eq!(p.id, i);
                prop_assert_eq!(&p.color, &spec.colors[i % colors]);
                prop_assert!(p.corners.iter().all(|c| c.is_finite()));
            }
        }

        #[test]
        fn zero_gaps_stay_zero(
            count_x in 1usize..8,
            count_y in 1usize..8,
            fit in fit_mode(),
        ) {
            let spec = ParcelSpec {
                gap_x: 0.0,
                gap_y: 0.0,
                ..parcel_spec(count_x, count_y, 1, fit)
            };
            let grid = generate(&field(), &spec, None).unwrap();
            prop_assert_eq!(grid.gap_x, 0.0);
            prop_assert_eq!(grid.gap_y, 0.0);
        }

        #[test]
        fn preserve_parcel_size_keeps_parcels(
            count_x in 1usize..8,
            count_y in 1usize..8,
        ) {
            let spec = parcel_spec(count_x, count_y, 1, FitMode::FitPreserveParcelSize);
            let grid = generate(&field(), &spec, None).unwrap();
            prop_assert_eq!(grid.parcel_width, 3.0);
            prop_assert_eq!(grid.parcel_height, 5.0);
        }
    }
}

// ============================================================================
// COVERAGE PROPERTIES
// ============================================================================

mod coverage_properties {
    use super::*;

    proptest! {
        #[test]
        fn every_pass_flown_once(
            count_x in 1usize..6,
            count_y in 1usize..6,
            colors in 1usize..=3,
            strips in 1usize..=4,
            buffer in 0.0_f64..5.0,
        ) {
            let spec = ParcelSpec {
                parcel_width: 1.5 * strips as f64,
                ..parcel_spec(count_x, count_y, colors, FitMode::NoFit)
            };
            let grid = generate(&field(), &spec, None).unwrap();
            let pattern = SprayPattern {
                parcel_width: grid.parcel_width,
                spray_width: 1.5,
                acceleration_buffer_m: buffer,
            };

            let color = &spec.colors[0];
            let matching = grid.parcels_with_color(color).count();
            let path = plan(&grid.parcels, color, &pattern).unwrap();

            prop_assert_eq!(path.num_passes(), matching * strips);
            prop_assert_eq!(path.path.len(), 2 * path.num_passes());
            prop_assert!(path.path.len() % 2 == 0);
            prop_assert!(path.is_consistent());

            let parcels = path.unbuffered_points.iter().map(|p| p.parcel).collect::<BTreeSet<_>>();
            let expected = grid.parcels_with_color(color).map(|p| p.id).collect::<BTreeSet<_>>();
            prop_assert_eq!(parcels, expected);

            let recomputed = path_length(&path.path);
            prop_assert!((path.total_distance_m - recomputed).abs() <= 1e-9 * recomputed.max(1.0));
        }

        #[test]
        fn uneven_division_rejected(
            parcel_width in 1.0_f64..10.0,
            spray_width in 0.1_f64..3.0,
        ) {
            let ratio = parcel_width / spray_width;
            prop_assume!((ratio - ratio.round()).abs() > 1e-6);
            let spec = ParcelSpec {
                parcel_width,
                ..parcel_spec(1, 1, 1, FitMode::NoFit)
            };
            let grid = generate(&field(), &spec, None).unwrap();
            let pattern = SprayPattern {
                parcel_width: grid.parcel_width,
                spray_width,
                acceleration_buffer_m: 2.0,
            };
            let result = plan(&grid.parcels, &spec.colors[0], &pattern);
            let rejected = matches!(result, Err(PlanError::UnevenDivision { .. }));
            prop_assert!(rejected, "ratio {} accepted", ratio);
        }

        #[test]
        fn fitted_sessions_are_plannable(
            count_x in 1usize..7,
            count_y in 1usize..7,
        ) {
            let mut session = Session::default();
            session.field = field();
            session.parcels = parcel_spec(count_x, count_y, 1, FitMode::FitScaleBoth);
            session.spray_width = 1.0;
            let grid = session.generate_grid().unwrap();
            let planned = session.plan_liquid(&grid, &session.parcels.colors[0]);
            prop_assert!(planned.is_ok(), "{:?}", planned.as_ref().err());
        }
    }
}

// ============================================================================
// MISSION PROPERTIES
// ============================================================================

mod mission_properties {
    use super::*;

    proptest! {
        #[test]
        fn mission_shape_and_file_round_trip(
            count_x in 1usize..5,
            count_y in 1usize..5,
            altitude in 1.0_f64..120.0,
            speed in 0.1_f64..15.0,
        ) {
            let spec = parcel_spec(count_x, count_y, 1, FitMode::NoFit);
            let grid = generate(&field(), &spec, None).unwrap();
            let pattern = SprayPattern {
                parcel_width: grid.parcel_width,
                spray_width: 1.5,
                acceleration_buffer_m: 2.0,
            };
            let path = plan(&grid.parcels, &spec.colors[0], &pattern).unwrap();
            let mission = compose(&path, field().top_left, altitude, speed).unwrap();

            prop_assert_eq!(mission.len(), 4 + 4 * path.num_passes());
            for (i, wp) in mission.iter().enumerate() {
                prop_assert_eq!(wp.seq as usize, i);
            }
            prop_assert_eq!(mission.iter().filter(|w| w.is_spray_trigger()).count(), 2 * path.num_passes());

            let text = mission_to_string(&mission);
            prop_assert!(!text.ends_with('\n'));
            let back = read_mission(text.as_bytes()).unwrap();
            prop_assert_eq!(back.len(), mission.len());
            for (a, b) in mission.iter().zip(back.iter()) {
                prop_assert_eq!(a.command, b.command);
                prop_assert_eq!(a.frame, b.frame);
                prop_assert_eq!(a.params, b.params);
                prop_assert_eq!(a.position, b.position);
                prop_assert_eq!(a.altitude, b.altitude);
            }
        }
    }
}
