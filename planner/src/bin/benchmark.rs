#[cfg(not(feature = "prof"))]
pub fn main() {
    println!("benchmarks not supported -- enable 'prof' crate feature")
}

#[cfg(feature = "prof")]
struct InstanceSpec {
    count_x: usize,
    count_y: usize,
    colors: usize,
}

#[cfg(feature = "prof")]
#[derive(Debug)]
struct Result {
    time: f32,
    passes: usize,
    distance: f64,
}

#[cfg(feature = "prof")]
const INSTANCES: [InstanceSpec; 6] = [
    InstanceSpec { count_x: 2, count_y: 2, colors: 1 },
    InstanceSpec { count_x: 6, count_y: 5, colors: 6 },
    InstanceSpec { count_x: 6, count_y: 5, colors: 1 },
    InstanceSpec { count_x: 12, count_y: 10, colors: 3 },
    InstanceSpec { count_x: 20, count_y: 20, colors: 2 },
    InstanceSpec { count_x: 40, count_y: 25, colors: 1 },
];

/// Flies the passes in generation order, always top to bottom.
#[cfg(feature = "prof")]
fn in_order(
    nodes: &[sprayplan_structs::plan::PassSegment],
    buffer_m: f64,
) -> Vec<sprayplan_planner::coverage::Leg> {
    use sprayplan_planner::{coverage::Leg, geo::extend_segment};
    use sprayplan_structs::plan::Direction;

    nodes
        .iter()
        .enumerate()
        .map(|(node, n)| {
            let (approach, depart) = extend_segment(&n.top, &n.bottom, buffer_m);
            Leg {
                node,
                direction: Direction::TopToBottom,
                approach,
                depart,
            }
        })
        .collect()
}

#[cfg(feature = "prof")]
pub fn main() -> std::io::Result<()> {
    use std::{io::Write, time::Instant};

    use sprayplan_planner::{
        coverage::{plan_with, PassOrdering},
        Session,
    };
    use sprayplan_structs::{
        problem::{FieldQuadrilateral, FitMode, ParcelSpec},
        ColorId, GeoPoint,
    };

    let solvers: [(&str, PassOrdering); 2] = [
        ("nearest", sprayplan_planner::coverage::nearest_neighbour),
        ("in_order", in_order),
    ];

    println!("-----------------------------");
    println!("sprayplan coverage benchmarking");
    println!("-----------------------------");
    println!();
    println!(
        "  orderings: {}",
        solvers
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();

    let session = Session::default();
    let field = FieldQuadrilateral {
        top_left: GeoPoint::new(37.330, -6.035),
        top_right: GeoPoint::new(37.330, -6.025),
        bottom_right: GeoPoint::new(37.320, -6.025),
        bottom_left: GeoPoint::new(37.320, -6.035),
    };

    let mut results: Vec<Vec<Result>> = Vec::new();
    println!("# RUNNING {} INSTANCES", INSTANCES.len());
    for instance in INSTANCES.iter() {
        results.push(Vec::new());
        let _p = hprof::enter("instance");
        let colors = ColorId::default_palette()
            .into_iter()
            .take(instance.colors)
            .collect::<Vec<_>>();
        let spec = ParcelSpec {
            count_x: instance.count_x,
            count_y: instance.count_y,
            fit: FitMode::NoFit,
            colors: colors.clone(),
            ..session.parcels.clone()
        };
        let grid = match sprayplan_planner::generate(&field, &spec, None) {
            Ok(grid) => grid,
            Err(e) => {
                println!(" * skipping {}x{}: {}", instance.count_x, instance.count_y, e);
                continue;
            }
        };
        println!(
            " * instance {}x{} with {} colors",
            instance.count_x, instance.count_y, instance.colors
        );

        let pattern = session.spray_pattern(&grid);
        for (solver_name, solver_fn) in &solvers {
            println!("   - ordering with: \"{}\"", solver_name);
            let _p0 = hprof::enter("plan");
            let t0 = Instant::now();
            let mut passes = 0;
            let mut distance = 0.0;
            for color in colors.iter() {
                match plan_with(&grid.parcels, color, &pattern, *solver_fn) {
                    Ok(path) => {
                        passes += path.num_passes();
                        distance += path.total_distance_m;
                    }
                    Err(e) => println!("     failed for {}: {}", color, e),
                }
            }
            let time = t0.elapsed().as_secs_f32();
            if let Some(r) = results.last_mut() {
                r.push(Result {
                    time,
                    passes,
                    distance,
                });
            }
        }
    }
    println!();
    println!("# PROFILER");
    hprof::profiler().print_timing();
    println!();

    println!("# RESULTS");

    let mut tablewriter = tabwriter::TabWriter::new(std::io::stdout());
    write!(&mut tablewriter, "grid\tcolors")?;
    for (solver_name, _) in &solvers {
        write!(&mut tablewriter, "\t|\t{}\t\t", solver_name)?;
    }
    writeln!(&mut tablewriter)?;

    write!(&mut tablewriter, "\t")?;
    for _ in &solvers {
        write!(&mut tablewriter, "\t|\ttime\tpasses\tdist")?;
    }
    writeln!(&mut tablewriter)?;

    write!(&mut tablewriter, "---\t---")?;
    for _ in &solvers {
        write!(&mut tablewriter, "\t\t---\t---\t---")?;
    }
    writeln!(&mut tablewriter)?;

    for (instance, solver_results) in INSTANCES.iter().zip(results.iter()) {
        write!(
            &mut tablewriter,
            "{}x{}\t{}",
            instance.count_x, instance.count_y, instance.colors
        )?;
        for result in solver_results.iter() {
            write!(
                &mut tablewriter,
                "\t|\t{:.4}\t{}\t{:.0}",
                result.time, result.passes, result.distance
            )?;
        }
        writeln!(&mut tablewriter)?;
    }

    tablewriter.flush()?;
    println!();
    Ok(())
}
