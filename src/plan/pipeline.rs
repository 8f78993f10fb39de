use anyhow::{ensure, Context, Result};
use tracing::{error, info, warn};

use crate::{
    config::PlanConfig,
    error::Error,
    estimate::estimate_area_count,
    geom::{average_nearest_neighbor, build_area_polygons, dedup_sites, dissolve_outlines, features_to_aoi, AreaShapes},
    graph::AdjacencyGraph,
    partition::{AreaMerger, AreaSplitter, Partition},
    plan::{AreaPlan, PlanReport},
    solver::{LocationAllocator, PartitionSolver, ProblemMode, RouteSolver, SolverOptions},
    stats::{self, travel_weights},
    types::DemandPoint,
};

/// Partition `points` into balanced areas.
///
/// Stages run strictly in order: estimate the area count, solve the initial partition,
/// split oversized areas, build outlines, collect workload stats, then merge
/// under-sized areas for up to `merge.max_passes` passes. Only a failed initial
/// solve is fatal; split and merge problems are logged and reported.
pub fn create_areas<A, R>(
    points: Vec<DemandPoint>,
    config: &PlanConfig,
    allocator: A,
    router: &R,
) -> Result<AreaPlan>
where
    A: LocationAllocator,
    R: RouteSolver,
{
    config.validate()?;
    ensure!(!points.is_empty(), "[create_areas] no demand points to partition");
    info!("[plan] {} demand points", points.len());

    let points = if config.weights.use_travel_weight {
        travel_weights(&points, config.weights.neighbors, config.weights.min_travel_length)
    } else {
        points
    };
    let coords = points.iter().map(|p| p.location).collect::<Vec<_>>();

    // Area count.
    let mut report = PlanReport::default();
    let estimate = &config.estimate;
    if estimate.use_clustering_index && estimate.requested_areas == 0 {
        report.clustering_index = average_nearest_neighbor(&coords);
    }
    let area_count = estimate_area_count(
        points.len(),
        estimate.requested_areas,
        report.clustering_index,
        estimate.area_size_factor,
    )?;
    report.estimated_areas = area_count;
    info!("[plan] creating {} areas (clustering index {:?})", area_count, report.clustering_index);

    // Initial partition.
    let sites = dedup_sites(&points, config.facilities.dedup_tolerance);
    let base = SolverOptions::new(area_count, config.allocation.travel_speed)
        .with_cutoff(config.allocation.impedance_cutoff);
    let solver = PartitionSolver::new(allocator, base);

    let (mode, capacity) = match config.allocation.max_units {
        0 => (ProblemMode::MinimizeTotalImpedance, None),
        max => (ProblemMode::MaximizeCapacitatedCoverage, Some(max)),
    };
    let mut initial = solver.solve(&points, &sites, area_count, mode, capacity)
        .into_result()
        .inspect_err(|e| error!("[plan] initial partition failed: {}", e))
        .context("[create_areas] initial partition failed")?;

    report.attached = initial.attach_unallocated(&points)?;
    if report.attached > 0 {
        warn!("[plan] attached {} unallocated points to their nearest area", report.attached);
    }
    let mut partition = Partition::from_solve(points, &initial)?;
    info!("[plan] initial partition has {} areas", partition.num_areas());

    // Split.
    report.split = AreaSplitter::new(&solver, config.split.clone()).split(&mut partition)?;

    // Outlines and stats.
    let aoi = features_to_aoi(&coords, config.geometry.aoi_buffer);
    let boundary = (!aoi.0.is_empty()).then_some(&aoi);
    let mut outlines = build_area_polygons(&partition.labelled_locations(), boundary, config.geometry.aoi_buffer);
    let mut workload = stats::collect(&partition, router);

    // Merge.
    let merger = AreaMerger::new(config.merge.clone());
    for pass in 1..=config.merge.max_passes {
        let graph = AdjacencyGraph::build(&AreaShapes::new(outlines.clone()))?;
        let plan = merger.plan(&workload, &graph);
        let unmerged = plan.diagnostics.iter()
            .filter(|e| matches!(e, Error::NoCompliantMerge { .. } | Error::EmptyNeighborhood { .. }))
            .count();

        if plan.is_empty() {
            info!("[plan] merge pass {}: nothing to merge ({} areas left as is)", pass, unmerged);
            report.merges.push(plan);
            break
        }

        let resolved = plan.apply(&mut partition);
        outlines = dissolve_outlines(&outlines, |id| resolved.get(id).cloned().unwrap_or_else(|| id.clone()));
        workload = stats::collect(&partition, router);
        info!(
            "[plan] merge pass {}: retired {} areas, {} left unmerged, {} areas remain",
            pass, resolved.len(), unmerged, workload.len()
        );
        report.merges.push(plan);
    }

    info!("[plan] finished with {} areas", workload.len());
    Ok(AreaPlan::new(partition, outlines, workload, report))
}
