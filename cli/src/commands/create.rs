use anyhow::{bail, Result};
use rodeplan::{io, PlanConfig, StraightLineAllocator, StraightLineRouter};
use tracing::info;

use crate::cli::{Cli, CreateArgs};

/// Load the config file (if any) and apply flag overrides.
pub(crate) fn load_config(path: Option<&std::path::Path>) -> Result<PlanConfig> {
    match path {
        Some(path) => PlanConfig::read_from_file(path),
        None => Ok(PlanConfig::default()),
    }
}

pub fn run(_cli: &Cli, args: &CreateArgs) -> Result<()> {
    if args.output.as_os_str() == "-" {
        bail!("[create] writing to stdout is not supported; pass an output directory");
    }

    let mut config = load_config(args.config.as_deref())?;
    if let Some(areas) = args.areas { config.estimate.requested_areas = areas }
    if let Some(factor) = args.factor { config.estimate.area_size_factor = factor }
    if let Some(max_units) = args.max_units { config.allocation.max_units = max_units }
    config.validate()?;

    info!("[create] loading points from {}", args.points.display());
    let points = io::read_points(&args.points)?;

    let allocator = StraightLineAllocator::new(args.seed, 50);
    let router = StraightLineRouter::new(config.allocation.travel_speed);
    let plan = rodeplan::create_areas(points, &config, allocator, &router)?;

    io::ensure_dir_exists(&args.output)?;
    let points_path = args.output.join("points.csv");
    let areas_path = args.output.join("areas.geojson");

    info!("[create] writing {} points to {}", plan.points().len(), points_path.display());
    io::write_points(&plan, &points_path)?;

    info!("[create] writing {} areas to {}", plan.num_areas(), areas_path.display());
    io::write_areas(&plan, &areas_path)?;

    Ok(())
}
