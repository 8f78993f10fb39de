use anyhow::Result;
use rodeplan::{average_nearest_neighbor, estimate_area_count, io};

use crate::{cli::{Cli, EstimateArgs}, commands::create::load_config};

pub fn run(_cli: &Cli, args: &EstimateArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(factor) = args.factor { config.estimate.area_size_factor = factor }
    config.validate()?;

    let points = io::read_points(&args.points)?;
    let coords = points.iter().map(|p| p.location).collect::<Vec<_>>();

    let index = config.estimate.use_clustering_index
        .then(|| average_nearest_neighbor(&coords))
        .flatten();
    let areas = estimate_area_count(
        points.len(),
        config.estimate.requested_areas,
        index,
        config.estimate.area_size_factor,
    )?;

    match index {
        Some(index) => println!("{} points, clustering index {:.3}: {} areas", points.len(), index, areas),
        None => println!("{} points: {} areas", points.len(), areas),
    }
    Ok(())
}
