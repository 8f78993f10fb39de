use geo::Coord;
use rand::{distr::{weighted::WeightedIndex, Distribution}, rngs::StdRng, SeedableRng};
use tracing::debug;

use crate::{
    error::{Error, Result},
    solver::{Allocation, AllocationProblem, LocationAllocator, ProblemMode, SolverOptions},
};

/// Location-allocation on straight-line impedance (distance / speed).
///
/// Facilities are seeded k-means++ style from the candidate sites, then improved by
/// alternating between assigning demand to its nearest open facility and moving each
/// facility to the candidate site that minimizes its members' weighted impedance.
/// Capacitated coverage fills facilities nearest-pair first and leaves demand that
/// does not fit unallocated.
#[derive(Debug, Clone)]
pub struct StraightLineAllocator {
    seed: u64,
    max_iter: usize,
}

impl Default for StraightLineAllocator {
    fn default() -> Self { Self { seed: 0, max_iter: 50 } }
}

impl StraightLineAllocator {
    pub fn new(seed: u64, max_iter: usize) -> Self { Self { seed, max_iter } }
}

/// Straight-line impedance matrix, demand-major: `cost[i][j]` is minutes from demand i to site j.
///
/// The matrix is dense and seeding rescans it once per opened facility, so a solve costs
/// O(facilities · demand · sites) time and O(demand · sites) memory. That suits inputs of a few
/// thousand points; for a whole municipality, split the input or plug in a network solver.
struct Impedance<'a> {
    sites: &'a [Coord<f64>],
    cost: Vec<Vec<f64>>,
    weights: Vec<f64>,
}

impl<'a> Impedance<'a> {
    fn new(problem: &AllocationProblem<'a>, speed: f64) -> Self {
        Self {
            sites: problem.facilities,
            cost: problem.demand.iter()
                .map(|d| problem.facilities.iter()
                    .map(|f| (d.location.x - f.x).hypot(d.location.y - f.y) / speed)
                    .collect())
                .collect(),
            weights: problem.demand.iter().map(|d| d.weight()).collect(),
        }
    }

    /// Nearest open facility (position in `open`) per demand point.
    fn nearest(&self, open: &[usize]) -> Vec<usize> {
        self.cost.iter()
            .map(|row| {
                (0..open.len())
                    .min_by(|&a, &b| row[open[a]].total_cmp(&row[open[b]]))
                    .unwrap_or(0)
            })
            .collect()
    }
}

impl StraightLineAllocator {
    /// k-means++ seeding over candidate sites, weighted by demand impedance.
    fn seed_sites(&self, imp: &Impedance<'_>, sites: usize, count: usize) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        // First site: the one with least total weighted impedance.
        let first = (0..sites)
            .min_by(|&a, &b| {
                let ca = imp.cost.iter().zip(&imp.weights).map(|(row, w)| w * row[a]).sum::<f64>();
                let cb = imp.cost.iter().zip(&imp.weights).map(|(row, w)| w * row[b]).sum::<f64>();
                ca.total_cmp(&cb)
            })
            .unwrap_or(0);
        let mut open = vec![first];

        // Each remaining site is drawn with probability proportional to how badly the
        // demand nearest to it is served today.
        while open.len() < count {
            let nearest = imp.nearest(&open);
            let mut gain = vec![0.0; sites];
            for (i, row) in imp.cost.iter().enumerate() {
                let served = row[open[nearest[i]]];
                for (j, g) in gain.iter_mut().enumerate() {
                    let better = served - row[j];
                    if better > 0.0 { *g += imp.weights[i] * better }
                }
            }
            for &j in &open { gain[j] = 0.0 }

            let next = match WeightedIndex::new(&gain) {
                Ok(dist) => dist.sample(&mut rng),
                // Every demand point already sits on an open site; take any closed one.
                Err(_) => match (0..sites).find(|j| !open.contains(j)) {
                    Some(j) => j,
                    None => break,
                },
            };
            open.push(next);
        }

        open
    }

    /// Alternate assignment and per-facility relocation until stable.
    fn improve(&self, imp: &Impedance<'_>, sites: usize, mut open: Vec<usize>) -> Vec<usize> {
        for iter in 0..self.max_iter {
            let nearest = imp.nearest(&open);

            // Candidate sites follow the facility they are closest to.
            let mut candidates = vec![Vec::new(); open.len()];
            let site_owner = (0..sites).map(|j| {
                (0..open.len())
                    .min_by(|&a, &b| site_distance(imp, open[a], j).total_cmp(&site_distance(imp, open[b], j)))
                    .unwrap_or(0)
            });
            for (j, owner) in site_owner.enumerate() { candidates[owner].push(j) }

            let mut moved = false;
            for (k, slot) in open.clone().iter().enumerate() {
                let members = (0..imp.cost.len()).filter(|&i| nearest[i] == k).collect::<Vec<_>>();
                if members.is_empty() { continue }

                let cost_at = |j: usize| members.iter().map(|&i| imp.weights[i] * imp.cost[i][j]).sum::<f64>();
                let best = candidates[k].iter().copied()
                    .filter(|j| j == slot || !open.contains(j))
                    .min_by(|&a, &b| cost_at(a).total_cmp(&cost_at(b)))
                    .unwrap_or(*slot);
                if best != *slot && cost_at(best) + 1e-12 < cost_at(*slot) {
                    open[k] = best;
                    moved = true;
                }
            }

            if !moved {
                debug!("[allocate] converged after {} iterations", iter + 1);
                break
            }
        }
        open
    }
}

fn site_distance(imp: &Impedance<'_>, a: usize, b: usize) -> f64 {
    let (a, b) = (imp.sites[a], imp.sites[b]);
    (a.x - b.x).hypot(a.y - b.y)
}

impl LocationAllocator for StraightLineAllocator {
    fn solve(&self, problem: &AllocationProblem<'_>, options: &SolverOptions) -> Result<Allocation> {
        let sites = problem.facilities.len();
        let count = options.facility_count;

        if problem.demand.is_empty() { return Err(Error::solver(["no demand points loaded"])) }
        if sites == 0 { return Err(Error::solver(["no facilities loaded"])) }
        if count == 0 { return Err(Error::solver(["facility count must be at least 1"])) }
        if count > sites {
            return Err(Error::solver([format!("cannot choose {count} facilities from {sites} candidates")]))
        }
        if !(options.travel_speed > 0.0) { return Err(Error::solver(["travel speed must be positive"])) }

        let imp = Impedance::new(problem, options.travel_speed);
        let open = self.improve(&imp, sites, self.seed_sites(&imp, sites, count));
        let cutoff = options.impedance_cutoff.unwrap_or(f64::INFINITY);

        let mut messages = Vec::new();
        let assignment = match options.mode {
            ProblemMode::MinimizeTotalImpedance => {
                imp.nearest(&open).into_iter().enumerate()
                    .map(|(i, k)| (imp.cost[i][open[k]] <= cutoff).then_some(open[k]))
                    .collect::<Vec<_>>()
            }
            ProblemMode::MaximizeCapacitatedCoverage => {
                let Some(capacity) = options.capacity else {
                    return Err(Error::solver(["capacitated coverage requires a capacity"]))
                };

                let mut pairs = (0..imp.cost.len())
                    .flat_map(|i| open.iter().map(move |&j| (i, j)))
                    .filter(|&(i, j)| imp.cost[i][j] <= cutoff)
                    .collect::<Vec<_>>();
                pairs.sort_by(|&(i, a), &(k, b)| imp.cost[i][a].total_cmp(&imp.cost[k][b]));

                let mut load = vec![0usize; sites];
                let mut assignment = vec![None; imp.cost.len()];
                for (i, j) in pairs {
                    if assignment[i].is_some() || load[j] >= capacity { continue }
                    assignment[i] = Some(j);
                    load[j] += 1;
                }
                assignment
            }
        };

        let unallocated = assignment.iter().filter(|a| a.is_none()).count();
        if unallocated > 0 {
            messages.push(format!("{unallocated} demand points were not allocated to any facility"));
        }

        Ok(Allocation { assignment, messages })
    }
}
