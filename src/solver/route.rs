use geo::Coord;

use crate::error::{Error, Result};

/// Cost of visiting a set of stops.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RouteCost {
    pub total_time: f64,   // minutes
    pub total_length: f64, // kilometres
}

/// A routing service: best-sequence travel cost through unordered stops.
pub trait RouteSolver: Send + Sync {
    fn solve_route(&self, stops: &[Coord<f64>]) -> Result<RouteCost>;
}

/// Open-path routing on straight-line distances.
/// Nearest-neighbour construction followed by 2-opt improvement.
#[derive(Debug, Clone)]
pub struct StraightLineRouter {
    speed: f64, // distance units per minute
    max_sweeps: usize,
}

impl StraightLineRouter {
    pub fn new(speed: f64) -> Self { Self { speed, max_sweeps: 100 } }

    /// Total length of the best open path found through `stops`, in distance units.
    pub fn path_length(&self, stops: &[Coord<f64>]) -> f64 {
        let order = self.sequence(stops);
        order.windows(2).map(|w| distance(stops[w[0]], stops[w[1]])).sum()
    }

    /// Visiting order of `stops`.
    pub fn sequence(&self, stops: &[Coord<f64>]) -> Vec<usize> {
        let n = stops.len();
        if n < 3 { return (0..n).collect() }

        // Nearest-neighbour construction from the first stop.
        let mut visited = vec![false; n];
        let mut order = Vec::with_capacity(n);
        let mut current = 0;
        visited[0] = true;
        order.push(0);
        while order.len() < n {
            let next = (0..n)
                .filter(|&j| !visited[j])
                .min_by(|&a, &b| distance(stops[current], stops[a]).total_cmp(&distance(stops[current], stops[b])));
            let Some(next) = next else { break };
            visited[next] = true;
            order.push(next);
            current = next;
        }

        // 2-opt on an open path: reversing order[i..=j] swaps the edges at both ends,
        // with a missing end contributing nothing.
        for _ in 0..self.max_sweeps {
            let mut improved = false;
            for i in 0..n - 1 {
                for j in i + 1..n {
                    let before = if i > 0 { distance(stops[order[i - 1]], stops[order[i]]) } else { 0.0 }
                        + if j + 1 < n { distance(stops[order[j]], stops[order[j + 1]]) } else { 0.0 };
                    let after = if i > 0 { distance(stops[order[i - 1]], stops[order[j]]) } else { 0.0 }
                        + if j + 1 < n { distance(stops[order[i]], stops[order[j + 1]]) } else { 0.0 };
                    if after + 1e-9 < before {
                        order[i..=j].reverse();
                        improved = true;
                    }
                }
            }
            if !improved { break }
        }

        order
    }
}

impl RouteSolver for StraightLineRouter {
    fn solve_route(&self, stops: &[Coord<f64>]) -> Result<RouteCost> {
        if stops.is_empty() {
            return Err(Error::solver(["route has no stops"]))
        }
        let length = self.path_length(stops);
        Ok(RouteCost { total_time: length / self.speed, total_length: length / 1000.0 })
    }
}

#[inline]
fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
