use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    config::MergeConfig,
    error::{Error, Result},
    graph::AdjacencyGraph,
    partition::Partition,
    types::{AreaId, AreaStats},
};

/// Which rule selected a merge target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRule {
    /// The neighbor with the fewest points fits within both bounds.
    LowestCount,
    /// The neighbor with the shortest travel time fits within both bounds.
    ShortestTime,
    /// No neighbor fits, but the area is below the hard floor.
    Forced,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeDecision {
    pub source: AreaId,
    pub target: AreaId,
    pub rule: MergeRule,
}

/// Merge decisions computed against one snapshot, plus the areas left unmerged and why.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergePlan {
    pub decisions: Vec<MergeDecision>,
    pub diagnostics: Vec<Error>,
}

impl MergePlan {
    #[inline] pub fn is_empty(&self) -> bool { self.decisions.is_empty() }

    /// Source -> target, as decided.
    pub fn targets(&self) -> BTreeMap<AreaId, AreaId> {
        self.decisions.iter().map(|d| (d.source.clone(), d.target.clone())).collect()
    }

    /// Source -> final area, following chains (A -> B, B -> C gives A -> C).
    /// Areas on a cycle all resolve to the smallest id in it, which is then not a source.
    pub fn resolve(&self) -> BTreeMap<AreaId, AreaId> {
        let targets = self.targets();

        targets.keys()
            .map(|source| {
                let mut path = vec![source];
                let mut current = source;
                let terminal = loop {
                    let Some(next) = targets.get(current) else { break current };
                    if let Some(pos) = path.iter().position(|&p| p == next) {
                        break path[pos..].iter().copied().min().unwrap_or(next)
                    }
                    path.push(next);
                    current = next;
                };
                (source.clone(), terminal.clone())
            })
            .filter(|(source, terminal)| source != terminal)
            .collect()
    }

    /// Relabel every point of a source area to its final area in one pass.
    /// Returns the resolved mapping so outlines can be dissolved the same way.
    pub fn apply(&self, partition: &mut Partition) -> BTreeMap<AreaId, AreaId> {
        let resolved = self.resolve();
        let moved = partition.relabel(|area| resolved.get(area).cloned());
        debug!("[merge] relabelled {} points out of {} retired areas", moved, resolved.len());
        resolved
    }
}

/// Greedy merger for under-sized areas.
#[derive(Debug, Clone)]
pub struct AreaMerger {
    config: MergeConfig,
}

impl AreaMerger {
    pub fn new(config: MergeConfig) -> Self { Self { config } }

    #[inline] pub fn config(&self) -> &MergeConfig { &self.config }

    /// Areas with at most `min_count` points, ascending by id.
    pub fn candidates<'s>(&self, stats: &'s BTreeMap<AreaId, AreaStats>) -> Vec<&'s AreaId> {
        stats.iter()
            .filter(|(_, s)| s.count <= self.config.min_count)
            .map(|(id, _)| id)
            .collect()
    }

    /// Choose the neighbor `area` should merge into.
    /// Neighbors without stats are not considered.
    pub fn decide(
        &self,
        area: &AreaId,
        stats: &BTreeMap<AreaId, AreaStats>,
        graph: &AdjacencyGraph,
    ) -> Result<MergeDecision> {
        let Some(own) = stats.get(area) else {
            return Err(Error::InvalidInput { message: format!("no statistics for area {area}") })
        };

        let neighbors = graph.neighbors(area).into_iter()
            .filter_map(|id| stats.get(id).map(|s| (id, s)))
            .collect::<Vec<_>>();

        let lowest_count = neighbors.iter()
            .min_by(|(a, sa), (b, sb)| sa.count.cmp(&sb.count).then_with(|| a.cmp(b)));
        let shortest_time = neighbors.iter()
            .min_by(|(a, sa), (b, sb)| sa.total_time.total_cmp(&sb.total_time).then_with(|| a.cmp(b)));

        let (Some(&(lowest, lowest_stats)), Some(&(shortest, shortest_stats))) = (lowest_count, shortest_time) else {
            return Err(Error::EmptyNeighborhood { area: area.clone() })
        };

        let fits = |other: &AreaStats| {
            own.count + other.count < self.config.max_count
                && own.total_time + other.total_time < self.config.max_time
        };

        let (target, rule) = if fits(lowest_stats) {
            (lowest, MergeRule::LowestCount)
        } else if fits(shortest_stats) {
            (shortest, MergeRule::ShortestTime)
        } else if own.count < self.config.abs_min_count {
            (lowest, MergeRule::Forced)
        } else {
            return Err(Error::NoCompliantMerge { area: area.clone() })
        };

        Ok(MergeDecision { source: area.clone(), target: target.clone(), rule })
    }

    /// Decide a merge for every candidate against the same snapshot of stats and adjacency.
    /// Decisions are independent, so they are evaluated in parallel; order is by source id.
    pub fn plan(&self, stats: &BTreeMap<AreaId, AreaStats>, graph: &AdjacencyGraph) -> MergePlan {
        let outcomes = self.candidates(stats)
            .into_par_iter()
            .map(|area| self.decide(area, stats, graph))
            .collect::<Vec<_>>();

        let mut plan = MergePlan::default();
        for outcome in outcomes {
            match outcome {
                Ok(decision) => {
                    debug!("[merge] {} -> {} ({:?})", decision.source, decision.target, decision.rule);
                    plan.decisions.push(decision);
                }
                Err(err) => {
                    info!("[merge] {}", err);
                    plan.diagnostics.push(err);
                }
            }
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DemandPoint;

    fn id(s: &str) -> AreaId { AreaId::new(s) }

    fn stats(entries: &[(&str, usize, f64)]) -> BTreeMap<AreaId, AreaStats> {
        entries.iter().map(|&(a, count, time)| (id(a), AreaStats::new(count, time, 0.0))).collect()
    }

    fn star(center: &str, others: &[&str]) -> AdjacencyGraph {
        let ids = std::iter::once(center).chain(others.iter().copied()).map(id);
        let edges = others.iter().map(|o| (id(center), id(o))).collect::<Vec<_>>();
        AdjacencyGraph::from_edges(ids, &edges)
    }

    fn merger() -> AreaMerger { AreaMerger::new(MergeConfig::default()) }

    #[test]
    fn lowest_count_rule_fires_first() {
        let stats = stats(&[("x", 10, 10.0), ("a", 15, 20.0), ("b", 30, 10.0)]);
        let graph = star("x", &["a", "b"]);

        let decision = merger().decide(&id("x"), &stats, &graph).unwrap();
        assert_eq!(decision.target, id("a"));
        assert_eq!(decision.rule, MergeRule::LowestCount);
    }

    #[test]
    fn shortest_time_rule_is_second() {
        let stats = stats(&[("x", 10, 40.0), ("a", 15, 30.0), ("b", 30, 5.0)]);
        let graph = star("x", &["a", "b"]);

        let decision = merger().decide(&id("x"), &stats, &graph).unwrap();
        assert_eq!(decision.target, id("b"));
        assert_eq!(decision.rule, MergeRule::ShortestTime);
    }

    #[test]
    fn tiny_area_is_forced_into_lowest_count_neighbor() {
        let stats = stats(&[("x", 3, 5.0), ("a", 48, 10.0), ("b", 49, 5.0)]);
        let graph = star("x", &["a", "b"]);

        let decision = merger().decide(&id("x"), &stats, &graph).unwrap();
        assert_eq!(decision.target, id("a"));
        assert_eq!(decision.rule, MergeRule::Forced);
    }

    #[test]
    fn bounds_are_strict() {
        // 10 + 40 == max_count
        let stats = stats(&[("x", 10, 5.0), ("a", 40, 5.0)]);
        let graph = star("x", &["a"]);
        assert_eq!(merger().decide(&id("x"), &stats, &graph), Err(Error::NoCompliantMerge { area: id("x") }));
    }

    #[test]
    fn ties_go_to_smallest_id() {
        let stats = stats(&[("x", 10, 5.0), ("c", 12, 5.0), ("b", 12, 5.0)]);
        let graph = star("x", &["b", "c"]);
        assert_eq!(merger().decide(&id("x"), &stats, &graph).unwrap().target, id("b"));
    }

    #[test]
    fn area_above_min_count_is_not_evaluated() {
        let stats = stats(&[("x", 25, 5.0), ("a", 30, 5.0)]);
        let plan = merger().plan(&stats, &star("x", &["a"]));
        assert!(plan.is_empty());
        assert!(plan.diagnostics.is_empty());
    }

    #[test]
    fn isolated_area_is_reported() {
        let stats = stats(&[("x", 10, 5.0), ("a", 30, 5.0)]);
        let graph = AdjacencyGraph::from_edges([id("x"), id("a")], &[]);
        let plan = merger().plan(&stats, &graph);

        assert!(plan.is_empty());
        assert_eq!(plan.diagnostics, vec![Error::EmptyNeighborhood { area: id("x") }]);
    }

    #[test]
    fn mutual_choices_resolve_to_one_area() {
        let stats = stats(&[("p", 8, 5.0), ("q", 9, 5.0), ("r", 40, 5.0)]);
        let graph = AdjacencyGraph::from_edges(
            [id("p"), id("q"), id("r")],
            &[(id("p"), id("q")), (id("q"), id("r"))],
        );

        let plan = merger().plan(&stats, &graph);
        assert_eq!(plan.targets(), BTreeMap::from([(id("p"), id("q")), (id("q"), id("p"))]));
        assert_eq!(plan.resolve(), BTreeMap::from([(id("q"), id("p"))]));
    }

    #[test]
    fn chains_resolve_to_terminal_target() {
        let plan = MergePlan {
            decisions: vec![
                MergeDecision { source: id("a"), target: id("b"), rule: MergeRule::LowestCount },
                MergeDecision { source: id("b"), target: id("c"), rule: MergeRule::LowestCount },
            ],
            diagnostics: vec![],
        };
        assert_eq!(plan.resolve(), BTreeMap::from([(id("a"), id("c")), (id("b"), id("c"))]));
    }

    #[test]
    fn apply_retires_sources() {
        let points = (0..4).map(|i| DemandPoint::new(format!("p{i}").as_str(), i as f64, 0.0)).collect::<Vec<_>>();
        let mut partition = Partition::new(points, vec![id("a"), id("a"), id("b"), id("c")]).unwrap();
        let plan = MergePlan {
            decisions: vec![MergeDecision { source: id("c"), target: id("b"), rule: MergeRule::Forced }],
            diagnostics: vec![],
        };

        plan.apply(&mut partition);
        assert_eq!(partition.counts(), BTreeMap::from([(id("a"), 2), (id("b"), 2)]));
    }
}
