//! Hot-Reload Cascade: level-parallel BFS over the dependents edge set,
//! cycle enumeration via a separate sequential DFS, and Kahn topological
//! ordering for safe reload.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::collaborators::Collaborators;
use crate::ids::parse_symbol_id;

use serde::Serialize;

/// `(symbolId, distance>=0, reason, filePath?)`. Distance 0 marks a
/// directly-changed symbol; each BFS hop increments it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeEntry {
    pub symbol_id: String,
    pub distance: u32,
    pub reason: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeResult {
    pub cascade: Vec<CascadeEntry>,
    pub order: Vec<String>,
    pub circular: Vec<Vec<String>>,
    pub total_symbols: usize,
    pub max_distance: u32,
    pub has_circular: bool,
}

/// Compute the cascade reachable from `changed`.
///
/// The fan-out within one level is written as a plain sequential loop:
/// each iteration only reads shared state (`visited`) before deciding
/// whether to queue a child, and only one node's dependents are resolved
/// at a time. An implementation that wants genuine parallel I/O here can
/// collect `(node, dependents)` pairs concurrently and feed them into the
/// same sequential merge below; the merge itself must never run two nodes'
/// mutations of `visited`/`dependency_graph` concurrently, or diamond
/// patterns can produce false-positive cycles.
pub fn compute_cascade(changed: &[String], collab: &Collaborators) -> CascadeResult {
    let (result, _graph) = compute_cascade_with_graph(changed, collab);
    result
}

/// Shared BFS core. Returns the cascade result plus the raw parent→children
/// adjacency map, which [`compute_cascade`] discards and [`build_impact_graph`]
/// needs to derive `dependents`/`dependsOn` edges per node.
fn compute_cascade_with_graph(
    changed: &[String],
    collab: &Collaborators,
) -> (CascadeResult, HashMap<String, Vec<String>>) {
    let mut visited: HashSet<String> = HashSet::new();
    let mut cascade: HashMap<String, CascadeEntry> = HashMap::new();
    let mut insertion_order: Vec<String> = Vec::new();
    let mut dependency_graph: HashMap<String, Vec<String>> = HashMap::new();

    let mut level: Vec<String> = Vec::new();
    for id in changed {
        if visited.insert(id.clone()) {
            cascade.insert(
                id.clone(),
                CascadeEntry {
                    symbol_id: id.clone(),
                    distance: 0,
                    reason: "direct change".to_string(),
                    file_path: None,
                },
            );
            insertion_order.push(id.clone());
            level.push(id.clone());
        }
    }

    while !level.is_empty() {
        // Fan-out phase: resolve each node's dependents independently.
        let fanout: Vec<(String, u32, Vec<crate::collaborators::DependentEdge>)> = level
            .iter()
            .map(|node_id| {
                let distance = cascade.get(node_id).map(|e| e.distance).unwrap_or(0);
                let edges = collab
                    .dependencies
                    .map(|dep| dep.dependents(std::slice::from_ref(node_id)))
                    .unwrap_or_default();
                (node_id.clone(), distance, edges)
            })
            .collect();

        // Merge phase: strictly sequential mutation of visited/cascade/graph.
        let mut next_level = Vec::new();
        for (parent_id, parent_distance, edges) in fanout {
            let parent_name = parse_symbol_id(&parent_id)
                .map(|p| p.bare_name().to_string())
                .unwrap_or_else(|_| parent_id.clone());
            let graph_entry = dependency_graph.entry(parent_id.clone()).or_default();
            for edge in edges {
                graph_entry.push(edge.symbol_id.clone());
                if visited.insert(edge.symbol_id.clone()) {
                    cascade.insert(
                        edge.symbol_id.clone(),
                        CascadeEntry {
                            symbol_id: edge.symbol_id.clone(),
                            distance: parent_distance + 1,
                            reason: format!("depends on {parent_name}"),
                            file_path: edge.file_path.clone(),
                        },
                    );
                    insertion_order.push(edge.symbol_id.clone());
                    next_level.push(edge.symbol_id.clone());
                }
            }
        }
        level = next_level;
    }

    let circular = enumerate_cycles(&dependency_graph, &insertion_order);
    let (mut order, topo_has_circular) = topological_order(&insertion_order, &dependency_graph);

    let has_circular = !circular.is_empty() || topo_has_circular;
    let max_distance = insertion_order
        .iter()
        .filter_map(|id| cascade.get(id).map(|e| e.distance))
        .max()
        .unwrap_or(0);

    let cascade_list: Vec<CascadeEntry> = insertion_order
        .iter()
        .map(|id| cascade.get(id).cloned().expect("every id has an entry"))
        .collect();

    order.dedup();

    let result = CascadeResult {
        total_symbols: cascade_list.len(),
        max_distance,
        has_circular,
        cascade: cascade_list,
        order,
        circular,
    };
    (result, dependency_graph)
}

/// Per-node estimated reload cost, in milliseconds. A node with no known
/// file (nothing to recompile) has no meaningful reload time.
const RELOAD_COST_MS_PER_NODE: u64 = 50;

/// `(symbolId, symbolName, distance, isDirectlyAffected, dependents[],
/// dependsOn[], filePath?, estimatedReloadTime?)`. Edges reflect "X is
/// depended on by Y": `dependents` lists symbols that depend on this node,
/// `dependsOn` lists symbols this node depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactGraphNode {
    pub symbol_id: String,
    pub symbol_name: String,
    pub distance: u32,
    pub is_directly_affected: bool,
    pub dependents: Vec<String>,
    pub depends_on: Vec<String>,
    pub file_path: Option<String>,
    pub estimated_reload_time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactGraph {
    pub nodes: Vec<ImpactGraphNode>,
    /// Symbol ids from a directly-changed root to the farthest reachable
    /// node, following the longest chain of "depends on" edges.
    pub critical_path: Vec<String>,
    /// Sum of `estimatedReloadTime` (treating `None` as 0) along `criticalPath`.
    pub critical_path_time: u64,
}

/// Build the impact graph for `changed`: one node per cascade entry, with
/// both edge directions and a critical-path estimate (the longest
/// distance-ordered chain of dependencies, by total estimated reload time).
pub fn build_impact_graph(changed: &[String], collab: &Collaborators) -> ImpactGraph {
    let (cascade_result, dependency_graph) = compute_cascade_with_graph(changed, collab);

    let mut depends_on: HashMap<String, Vec<String>> = HashMap::new();
    for (parent, children) in &dependency_graph {
        for child in children {
            depends_on.entry(child.clone()).or_default().push(parent.clone());
        }
    }

    let nodes: Vec<ImpactGraphNode> = cascade_result
        .cascade
        .iter()
        .map(|entry| {
            let symbol_name = parse_symbol_id(&entry.symbol_id)
                .map(|p| p.bare_name().to_string())
                .unwrap_or_else(|_| entry.symbol_id.clone());
            let estimated_reload_time = entry.file_path.as_ref().map(|_| RELOAD_COST_MS_PER_NODE);
            ImpactGraphNode {
                symbol_id: entry.symbol_id.clone(),
                symbol_name,
                distance: entry.distance,
                is_directly_affected: entry.distance == 0,
                dependents: dependency_graph
                    .get(&entry.symbol_id)
                    .cloned()
                    .unwrap_or_default(),
                depends_on: depends_on.get(&entry.symbol_id).cloned().unwrap_or_default(),
                file_path: entry.file_path.clone(),
                estimated_reload_time,
            }
        })
        .collect();

    let (critical_path, critical_path_time) = critical_path(&nodes);

    ImpactGraph {
        nodes,
        critical_path,
        critical_path_time,
    }
}

/// Walk backward from the node at `max_distance`, at each step picking the
/// `dependsOn` predecessor with the highest reload-time contribution so far,
/// then reverse to produce a root-to-leaf path.
fn critical_path(nodes: &[ImpactGraphNode]) -> (Vec<String>, u64) {
    let by_id: HashMap<&str, &ImpactGraphNode> =
        nodes.iter().map(|n| (n.symbol_id.as_str(), n)).collect();

    let Some(deepest) = nodes.iter().max_by_key(|n| n.distance) else {
        return (Vec::new(), 0);
    };

    let mut path = vec![deepest.symbol_id.clone()];
    let mut total = deepest.estimated_reload_time.unwrap_or(0);
    let mut current = deepest;
    while current.distance > 0 {
        let predecessor: Option<&ImpactGraphNode> = current
            .depends_on
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .filter(|p| p.distance + 1 == current.distance)
            .max_by_key(|p| p.estimated_reload_time.unwrap_or(0));
        match predecessor {
            Some(p) => {
                path.push(p.symbol_id.clone());
                total += p.estimated_reload_time.unwrap_or(0);
                current = p;
            }
            None => break,
        }
    }
    path.reverse();
    (path, total)
}

/// Sequential DFS over the completed graph; on a back edge into a node
/// still `visiting`, close the cycle by slicing `path` from that node's
/// first occurrence. Each node is entered at most once overall.
fn enumerate_cycles(graph: &HashMap<String, Vec<String>>, order: &[String]) -> Vec<Vec<String>> {
    let mut visiting: HashSet<String> = HashSet::new();
    let mut done: HashSet<String> = HashSet::new();
    let mut path: Vec<String> = Vec::new();
    let mut cycles: Vec<Vec<String>> = Vec::new();

    fn dfs(
        node: &str,
        graph: &HashMap<String, Vec<String>>,
        visiting: &mut HashSet<String>,
        done: &mut HashSet<String>,
        path: &mut Vec<String>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        if done.contains(node) {
            return;
        }
        if visiting.contains(node) {
            let start = path.iter().position(|n| n == node).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].to_vec();
            cycle.push(node.to_string());
            cycles.push(cycle);
            return;
        }
        visiting.insert(node.to_string());
        path.push(node.to_string());
        if let Some(children) = graph.get(node) {
            for child in children {
                dfs(child, graph, visiting, done, path, cycles);
            }
        }
        path.pop();
        visiting.remove(node);
        done.insert(node.to_string());
    }

    for node in order {
        if !done.contains(node) {
            dfs(node, graph, &mut visiting, &mut done, &mut path, &mut cycles);
        }
    }
    cycles
}

/// Kahn's algorithm. Returns `(order, has_circular)`. Nodes left over once
/// the queue drains are cycle members; they are appended in `insertion_order`
/// for a deterministic (if arbitrary) tail.
fn topological_order(insertion_order: &[String], graph: &HashMap<String, Vec<String>>) -> (Vec<String>, bool) {
    let mut in_degree: HashMap<String, usize> =
        insertion_order.iter().map(|id| (id.clone(), 0)).collect();
    for children in graph.values() {
        for child in children {
            if let Some(d) = in_degree.get_mut(child) {
                *d += 1;
            }
        }
    }

    let mut queue: VecDeque<String> = VecDeque::new();
    for id in insertion_order {
        if in_degree.get(id) == Some(&0) {
            queue.push_back(id.clone());
        }
    }

    let mut order = Vec::new();
    let mut emitted: HashSet<String> = HashSet::new();
    while let Some(u) = queue.pop_front() {
        order.push(u.clone());
        emitted.insert(u.clone());
        if let Some(children) = graph.get(&u) {
            for child in children {
                if let Some(d) = in_degree.get_mut(child) {
                    *d = d.saturating_sub(1);
                    if *d == 0 {
                        queue.push_back(child.clone());
                    }
                }
            }
        }
    }

    let mut has_circular = false;
    for id in insertion_order {
        if !emitted.contains(id) {
            order.push(id.clone());
            has_circular = true;
        }
    }

    (order, has_circular)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{DependencyAnalyzer, DependentEdge};

    struct FixtureGraph {
        edges: HashMap<String, Vec<DependentEdge>>,
    }
    impl DependencyAnalyzer for FixtureGraph {
        fn dependents(&self, symbol_ids: &[String]) -> Vec<DependentEdge> {
            symbol_ids
                .iter()
                .flat_map(|id| self.edges.get(id).cloned().unwrap_or_default())
                .collect()
        }
    }

    fn edge(id: &str, file: Option<&str>) -> DependentEdge {
        DependentEdge {
            symbol_id: id.to_string(),
            file_path: file.map(str::to_string),
        }
    }

    #[test]
    fn diamond_with_cycle_s5() {
        let mut edges = HashMap::new();
        edges.insert("A".to_string(), vec![edge("B", None), edge("C", None)]);
        edges.insert("B".to_string(), vec![edge("D", None)]);
        edges.insert("C".to_string(), vec![edge("D", None)]);
        edges.insert("D".to_string(), vec![edge("A", None)]);
        let graph = FixtureGraph { edges };
        let collab = Collaborators {
            dependencies: Some(&graph),
            ..Collaborators::new()
        };

        let result = compute_cascade(&["A".to_string()], &collab);
        assert_eq!(result.total_symbols, 4);
        assert_eq!(result.max_distance, 2);

        let by_id = |id: &str| result.cascade.iter().find(|e| e.symbol_id == id).unwrap();
        assert_eq!(by_id("A").distance, 0);
        assert_eq!(by_id("B").distance, 1);
        assert_eq!(by_id("C").distance, 1);
        assert_eq!(by_id("D").distance, 2);

        assert!(result.has_circular);
        assert_eq!(result.circular.len(), 1);
        assert_eq!(
            result.circular[0],
            vec!["A".to_string(), "B".to_string(), "D".to_string(), "A".to_string()]
        );
    }

    #[test]
    fn acyclic_chain_respects_edge_order() {
        let mut edges = HashMap::new();
        edges.insert("A".to_string(), vec![edge("B", None)]);
        edges.insert("B".to_string(), vec![edge("C", None)]);
        let graph = FixtureGraph { edges };
        let collab = Collaborators {
            dependencies: Some(&graph),
            ..Collaborators::new()
        };
        let result = compute_cascade(&["A".to_string()], &collab);
        assert!(!result.has_circular);
        assert!(result.circular.is_empty());
        let idx = |id: &str| result.order.iter().position(|x| x == id).unwrap();
        assert!(idx("A") < idx("B"));
        assert!(idx("B") < idx("C"));
    }

    #[test]
    fn no_dependents_collaborator_yields_direct_only() {
        let collab = Collaborators::new();
        let result = compute_cascade(&["A".to_string(), "B".to_string()], &collab);
        assert_eq!(result.total_symbols, 2);
        assert_eq!(result.max_distance, 0);
        assert!(!result.has_circular);
    }

    #[test]
    fn cascade_entries_carry_file_paths() {
        let mut edges = HashMap::new();
        edges.insert(
            "gml/script/a".to_string(),
            vec![edge("gml/script/b", Some("scripts/b.gml"))],
        );
        let graph = FixtureGraph { edges };
        let collab = Collaborators {
            dependencies: Some(&graph),
            ..Collaborators::new()
        };
        let result = compute_cascade(&["gml/script/a".to_string()], &collab);
        let b = result
            .cascade
            .iter()
            .find(|e| e.symbol_id == "gml/script/b")
            .unwrap();
        assert_eq!(b.file_path.as_deref(), Some("scripts/b.gml"));
        assert_eq!(b.reason, "depends on a");
    }

    #[test]
    fn impact_graph_edges_are_bidirectional() {
        let mut edges = HashMap::new();
        edges.insert("A".to_string(), vec![edge("B", Some("b.gml"))]);
        edges.insert("B".to_string(), vec![edge("C", Some("c.gml"))]);
        let graph = FixtureGraph { edges };
        let collab = Collaborators {
            dependencies: Some(&graph),
            ..Collaborators::new()
        };

        let impact = build_impact_graph(&["A".to_string()], &collab);
        assert_eq!(impact.nodes.len(), 3);

        let by_id = |id: &str| impact.nodes.iter().find(|n| n.symbol_id == id).unwrap();
        let a = by_id("A");
        assert!(a.is_directly_affected);
        assert_eq!(a.dependents, vec!["B".to_string()]);
        assert!(a.depends_on.is_empty());

        let b = by_id("B");
        assert!(!b.is_directly_affected);
        assert_eq!(b.depends_on, vec!["A".to_string()]);
        assert_eq!(b.dependents, vec!["C".to_string()]);

        let c = by_id("C");
        assert_eq!(c.distance, 2);
        assert_eq!(c.depends_on, vec!["B".to_string()]);

        assert_eq!(impact.critical_path, vec!["A".to_string(), "B".to_string(), "C".to_string()]);
        // The directly-changed root carries no file path (and so no reload
        // estimate); only B and C have one.
        assert_eq!(impact.critical_path_time, 2 * RELOAD_COST_MS_PER_NODE);
    }

    #[test]
    fn impact_graph_node_without_file_has_no_reload_estimate() {
        let collab = Collaborators::new();
        let impact = build_impact_graph(&["A".to_string()], &collab);
        assert_eq!(impact.nodes.len(), 1);
        assert_eq!(impact.nodes[0].estimated_reload_time, None);
        assert_eq!(impact.critical_path, vec!["A".to_string()]);
        assert_eq!(impact.critical_path_time, 0);
    }
}
