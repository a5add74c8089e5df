//! Transitive inheritance closure over the project's declaration graph.
//!
//! The graph has one node per declaration and an edge from every declaration
//! to each of its direct bases. Closures are only computed once the whole
//! graph is known to be acyclic and fully resolved.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::error::BuildError;

/// Computes the transitive dependency set of every declaration.
///
/// `bases` maps each declaration name to its direct base names. The result
/// maps every name to all names reachable through base edges, excluding the
/// name itself.
///
/// Fails with [`BuildError::UnknownBase`] if a base is not a key of `bases`,
/// and with [`BuildError::InheritanceCycle`] if any declaration inherits from
/// itself, directly or through other declarations.
pub fn compute_closures(
    bases: &BTreeMap<String, Vec<String>>,
) -> Result<BTreeMap<String, BTreeSet<String>>, BuildError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::with_capacity(bases.len(), bases.len());
    let nodes: HashMap<&str, NodeIndex> = bases
        .keys()
        .map(|name| (name.as_str(), graph.add_node(name.as_str())))
        .collect();

    for (name, direct) in bases {
        let from = nodes[name.as_str()];
        for base in direct {
            let to = *nodes.get(base.as_str()).ok_or_else(|| BuildError::UnknownBase {
                name: name.clone(),
                base: base.clone(),
            })?;
            graph.update_edge(from, to, ());
        }
    }

    if let Some(cycle) = find_cycle(&graph) {
        return Err(BuildError::InheritanceCycle { cycle });
    }

    let mut closures = BTreeMap::new();
    for (name, &start) in &nodes {
        let mut reachable = BTreeSet::new();
        let mut dfs = Dfs::new(&graph, start);
        while let Some(node) = dfs.next(&graph) {
            if node != start {
                reachable.insert(graph[node].to_string());
            }
        }
        closures.insert(name.to_string(), reachable);
    }
    Ok(closures)
}

/// Returns one cycle of the graph, starting and ending at the same name.
///
/// The reported cycle is deterministic: it starts at the smallest name of the
/// first cyclic component and always follows the smallest successor.
fn find_cycle(graph: &DiGraph<&str, ()>) -> Option<Vec<String>> {
    let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .collect();
    for scc in &mut components {
        scc.sort_by_key(|&n| graph[n]);
    }
    components.sort_by_key(|scc| graph[scc[0]]);
    let component = components.first()?;

    let mut path = vec![component[0]];
    loop {
        let current = *path.last()?;
        let next = graph
            .neighbors(current)
            .filter(|n| component.contains(n))
            .min_by_key(|&n| graph[n])?;
        if let Some(pos) = path.iter().position(|&n| n == next) {
            let mut cycle: Vec<String> = path[pos..].iter().map(|&n| graph[n].to_string()).collect();
            cycle.push(graph[next].to_string());
            return Some(cycle);
        }
        path.push(next);
    }
}
