//! Capability graph over a set of skills.
//!
//! Nodes are skills; a directed edge `A -> B` exists when skill A provides
//! a capability that skill B requires. The graph owns a clone of its input
//! skills (arena + index pattern); everything else passes names around.
//!
//! Determinism: adjacency lists are kept sorted under [`compare_skills`],
//! traversals visit nodes in input order, and the topological sort re-sorts
//! its ready queue after every insertion.

pub mod mermaid;

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::catalog::Skill;

/// Strict total order for deterministic selection: risk, then cost, then
/// lexicographic name.
#[must_use]
pub fn compare_skills(a: &Skill, b: &Skill) -> Ordering {
    a.risk
        .cmp(&b.risk)
        .then_with(|| a.cost.cmp(&b.cost))
        .then_with(|| a.name.cmp(&b.name))
}

/// A provides/requires edge, labeled with the capability that induces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub capability: String,
}

/// Result of cycle detection.
#[derive(Debug, Clone, Serialize)]
pub struct CycleDetection {
    pub has_cycle: bool,
    /// The cycle from the revisit point through the stack top, closed with
    /// the revisited node. Empty when no cycle exists.
    pub cycle: Vec<String>,
}

/// Dependency graph over a fixed set of skills.
#[derive(Debug, Clone)]
pub struct CapabilityGraph {
    skills: Vec<Skill>,
    index: HashMap<String, usize>,
    /// capability -> providing skill indices, insertion-ordered.
    providers: HashMap<String, Vec<usize>>,
    /// Direct successors per node, sorted under `compare_skills`.
    children: Vec<Vec<usize>>,
    /// Direct predecessors per node, sorted under `compare_skills`.
    parents: Vec<Vec<usize>>,
    edges: Vec<Edge>,
}

impl CapabilityGraph {
    /// Build the graph from a skill list. Input order is preserved and
    /// meaningful: it breaks ties in `providers` and seeds every traversal.
    #[must_use]
    pub fn new(skills: &[Skill]) -> Self {
        let skills: Vec<Skill> = skills.to_vec();
        let index: HashMap<String, usize> = skills
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();

        let mut providers: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, skill) in skills.iter().enumerate() {
            for cap in &skill.provides {
                providers.entry(cap.clone()).or_default().push(i);
            }
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); skills.len()];
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); skills.len()];
        let mut edges = Vec::new();
        for (to, skill) in skills.iter().enumerate() {
            for cap in &skill.requires {
                let Some(froms) = providers.get(cap) else {
                    continue;
                };
                for &from in froms {
                    if from == to {
                        continue;
                    }
                    edges.push(Edge {
                        from: skills[from].name.clone(),
                        to: skill.name.clone(),
                        capability: cap.clone(),
                    });
                    if !children[from].contains(&to) {
                        children[from].push(to);
                    }
                    if !parents[to].contains(&from) {
                        parents[to].push(from);
                    }
                }
            }
        }
        for list in children.iter_mut().chain(parents.iter_mut()) {
            list.sort_by(|&a, &b| compare_skills(&skills[a], &skills[b]));
        }

        Self {
            skills,
            index,
            providers,
            children,
            parents,
            edges,
        }
    }

    /// All skills, in input order.
    #[must_use]
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Look up a skill by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.index.get(name).map(|&i| &self.skills[i])
    }

    /// Skills providing a capability, insertion-ordered under the input
    /// skill list.
    #[must_use]
    pub fn providers(&self, capability: &str) -> Vec<&Skill> {
        self.providers
            .get(capability)
            .map(|ids| ids.iter().map(|&i| &self.skills[i]).collect())
            .unwrap_or_default()
    }

    /// Direct successors of a skill.
    #[must_use]
    pub fn dependents(&self, name: &str) -> Vec<&Skill> {
        self.index
            .get(name)
            .map(|&i| self.children[i].iter().map(|&c| &self.skills[c]).collect())
            .unwrap_or_default()
    }

    /// Direct predecessors of a skill.
    #[must_use]
    pub fn dependencies(&self, name: &str) -> Vec<&Skill> {
        self.index
            .get(name)
            .map(|&i| self.parents[i].iter().map(|&p| &self.skills[p]).collect())
            .unwrap_or_default()
    }

    /// All provides/requires edges, in construction order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// DFS cycle detection with an explicit recursion stack. On a
    /// back-edge, the cycle is emitted from the revisit point through the
    /// stack top. Deterministic under input ordering.
    #[must_use]
    pub fn detect_cycle(&self) -> CycleDetection {
        let n = self.skills.len();
        let mut visited = vec![false; n];
        let mut on_stack = vec![false; n];
        let mut stack: Vec<usize> = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }
            if let Some(cycle) = self.dfs_cycle(start, &mut visited, &mut on_stack, &mut stack) {
                return CycleDetection {
                    has_cycle: true,
                    cycle,
                };
            }
        }
        CycleDetection {
            has_cycle: false,
            cycle: Vec::new(),
        }
    }

    fn dfs_cycle(
        &self,
        node: usize,
        visited: &mut [bool],
        on_stack: &mut [bool],
        stack: &mut Vec<usize>,
    ) -> Option<Vec<String>> {
        visited[node] = true;
        on_stack[node] = true;
        stack.push(node);

        for &child in &self.children[node] {
            if on_stack[child] {
                let revisit = stack.iter().position(|&s| s == child).unwrap_or(0);
                let mut cycle: Vec<String> = stack[revisit..]
                    .iter()
                    .map(|&i| self.skills[i].name.clone())
                    .collect();
                cycle.push(self.skills[child].name.clone());
                return Some(cycle);
            }
            if !visited[child] {
                if let Some(cycle) = self.dfs_cycle(child, visited, on_stack, stack) {
                    return Some(cycle);
                }
            }
        }

        stack.pop();
        on_stack[node] = false;
        None
    }

    /// Kahn's algorithm with a ready queue kept sorted under
    /// [`compare_skills`], re-sorted after each insertion. Returns `None`
    /// iff the graph has a cycle.
    #[must_use]
    pub fn topological_sort(&self) -> Option<Vec<String>> {
        let n = self.skills.len();
        let mut indegree: Vec<usize> = self.parents.iter().map(Vec::len).collect();

        let mut ready: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
        ready.sort_by(|&a, &b| compare_skills(&self.skills[a], &self.skills[b]));

        let mut order = Vec::with_capacity(n);
        while !ready.is_empty() {
            let node = ready.remove(0);
            order.push(self.skills[node].name.clone());
            for &child in &self.children[node] {
                indegree[child] -= 1;
                if indegree[child] == 0 {
                    ready.push(child);
                    ready.sort_by(|&a, &b| compare_skills(&self.skills[a], &self.skills[b]));
                }
            }
        }

        (order.len() == n).then_some(order)
    }

    /// Transitive closure of providers needed to satisfy the seed
    /// capabilities, walked via BFS on `requires`. The subgraph preserves
    /// the input order of the surviving skills.
    #[must_use]
    pub fn subgraph(&self, capabilities: &[String]) -> Self {
        let mut included = vec![false; self.skills.len()];
        let mut queue: VecDeque<String> = capabilities.iter().cloned().collect();

        while let Some(cap) = queue.pop_front() {
            let Some(ids) = self.providers.get(&cap) else {
                continue;
            };
            for &id in ids {
                if included[id] {
                    continue;
                }
                included[id] = true;
                for req in &self.skills[id].requires {
                    queue.push_back(req.clone());
                }
            }
        }

        let subset: Vec<Skill> = self
            .skills
            .iter()
            .enumerate()
            .filter(|(i, _)| included[*i])
            .map(|(_, s)| s.clone())
            .collect();
        Self::new(&subset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Cost, Risk};
    use crate::test_utils::skill;

    fn named(name: &str, provides: &[&str], requires: &[&str]) -> Skill {
        let mut s = skill(name, provides);
        s.requires = requires.iter().map(|&r| r.to_string()).collect();
        s
    }

    #[test]
    fn edges_follow_provides_requires() {
        let skills = vec![
            named("a", &["x"], &[]),
            named("b", &[], &["x"]),
            named("c", &[], &["x"]),
        ];
        let graph = CapabilityGraph::new(&skills);

        assert_eq!(graph.edges().len(), 2);
        assert_eq!(graph.edges()[0].capability, "x");
        let dependents: Vec<&str> = graph.dependents("a").iter().map(|s| s.name.as_str()).collect();
        assert_eq!(dependents, vec!["b", "c"]);
        let deps: Vec<&str> = graph.dependencies("b").iter().map(|s| s.name.as_str()).collect();
        assert_eq!(deps, vec!["a"]);
    }

    #[test]
    fn self_provision_creates_no_edge() {
        // A skill both providing and requiring the same capability must not
        // depend on itself.
        let skills = vec![named("a", &["x"], &["x"])];
        let graph = CapabilityGraph::new(&skills);
        assert!(graph.edges().is_empty());
        assert!(!graph.detect_cycle().has_cycle);
    }

    #[test]
    fn providers_preserve_insertion_order() {
        let skills = vec![named("zebra", &["a"], &[]), named("alpha", &["a"], &[])];
        let graph = CapabilityGraph::new(&skills);
        let providers: Vec<&str> = graph.providers("a").iter().map(|s| s.name.as_str()).collect();
        assert_eq!(providers, vec!["zebra", "alpha"]);
    }

    #[test]
    fn detects_two_node_cycle() {
        let skills = vec![named("a", &["x"], &["y"]), named("b", &["y"], &["x"])];
        let graph = CapabilityGraph::new(&skills);
        let detection = graph.detect_cycle();
        assert!(detection.has_cycle);
        assert_eq!(detection.cycle, vec!["a", "b", "a"]);
        assert!(graph.topological_sort().is_none());
    }

    #[test]
    fn topological_sort_orders_dependencies_first() {
        let skills = vec![
            named("deploy", &["deployed"], &["built", "tested"]),
            named("build", &["built"], &[]),
            named("test", &["tested"], &["built"]),
        ];
        let graph = CapabilityGraph::new(&skills);
        let order = graph.topological_sort().unwrap();
        assert_eq!(order, vec!["build", "test", "deploy"]);
    }

    #[test]
    fn topological_sort_breaks_ties_by_risk_cost_name() {
        let mut low = named("m-low", &[], &[]);
        low.risk = Risk::Low;
        let mut cheap = named("z-cheap", &[], &[]);
        cheap.risk = Risk::Low;
        cheap.cost = Cost::Low;
        let mut high = named("a-high", &[], &[]);
        high.risk = Risk::High;

        let graph = CapabilityGraph::new(&[high, low, cheap]);
        let order = graph.topological_sort().unwrap();
        // low risk first; within low risk, low cost; name last.
        assert_eq!(order, vec!["z-cheap", "m-low", "a-high"]);
    }

    #[test]
    fn subgraph_walks_transitive_requires() {
        let skills = vec![
            named("a", &["x"], &["y"]),
            named("b", &["y"], &[]),
            named("c", &["z"], &[]),
        ];
        let graph = CapabilityGraph::new(&skills);
        let sub = graph.subgraph(&["x".to_string()]);
        let names: Vec<&str> = sub.skills().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn subgraph_of_unknown_capability_is_empty() {
        let graph = CapabilityGraph::new(&[named("a", &["x"], &[])]);
        assert!(graph.subgraph(&["ghost".to_string()]).skills().is_empty());
    }
}
