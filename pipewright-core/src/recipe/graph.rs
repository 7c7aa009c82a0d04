//! Component dependency graph.

use super::definition::Recipe;
use super::reference::ReferenceParser;
use crate::error::{PipewrightError, Result};
use indexmap::IndexSet;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A dependency edge: `dependent` reads the output of `dependency`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Component whose output is read.
    pub dependency: usize,
    /// Component reading it.
    pub dependent: usize,
}

/// Components of a recipe and the reference edges between them.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: IndexSet<String>,
    edges: IndexSet<Edge>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph of a recipe from the references in each component's
    /// input, setup and condition.
    pub fn from_recipe(recipe: &Recipe) -> Result<Self> {
        let mut graph = Self::new();
        for id in recipe.component.keys() {
            graph.add_node(id);
        }

        for (id, component) in &recipe.component {
            let mut references = ReferenceParser::collect(&component.input)?;
            if let Some(setup) = &component.setup {
                references.extend(ReferenceParser::collect(setup)?);
            }
            if let Some(condition) = &component.condition {
                references.extend(ReferenceParser::parse_all(condition)?);
            }

            for reference in references {
                if recipe.component.contains_key(&reference.root) {
                    graph.add_edge(&reference.root, id);
                }
            }
        }

        Ok(graph)
    }

    /// Add a component.
    pub fn add_node(&mut self, id: impl Into<String>) {
        self.nodes.insert(id.into());
    }

    /// Record that `dependent` reads from `dependency`. Unknown ids are ignored.
    pub fn add_edge(&mut self, dependency: &str, dependent: &str) {
        if let (Some(from), Some(to)) = (
            self.nodes.get_index_of(dependency),
            self.nodes.get_index_of(dependent),
        ) {
            self.edges.insert(Edge {
                dependency: from,
                dependent: to,
            });
        }
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no components.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Components `id` reads from.
    pub fn dependencies(&self, id: &str) -> Vec<&str> {
        let Some(index) = self.nodes.get_index_of(id) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .filter(|e| e.dependent == index)
            .filter_map(|e| self.nodes.get_index(e.dependency).map(String::as_str))
            .collect()
    }

    /// Components reading from `id`.
    pub fn dependents(&self, id: &str) -> Vec<&str> {
        let Some(index) = self.nodes.get_index_of(id) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .filter(|e| e.dependency == index)
            .filter_map(|e| self.nodes.get_index(e.dependent).map(String::as_str))
            .collect()
    }

    /// Perform topological sort using Kahn's algorithm.
    ///
    /// Among ready components, declaration order wins. Returns
    /// [`PipewrightError::DependencyCycle`] naming the components left over.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        let mut in_degree = vec![0usize; self.nodes.len()];
        for edge in &self.edges {
            in_degree[edge.dependent] += 1;
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse(index)) = ready.pop() {
            sorted.push(index);
            for edge in self.edges.iter().filter(|e| e.dependency == index) {
                in_degree[edge.dependent] -= 1;
                if in_degree[edge.dependent] == 0 {
                    ready.push(Reverse(edge.dependent));
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            let components = (0..self.nodes.len())
                .filter(|i| !sorted.contains(i))
                .filter_map(|i| self.nodes.get_index(i).cloned())
                .collect();
            return Err(PipewrightError::DependencyCycle { components });
        }

        Ok(sorted
            .into_iter()
            .filter_map(|i| self.nodes.get_index(i).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipe(components: serde_json::Value) -> Recipe {
        Recipe::from_json(json!({ "component": components })).unwrap()
    }

    #[test]
    fn linear_graph_topo_sort() {
        let r = recipe(json!({
            "c": { "type": "json", "task": "TASK_JQ", "input": { "json-value": "${b.output.string}" } },
            "b": { "type": "json", "task": "TASK_MARSHAL", "input": { "json": "${a.output.json}" } },
            "a": { "type": "json", "task": "TASK_UNMARSHAL", "input": { "string": "${variable.s}" } }
        }));
        let graph = DependencyGraph::from_recipe(&r).unwrap();
        assert_eq!(graph.topological_sort().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(graph.dependencies("b"), vec!["a"]);
        assert_eq!(graph.dependents("b"), vec!["c"]);
    }

    #[test]
    fn independent_components_keep_declaration_order() {
        let r = recipe(json!({
            "second": { "type": "base64", "task": "TASK_ENCODE", "input": {} },
            "first": { "type": "base64", "task": "TASK_ENCODE", "input": {} }
        }));
        let graph = DependencyGraph::from_recipe(&r).unwrap();
        assert_eq!(graph.topological_sort().unwrap(), vec!["second", "first"]);
    }

    #[test]
    fn diamond_graph_topo_sort() {
        let mut graph = DependencyGraph::new();
        for id in ["top", "left", "right", "bottom"] {
            graph.add_node(id);
        }
        graph.add_edge("top", "left");
        graph.add_edge("top", "right");
        graph.add_edge("left", "bottom");
        graph.add_edge("right", "bottom");

        let sorted = graph.topological_sort().unwrap();
        assert_eq!(sorted.first().map(String::as_str), Some("top"));
        assert_eq!(sorted.last().map(String::as_str), Some("bottom"));
    }

    #[test]
    fn cycle_detected() {
        let r = recipe(json!({
            "a": { "type": "json", "task": "TASK_JQ", "input": { "x": "${b.output.y}" } },
            "b": { "type": "json", "task": "TASK_JQ", "input": { "x": "${a.output.y}" } },
            "c": { "type": "json", "task": "TASK_JQ", "input": {} }
        }));
        let graph = DependencyGraph::from_recipe(&r).unwrap();
        match graph.topological_sort() {
            Err(PipewrightError::DependencyCycle { components }) => {
                assert_eq!(components, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let r = recipe(json!({
            "a": { "type": "json", "task": "TASK_JQ", "input": { "x": "${a.output.y}" } }
        }));
        let graph = DependencyGraph::from_recipe(&r).unwrap();
        assert!(graph.topological_sort().is_err());
    }
}
