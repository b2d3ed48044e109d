//! State diagram export.
//!
//! A registry already knows every `(from, via, to)` triple, so the diagram
//! is derived from it rather than maintained by hand.

use crate::core::{State, Tag, Transition};
use crate::registry::Registry;
use serde::Serialize;

/// One arrow of a state diagram.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagramEdge {
    pub from: &'static str,
    pub to: &'static str,
    pub via: &'static str,
}

/// States and transitions of a registry, ready for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StateDiagram {
    nodes: Vec<&'static str>,
    edges: Vec<DiagramEdge>,
}

impl StateDiagram {
    /// State names in order of first appearance.
    pub fn nodes(&self) -> &[&'static str] {
        &self.nodes
    }

    /// Edges in registration order.
    pub fn edges(&self) -> &[DiagramEdge] {
        &self.edges
    }

    /// States no transition leads into.
    pub fn entries(&self) -> Vec<&'static str> {
        self.nodes
            .iter()
            .copied()
            .filter(|node| !self.edges.iter().any(|edge| edge.to == *node))
            .collect()
    }

    /// States no transition leaves.
    pub fn exits(&self) -> Vec<&'static str> {
        self.nodes
            .iter()
            .copied()
            .filter(|node| !self.edges.iter().any(|edge| edge.from == *node))
            .collect()
    }

    /// PlantUML state diagram.
    pub fn to_puml(&self) -> String {
        let entries = self
            .entries()
            .into_iter()
            .map(|entry| format!("  [*] --> {entry}\n"));
        let edges = self
            .edges
            .iter()
            .map(|edge| format!("  {} --> {} : {}\n", edge.from, edge.to, edge.via));
        let exits = self
            .exits()
            .into_iter()
            .map(|exit| format!("  {exit} --> [*]\n"));

        let body: String = entries.chain(edges).chain(exits).collect();
        format!("@startuml\n{body}@enduml\n")
    }

    /// Graphviz digraph.
    pub fn to_dot(&self) -> String {
        let nodes = self.nodes.iter().map(|node| format!("  \"{node}\";\n"));
        let edges = self.edges.iter().map(|edge| {
            format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                edge.from, edge.to, edge.via
            )
        });

        let body: String = nodes.chain(edges).collect();
        format!("digraph states {{\n{body}}}\n")
    }
}

impl<S: State, T: Transition> Registry<S, T> {
    /// Diagram of every registered transition.
    pub fn diagram(&self) -> StateDiagram {
        let mut nodes: Vec<&'static str> = Vec::new();
        let mut edges = Vec::with_capacity(self.entries().len());

        for entry in self.entries() {
            let edge = DiagramEdge {
                from: entry.from.name(),
                to: entry.to.name(),
                via: entry.via.name(),
            };
            for node in [edge.from, edge.to] {
                if !nodes.contains(&node) {
                    nodes.push(node);
                }
            }
            edges.push(edge);
        }

        StateDiagram { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::Registry;
    use crate::{state_enum, transition_enum};
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Draft;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Review;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Published;

    state_enum! {
        enum Article: ArticleKind {
            Draft(Draft),
            Review(Review),
            Published(Published),
        }
    }

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Submit;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Reject;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Approve;

    transition_enum! {
        enum Editorial: EditorialKind {
            Submit(Submit),
            Reject(Reject),
            Approve(Approve),
        }
    }

    fn registry() -> Registry<Article, Editorial> {
        Registry::builder()
            .on(|_: &Draft, _: &Submit| Review)
            .on(|_: &Review, _: &Reject| Draft)
            .on(|_: &Review, _: &Approve| Published)
            .build()
            .unwrap()
    }

    #[test]
    fn cycles_have_no_entry() {
        let diagram = registry().diagram();

        assert_eq!(diagram.nodes(), &["Draft", "Review", "Published"]);
        assert!(diagram.entries().is_empty());
        assert_eq!(diagram.exits(), vec!["Published"]);
    }

    #[test]
    fn renders_plantuml() {
        assert_eq!(
            registry().diagram().to_puml(),
            "@startuml\n  \
             Draft --> Review : Submit\n  \
             Review --> Draft : Reject\n  \
             Review --> Published : Approve\n  \
             Published --> [*]\n\
             @enduml\n"
        );
    }

    #[test]
    fn renders_graphviz() {
        let dot = registry().diagram().to_dot();

        assert!(dot.starts_with("digraph states {\n"));
        assert!(dot.contains("  \"Review\" -> \"Published\" [label=\"Approve\"];\n"));
        assert!(dot.ends_with("}\n"));
    }
}
