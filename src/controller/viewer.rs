use tracing::{info, warn};

use crate::{
    controller::{
        engine::TopologyEngine,
        selection::{SelectionAction, SelectionState},
    },
    network::element::ElementId,
};

/// Result of the last completed pick-pair cycle, shown in the side panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathReport {
    Found {
        start: ElementId,
        end: ElementId,
        elements: Vec<ElementId>,
    },
    NotFound {
        start: ElementId,
        end: ElementId,
    },
}

impl PathReport {
    pub fn endpoints(&self) -> (&ElementId, &ElementId) {
        match self {
            PathReport::Found { start, end, .. } | PathReport::NotFound { start, end } => {
                (start, end)
            }
        }
    }

    /// Number of edges on the path.
    pub fn hops(&self) -> Option<usize> {
        match self {
            PathReport::Found { elements, .. } => Some(elements.len() / 2),
            PathReport::NotFound { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    UnknownNode,
    Ignored,
    StartSelected,
    PathHighlighted,
    NoPath,
}

/// Owns the selection state and turns node clicks into highlight changes on an engine.
#[derive(Debug, Default)]
pub struct TopologyController {
    selection: SelectionState,
    last_path: Option<PathReport>,
}

impl TopologyController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn last_path(&self) -> Option<&PathReport> {
        self.last_path.as_ref()
    }

    pub fn handle_click<E>(&mut self, engine: &mut E, id: &ElementId) -> ClickOutcome
    where
        E: TopologyEngine + ?Sized,
    {
        let Some(node) = engine.node(id).cloned() else {
            warn!(id = %id, "Click on an unknown node");
            return ClickOutcome::UnknownNode;
        };

        let (next, action) = std::mem::take(&mut self.selection).on_click(&node);
        self.selection = next;

        match action {
            SelectionAction::Ignore => {
                info!(id = %id, role = %node.role, "Node selection prevented");
                ClickOutcome::Ignored
            }
            SelectionAction::PickStart(start) => {
                engine.clear_highlighted();
                engine.mark_highlighted(&start);
                info!(id = %start, "Start node selected");
                ClickOutcome::StartSelected
            }
            SelectionAction::PickPair { start, end } => {
                engine.mark_highlighted(&end);
                info!(id = %end, "End node selected");
                self.highlight_path(engine, start, end)
            }
        }
    }

    /// Removes every highlight. A selection in progress is kept.
    pub fn clear<E>(&mut self, engine: &mut E)
    where
        E: TopologyEngine + ?Sized,
    {
        engine.clear_highlighted();
    }

    fn highlight_path<E>(&mut self, engine: &mut E, start: ElementId, end: ElementId) -> ClickOutcome
    where
        E: TopologyEngine + ?Sized,
    {
        match engine.shortest_path(&start, &end) {
            Some(elements) => {
                info!(
                    from = %start,
                    to = %end,
                    path = ?elements.iter().map(ElementId::as_str).collect::<Vec<_>>(),
                    "Path found"
                );
                for id in &elements {
                    engine.mark_highlighted(id);
                }
                self.last_path = Some(PathReport::Found {
                    start,
                    end,
                    elements,
                });
                ClickOutcome::PathHighlighted
            }
            None => {
                info!(from = %start, to = %end, "No path found");
                self.last_path = Some(PathReport::NotFound { start, end });
                ClickOutcome::NoPath
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use proptest::prelude::*;

    use super::*;
    use crate::network::{
        edge::Edge,
        element::Elements,
        node::Node,
        topology::Topology,
    };

    fn three_hop() -> Topology {
        let json = include_str!("../../test_data/three_hop.json");
        Topology::build(Elements::from_json(json).unwrap())
    }

    fn marked(topology: &Topology) -> HashSet<&str> {
        topology.marked().map(ElementId::as_str).collect()
    }

    #[test]
    fn two_clicks_highlight_the_whole_path() {
        let mut topology = three_hop();
        let mut controller = TopologyController::new();

        assert_eq!(
            controller.handle_click(&mut topology, &"R1".into()),
            ClickOutcome::StartSelected
        );
        assert_eq!(marked(&topology), HashSet::from(["R1"]));

        assert_eq!(
            controller.handle_click(&mut topology, &"Net1".into()),
            ClickOutcome::PathHighlighted
        );
        assert_eq!(
            marked(&topology),
            HashSet::from(["R1", "e1", "S1", "e2", "Net1"])
        );
        assert_eq!(controller.selection(), &SelectionState::Empty);
        assert_eq!(controller.last_path().and_then(PathReport::hops), Some(2));
    }

    #[test]
    fn no_path_keeps_only_the_endpoints() {
        let elements = Elements::new(
            vec![
                Node::new("A", "Router"),
                Node::new("B", "Router"),
                Node::new("C", "subnet"),
            ],
            vec![Edge::new("ac", "A", "C")],
        );
        let mut topology = Topology::build(elements);
        let mut controller = TopologyController::new();

        controller.handle_click(&mut topology, &"A".into());
        let outcome = controller.handle_click(&mut topology, &"B".into());

        assert_eq!(outcome, ClickOutcome::NoPath);
        assert_eq!(marked(&topology), HashSet::from(["A", "B"]));
        assert_eq!(controller.selection(), &SelectionState::Empty);
        assert_eq!(
            controller.last_path(),
            Some(&PathReport::NotFound {
                start: "A".into(),
                end: "B".into()
            })
        );
    }

    #[test]
    fn grouping_node_does_not_bridge_a_path() {
        let elements = Elements::new(
            vec![
                Node::new("A", "Router"),
                Node::new("T", "tenant"),
                Node::new("B", "Router"),
            ],
            vec![Edge::new("a-t", "A", "T"), Edge::new("t-b", "T", "B")],
        );
        let mut topology = Topology::build(elements);
        let mut controller = TopologyController::new();

        controller.handle_click(&mut topology, &"A".into());
        let outcome = controller.handle_click(&mut topology, &"B".into());

        assert_eq!(outcome, ClickOutcome::NoPath);
        assert_eq!(marked(&topology), HashSet::from(["A", "B"]));
    }

    #[test]
    fn a_new_cycle_clears_the_previous_path() {
        let mut topology = three_hop();
        let mut controller = TopologyController::new();

        controller.handle_click(&mut topology, &"R1".into());
        controller.handle_click(&mut topology, &"Net1".into());
        controller.handle_click(&mut topology, &"S1".into());

        assert_eq!(marked(&topology), HashSet::from(["S1"]));
        assert_eq!(controller.selection(), &SelectionState::HasStart("S1".into()));
    }

    #[test]
    fn clear_keeps_selection_in_progress() {
        let mut topology = three_hop();
        let mut controller = TopologyController::new();

        controller.handle_click(&mut topology, &"R1".into());
        controller.clear(&mut topology);
        assert!(marked(&topology).is_empty());
        assert_eq!(controller.selection(), &SelectionState::HasStart("R1".into()));

        controller.handle_click(&mut topology, &"S1".into());
        assert_eq!(marked(&topology), HashSet::from(["R1", "e1", "S1"]));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut topology = three_hop();
        let mut controller = TopologyController::new();
        controller.handle_click(&mut topology, &"R1".into());
        controller.handle_click(&mut topology, &"Net1".into());

        controller.clear(&mut topology);
        let once = marked(&topology).len();
        controller.clear(&mut topology);
        assert_eq!(once, 0);
        assert!(marked(&topology).is_empty());
    }

    #[test]
    fn unknown_node_is_ignored() {
        let mut topology = three_hop();
        let mut controller = TopologyController::new();
        controller.handle_click(&mut topology, &"R1".into());

        assert_eq!(
            controller.handle_click(&mut topology, &"ghost".into()),
            ClickOutcome::UnknownNode
        );
        assert_eq!(controller.selection(), &SelectionState::HasStart("R1".into()));
    }

    const ROLES: [&str; 5] = ["Router", "Access Switch", "subnet", "vrf", "tenant"];

    fn arb_elements() -> impl Strategy<Value = Elements> {
        (2usize..10)
            .prop_flat_map(|n| {
                (
                    proptest::collection::vec(0usize..ROLES.len(), n),
                    proptest::collection::vec((0..n, 0..n), 0..n * 2),
                )
            })
            .prop_map(|(roles, links)| {
                let nodes = roles
                    .iter()
                    .enumerate()
                    .map(|(i, &r)| Node::new(format!("n{i}"), ROLES[r]))
                    .collect();
                let edges = links
                    .iter()
                    .enumerate()
                    .map(|(i, &(s, t))| Edge::new(format!("e{i}"), format!("n{s}"), format!("n{t}")))
                    .collect();
                Elements::new(nodes, edges)
            })
    }

    fn hop_distance(topology: &Topology, from: &ElementId, to: &ElementId) -> Option<usize> {
        let mut seen = HashSet::from([from.clone()]);
        let mut queue = VecDeque::from([(from.clone(), 0usize)]);
        while let Some((node, distance)) = queue.pop_front() {
            if &node == to {
                return Some(distance);
            }
            for edge in topology.edges() {
                let touches_group = [&edge.source, &edge.target]
                    .into_iter()
                    .any(|end| topology.node(end).is_some_and(Node::is_grouping));
                if touches_group {
                    continue;
                }
                let next = if edge.source == node {
                    &edge.target
                } else if edge.target == node {
                    &edge.source
                } else {
                    continue;
                };
                if seen.insert(next.clone()) {
                    queue.push_back((next.clone(), distance + 1));
                }
            }
        }
        None
    }

    proptest! {
        #[test]
        fn grouping_clicks_change_nothing(elements in arb_elements(), picks in proptest::collection::vec(0usize..10, 1..8)) {
            let mut topology = Topology::build(elements);
            let mut controller = TopologyController::new();
            let ids: Vec<ElementId> = topology.nodes().iter().map(|n| n.id.clone()).collect();

            for pick in picks {
                let id = &ids[pick % ids.len()];
                let grouping = topology.node(id).unwrap().is_grouping();
                let before_state = controller.selection().clone();
                let before_marks: HashSet<ElementId> = topology.marked().cloned().collect();

                controller.handle_click(&mut topology, id);

                if grouping {
                    prop_assert_eq!(controller.selection(), &before_state);
                    let after: HashSet<ElementId> = topology.marked().cloned().collect();
                    prop_assert_eq!(after, before_marks);
                    prop_assert!(!topology.is_marked(id));
                }
            }
        }

        #[test]
        fn pair_highlights_a_shortest_path(elements in arb_elements(), a in 0usize..10, b in 0usize..10) {
            let mut topology = Topology::build(elements);
            let addressable: Vec<ElementId> = topology
                .nodes()
                .iter()
                .filter(|n| !n.is_grouping())
                .map(|n| n.id.clone())
                .collect();
            prop_assume!(!addressable.is_empty());
            let start = addressable[a % addressable.len()].clone();
            let end = addressable[b % addressable.len()].clone();

            let mut controller = TopologyController::new();
            controller.handle_click(&mut topology, &start);
            controller.handle_click(&mut topology, &end);
            prop_assert_eq!(controller.selection(), &SelectionState::Empty);

            let marks: HashSet<ElementId> = topology.marked().cloned().collect();
            match hop_distance(&topology, &start, &end) {
                Some(distance) => {
                    let Some(PathReport::Found { elements, .. }) = controller.last_path() else {
                        return Err(TestCaseError::fail("expected a path"));
                    };
                    prop_assert_eq!(elements.len(), distance * 2 + 1);
                    prop_assert_eq!(elements.first(), Some(&start));
                    prop_assert_eq!(elements.last(), Some(&end));
                    for step in elements.chunks(2).zip(elements.iter().skip(2).step_by(2)) {
                        let (pair, next) = step;
                        let edge = topology.edge(&pair[1]).unwrap();
                        let joins = (edge.source == pair[0] && &edge.target == next)
                            || (&edge.source == next && edge.target == pair[0]);
                        prop_assert!(joins);
                    }
                    let expected: HashSet<ElementId> = elements.iter().cloned().collect();
                    prop_assert_eq!(marks, expected);
                }
                None => {
                    prop_assert_eq!(marks, HashSet::from([start, end]));
                }
            }
        }
    }
}
