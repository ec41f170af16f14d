/*!
Frames for grouping nodes (vrf, tenant).

Grouping nodes are not laid out themselves. Their frame is the union of their members'
bounds, nested groups included, grown by a padding. The GUI feeds screen rectangles and the
exporter feeds canvas rectangles into the same computation.
*/

use std::collections::{HashMap, HashSet};

use crate::network::{element::ElementId, topology::Topology};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn from_center(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min_x: x - width / 2.0,
            min_y: y - height / 2.0,
            max_x: x + width / 2.0,
            max_y: y + height / 2.0,
        }
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn expand(&self, side: f32, top: f32) -> Bounds {
        Bounds {
            min_x: self.min_x - side,
            min_y: self.min_y - side - top,
            max_x: self.max_x + side,
            max_y: self.max_y + side,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupFrame {
    pub id: ElementId,
    pub bounds: Bounds,
    /// Number of enclosing groups.
    pub depth: usize,
}

/// Compute frames for every grouping node that has at least one visible member.
///
/// `member_bounds` holds the bounds of laid-out (non-grouping) nodes. The result is ordered
/// outermost first, which is also the painting order.
pub fn group_frames(
    topology: &Topology,
    member_bounds: &HashMap<ElementId, Bounds>,
    padding: f32,
    label_space: f32,
) -> Vec<GroupFrame> {
    let mut children: HashMap<&ElementId, Vec<&ElementId>> = HashMap::new();
    for node in topology.nodes() {
        if let Some(parent) = &node.parent {
            children.entry(parent).or_default().push(&node.id);
        }
    }

    let mut resolved: HashMap<ElementId, Option<Bounds>> = HashMap::new();
    let mut frames = Vec::new();
    for node in topology.nodes().iter().filter(|n| n.is_grouping()) {
        let mut visiting = HashSet::new();
        let bounds = resolve(
            &node.id,
            &children,
            member_bounds,
            padding,
            label_space,
            &mut resolved,
            &mut visiting,
        );
        if let Some(bounds) = bounds {
            frames.push(GroupFrame {
                id: node.id.clone(),
                bounds,
                depth: depth_of(topology, &node.id),
            });
        }
    }

    frames.sort_by_key(|frame| frame.depth);
    frames
}

fn resolve(
    group: &ElementId,
    children: &HashMap<&ElementId, Vec<&ElementId>>,
    member_bounds: &HashMap<ElementId, Bounds>,
    padding: f32,
    label_space: f32,
    resolved: &mut HashMap<ElementId, Option<Bounds>>,
    visiting: &mut HashSet<ElementId>,
) -> Option<Bounds> {
    if let Some(done) = resolved.get(group) {
        return *done;
    }
    if !visiting.insert(group.clone()) {
        // parent cycle
        return None;
    }

    let mut union: Option<Bounds> = None;
    for child in children.get(group).into_iter().flatten() {
        let child_bounds = match member_bounds.get(*child) {
            Some(bounds) => Some(*bounds),
            None => resolve(
                child,
                children,
                member_bounds,
                padding,
                label_space,
                resolved,
                visiting,
            ),
        };
        if let Some(b) = child_bounds {
            union = Some(union.map_or(b, |u| u.union(&b)));
        }
    }

    let frame = union.map(|u| u.expand(padding, label_space));
    resolved.insert(group.clone(), frame);
    frame
}

fn depth_of(topology: &Topology, id: &ElementId) -> usize {
    let mut depth = 0;
    let mut seen = HashSet::from([id.clone()]);
    let mut current = topology.node(id).and_then(|n| n.parent.clone());
    while let Some(parent) = current {
        if !seen.insert(parent.clone()) {
            break;
        }
        depth += 1;
        current = topology.node(&parent).and_then(|n| n.parent.clone());
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{element::Elements, node::Node};

    fn nested() -> Topology {
        Topology::build(Elements::new(
            vec![
                Node::new("acme", "tenant"),
                Node::new("blue", "vrf").with_parent("acme"),
                Node::new("R1", "Router").with_parent("acme"),
                Node::new("10.0.0.0/24 blue", "subnet").with_parent("blue"),
                Node::new("empty", "vrf"),
            ],
            vec![],
        ))
    }

    #[test]
    fn nested_frames_enclose_inner_frames() {
        let topology = nested();
        let members = HashMap::from([
            ("R1".into(), Bounds::from_center(0.0, 0.0, 10.0, 10.0)),
            (
                "10.0.0.0/24 blue".into(),
                Bounds::from_center(100.0, 0.0, 20.0, 10.0),
            ),
        ]);

        let frames = group_frames(&topology, &members, 5.0, 0.0);
        let ids: Vec<_> = frames.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["acme", "blue"]);

        let acme = &frames[0];
        let blue = &frames[1];
        assert_eq!(acme.depth, 0);
        assert_eq!(blue.depth, 1);
        assert_eq!(blue.bounds, Bounds::from_center(100.0, 0.0, 30.0, 20.0));
        assert_eq!(acme.bounds.min_x, -10.0);
        assert_eq!(acme.bounds.max_x, blue.bounds.max_x + 5.0);
    }

    #[test]
    fn label_space_grows_the_top_only() {
        let topology = nested();
        let members = HashMap::from([("R1".into(), Bounds::from_center(0.0, 0.0, 10.0, 10.0))]);
        let frames = group_frames(&topology, &members, 2.0, 8.0);
        let acme = frames.iter().find(|f| f.id.as_str() == "acme").unwrap();
        assert_eq!(acme.bounds.min_y, -15.0);
        assert_eq!(acme.bounds.max_y, 7.0);
    }

    #[test]
    fn groups_without_members_have_no_frame() {
        let frames = group_frames(&nested(), &HashMap::new(), 5.0, 0.0);
        assert!(frames.is_empty());
    }
}
