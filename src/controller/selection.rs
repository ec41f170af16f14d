use crate::network::{element::ElementId, node::Node};

/// Two-click path selection.
///
/// `HasStartAndEnd` is never stored: picking the end node hands both endpoints to the caller
/// as a [`SelectionAction::PickPair`] and the state is back to `Empty` in the same step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Empty,
    HasStart(ElementId),
}

/// What the caller has to do after a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    /// Grouping node, nothing changes.
    Ignore,
    /// A new cycle starts at this node.
    PickStart(ElementId),
    /// Both endpoints are known; query and highlight the path between them.
    PickPair { start: ElementId, end: ElementId },
}

impl SelectionState {
    pub fn on_click(self, node: &Node) -> (SelectionState, SelectionAction) {
        if node.is_grouping() {
            return (self, SelectionAction::Ignore);
        }
        match self {
            SelectionState::Empty => (
                SelectionState::HasStart(node.id.clone()),
                SelectionAction::PickStart(node.id.clone()),
            ),
            SelectionState::HasStart(start) => (
                SelectionState::Empty,
                SelectionAction::PickPair {
                    start,
                    end: node.id.clone(),
                },
            ),
        }
    }

    pub fn start(&self) -> Option<&ElementId> {
        match self {
            SelectionState::Empty => None,
            SelectionState::HasStart(start) => Some(start),
        }
    }
}
