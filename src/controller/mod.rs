/*!
Controller module

Interactive logic around the topology engine, kept free of egui so it can be tested headless.

Structure:
- `engine`: the `TopologyEngine` trait the controller drives.
- `selection`: the two-click selection state machine.
- `viewer`: `TopologyController`, which applies selection actions to an engine.
- `intent`: the dispatch table for button intents (clear, export).
*/

pub mod engine;
pub mod intent;
pub mod selection;
pub mod viewer;

pub use intent::{ExportSettings, Intent, IntentContext, IntentTable};
pub use viewer::{PathReport, TopologyController};
