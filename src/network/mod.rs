/*
 * This module defines the element model shared by every topology source, the engine that
 * owns highlight state and answers path queries, and the egui projection used by the GUI.
 */

pub mod edge;
pub mod element;
pub mod groups;
pub mod network_graph;
pub mod node;
pub mod topology;
