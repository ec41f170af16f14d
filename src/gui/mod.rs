/*
 * egui front end: the app window, role-styled node and edge shapes for egui_graphs, the
 * vrf/tenant frame overlay and the icon texture cache.
 */

pub mod app;
pub mod edge_shape;
pub mod group_overlay;
pub mod icons;
pub mod node_shape;
