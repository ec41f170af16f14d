use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use eframe::egui;
use egui::{CentralPanel, CollapsingHeader, Context, SidePanel, Ui};
use egui_extras::{Column, TableBuilder};
use egui_graphs::{
    FruchtermanReingoldWithCenterGravity, FruchtermanReingoldWithCenterGravityState,
    LayoutForceDirected, SettingsInteraction, SettingsNavigation,
};
use petgraph::{Directed, csr::DefaultIx};
use tokio::{runtime::Runtime, sync::oneshot};
use tracing::{debug, error, info, warn};

use crate::{
    controller::{
        ExportSettings, Intent, IntentContext, IntentTable, PathReport, TopologyController,
        intent::IntentOutcome,
    },
    gui::{
        edge_shape::{NetworkGraphEdgeShape, set_edge_labels_enabled},
        group_overlay, icons,
        node_shape::NetworkGraphNodeShape,
    },
    network::{
        element::{ElementId, Elements},
        network_graph::{GraphEdge, GraphNode, NetworkGraph},
        topology::Topology,
    },
    topology::{SourceSpec, TopologyResult},
};

pub fn main(rt: Arc<Runtime>, source: SourceSpec, export: ExportSettings) -> eframe::Result {
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Network Topology",
        native_options,
        Box::new(|cc| {
            let app = App::new(cc, rt, source, export);
            Ok(Box::new(app) as Box<dyn eframe::App>)
        }),
    )
}

pub fn get_theme() -> catppuccin_egui::Theme {
    catppuccin_egui::MOCHA
}

type Layout = FruchtermanReingoldWithCenterGravity;
type LayoutState = FruchtermanReingoldWithCenterGravityState;

type Loaded = (TopologyResult<Elements>, Duration);

struct App {
    runtime: Arc<Runtime>,
    source_name: String,
    pending: Option<oneshot::Receiver<Loaded>>,
    load_time: Option<Duration>,

    graph: NetworkGraph,
    controller: TopologyController,
    intents: IntentTable,
    export: ExportSettings,
    last_outcome: Option<String>,

    layout_state: LayoutState,
    show_edge_labels: bool,
}

impl App {
    fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Arc<Runtime>,
        source: SourceSpec,
        export: ExportSettings,
    ) -> Self {
        catppuccin_egui::set_theme(&cc.egui_ctx, get_theme());
        icons::preload(&cc.egui_ctx);

        let mut app = Self {
            runtime,
            source_name: String::new(),
            pending: None,
            load_time: None,
            graph: NetworkGraph::default(),
            controller: TopologyController::new(),
            intents: IntentTable::default(),
            export,
            last_outcome: None,
            layout_state: LayoutState::default(),
            show_edge_labels: false,
        };
        app.start_fetch(&cc.egui_ctx, &source);
        app
    }

    /// Fetch once on the runtime; the result is picked up by `poll_fetch` on a later frame.
    fn start_fetch(&mut self, ctx: &Context, spec: &SourceSpec) {
        let source = match spec.build_source() {
            Ok(source) => source,
            Err(e) => {
                error!(error = %e, "Cannot set up topology source");
                return;
            }
        };
        self.source_name = source.describe();
        info!(source = %self.source_name, "Fetching topology");

        let (tx, rx) = oneshot::channel();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let started = Instant::now();
            let result = source.fetch_elements().await;
            let _ = tx.send((result, started.elapsed()));
            ctx.request_repaint();
        });
        self.pending = Some(rx);
    }

    fn poll_fetch(&mut self) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };
        let (result, elapsed) = match rx.try_recv() {
            Ok(loaded) => loaded,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                error!("Topology fetch task ended without a result");
                self.pending = None;
                return;
            }
        };
        self.pending = None;

        match result {
            Ok(elements) => {
                if elements.is_empty() {
                    warn!(source = %self.source_name, "Topology source returned no elements");
                }
                info!(
                    nodes = elements.nodes.len(),
                    edges = elements.edges.len(),
                    elapsed = %humantime::format_duration(elapsed),
                    "Topology loaded"
                );
                self.graph = NetworkGraph::build_new(Topology::build(elements));
                self.controller = TopologyController::new();
                self.load_time = Some(elapsed);
            }
            Err(e) => error!(source = %self.source_name, error = %e, "Error fetching topology"),
        }
    }

    fn handle_click(&mut self, id: &ElementId) {
        let outcome = self.controller.handle_click(&mut self.graph, id);
        debug!(id = %id, ?outcome, "Node click handled");
    }

    fn run_intent(&mut self, intent: Intent) {
        let mut ctx = IntentContext {
            engine: &mut self.graph,
            controller: &mut self.controller,
            settings: &self.export,
        };
        match self.intents.dispatch(intent, &mut ctx) {
            Ok(IntentOutcome::Cleared) => self.last_outcome = None,
            Ok(IntentOutcome::Exported(path)) => {
                self.last_outcome = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                error!(intent = ?intent, error = %e, "Action failed");
                self.last_outcome = Some(format!("{} failed", intent.label()));
            }
        }
    }

    fn render_side_panel(&mut self, ui: &mut Ui) {
        ui.heading("Topology");
        ui.label(self.source_name.as_str());
        ui.label(load_status(self.pending.is_some(), self.load_time));
        let topology = self.graph.topology();
        ui.label(format!(
            "{} nodes, {} edges",
            topology.nodes().len(),
            topology.edges().len()
        ));

        ui.separator();
        let mut requested = None;
        ui.horizontal_wrapped(|ui| {
            for intent in Intent::ALL {
                if ui.button(intent.label()).clicked() {
                    requested = Some(intent);
                }
            }
        });
        if let Some(intent) = requested {
            info!(intent = ?intent, "Button pressed");
            self.run_intent(intent);
        }
        if let Some(outcome) = &self.last_outcome {
            ui.label(outcome.as_str());
        }

        ui.separator();
        match self.controller.selection().start() {
            Some(start) => ui.label(format!("Start: {start}. Click the end node.")),
            None => ui.label("Click a node to start a path."),
        };
        self.render_path(ui);

        ui.separator();
        if ui.checkbox(&mut self.show_edge_labels, "Edge labels").changed() {
            set_edge_labels_enabled(self.show_edge_labels);
        }

        CollapsingHeader::new("Forces").default_open(false).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.add(egui::Slider::new(&mut self.layout_state.base.k_scale, 0.2..=3.0).text("k_scale"));
                info_icon(ui, "Scale ideal edge length k; >1 spreads the layout, <1 compacts it.");
            });
            ui.horizontal(|ui| {
                ui.add(egui::Slider::new(&mut self.layout_state.base.c_attract, 0.1..=3.0).text("c_attract"));
                info_icon(ui, "Multiplier for attractive force along edges.");
            });
            ui.horizontal(|ui| {
                ui.add(egui::Slider::new(&mut self.layout_state.base.c_repulse, 0.1..=3.0).text("c_repulse"));
                info_icon(ui, "Multiplier for repulsive force between nodes.");
            });
            ui.horizontal(|ui| {
                ui.checkbox(&mut self.layout_state.extras.0.enabled, "center_gravity");
                info_icon(ui, "Enable/disable center gravity force.");
            });
            ui.add_enabled_ui(self.layout_state.extras.0.enabled, |ui| {
                ui.add(egui::Slider::new(&mut self.layout_state.extras.0.params.c, 0.0..=2.0).text("center_strength"));
            });
        });
    }

    fn render_path(&self, ui: &mut Ui) {
        let Some(report) = self.controller.last_path() else {
            return;
        };
        let (start, end) = report.endpoints();
        let PathReport::Found { elements, .. } = report else {
            ui.label(format!("No path between {start} and {end}"));
            return;
        };
        ui.label(format!(
            "{start} to {end}: {} hops",
            report.hops().unwrap_or_default()
        ));

        let topology = self.graph.topology();
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(24.0))
            .column(Column::auto().at_least(50.0))
            .column(Column::remainder())
            .max_scroll_height(240.0)
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                header.col(|ui| {
                    ui.strong("Kind");
                });
                header.col(|ui| {
                    ui.strong("Element");
                });
            })
            .body(|mut body| {
                for (i, id) in elements.iter().enumerate() {
                    let (kind, detail) = match (topology.node(id), topology.edge(id)) {
                        (Some(node), _) => (node.role.as_str(), node.label.as_deref()),
                        (None, Some(edge)) => ("link", edge.label.as_deref()),
                        (None, None) => ("", None),
                    };
                    body.row(20.0, |mut row| {
                        row.col(|ui| {
                            ui.label((i + 1).to_string());
                        });
                        row.col(|ui| {
                            ui.label(kind);
                        });
                        row.col(|ui| {
                            let label = ui.label(id.as_str());
                            if let Some(detail) = detail {
                                label.on_hover_text(detail);
                            }
                        });
                    });
                }
            });
    }

    fn render_graph(&mut self, ui: &mut Ui) {
        egui_graphs::set_layout_state(ui, self.layout_state.clone(), None);
        group_overlay::clear_member_rects();

        let response = {
            let widget = &mut egui_graphs::GraphView::<
                GraphNode,
                GraphEdge,
                Directed,
                DefaultIx,
                NetworkGraphNodeShape,
                NetworkGraphEdgeShape,
                LayoutState,
                LayoutForceDirected<Layout>,
            >::new(&mut self.graph.graph)
            .with_navigations(
                &SettingsNavigation::default()
                    .with_zoom_and_pan_enabled(true)
                    .with_fit_to_screen_enabled(false),
            )
            .with_interactions(
                &SettingsInteraction::default()
                    .with_dragging_enabled(true)
                    .with_node_clicking_enabled(true),
            );
            ui.add(widget)
        };
        self.layout_state = egui_graphs::get_layout_state::<LayoutState>(ui, None);

        let frames = group_overlay::collect_frames(self.graph.topology());
        group_overlay::paint_frames(ui.painter(), self.graph.topology(), &frames);

        let click = ui.input(|i| {
            if i.pointer.primary_clicked() {
                i.pointer.interact_pos()
            } else {
                None
            }
        });
        let Some(pos) = click.filter(|pos| response.rect.contains(*pos)) else {
            return;
        };
        let target = self
            .graph
            .hovered_id()
            .or_else(|| group_overlay::frame_at(&frames, pos).cloned());
        if let Some(id) = target {
            self.handle_click(&id);
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        self.poll_fetch();
        SidePanel::right("right_panel")
            .min_width(220.0)
            .show(ctx, |ui| self.render_side_panel(ui));
        CentralPanel::default().show(ctx, |ui| self.render_graph(ui));
    }
}

/// Status line under the source name. Plain text, no progress widget while the fetch runs.
fn load_status(loading: bool, load_time: Option<Duration>) -> String {
    match (loading, load_time) {
        (true, _) => "Loading topology".to_string(),
        (false, Some(elapsed)) => {
            let elapsed = Duration::from_millis(elapsed.as_millis() as u64);
            format!("Loaded in {}", humantime::format_duration(elapsed))
        }
        (false, None) => "No topology loaded".to_string(),
    }
}

fn info_icon(ui: &mut egui::Ui, tip: &str) {
    ui.add_space(4.0);
    ui.small_button("ℹ").on_hover_text(tip);
}
