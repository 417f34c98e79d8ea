//! Network Viewer - standalone host for the partner network widget
//!
//! Usage:
//!   network_viewer [TREE_JSON] [--settings config/graph_settings.yaml]
//!
//! Without a tree file a generated sample network is shown. Set `RUST_LOG`
//! (e.g. `RUST_LOG=ib_network_graph=debug`) for layout diagnostics.

use std::path::{Path, PathBuf};

use eframe::egui;
use ib_network_graph::{
    GraphSettings, InteractionEvent, NetworkGraphWidget, NodeRole, TreeMetrics, TreeNode,
};
use tracing::{info, warn};

struct Args {
    tree: Option<PathBuf>,
    settings: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args {
        tree: None,
        settings: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        if arg == "--settings" {
            args.settings = it.next().map(PathBuf::from);
        } else {
            args.tree = Some(PathBuf::from(arg));
        }
    }
    args
}

/// Three levels of referrals under one introducer
fn sample_tree() -> TreeNode {
    let partner = |id: String, level: u32| {
        TreeNode::new(id.clone())
            .with_name(format!("Partner {}", id))
            .with_email(format!("{}@example.com", id.to_lowercase()))
            .with_referral_code(format!("IB-{}", id))
            .with_level(level)
    };

    partner("ROOT".to_string(), 0)
        .with_role(NodeRole::Root)
        .with_children((0..4).map(|i| {
            let mut node = partner(format!("A{}", i), 1).with_children((0..3).map(move |j| {
                partner(format!("A{}B{}", i, j), 2)
                    .with_children((0..j).map(move |k| partner(format!("A{}B{}C{}", i, j, k), 3)))
            }));
            if i == 1 {
                node = node.with_role(NodeRole::SelfNode);
            }
            node
        }))
}

struct ViewerApp {
    widget: NetworkGraphWidget,
    status: String,
    last_event: Option<String>,
}

impl ViewerApp {
    fn new(settings: GraphSettings, tree: Option<TreeNode>) -> Self {
        let status = match tree.as_ref().map(TreeMetrics::of) {
            Some(Ok(m)) => format!(
                "{} partners, {} levels, widest level {}",
                m.len(),
                m.tree_depth(),
                m.max_breadth()
            ),
            Some(Err(err)) => format!("Tree has structural problems: {}", err),
            None => "No network data".to_string(),
        };

        let mut widget = NetworkGraphWidget::new(settings);
        widget.set_tree(tree);
        Self {
            widget,
            status,
            last_event: None,
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Zoom in").clicked() {
                    self.widget.zoom_in();
                }
                if ui.button("Zoom out").clicked() {
                    self.widget.zoom_out();
                }
                if ui.button("Fit").clicked() {
                    self.widget.fit_to_content();
                }
                ui.separator();
                ui.label(&self.status);
                if let Some(ref event) = self.last_event {
                    ui.separator();
                    ui.label(event);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.widget.ui(ui);
        });

        for event in self.widget.take_events() {
            if let InteractionEvent::NodeClicked { node_id } = event {
                info!("Centering on {}", node_id);
                self.last_event = Some(format!("Centered on {}", node_id));
            }
        }
    }
}

fn load_tree(path: &Path) -> Option<TreeNode> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) => {
            warn!("Cannot read {}: {}", path.display(), err);
            return None;
        }
    };
    match TreeNode::from_json(&json) {
        Ok(tree) => Some(tree),
        Err(err) => {
            warn!("{}: {}", path.display(), err);
            None
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ib_network_graph=info,network_viewer=info".into()),
        )
        .with_target(false)
        .init();

    let args = parse_args();

    let settings = match args.settings {
        Some(ref path) => GraphSettings::load(path)?,
        None => GraphSettings::default(),
    };

    let tree = match args.tree {
        Some(ref path) => load_tree(path),
        None => Some(sample_tree()),
    };

    info!("Starting network viewer");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("IB Partner Network")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "IB Partner Network",
        native_options,
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(settings, tree)))),
    )?;
    Ok(())
}
