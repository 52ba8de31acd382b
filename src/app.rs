use std::sync::mpsc;

use vello::Scene;

use crate::layout::{layout_hierarchy, LayoutTree};
use crate::loader::{self, LoadError, Source};
use crate::render::colors::ColorScale;
use crate::render::scene::{build_scene, fit_scale, SceneInputs};
use crate::render::text::TextRenderer;
use crate::settings::Settings;
use crate::tree::arena::{Hierarchy, NodeId};
use crate::tree::{build_tree, TreeNode};
use crate::ui::input::{process_cursor, InputAction, MouseState};
use crate::ui::legend::category_colors;

/// Application state machine phases.
#[derive(Debug, PartialEq, Eq)]
pub enum AppPhase {
    /// Dataset is being fetched on a worker thread
    Loading,
    /// Layout computed, treemap on screen
    Ready,
    /// Loading or layout failed; the message is shown in the window title
    Failed(String),
}

/// Top-level application state.
pub struct App {
    pub phase: AppPhase,
    pub settings: Settings,
    pub source: Source,
    pub title: String,
    pub description: String,

    load_rx: Option<mpsc::Receiver<Result<TreeNode, LoadError>>>,

    // Data
    pub tree: Option<Hierarchy>,
    pub layout: Option<LayoutTree>,
    pub colors: ColorScale,
    pub text_renderer: TextRenderer,

    // UI state
    pub mouse: MouseState,
    pub hover_node: Option<NodeId>,

    // Rendering
    pub scene: Scene,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl App {
    pub fn new(settings: Settings, source: Source) -> Self {
        let mut text_renderer = TextRenderer::new();
        let font = match &settings.font_path {
            Some(path) => text_renderer.load_font_from_path("default", path),
            None => text_renderer.load_system_font("default"),
        };
        if let Err(e) = font {
            tracing::warn!("No font available ({e}), text will not be drawn");
        }

        let (title, description) = match &source {
            Source::Dataset(d) => (d.title().to_string(), d.description().to_string()),
            other => (String::new(), other.to_string()),
        };

        Self {
            phase: AppPhase::Loading,
            viewport_width: settings.canvas.width as f32,
            viewport_height: settings.canvas.height as f32,
            settings,
            source,
            title,
            description,
            load_rx: None,
            tree: None,
            layout: None,
            colors: ColorScale::default(),
            text_renderer,
            mouse: MouseState::default(),
            hover_node: None,
            scene: Scene::new(),
        }
    }

    /// Fetch the dataset on a background thread.
    pub fn start_load(&mut self) {
        self.phase = AppPhase::Loading;
        let (tx, rx) = mpsc::channel();
        self.load_rx = Some(rx);

        let source = self.source.clone();
        std::thread::spawn(move || {
            let result = loader::load(&source);
            if let Err(e) = &result {
                tracing::error!("Loading {} failed: {}", source, e);
            }
            // The receiver is gone only if the window already closed.
            let _ = tx.send(result);
        });
    }

    /// Poll for load completion. Call this from the event loop; returns true
    /// once the phase changed.
    pub fn poll_load(&mut self) -> bool {
        let Some(rx) = &self.load_rx else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return false,
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(LoadError::Io {
                    path: self.source.to_string().into(),
                    source: std::io::Error::other("loader thread exited without a result"),
                })
            }
        };
        self.load_rx = None;

        match result {
            Ok(root) => self.set_data(&root),
            Err(e) => self.phase = AppPhase::Failed(e.to_string()),
        }
        true
    }

    /// Build the hierarchy and lay it out once at canvas size. Window resizes
    /// only rescale the scene.
    pub fn set_data(&mut self, root: &TreeNode) {
        if self.title.is_empty() {
            self.title = root.name.clone();
        }
        let (w, h) = self.settings.canvas.treemap_size();
        let laid_out = build_tree(root)
            .and_then(|tree| layout_hierarchy(&tree, w, h, &self.settings.layout).map(|l| (tree, l)));

        match laid_out {
            Ok((tree, layout)) => {
                tracing::info!(
                    "Layout ready: {} rectangles, {} leaves",
                    layout.len(),
                    layout.leaves().count()
                );
                self.colors = category_colors(&tree, &layout);
                self.tree = Some(tree);
                self.layout = Some(layout);
                self.hover_node = None;
                self.phase = AppPhase::Ready;
            }
            Err(e) => {
                tracing::error!("Layout failed: {}", e);
                self.phase = AppPhase::Failed(e.to_string());
            }
        }
    }

    /// Canvas → window scale for the current viewport.
    pub fn scale(&self) -> f64 {
        fit_scale(
            self.settings.canvas.width,
            self.settings.canvas.height,
            self.viewport_width as f64,
            self.viewport_height as f64,
        )
    }

    /// Update hover from a cursor position in window pixels. Returns true
    /// when the scene needs rebuilding.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> bool {
        self.mouse = MouseState { x, y, inside: true };
        let Some(layout) = &self.layout else {
            return false;
        };

        let s = self.scale() as f32;
        let canvas_mouse = MouseState {
            x: x / s,
            y: y / s,
            inside: true,
        };
        let origin = (0.0, self.settings.canvas.padding);
        match process_cursor(layout, &canvas_mouse, origin, self.hover_node) {
            InputAction::Hover { node } => {
                self.hover_node = node;
                true
            }
            // The tooltip follows the cursor.
            InputAction::None => self.hover_node.is_some(),
        }
    }

    pub fn cursor_left(&mut self) -> bool {
        self.mouse.inside = false;
        self.hover_node.take().is_some()
    }

    /// Handle viewport resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport_width = width as f32;
        self.viewport_height = height as f32;
    }

    /// Rebuild the Vello scene from the current layout.
    pub fn rebuild_scene(&mut self) {
        let (Some(tree), Some(layout)) = (&self.tree, &self.layout) else {
            self.scene.reset();
            return;
        };
        let cursor = self
            .mouse
            .inside
            .then_some((self.mouse.x as f64, self.mouse.y as f64));
        let inputs = SceneInputs {
            tree,
            layout,
            colors: &self.colors,
            settings: &self.settings,
            title: &self.title,
            description: &self.description,
            hover: self.hover_node,
            cursor,
            scale: self.scale(),
        };
        build_scene(&mut self.scene, &inputs, &mut self.text_renderer);
    }

    /// Window title reflecting the current phase.
    pub fn window_title(&self) -> String {
        match &self.phase {
            AppPhase::Loading => format!("salesview - loading {}", self.source),
            AppPhase::Ready => format!("salesview - {}", self.title),
            AppPhase::Failed(msg) => format!("salesview - error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Dataset;

    fn games() -> TreeNode {
        TreeNode::branch(
            "Video Game Sales Data Top 100",
            vec![
                TreeNode::branch(
                    "Wii",
                    vec![
                        TreeNode::leaf("Wii Sports", 82.53),
                        TreeNode::leaf("Mario Kart Wii", 35.52),
                    ],
                ),
                TreeNode::branch("NES", vec![TreeNode::leaf("Super Mario Bros.", 40.24)]),
            ],
        )
    }

    #[test]
    fn set_data_lays_out_at_canvas_size() {
        let mut app = App::new(Settings::default(), Source::Dataset(Dataset::VideoGames));
        app.set_data(&games());
        assert_eq!(app.phase, AppPhase::Ready);
        let layout = app.layout.as_ref().unwrap();
        assert_eq!(layout.width, 600.0);
        assert!((layout.height - (800.0 * 2.0 / 3.0 - 60.0)).abs() < 1e-9);
        assert_eq!(app.colors.len(), 2);
        assert_eq!(app.title, "Video Game Sales");
    }

    #[test]
    fn invalid_data_fails_the_app() {
        let mut app = App::new(Settings::default(), Source::Url("http://localhost/x.json".into()));
        app.set_data(&TreeNode::branch("empty", vec![TreeNode::branch("none", vec![])]));
        assert!(matches!(app.phase, AppPhase::Failed(_)));
        assert!(app.layout.is_none());
    }

    #[test]
    fn hover_tracks_the_cursor_and_clears_on_leave() {
        let mut app = App::new(Settings::default(), Source::Dataset(Dataset::VideoGames));
        app.set_data(&games());
        app.resize(600, 800);

        // Inside the treemap, just below the title band.
        assert!(app.cursor_moved(5.0, 65.0));
        assert!(app.hover_node.is_some());
        // Title band: nothing under the cursor.
        assert!(app.cursor_moved(5.0, 10.0));
        assert_eq!(app.hover_node, None);
        assert!(!app.cursor_moved(5.0, 12.0));

        app.cursor_moved(5.0, 65.0);
        assert!(app.cursor_left());
        assert_eq!(app.hover_node, None);
    }
}
