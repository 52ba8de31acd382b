use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{CursorIcon, Window, WindowAttributes, WindowId};

use salesview_rs::app::{App, AppPhase};
use salesview_rs::loader::{Dataset, Source};
use salesview_rs::render::RenderState;
use salesview_rs::settings::Settings;

/// Interactive treemap of hierarchical sales data.
#[derive(Debug, Parser)]
#[command(name = "salesview", version, about)]
struct Cli {
    /// Published dataset to show (overrides the settings file)
    #[arg(long, value_enum)]
    dataset: Option<Dataset>,

    /// Fetch the hierarchy from this URL instead
    #[arg(long, conflicts_with_all = ["dataset", "file"])]
    url: Option<String>,

    /// Read the hierarchy from a local JSON file instead
    #[arg(long, conflicts_with = "dataset")]
    file: Option<PathBuf>,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn source(&self, settings: &Settings) -> Source {
        if let Some(url) = &self.url {
            Source::Url(url.clone())
        } else if let Some(path) = &self.file {
            Source::File(path.clone())
        } else {
            Source::Dataset(self.dataset.unwrap_or(settings.dataset))
        }
    }
}

/// Main application handler for winit's event loop.
struct SalesViewApp {
    app: App,
    render_state: Option<RenderState>,
    window: Option<Arc<Window>>,
}

impl SalesViewApp {
    fn new(app: App) -> Self {
        Self {
            app,
            render_state: None,
            window: None,
        }
    }

    fn update_window_title(&self) {
        if let Some(window) = &self.window {
            window.set_title(&self.app.window_title());
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for SalesViewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let canvas = &self.app.settings.canvas;
        let attrs = WindowAttributes::default()
            .with_title(self.app.window_title())
            .with_inner_size(winit::dpi::LogicalSize::new(canvas.width, canvas.height));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        // Initialize GPU rendering
        match pollster::block_on(RenderState::new(window.clone())) {
            Ok(state) => {
                let size = window.inner_size();
                tracing::info!(
                    "Window initialized: scale_factor={:.3}, physical_size={}x{}",
                    window.scale_factor(),
                    size.width,
                    size.height
                );
                self.app.resize(size.width, size.height);
                self.render_state = Some(state);
                self.app.start_load();
                window.request_redraw();
            }
            Err(e) => {
                tracing::error!("Failed to initialize GPU: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(render) = &mut self.render_state {
                    render.resize(size.width, size.height);
                    self.app.resize(size.width, size.height);
                    self.request_redraw();
                }
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                tracing::info!("Scale factor changed: {:.3}", scale_factor);
                if let (Some(render), Some(window)) = (&mut self.render_state, &self.window) {
                    let size = window.inner_size();
                    render.resize(size.width, size.height);
                    self.app.resize(size.width, size.height);
                    window.request_redraw();
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.app.cursor_moved(position.x as f32, position.y as f32) {
                    self.request_redraw();
                }
            }

            WindowEvent::CursorLeft { .. } => {
                if self.app.cursor_left() {
                    self.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && matches!(event.logical_key.as_ref(), Key::Named(NamedKey::Escape))
                {
                    event_loop.exit();
                }
            }

            WindowEvent::RedrawRequested => {
                if self.app.phase == AppPhase::Loading && self.app.poll_load() {
                    self.update_window_title();
                }

                if let Some(window) = &self.window {
                    window.set_cursor(if self.app.phase == AppPhase::Loading {
                        CursorIcon::Progress
                    } else {
                        CursorIcon::Default
                    });
                }

                self.app.rebuild_scene();

                if let Some(render) = &mut self.render_state {
                    if let Err(e) = render.render(&self.app.scene) {
                        tracing::error!("Render error: {}", e);
                    }
                }

                // Keep polling until the loader thread reports back.
                if self.app.phase == AppPhase::Loading {
                    self.request_redraw();
                }
            }

            _ => {}
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("salesview_rs=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load(path).context("loading settings")?,
        None => Settings::default(),
    };
    let source = cli.source(&settings);
    tracing::info!("salesview starting, source: {}", source);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = SalesViewApp::new(App::new(settings, source));
    event_loop.run_app(&mut app)?;

    Ok(())
}
