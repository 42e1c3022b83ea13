//! Clipping demo: a 3D-tilted panel whose content is scissored at the
//! panel's edges, next to an unclipped twin showing the difference.
//!
//! Run with `RUST_LOG=info` for renderer logging. Pass `--capture <path>`
//! to save a PNG of the last frame on exit; `--headless` renders a single
//! frame without a window (capture implied).

use std::path::PathBuf;
use vitrina_app::App;
use vitrina_graphics::{Renderer, RendererKind, WgpuRenderer};
use vitrina_scene::{Color, Frame2D, Frame3D, Rect2D, Text2D};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 700;

fn build_scene(app: &mut App) {
    let camera = app.scene.camera_mut();
    camera.set_position(0.0, 0.0, 800.0);
    camera.set_perspective(1.0472, WIDTH as f32 / HEIGHT as f32, 0.1, 2000.0);

    // Left: clipped panel, slightly yawed so the 3D composite is visible.
    let mut clipped = Frame3D::new("clipped_panel", 300, 300);
    clipped.set_position(-180.0, 0.0, 0.0);
    clipped.set_rotation(0.0, 0.35, 0.0);
    let clipped = app.scene.add_frame(clipped);

    // Right: identical content, clipping off.
    let mut open = Frame3D::new("open_panel", 300, 300);
    open.set_position(180.0, 0.0, 0.0);
    open.set_rotation(0.0, -0.35, 0.0);
    let open = app.scene.add_frame(open);

    for (frame, clip) in [(clipped, true), (open, false)] {
        let mut panel = Frame2D::new("viewport", 200.0, 200.0);
        panel.set_position(50.0, 50.0);
        panel.set_clip(clip);
        let panel = app.scene.spawn(panel);
        app.scene.add_child(frame, panel);

        // Border marking the clip boundary.
        let mut border = Rect2D::new("border", 200.0, 200.0);
        border.color = Color::rgba(0.1, 0.9, 0.2, 0.25);
        let border = app.scene.spawn(border);
        app.scene.add_child(panel, border);

        // Oversized content extending past the panel on every side.
        let mut sweep = Rect2D::new("sweep", 250.0, 120.0);
        sweep.set_position(-40.0, 40.0);
        sweep.color = Color::rgba(0.95, 0.2, 0.2, 1.0);
        let sweep = app.scene.spawn(sweep);
        app.scene.add_child(panel, sweep);

        let mut tall = Rect2D::new("tall", 80.0, 260.0);
        tall.set_position(110.0, -30.0);
        tall.color = Color::rgba(0.2, 0.4, 0.95, 1.0);
        let tall = app.scene.spawn(tall);
        app.scene.add_child(panel, tall);

        let mut label = Text2D::new("label", if clip { "clipped" } else { "unclipped" });
        label.set_position(10.0, 10.0);
        label.color = Color::WHITE;
        let label = app.scene.spawn(label);
        app.scene.add_child(panel, label);
    }
}

fn main() {
    env_logger::init();

    let mut capture: Option<PathBuf> = None;
    let mut headless = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--capture" => capture = args.next().map(PathBuf::from),
            "--headless" => headless = true,
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }
    if headless && capture.is_none() {
        capture = Some(PathBuf::from("clipping_demo.png"));
    }

    let mut app = if headless {
        App::with_renderer(Box::new(WgpuRenderer::headless()))
    } else {
        App::new(RendererKind::Wgpu)
    };
    if !app.initialize(WIDTH, HEIGHT, "Vitrina - Clipping Demo") {
        eprintln!("failed to initialize renderer");
        std::process::exit(1);
    }

    build_scene(&mut app);

    if headless {
        app.frame();
    } else {
        while app.frame() {}
    }

    if let Some(path) = capture {
        if app.renderer.save_capture(&path) {
            println!("saved capture to {}", path.display());
        } else {
            eprintln!("capture failed");
        }
    }
    app.renderer.shutdown();
}
