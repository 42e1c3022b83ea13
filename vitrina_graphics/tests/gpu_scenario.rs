//! End-to-end scenario against a real (headless) GPU device. Every test
//! skips cleanly when the machine has no usable adapter.

use vitrina_graphics::{Renderer, WgpuRenderer};
use vitrina_assets::AssetStore;
use vitrina_scene::{Frame3D, Rect2D, Scene};

const WIDTH: u32 = 400;
const HEIGHT: u32 = 300;

fn init_headless() -> Option<WgpuRenderer> {
    let mut renderer = WgpuRenderer::headless();
    if !renderer.initialize(WIDTH, HEIGHT, "scenario") {
        eprintln!("skipping: no gpu adapter available");
        return None;
    }
    Some(renderer)
}

/// 200x150 frame holding a red 50x50 rectangle at (10,10), viewed from
/// z = 800. The capture must show red inside the rectangle's projected
/// bounds and the background clear color elsewhere.
#[test]
fn red_rect_scenario_renders_into_capture() {
    let Some(mut renderer) = init_headless() else {
        return;
    };

    let mut scene = Scene::new();
    scene.camera_mut().set_position(0.0, 0.0, 800.0);
    scene
        .camera_mut()
        .set_perspective(1.0472, WIDTH as f32 / HEIGHT as f32, 0.1, 2000.0);

    let frame = scene.add_frame(Frame3D::new("frame", 200, 150));
    let mut rect = Rect2D::new("rect", 50.0, 50.0);
    rect.set_position(10.0, 10.0);
    rect.set_color(1.0, 0.0, 0.0, 1.0);
    let rect = scene.spawn(rect);
    scene.add_child(frame, rect);

    let assets = AssetStore::new();
    assert!(renderer.begin_frame());
    renderer.render_scene(&scene, &assets);
    renderer.end_frame();
    assert_eq!(renderer.frame_count(), 1);

    let capture = renderer.capture_frame().expect("capture after end_frame");
    assert_eq!((capture.width, capture.height), (WIDTH, HEIGHT));
    assert_eq!(
        capture.pixels.len(),
        (WIDTH * HEIGHT * 4) as usize,
        "capture must be tightly packed RGBA8"
    );

    // Project the rectangle's corners the same way the renderer does to
    // get its expected on-screen bounds.
    let camera = scene.camera();
    let vp = camera.projection_matrix() * camera.view_matrix();
    let to_screen = |tx: f32, ty: f32| -> (f32, f32) {
        // Target pixel -> quad-local -> world (frame transform is identity).
        let local = glam::Vec4::new(tx - 100.0, 75.0 - ty, 0.0, 1.0);
        let clip = vp * local;
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        (
            (ndc_x + 1.0) * 0.5 * WIDTH as f32,
            (1.0 - ndc_y) * 0.5 * HEIGHT as f32,
        )
    };
    let (x0, y0) = to_screen(10.0, 10.0);
    let (x1, y1) = to_screen(60.0, 60.0);
    let (min_x, max_x) = (x0.min(x1) - 3.0, x0.max(x1) + 3.0);
    let (min_y, max_y) = (y0.min(y1) - 3.0, y0.max(y1) + 3.0);

    let mut red_pixels = 0usize;
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let i = ((y * WIDTH + x) * 4) as usize;
            let (r, g, b) = (
                capture.pixels[i],
                capture.pixels[i + 1],
                capture.pixels[i + 2],
            );
            if r > 200 && g < 80 && b < 80 {
                red_pixels += 1;
                let (fx, fy) = (x as f32, y as f32);
                assert!(
                    fx >= min_x && fx <= max_x && fy >= min_y && fy <= max_y,
                    "red pixel ({x},{y}) outside projected bounds \
                     [{min_x:.1},{max_x:.1}]x[{min_y:.1},{max_y:.1}]"
                );
            }
        }
    }
    assert!(
        red_pixels > 50,
        "expected a solid red region, found {red_pixels} red pixels"
    );

    // A corner pixel shows the background clear color (sRGB 51,51,76).
    let i = ((5 * WIDTH + 5) * 4) as usize;
    let (r, g, b, a) = (
        capture.pixels[i] as i32,
        capture.pixels[i + 1] as i32,
        capture.pixels[i + 2] as i32,
        capture.pixels[i + 3],
    );
    assert!((r - 51).abs() <= 4, "background r was {r}");
    assert!((g - 51).abs() <= 4, "background g was {g}");
    assert!((b - 76).abs() <= 4, "background b was {b}");
    assert_eq!(a, 255);

    renderer.shutdown();
    assert!(renderer.capture_frame().is_none());
}

/// Clipping disabled: a child far outside its Frame2D's bounds still draws.
#[test]
fn clipping_disabled_draws_out_of_bounds_child() {
    let Some(mut renderer) = init_headless() else {
        return;
    };

    let mut scene = Scene::new();
    scene.camera_mut().set_position(0.0, 0.0, 800.0);
    scene
        .camera_mut()
        .set_perspective(1.0472, WIDTH as f32 / HEIGHT as f32, 0.1, 2000.0);

    let frame = scene.add_frame(Frame3D::new("frame", 200, 150));
    let mut panel = vitrina_scene::Frame2D::new("panel", 20.0, 20.0);
    panel.set_position(50.0, 100.0);
    panel.set_clip(false);
    let panel = scene.spawn(panel);
    // Way outside the 20x20 panel, still inside the 200x150 target.
    let mut stray = Rect2D::new("stray", 40.0, 40.0);
    stray.set_position(100.0, 20.0);
    stray.set_color(0.0, 1.0, 0.0, 1.0);
    let stray = scene.spawn(stray);
    scene.add_child(frame, panel);
    scene.add_child(panel, stray);

    let assets = AssetStore::new();
    assert!(renderer.begin_frame());
    renderer.render_scene(&scene, &assets);
    renderer.end_frame();

    let capture = renderer.capture_frame().expect("capture");
    let green = capture
        .pixels
        .chunks_exact(4)
        .filter(|px| px[1] > 200 && px[0] < 80 && px[2] < 80)
        .count();
    assert!(green > 50, "expected green pixels, found {green}");

    // Same scene with clipping on: the stray child disappears.
    scene
        .get_mut(panel)
        .unwrap()
        .as_frame_2d_mut()
        .unwrap()
        .set_clip(true);
    assert!(renderer.begin_frame());
    renderer.render_scene(&scene, &assets);
    renderer.end_frame();
    let capture = renderer.capture_frame().expect("capture");
    let green = capture
        .pixels
        .chunks_exact(4)
        .filter(|px| px[1] > 200 && px[0] < 80 && px[2] < 80)
        .count();
    assert_eq!(green, 0, "clipped child must not draw");
}

#[test]
fn uninitialized_renderer_refuses_frames() {
    let mut renderer = WgpuRenderer::new();
    assert!(!renderer.begin_frame());
    assert!(renderer.should_close());
    assert!(renderer.capture_frame().is_none());
    assert_eq!(renderer.frame_count(), 0);
    // Shutdown before initialize is a no-op.
    renderer.shutdown();
}

#[test]
fn save_capture_writes_png() {
    let Some(mut renderer) = init_headless() else {
        return;
    };
    let scene = Scene::new();
    let assets = AssetStore::new();
    assert!(renderer.begin_frame());
    renderer.render_scene(&scene, &assets);
    renderer.end_frame();

    let path = std::env::temp_dir().join("vitrina_capture_test.png");
    assert!(renderer.save_capture(&path));
    let meta = std::fs::metadata(&path).expect("capture file exists");
    assert!(meta.len() > 0);
    std::fs::remove_file(&path).ok();
}
