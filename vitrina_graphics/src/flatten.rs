//! Scene flattening: walks the node tree and produces plain draw batches
//! the GPU layer executes. No GPU types here — the whole traversal,
//! including clip-region stacking and matrix composition, is testable on
//! its own.

use glam::{Mat4, Vec2, Vec4};
use vitrina_ids::{FontID, ImageID, NodeID};
use vitrina_scene::{Scene, SceneNode, TextAlign};

/// Typed handle naming which texture a draw samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKey {
    /// 1x1 white fallback; flat-colored rectangles use this.
    White,
    /// A decoded image from the asset store.
    Image(ImageID),
    /// The off-screen color target owned by a `Frame3D`.
    Target(NodeID),
}

/// Integer scissor rectangle in target pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ClipRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Stack of scissor regions for one render target. Pushing replaces the
/// active region; popping restores the previous one, or the full target
/// once the stack is empty. Regions are clamped to the target but not
/// intersected with their parent.
pub struct ClipStack {
    target: (u32, u32),
    stack: Vec<ClipRect>,
}

impl ClipStack {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target: (width, height),
            stack: Vec::new(),
        }
    }

    pub fn push(&mut self, rect: ClipRect) {
        self.stack.push(rect);
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    pub fn current(&self) -> ClipRect {
        self.stack
            .last()
            .copied()
            .unwrap_or_else(|| ClipRect::full(self.target.0, self.target.1))
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// One recorded 2D draw inside a frame's off-screen pass.
#[derive(Debug, Clone)]
pub enum Draw2D {
    Rect {
        mvp: Mat4,
        size: Vec2,
        color: [f32; 4],
        texture: TextureKey,
        clip: ClipRect,
    },
    /// Text is recorded but not rasterized; glyph generation is an
    /// external service the backend may or may not have.
    Text {
        mvp: Mat4,
        content: String,
        color: [f32; 4],
        align: TextAlign,
        font: Option<FontID>,
        clip: ClipRect,
    },
}

/// The 2D draws destined for one `Frame3D`'s off-screen target.
#[derive(Debug)]
pub struct FrameBatch {
    pub frame: NodeID,
    pub target_size: (u32, u32),
    pub draws: Vec<Draw2D>,
}

/// One composited quad in the 3D pass: the frame's target texture drawn
/// centered at the origin with half extents, under the full MVP.
#[derive(Debug, Clone, Copy)]
pub struct Composite3D {
    pub frame: NodeID,
    pub mvp: Mat4,
    pub half_size: Vec2,
}

/// Everything one `render_scene` call will draw, in submission order.
#[derive(Debug, Default)]
pub struct ScenePlan {
    pub batches: Vec<FrameBatch>,
    pub composites: Vec<Composite3D>,
}

/// Orthographic projection for a frame's off-screen target: pixel
/// coordinates, origin top-left, Y increasing downward.
pub fn target_ortho(width: u32, height: u32) -> Mat4 {
    Mat4::orthographic_rh_gl(0.0, width as f32, height as f32, 0.0, -1.0, 1.0)
}

/// The Frame2D boundary matrix: flips Y and offsets by the frame height,
/// converting the frame-local top-left-origin space. Applied exactly once
/// per Frame2D, on top of the frame's own translation.
fn frame_flip(height: f32) -> Mat4 {
    Mat4::from_translation(glam::Vec3::new(0.0, height, 0.0))
        * Mat4::from_scale(glam::Vec3::new(1.0, -1.0, 1.0))
}

/// Transform a point through `mvp` into target pixel coordinates
/// (origin top-left). Returns `None` for points at or behind w = 0.
fn project_to_target(mvp: &Mat4, x: f32, y: f32, target: (u32, u32)) -> Option<(f32, f32)> {
    let clip = *mvp * Vec4::new(x, y, 0.0, 1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    Some((
        (ndc_x + 1.0) * 0.5 * target.0 as f32,
        (1.0 - ndc_y) * 0.5 * target.1 as f32,
    ))
}

/// Axis-aligned bounding rectangle of a `w`x`h` rect transformed by `mvp`,
/// clamped to the target bounds. Degenerate projections clip everything.
pub fn clip_rect_for(mvp: &Mat4, width: f32, height: f32, target: (u32, u32)) -> ClipRect {
    let corners = [
        (0.0, 0.0),
        (width, 0.0),
        (0.0, height),
        (width, height),
    ];
    let mut min = (f32::INFINITY, f32::INFINITY);
    let mut max = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for (cx, cy) in corners {
        let Some((sx, sy)) = project_to_target(mvp, cx, cy, target) else {
            return ClipRect {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            };
        };
        if !sx.is_finite() || !sy.is_finite() {
            return ClipRect {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            };
        }
        min.0 = min.0.min(sx);
        min.1 = min.1.min(sy);
        max.0 = max.0.max(sx);
        max.1 = max.1.max(sy);
    }

    // Snap to the pixel grid; rounding keeps exact pixel edges stable
    // against float error in the matrix chain.
    let tw = target.0 as f32;
    let th = target.1 as f32;
    let x0 = min.0.round().clamp(0.0, tw);
    let y0 = min.1.round().clamp(0.0, th);
    let x1 = max.0.round().clamp(0.0, tw);
    let y1 = max.1.round().clamp(0.0, th);
    ClipRect {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0).max(0.0) as u32,
        height: (y1 - y0).max(0.0) as u32,
    }
}

/// Flatten a scene into draw batches: view-projection from the camera,
/// then every visible root `Frame3D` in order — its 2D subtree under the
/// target's orthographic projection, plus one composite quad.
pub fn flatten_scene(scene: &Scene) -> ScenePlan {
    let camera = scene.camera();
    let view_proj = camera.projection_matrix() * camera.view_matrix();

    let mut plan = ScenePlan::default();
    for &frame_id in scene.frames() {
        let Some(frame) = scene.get(frame_id).and_then(|n| n.as_frame_3d()) else {
            continue;
        };
        if !frame.node.visible {
            continue;
        }

        let (tw, th) = frame.target_size;
        let ortho = target_ortho(tw, th);
        let mut clip = ClipStack::new(tw, th);
        let mut draws = Vec::new();
        for &child in &frame.node.children {
            flatten_node(scene, child, &ortho, &mut clip, &mut draws, (tw, th));
        }
        plan.batches.push(FrameBatch {
            frame: frame_id,
            target_size: (tw, th),
            draws,
        });

        let model = frame.transform.matrix();
        plan.composites.push(Composite3D {
            frame: frame_id,
            mvp: view_proj * model,
            half_size: Vec2::new(tw as f32 * 0.5, th as f32 * 0.5),
        });
    }
    plan
}

fn flatten_node(
    scene: &Scene,
    id: NodeID,
    parent_mvp: &Mat4,
    clip: &mut ClipStack,
    draws: &mut Vec<Draw2D>,
    target: (u32, u32),
) {
    let Some(node) = scene.get(id) else {
        return;
    };
    if !node.visible() {
        return;
    }

    match node {
        // Frames live only in the root list; a stray one ends the branch.
        SceneNode::Frame3D(_) => {}
        SceneNode::Node2D(group) => {
            let mvp = *parent_mvp * Mat4::from_translation(group.position.extend(0.0));
            for &child in &group.node.children {
                flatten_node(scene, child, &mvp, clip, draws, target);
            }
        }
        SceneNode::Frame2D(frame) => {
            let moved = *parent_mvp * Mat4::from_translation(frame.position.extend(0.0));
            let mvp = moved * frame_flip(frame.size.y);
            let clipping = frame.clip;
            if clipping {
                clip.push(clip_rect_for(&mvp, frame.size.x, frame.size.y, target));
            }
            for &child in &frame.node.children {
                flatten_node(scene, child, &mvp, clip, draws, target);
            }
            if clipping {
                clip.pop();
            }
        }
        SceneNode::Rect2D(rect) => {
            let mvp = *parent_mvp * Mat4::from_translation(rect.position.extend(0.0));
            let texture = match rect.image {
                Some(image) => TextureKey::Image(image),
                None => TextureKey::White,
            };
            draws.push(Draw2D::Rect {
                mvp,
                size: rect.size,
                color: rect.color.to_array(),
                texture,
                clip: clip.current(),
            });
            for &child in &rect.node.children {
                flatten_node(scene, child, &mvp, clip, draws, target);
            }
        }
        SceneNode::Text2D(text) => {
            let mvp = *parent_mvp * Mat4::from_translation(text.position.extend(0.0));
            draws.push(Draw2D::Text {
                mvp,
                content: text.content.clone(),
                color: text.color.to_array(),
                align: text.align,
                font: text.font,
                clip: clip.current(),
            });
            for &child in &text.node.children {
                flatten_node(scene, child, &mvp, clip, draws, target);
            }
        }
    }
}
