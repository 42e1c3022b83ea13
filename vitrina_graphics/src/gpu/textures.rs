use super::context::SCENE_FORMAT;
use crate::flatten::TextureKey;
use log::debug;
use std::collections::{HashMap, HashSet};
use vitrina_assets::AssetStore;
use vitrina_ids::{ImageID, NodeID};

/// An uploaded sampleable texture with its bind group.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
}

/// A color texture that doubles as a render target (Frame3D off-screen
/// targets, the internal screen target).
pub struct ColorTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub size: (u32, u32),
}

pub fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("vitrina_texture_bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Caches GPU textures by source identity: decoded images by `ImageID`,
/// off-screen targets by their owning frame's `NodeID`. Entries are created
/// lazily on first use and live until the renderer shuts down. A flag
/// records whether any pixel upload happened this frame so `end_frame` can
/// decide to synchronize.
pub struct TextureCache {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    images: HashMap<ImageID, GpuTexture>,
    targets: HashMap<NodeID, ColorTarget>,
    uploaded_this_frame: bool,
    missing_logged: HashSet<ImageID>,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, layout: wgpu::BindGroupLayout) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("vitrina_texture_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });
        let white = upload_rgba8(
            device,
            queue,
            &layout,
            &sampler,
            1,
            1,
            &[255, 255, 255, 255],
            "vitrina_white_texture",
        );
        Self {
            layout,
            sampler,
            white,
            images: HashMap::new(),
            targets: HashMap::new(),
            uploaded_this_frame: false,
            missing_logged: HashSet::new(),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn begin_frame(&mut self) {
        self.uploaded_this_frame = false;
    }

    pub fn uploaded_this_frame(&self) -> bool {
        self.uploaded_this_frame
    }

    /// Create the texture for an image on first use. A second call with the
    /// same ID is a pure lookup and does not mark an upload.
    pub fn ensure_image(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        id: ImageID,
        assets: &AssetStore,
    ) {
        if self.images.contains_key(&id) {
            return;
        }
        let Some(image) = assets.image(id) else {
            // Stale handle: the draw falls back to the white texture.
            // Logged once per handle, not per frame.
            if self.missing_logged.insert(id) {
                debug!("image {id} not in asset store; using fallback");
            }
            return;
        };
        if !image.is_loaded() {
            return;
        }
        let texture = upload_rgba8(
            device,
            queue,
            &self.layout,
            &self.sampler,
            image.width(),
            image.height(),
            image.pixels(),
            "vitrina_image_texture",
        );
        self.images.insert(id, texture);
        self.uploaded_this_frame = true;
    }

    /// Lazily create (or recreate after a size change) the off-screen color
    /// target owned by a `Frame3D`.
    pub fn ensure_target(&mut self, device: &wgpu::Device, frame: NodeID, size: (u32, u32)) {
        let stale = self
            .targets
            .get(&frame)
            .map(|t| t.size != size)
            .unwrap_or(true);
        if !stale {
            return;
        }
        let target = create_color_target(
            device,
            &self.layout,
            &self.sampler,
            size.0,
            size.1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            "vitrina_frame_target",
        );
        self.targets.insert(frame, target);
    }

    pub fn target(&self, frame: NodeID) -> Option<&ColorTarget> {
        self.targets.get(&frame)
    }

    /// Resolve a draw's texture key; anything unresolved samples white.
    pub fn bind_group(&self, key: TextureKey) -> &wgpu::BindGroup {
        match key {
            TextureKey::White => &self.white.bind_group,
            TextureKey::Image(id) => self
                .images
                .get(&id)
                .map(|t| &t.bind_group)
                .unwrap_or(&self.white.bind_group),
            TextureKey::Target(frame) => self
                .targets
                .get(&frame)
                .map(|t| &t.bind_group)
                .unwrap_or(&self.white.bind_group),
        }
    }

    pub fn has_image(&self, id: ImageID) -> bool {
        self.images.contains_key(&id)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Build an independent screen-sized target (color + sampleable) for
    /// the internal frame texture; readable for capture.
    pub fn create_screen_target(&self, device: &wgpu::Device, width: u32, height: u32) -> ColorTarget {
        create_color_target(
            device,
            &self.layout,
            &self.sampler,
            width,
            height,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            "vitrina_screen_target",
        )
    }
}

fn upload_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
    pixels: &[u8],
    label: &str,
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SCENE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = bind_texture(device, layout, sampler, &view, label);
    GpuTexture {
        texture,
        view,
        bind_group,
    }
}

fn create_color_target(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
    usage: wgpu::TextureUsages,
    label: &str,
) -> ColorTarget {
    let width = width.max(1);
    let height = height.max(1);
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SCENE_FORMAT,
        usage,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = bind_texture(device, layout, sampler, &view, label);
    ColorTarget {
        texture,
        view,
        bind_group,
        size: (width, height),
    }
}

fn bind_texture(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    view: &wgpu::TextureView,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrina_assets::Image;

    fn test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok()?;
        pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("vitrina_test_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))
        .ok()
    }

    #[test]
    fn image_fetch_is_idempotent() {
        let Some((device, queue)) = test_device() else {
            eprintln!("skipping: no gpu adapter available");
            return;
        };
        let layout = create_texture_bind_group_layout(&device);
        let mut cache = TextureCache::new(&device, &queue, layout);
        let mut assets = AssetStore::new();
        let id = assets.insert_image(Image::from_data(&[255u8; 2 * 2 * 4], 2, 2, 4).unwrap());

        cache.begin_frame();
        cache.ensure_image(&device, &queue, id, &assets);
        assert!(cache.uploaded_this_frame());
        assert!(cache.has_image(id));
        assert_eq!(cache.image_count(), 1);

        // Second fetch: same entry, no new upload flagged.
        cache.begin_frame();
        cache.ensure_image(&device, &queue, id, &assets);
        assert!(!cache.uploaded_this_frame());
        assert_eq!(cache.image_count(), 1);
    }

    #[test]
    fn stale_image_id_falls_back_to_white() {
        let Some((device, queue)) = test_device() else {
            eprintln!("skipping: no gpu adapter available");
            return;
        };
        let layout = create_texture_bind_group_layout(&device);
        let mut cache = TextureCache::new(&device, &queue, layout);
        let assets = AssetStore::new();
        let stale = ImageID::from_parts(42, 0);

        cache.begin_frame();
        cache.ensure_image(&device, &queue, stale, &assets);
        assert!(!cache.uploaded_this_frame());
        assert!(!cache.has_image(stale));
        // bind_group must still resolve (to the white fallback).
        let _ = cache.bind_group(TextureKey::Image(stale));
    }

    #[test]
    fn target_recreated_on_size_change() {
        let Some((device, queue)) = test_device() else {
            eprintln!("skipping: no gpu adapter available");
            return;
        };
        let layout = create_texture_bind_group_layout(&device);
        let mut cache = TextureCache::new(&device, &queue, layout);
        let frame = NodeID::from_parts(1, 0);

        cache.ensure_target(&device, frame, (64, 64));
        assert_eq!(cache.target(frame).map(|t| t.size), Some((64, 64)));
        cache.ensure_target(&device, frame, (64, 64));
        assert_eq!(cache.target_count(), 1);
        cache.ensure_target(&device, frame, (128, 32));
        assert_eq!(cache.target(frame).map(|t| t.size), Some((128, 32)));
        assert_eq!(cache.target_count(), 1);
    }
}
