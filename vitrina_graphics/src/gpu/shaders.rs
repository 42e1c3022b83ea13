pub const QUAD_WGSL: &str = include_str!("shaders/quad.wgsl");

#[inline]
pub fn create_quad_shader_module(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("vitrina_quad"),
        source: wgpu::ShaderSource::Wgsl(QUAD_WGSL.into()),
    })
}
