use log::warn;

/// Copy rows must be aligned to 256 bytes (`COPY_BYTES_PER_ROW_ALIGNMENT`).
pub fn aligned_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Strip the per-row copy padding, yielding tightly packed RGBA8.
pub fn unpad_rows(data: &[u8], width: u32, height: u32, padded_bytes_per_row: u32) -> Vec<u8> {
    let row_bytes = width as usize * 4;
    let padded = padded_bytes_per_row as usize;
    let mut out = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * padded;
        out.extend_from_slice(&data[start..start + row_bytes]);
    }
    out
}

/// Read a color texture back as tightly packed RGBA8, row-major,
/// top-to-bottom. Blocks until the copy completes.
pub fn read_texture_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> Option<Vec<u8>> {
    let padded_bytes_per_row = aligned_bytes_per_row(width);
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("vitrina_capture_buffer"),
        size: u64::from(padded_bytes_per_row) * u64::from(height),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("vitrina_capture_encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    if let Err(err) = device.poll(wgpu::PollType::wait_indefinitely()) {
        warn!("capture poll failed: {err:?}");
        return None;
    }
    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!("capture map failed: {err:?}");
            return None;
        }
        Err(_) => {
            warn!("capture map channel closed");
            return None;
        }
    }

    let mapped = slice.get_mapped_range();
    let pixels = unpad_rows(&mapped, width, height, padded_bytes_per_row);
    drop(mapped);
    buffer.unmap();
    Some(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_alignment_rounds_up_to_256() {
        assert_eq!(aligned_bytes_per_row(64), 256);
        assert_eq!(aligned_bytes_per_row(63), 256);
        assert_eq!(aligned_bytes_per_row(65), 512);
        assert_eq!(aligned_bytes_per_row(320), 1280);
    }

    #[test]
    fn unpad_strips_trailing_row_bytes() {
        // 2x2 image padded to 12 bytes per row; payload is 8 bytes per row.
        let mut data = Vec::new();
        for row in 0..2u8 {
            for px in 0..8u8 {
                data.push(row * 10 + px);
            }
            data.extend_from_slice(&[0xEE; 4]);
        }
        let out = unpad_rows(&data, 2, 2, 12);
        assert_eq!(out.len(), 16);
        assert_eq!(&out[..8], &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(&out[8..], &[10, 11, 12, 13, 14, 15, 16, 17]);
    }

    #[test]
    fn unpad_is_identity_when_unpadded() {
        let data: Vec<u8> = (0..32).collect();
        let out = unpad_rows(&data, 2, 4, 8);
        assert_eq!(out, data);
    }
}
