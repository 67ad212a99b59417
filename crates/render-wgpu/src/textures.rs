use std::collections::HashMap;
use textscene_assets::{Rgba, RgbaImage, TextureLoader};
use textscene_common::TextureKey;

/// Colour shown by a matcap whose image has not arrived yet.
const BLANK_PIXEL: [u8; 4] = [128, 128, 128, 255];

struct GpuTexture {
    revision: u64,
    bind_group: wgpu::BindGroup,
    // Kept alive for the bind group.
    _texture: wgpu::Texture,
}

/// GPU copies of the loaded matcaps, one bind group per key, plus a blank
/// fallback for keys that are still loading or failed.
pub(crate) struct MatcapTextures {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    blank: GpuTexture,
    textures: HashMap<TextureKey, GpuTexture>,
}

impl MatcapTextures {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("matcap_bind_group_layout"),
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
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("matcap_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let blank_image = RgbaImage::from_pixel(1, 1, Rgba(BLANK_PIXEL));
        let blank = upload(device, queue, &layout, &sampler, &blank_image, 0, "matcap_blank");

        Self {
            layout,
            sampler,
            blank,
            textures: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Upload any matcap whose pixels are new since the last call.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, loader: &TextureLoader) {
        for (key, entry) in loader.iter() {
            let Some(image) = entry.image.as_deref() else {
                continue;
            };
            if image.width() == 0 || image.height() == 0 {
                continue;
            }
            let current = self.textures.get(&key).map(|t| t.revision);
            if current == Some(entry.revision) {
                continue;
            }
            let label = format!("matcap_{}", key.0);
            let texture = upload(
                device,
                queue,
                &self.layout,
                &self.sampler,
                image,
                entry.revision,
                &label,
            );
            tracing::debug!(
                "uploaded matcap {} ({}x{})",
                key.0,
                image.width(),
                image.height()
            );
            self.textures.insert(key, texture);
        }
    }

    /// Bind group for `key`, or the blank matcap if it is not on the GPU.
    pub fn bind_group(&self, key: TextureKey) -> &wgpu::BindGroup {
        self.textures
            .get(&key)
            .map(|t| &t.bind_group)
            .unwrap_or(&self.blank.bind_group)
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    image: &RgbaImage,
    revision: u64,
    label: &str,
) -> GpuTexture {
    let (width, height) = image.dimensions();
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
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuTexture {
        revision,
        bind_group,
        _texture: texture,
    }
}
