/// WGSL shader for matcap-shaded meshes.
///
/// The matcap is sampled with a UV built from the view-space normal, using a
/// basis aligned with the view direction so the lookup stays stable away from
/// the screen centre.
pub const MATCAP_SHADER: &str = r#"
struct Camera {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var matcap_texture: texture_2d<f32>;
@group(1) @binding(1)
var matcap_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_position: vec3<f32>,
    @location(1) view_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let model_view = camera.view * model;
    let view_pos = model_view * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = camera.proj * view_pos;
    out.view_position = -view_pos.xyz;
    out.view_normal = (model_view * vec4<f32>(vertex.normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.view_normal);
    let view_dir = normalize(in.view_position);
    let x = normalize(vec3<f32>(view_dir.z, 0.0, -view_dir.x));
    let y = cross(view_dir, x);
    let uv = vec2<f32>(dot(x, normal), dot(y, normal)) * 0.495 + 0.5;
    // Image rows run top to bottom.
    return textureSample(matcap_texture, matcap_sampler, vec2<f32>(uv.x, 1.0 - uv.y));
}
"#;

/// WGSL shader for line segments in the default colour.
pub const LINE_SHADER: &str = r#"
struct Camera {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
};

@vertex
fn vs_line(vertex: VertexInput, instance: InstanceInput) -> @builtin(position) vec4<f32> {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    return camera.proj * camera.view * model * vec4<f32>(vertex.position, 1.0);
}

@fragment
fn fs_line() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
"#;
