/// WGSL shader for every scene layer.
///
/// Lit draws use a single point light in view space plus a global ambient
/// term; unlit draws use a flat color. Both are modulated by the bound
/// texture, which is plain white for untextured draws.
pub const SCENE_SHADER: &str = r#"
struct DrawUniforms {
    mvp: mat4x4<f32>,
    model_view: mat4x4<f32>,
    color: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    emissive: vec4<f32>,
    light_position: vec4<f32>,
    light_ambient: vec4<f32>,
    light_diffuse: vec4<f32>,
    light_specular: vec4<f32>,
    // x: shininess, y: 1.0 when lit, z: global ambient
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniforms;

@group(1) @binding(0)
var layer_texture: texture_2d<f32>;
@group(1) @binding(1)
var layer_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_position: vec3<f32>,
    @location(1) view_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = draw.mvp * vec4<f32>(vertex.position, 1.0);
    out.view_position = (draw.model_view * vec4<f32>(vertex.position, 1.0)).xyz;
    out.view_normal = (draw.model_view * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv;
    return out;
}

fn shade(in: VertexOutput) -> vec4<f32> {
    let n = normalize(in.view_normal);
    let l = normalize(draw.light_position.xyz - in.view_position);
    let v = normalize(-in.view_position);
    let h = normalize(l + v);

    let n_dot_l = max(dot(n, l), 0.0);
    var specular = 0.0;
    if n_dot_l > 0.0 {
        specular = pow(max(dot(n, h), 0.0), draw.params.x);
    }

    let rgb = draw.emissive.rgb
        + draw.ambient.rgb * draw.params.z
        + draw.ambient.rgb * draw.light_ambient.rgb
        + draw.diffuse.rgb * draw.light_diffuse.rgb * n_dot_l
        + draw.specular.rgb * draw.light_specular.rgb * specular;
    return vec4<f32>(min(rgb, vec3<f32>(1.0)), draw.diffuse.a);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(layer_texture, layer_sampler, in.uv);
    var base = draw.color;
    if draw.params.y > 0.5 {
        base = shade(in);
    }
    return base * texel;
}
"#;
