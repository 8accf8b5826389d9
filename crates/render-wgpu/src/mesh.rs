use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use nutshell_render::Geometry;
use std::f32::consts::{PI, TAU};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Topology {
    Triangles,
    Lines,
}

/// CPU-side mesh before upload.
#[derive(Debug, Clone)]
pub(crate) struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl MeshData {
    pub fn for_geometry(geometry: &Geometry) -> Self {
        match *geometry {
            Geometry::Cube { half_extent } => skybox_cube(half_extent),
            Geometry::Sphere {
                radius,
                segments,
                wireframe: false,
            } => uv_sphere(radius, segments, segments),
            Geometry::Sphere {
                radius,
                segments,
                wireframe: true,
            } => wire_sphere(radius, segments, segments),
            Geometry::Line { from, to } => line(from, to),
        }
    }
}

/// Generate a cube whose faces point inward, each face mapping the whole
/// texture once.
fn skybox_cube(half_extent: f32) -> MeshData {
    let h = half_extent;
    // (normal, corners counter-clockwise seen from inside)
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([ 0.0,  0.0,  1.0], [[-h, -h, -h], [ h, -h, -h], [ h,  h, -h], [-h,  h, -h]]), // back
        ([ 0.0,  0.0, -1.0], [[ h, -h,  h], [-h, -h,  h], [-h,  h,  h], [ h,  h,  h]]), // front
        ([-1.0,  0.0,  0.0], [[ h, -h, -h], [ h, -h,  h], [ h,  h,  h], [ h,  h, -h]]), // right
        ([ 1.0,  0.0,  0.0], [[-h, -h,  h], [-h, -h, -h], [-h,  h, -h], [-h,  h,  h]]), // left
        ([ 0.0, -1.0,  0.0], [[-h,  h, -h], [ h,  h, -h], [ h,  h,  h], [-h,  h,  h]]), // top
        ([ 0.0,  1.0,  0.0], [[-h, -h,  h], [ h, -h,  h], [ h, -h, -h], [-h, -h, -h]]), // bottom
    ];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        for (position, uv) in corners.into_iter().zip(uvs) {
            vertices.push(Vertex {
                position,
                normal,
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    MeshData {
        vertices,
        indices,
        topology: Topology::Triangles,
    }
}

/// Sphere around the z axis, `slices` around and `stacks` from +z to -z.
///
/// The seam column is duplicated so the texture wraps once around; `v` runs
/// from 0 at the +z pole to 1 at the -z pole.
fn sphere_vertices(radius: f32, slices: u32, stacks: u32) -> Vec<Vertex> {
    let slices = slices.max(3);
    let stacks = stacks.max(2);
    let mut vertices = Vec::with_capacity(((slices + 1) * (stacks + 1)) as usize);
    for i in 0..=stacks {
        let rho = PI * i as f32 / stacks as f32;
        let (sin_rho, cos_rho) = rho.sin_cos();
        for j in 0..=slices {
            let theta = if j == slices {
                0.0
            } else {
                TAU * j as f32 / slices as f32
            };
            let (sin_theta, cos_theta) = theta.sin_cos();
            let normal = [-sin_theta * sin_rho, cos_theta * sin_rho, cos_rho];
            vertices.push(Vertex {
                position: normal.map(|c| c * radius),
                normal,
                uv: [j as f32 / slices as f32, i as f32 / stacks as f32],
            });
        }
    }
    vertices
}

fn uv_sphere(radius: f32, slices: u32, stacks: u32) -> MeshData {
    let vertices = sphere_vertices(radius, slices, stacks);
    let (slices, stacks) = (slices.max(3), stacks.max(2));
    let row = slices + 1;

    let mut indices = Vec::with_capacity((slices * stacks * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    MeshData {
        vertices,
        indices,
        topology: Topology::Triangles,
    }
}

/// Parallels and meridians of a sphere as a line list.
fn wire_sphere(radius: f32, slices: u32, stacks: u32) -> MeshData {
    let vertices = sphere_vertices(radius, slices, stacks);
    let (slices, stacks) = (slices.max(3), stacks.max(2));
    let row = slices + 1;

    let mut indices = Vec::new();
    // the pole rings collapse to a point, skip them
    for i in 1..stacks {
        for j in 0..slices {
            let a = i * row + j;
            indices.extend_from_slice(&[a, a + 1]);
        }
    }
    for j in 0..slices {
        for i in 0..stacks {
            let a = i * row + j;
            indices.extend_from_slice(&[a, a + row]);
        }
    }
    MeshData {
        vertices,
        indices,
        topology: Topology::Lines,
    }
}

fn line(from: Vec3, to: Vec3) -> MeshData {
    let normal = (to - from).normalize_or_zero().to_array();
    MeshData {
        vertices: vec![
            Vertex {
                position: from.to_array(),
                normal,
                uv: [0.0, 0.0],
            },
            Vertex {
                position: to.to_array(),
                normal,
                uv: [1.0, 0.0],
            },
        ],
        indices: vec![0, 1],
        topology: Topology::Lines,
    }
}

/// Uploaded mesh.
pub(crate) struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub topology: Topology,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            topology: data.topology,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_quads() {
        let mesh = skybox_cube(2000.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() == 2000.0)));
    }

    #[test]
    fn sphere_counts() {
        let mesh = uv_sphere(5.0, 100, 100);
        assert_eq!(mesh.vertices.len(), 101 * 101);
        assert_eq!(mesh.indices.len(), 100 * 100 * 6);
        assert_eq!(mesh.topology, Topology::Triangles);
        let max = *mesh.indices.iter().max().unwrap();
        assert!((max as usize) < mesh.vertices.len());
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = uv_sphere(5.4, 12, 8);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 5.4).abs() < 1e-4);
        }
        // +z pole at the top of the texture
        assert_eq!(mesh.vertices[0].uv[1], 0.0);
        assert!((mesh.vertices[0].position[2] - 5.4).abs() < 1e-4);
    }

    #[test]
    fn seam_column_wraps_texture_once() {
        let mesh = uv_sphere(1.0, 4, 2);
        let equator = &mesh.vertices[5..10];
        assert_eq!(equator[0].uv[0], 0.0);
        assert_eq!(equator[4].uv[0], 1.0);
        assert_eq!(equator[0].position, equator[4].position);
    }

    #[test]
    fn wire_sphere_is_lines() {
        let mesh = wire_sphere(5.1, 50, 50);
        assert_eq!(mesh.topology, Topology::Lines);
        assert_eq!(mesh.indices.len() % 2, 0);
        let parallels = 49 * 50 * 2;
        let meridians = 50 * 50 * 2;
        assert_eq!(mesh.indices.len(), parallels + meridians);
    }

    #[test]
    fn geometry_maps_to_mesh() {
        let line = MeshData::for_geometry(&Geometry::Line {
            from: Vec3::new(0.0, 0.0, -10.0),
            to: Vec3::new(0.0, 0.0, 10.0),
        });
        assert_eq!(line.vertices.len(), 2);
        assert_eq!(line.topology, Topology::Lines);

        let wire = MeshData::for_geometry(&Geometry::Sphere {
            radius: 1.0,
            segments: 8,
            wireframe: true,
        });
        assert_eq!(wire.topology, Topology::Lines);
    }
}
