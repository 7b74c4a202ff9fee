use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl CubeVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// One cube of the field: where it sits and its animation phase offset.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct CubeInstance {
    pub offset: [f32; 3],
    pub phase: f32,
}

impl CubeInstance {
    pub const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        2 => Float32x3,
        3 => Float32,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Unit cube (half-extent 0.5), 4 vertices per face so normals stay flat.
pub fn cube() -> (Vec<CubeVertex>, Vec<u16>) {
    // (normal, tangent u, tangent v); u × v == normal keeps faces CCW from outside.
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, u, v) in FACES {
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = std::array::from_fn(|i| 0.5 * (n[i] + su * u[i] + sv * v[i]));
            vertices.push(CubeVertex { position, normal: n });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

/// `side × side` cubes on the XZ plane, centered on the origin.
pub fn field(side: u32, spacing: f32) -> Vec<CubeInstance> {
    let half = (side.saturating_sub(1)) as f32 * 0.5;
    let mut out = Vec::with_capacity((side * side) as usize);
    for z in 0..side {
        for x in 0..side {
            out.push(CubeInstance {
                offset: [(x as f32 - half) * spacing, 0.0, (z as f32 - half) * spacing],
                phase: (x + z) as f32 * 0.45,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    #[test]
    fn cube_has_flat_faces() {
        let (vertices, indices) = cube();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(vertices.iter().all(|v| v.position.iter().all(|c| c.abs() == 0.5)));
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let (vertices, indices) = cube();
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| vertices[tri[i] as usize]);
            let n = cross(sub(b.position, a.position), sub(c.position, a.position));
            let dot: f32 = (0..3).map(|i| n[i] * a.normal[i]).sum();
            assert!(dot > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn field_is_centered() {
        let cubes = field(3, 2.0);
        assert_eq!(cubes.len(), 9);
        assert_eq!(cubes[0].offset, [-2.0, 0.0, -2.0]);
        assert_eq!(cubes[4].offset, [0.0, 0.0, 0.0]);
        assert_eq!(cubes[8].offset, [2.0, 0.0, 2.0]);
    }

    #[test]
    fn gpu_layouts_are_tight() {
        assert_eq!(std::mem::size_of::<CubeVertex>(), 24);
        assert_eq!(std::mem::size_of::<CubeInstance>(), 16);
    }
}
