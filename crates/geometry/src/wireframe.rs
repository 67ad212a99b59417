use crate::{Geometry, Topology};
use glam::Vec3;
use std::collections::HashSet;

/// Decompose a triangle geometry into its unique edges as line segments.
///
/// Edges are deduplicated by endpoint position, so seams with duplicated
/// vertices still yield a single segment.
pub fn wireframe(geometry: &Geometry) -> Geometry {
    let mut seen: HashSet<([u32; 3], [u32; 3])> = HashSet::new();
    let mut positions = Vec::new();

    let mut push_edge = |a: Vec3, b: Vec3| {
        let (ka, kb) = (position_key(a), position_key(b));
        let key = if ka <= kb { (ka, kb) } else { (kb, ka) };
        if ka != kb && seen.insert(key) {
            positions.push(a);
            positions.push(b);
        }
    };

    match geometry.topology {
        Topology::Triangles => {
            for tri in geometry.indices.chunks_exact(3) {
                let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| geometry.positions[i as usize]);
                push_edge(a, b);
                push_edge(b, c);
                push_edge(c, a);
            }
        }
        Topology::Lines => {
            for seg in geometry.indices.chunks_exact(2) {
                push_edge(
                    geometry.positions[seg[0] as usize],
                    geometry.positions[seg[1] as usize],
                );
            }
        }
    }

    let indices = (0..positions.len() as u32).collect();
    tracing::debug!("wireframe with {} edges", positions.len() / 2);
    Geometry::new(Topology::Lines, positions, Vec::new(), indices)
}

fn position_key(p: Vec3) -> [u32; 3] {
    // +0.0 and -0.0 are the same point.
    let bits = |v: f32| if v == 0.0 { 0 } else { v.to_bits() };
    [bits(p.x), bits(p.y), bits(p.z)]
}
