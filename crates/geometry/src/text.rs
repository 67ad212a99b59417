use crate::{Geometry, GeometryError, Topology};
use glam::{Vec2, Vec3};
use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment};
use lyon_path::Path;
use lyon_path::math::point;
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};
use std::f32::consts::FRAC_PI_2;
use textscene_assets::{Font, GlyphOutline, OutlineCommand};

const EPSILON: f32 = 1e-7;

/// Bevel applied around the front and back edges of extruded text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BevelParams {
    /// How far the bevel reaches along the extrusion axis.
    pub thickness: f32,
    /// How far the bevel pushes the outline outwards.
    pub size: f32,
    /// Outline offset at the start of the bevel.
    pub offset: f32,
    pub segments: u32,
}

/// Extruded text settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextParams {
    /// Em size in scene units.
    pub size: f32,
    /// Extrusion depth along +Z, not counting the bevel.
    pub depth: f32,
    /// Points sampled per outline curve.
    pub curve_segments: u32,
    pub bevel: Option<BevelParams>,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            size: 0.5,
            depth: 0.2,
            curve_segments: 12,
            bevel: Some(BevelParams {
                thickness: 0.03,
                size: 0.02,
                offset: 0.0,
                segments: 5,
            }),
        }
    }
}

/// A closed polygon with the offset direction for each vertex.
struct Contour {
    points: Vec<Vec2>,
    bevel_dirs: Vec<Vec2>,
}

impl Contour {
    fn new(points: Vec<Vec2>) -> Self {
        let bevel_dirs = bevel_directions(&points);
        Self { points, bevel_dirs }
    }

    fn expanded(&self, amount: f32) -> impl Iterator<Item = Vec2> + '_ {
        self.points
            .iter()
            .zip(&self.bevel_dirs)
            .map(move |(p, d)| *p + *d * amount)
    }
}

/// One ring of the extrusion: outline offset at a given depth.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layer {
    z: f32,
    offset: f32,
}

/// Build extruded, bevelled text geometry with flat normals.
///
/// The front cap faces -Z, the back cap +Z; the geometry is not centred.
pub fn text_geometry(
    font: &Font,
    text: &str,
    params: TextParams,
) -> Result<Geometry, GeometryError> {
    let layers = extrusion_layers(params.depth, params.bevel);
    let mut builder = MeshBuilder::default();

    for outline in font.layout(text, params.size) {
        let contours = glyph_contours(&outline, params.curve_segments.max(1));
        if contours.is_empty() {
            continue;
        }
        builder.caps(&contours, &layers)?;
        for contour in &contours {
            builder.sides(contour, &layers);
        }
    }

    if builder.positions.is_empty() {
        return Err(GeometryError::EmptyOutline(text.to_string()));
    }

    tracing::debug!(
        "text {text:?}: {} vertices, {} triangles",
        builder.positions.len(),
        builder.indices.len() / 3
    );

    Ok(Geometry::new(
        Topology::Triangles,
        builder.positions,
        builder.normals,
        builder.indices,
    ))
}

/// Layers from the front cap to the back cap, in increasing z.
fn extrusion_layers(depth: f32, bevel: Option<BevelParams>) -> Vec<Layer> {
    let Some(bevel) = bevel.filter(|b| b.segments > 0) else {
        return vec![
            Layer { z: 0.0, offset: 0.0 },
            Layer { z: depth, offset: 0.0 },
        ];
    };

    let ring = |b: u32| {
        let t = b as f32 / bevel.segments as f32;
        let angle = t * FRAC_PI_2;
        (
            bevel.thickness * angle.cos(),
            bevel.size * angle.sin() + bevel.offset,
        )
    };
    let full = bevel.size + bevel.offset;

    let mut layers = Vec::with_capacity(2 * bevel.segments as usize + 2);
    for b in 0..bevel.segments {
        let (z, offset) = ring(b);
        layers.push(Layer { z: -z, offset });
    }
    layers.push(Layer { z: 0.0, offset: full });
    layers.push(Layer { z: depth, offset: full });
    for b in (0..bevel.segments).rev() {
        let (z, offset) = ring(b);
        layers.push(Layer {
            z: depth + z,
            offset,
        });
    }
    layers
}

/// Flatten a glyph outline into closed contours, solids counter-clockwise
/// and holes clockwise.
fn glyph_contours(outline: &GlyphOutline, curve_segments: u32) -> Vec<Contour> {
    let mut rings: Vec<Vec<Vec2>> = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    let mut cursor = Vec2::ZERO;

    let to_lyon = |v: Vec2| point(v.x, v.y);
    let from_lyon = |p: lyon_path::math::Point| Vec2::new(p.x, p.y);

    for cmd in &outline.commands {
        match *cmd {
            OutlineCommand::MoveTo(p) => {
                rings.push(std::mem::take(&mut current));
                current.push(p);
                cursor = p;
            }
            OutlineCommand::LineTo(p) => {
                current.push(p);
                cursor = p;
            }
            OutlineCommand::QuadTo { ctrl, to } => {
                let seg = QuadraticBezierSegment {
                    from: to_lyon(cursor),
                    ctrl: to_lyon(ctrl),
                    to: to_lyon(to),
                };
                for i in 1..=curve_segments {
                    current.push(from_lyon(seg.sample(i as f32 / curve_segments as f32)));
                }
                cursor = to;
            }
            OutlineCommand::CubicTo { ctrl1, ctrl2, to } => {
                let seg = CubicBezierSegment {
                    from: to_lyon(cursor),
                    ctrl1: to_lyon(ctrl1),
                    ctrl2: to_lyon(ctrl2),
                    to: to_lyon(to),
                };
                for i in 1..=curve_segments {
                    current.push(from_lyon(seg.sample(i as f32 / curve_segments as f32)));
                }
                cursor = to;
            }
        }
    }
    rings.push(current);

    let rings: Vec<Vec<Vec2>> = rings
        .into_iter()
        .map(clean_ring)
        .filter(|r| r.len() >= 3 && signed_area(r).abs() > EPSILON)
        .collect();

    rings
        .iter()
        .enumerate()
        .map(|(i, ring)| {
            let depth = rings
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && contains(other, ring[0]))
                .count();
            let is_hole = depth % 2 == 1;
            let mut points = ring.clone();
            let ccw = signed_area(&points) > 0.0;
            if ccw == is_hole {
                points.reverse();
            }
            Contour::new(points)
        })
        .collect()
}

/// Drop consecutive duplicates and a trailing copy of the first point.
fn clean_ring(mut ring: Vec<Vec2>) -> Vec<Vec2> {
    ring.dedup_by(|a, b| a.distance_squared(*b) < EPSILON * EPSILON);
    while ring.len() > 1 && ring[0].distance_squared(ring[ring.len() - 1]) < EPSILON * EPSILON {
        ring.pop();
    }
    ring
}

fn signed_area(ring: &[Vec2]) -> f32 {
    let n = ring.len();
    (0..n)
        .map(|i| ring[i].perp_dot(ring[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

/// Even-odd point in polygon test.
fn contains(ring: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Per-vertex direction that pushes the outline away from the filled
/// region, mitred at corners and capped at sqrt(2) in length.
fn bevel_directions(points: &[Vec2]) -> Vec<Vec2> {
    let n = points.len();
    // Right-hand normal; outward for counter-clockwise solids and
    // clockwise holes alike.
    let edge_normal = |a: Vec2, b: Vec2| {
        let d = (b - a).normalize_or_zero();
        Vec2::new(d.y, -d.x)
    };

    (0..n)
        .map(|i| {
            let prev = points[(i + n - 1) % n];
            let here = points[i];
            let next = points[(i + 1) % n];
            let n1 = edge_normal(prev, here);
            let n2 = edge_normal(here, next);
            let sum = n1 + n2;
            if sum.length_squared() < EPSILON {
                return n1;
            }
            let dir = sum.normalize();
            let cos_half = dir.dot(n1).max(EPSILON);
            let miter = dir / cos_half;
            if miter.length_squared() > 2.0 {
                dir * std::f32::consts::SQRT_2
            } else {
                miter
            }
        })
        .collect()
}

#[derive(Default)]
struct MeshBuilder {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    /// Tessellate the glyph's cap outline and emit it at the first and last
    /// layer.
    fn caps(&mut self, contours: &[Contour], layers: &[Layer]) -> Result<(), GeometryError> {
        let (Some(front), Some(back)) = (layers.first(), layers.last()) else {
            return Ok(());
        };

        let mut path = Path::builder();
        for contour in contours {
            let mut pts = contour.expanded(front.offset);
            let Some(first) = pts.next() else {
                continue;
            };
            path.begin(point(first.x, first.y));
            for p in pts {
                path.line_to(point(p.x, p.y));
            }
            path.end(true);
        }
        let path = path.build();

        let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
        FillTessellator::new().tessellate_path(
            &path,
            &FillOptions::default().with_fill_rule(FillRule::EvenOdd),
            &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| {
                Vec2::new(v.position().x, v.position().y)
            }),
        )?;

        // The outermost layers share an offset, so one tessellation serves
        // both caps.
        for (z, normal, flip) in [(front.z, Vec3::NEG_Z, true), (back.z, Vec3::Z, false)] {
            let base = self.positions.len() as u32;
            for v in &buffers.vertices {
                self.positions.push(v.extend(z));
                self.normals.push(normal);
            }
            for tri in buffers.indices.chunks_exact(3) {
                let [a, b, c] = [tri[0], tri[1], tri[2]];
                let (pa, pb, pc) = (
                    buffers.vertices[a as usize],
                    buffers.vertices[b as usize],
                    buffers.vertices[c as usize],
                );
                let ccw = (pb - pa).perp_dot(pc - pa) > 0.0;
                // Counter-clockwise when seen from the side the normal faces.
                if ccw != flip {
                    self.indices.extend_from_slice(&[base + a, base + b, base + c]);
                } else {
                    self.indices.extend_from_slice(&[base + a, base + c, base + b]);
                }
            }
        }
        Ok(())
    }

    /// Walls between successive layers, one flat quad per contour edge.
    fn sides(&mut self, contour: &Contour, layers: &[Layer]) {
        let n = contour.points.len();
        for pair in layers.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            let ring_lo: Vec<Vec2> = contour.expanded(lo.offset).collect();
            let ring_hi: Vec<Vec2> = contour.expanded(hi.offset).collect();
            for i in 0..n {
                let j = (i + 1) % n;
                let a = ring_lo[i].extend(lo.z);
                let b = ring_lo[j].extend(lo.z);
                let c = ring_hi[j].extend(hi.z);
                let d = ring_hi[i].extend(hi.z);
                self.quad(a, b, c, d);
            }
        }
    }

    fn quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        let normal = (c - a).cross(d - b);
        if normal.length_squared() < EPSILON * EPSILON {
            return;
        }
        let normal = normal.normalize();
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&[a, b, c, d]);
        self.normals.extend_from_slice(&[normal; 4]);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}
