use holocron_files_derive_parseable::Parse;
use num_enum::TryFromPrimitive;

use crate::ParserError;
use crate::common::types::C2Vector;

#[derive(Debug, Copy, Clone, PartialEq, Parse)]
pub struct TerrainInfo {
    pub map_size: f32,
    pub water_height: f32,
    pub flags: u32,
}

impl TerrainInfo {
    pub const WATER_ENABLED: u32 = 0x1;
    /// Planets are 16km wide, anything beyond a few times that is garbage.
    pub const MAX_MAP_SIZE: f32 = 65536.0;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum AffectorOperation {
    Replace = 0,
    Add = 1,
    Subtract = 2,
    Multiply = 3,
}

impl AffectorOperation {
    pub fn apply(&self, current: f32, value: f32) -> f32 {
        match self {
            AffectorOperation::Replace => value,
            AffectorOperation::Add => current + value,
            AffectorOperation::Subtract => current - value,
            AffectorOperation::Multiply => current * value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    Circle {
        center: C2Vector,
        radius: f32,
        feather: f32,
    },
    Rectangle {
        min: C2Vector,
        max: C2Vector,
        feather: f32,
    },
    Polygon {
        points: Vec<C2Vector>,
        feather: f32,
    },
    Polyline {
        points: Vec<C2Vector>,
        width: f32,
        feather: f32,
    },
}

fn distance(a: C2Vector, b: C2Vector) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

fn distance_to_segment(p: C2Vector, a: C2Vector, b: C2Vector) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return distance(p, a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    distance(p, C2Vector {
        x: a.x + t * dx,
        y: a.y + t * dy,
    })
}

fn polygon_contains(points: &[C2Vector], p: C2Vector) -> bool {
    let mut inside = false;
    let mut j = points.len().wrapping_sub(1);
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Maps the distance to the boundary edge (positive inside) to a weight.
fn feathered(depth: f32, feather: f32) -> f32 {
    if depth < 0.0 {
        0.0
    } else if feather <= 0.0 || depth >= feather {
        1.0
    } else {
        depth / feather
    }
}

impl Boundary {
    /// 1 inside beyond the feather band, linear from 0 to 1 within the band, 0 outside.
    pub fn weight(&self, x: f32, y: f32) -> f32 {
        let p = C2Vector { x, y };
        match self {
            Boundary::Circle {
                center,
                radius,
                feather,
            } => feathered(radius - distance(p, *center), *feather),
            Boundary::Rectangle { min, max, feather } => {
                let depth = (p.x - min.x).min(max.x - p.x).min(p.y - min.y).min(max.y - p.y);
                feathered(depth, *feather)
            }
            Boundary::Polygon { points, feather } => {
                if points.len() < 3 || !polygon_contains(points, p) {
                    return 0.0;
                }
                let depth = points
                    .iter()
                    .zip(points.iter().cycle().skip(1))
                    .map(|(a, b)| distance_to_segment(p, *a, *b))
                    .fold(f32::INFINITY, f32::min);
                feathered(depth, *feather)
            }
            Boundary::Polyline {
                points,
                width,
                feather,
            } => {
                let nearest = match points.len() {
                    0 => return 0.0,
                    1 => distance(p, points[0]),
                    _ => points
                        .windows(2)
                        .map(|seg| distance_to_segment(p, seg[0], seg[1]))
                        .fold(f32::INFINITY, f32::min),
                };
                feathered(width * 0.5 - nearest, *feather)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Affector {
    ConstantHeight {
        operation: AffectorOperation,
        height: f32,
    },
    SlopeHeight {
        operation: AffectorOperation,
        base: f32,
        slope_x: f32,
        slope_y: f32,
    },
}

impl Affector {
    /// Blends the affected height into `current` by `weight`.
    pub fn apply(&self, current: f32, x: f32, y: f32, weight: f32) -> f32 {
        let (operation, value) = match self {
            Affector::ConstantHeight { operation, height } => (operation, *height),
            Affector::SlopeHeight {
                operation,
                base,
                slope_x,
                slope_y,
            } => (operation, base + slope_x * x + slope_y * y),
        };

        let target = operation.apply(current, value);
        current + (target - current) * weight
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerEntry {
    Affector(Affector),
    Layer(TerrainLayer),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainLayer {
    pub name: String,
    pub enabled: bool,
    pub boundaries: Vec<Boundary>,
    /// Affectors and sub layers, in source order
    pub entries: Vec<LayerEntry>,
}

impl TerrainLayer {
    /// Without boundaries a layer covers the whole map, otherwise the strongest boundary wins.
    pub fn weight(&self, x: f32, y: f32) -> f32 {
        if self.boundaries.is_empty() {
            return 1.0;
        }

        self.boundaries
            .iter()
            .map(|boundary| boundary.weight(x, y))
            .fold(0.0, f32::max)
    }

    pub fn affectors(&self) -> impl Iterator<Item = &Affector> {
        self.entries.iter().filter_map(|entry| match entry {
            LayerEntry::Affector(affector) => Some(affector),
            LayerEntry::Layer(_) => None,
        })
    }

    pub fn sub_layers(&self) -> impl Iterator<Item = &TerrainLayer> {
        self.entries.iter().filter_map(|entry| match entry {
            LayerEntry::Layer(layer) => Some(layer),
            LayerEntry::Affector(_) => None,
        })
    }

    fn apply(&self, height: f32, x: f32, y: f32, parent_weight: f32) -> f32 {
        if !self.enabled {
            return height;
        }

        let weight = self.weight(x, y) * parent_weight;
        if weight <= 0.0 {
            return height;
        }

        self.entries.iter().fold(height, |height, entry| match entry {
            LayerEntry::Affector(affector) => affector.apply(height, x, y, weight),
            LayerEntry::Layer(layer) => layer.apply(height, x, y, weight),
        })
    }
}

/// A procedural terrain description. Heights are computed on demand, nothing is baked.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainAsset {
    pub info: TerrainInfo,
    pub layers: Vec<TerrainLayer>,
}

impl TerrainAsset {
    pub const MAX_GRID_SAMPLES: usize = 4096 * 4096;

    pub fn map_size(&self) -> f32 {
        self.info.map_size
    }

    /// The flag is informational, the water table is used either way.
    pub fn water_enabled(&self) -> bool {
        self.info.flags & TerrainInfo::WATER_ENABLED != 0
    }

    pub fn water_height(&self) -> f32 {
        self.info.water_height
    }

    /// Starts at the water table and applies every layer on top.
    pub fn height_at(&self, x: f32, y: f32) -> f32 {
        self.layers
            .iter()
            .fold(self.water_height(), |height, layer| layer.apply(height, x, y, 1.0))
    }

    /// Row-major heights of a `rows` x `cols` grid starting at the origin. Grids with more than
    /// [`TerrainAsset::MAX_GRID_SAMPLES`] samples are refused.
    pub fn sample_grid(
        &self,
        origin_x: f32,
        origin_y: f32,
        spacing: f32,
        rows: usize,
        cols: usize,
    ) -> Result<Vec<f32>, ParserError> {
        let count = rows
            .checked_mul(cols)
            .filter(|count| *count <= Self::MAX_GRID_SAMPLES)
            .ok_or(ParserError::FormatError {
                reason: "Sample grid is too large",
            })?;

        let mut heights = Vec::with_capacity(count);
        for row in 0..rows {
            let y = origin_y + row as f32 * spacing;
            for col in 0..cols {
                heights.push(self.height_at(origin_x + col as f32 * spacing, y));
            }
        }
        Ok(heights)
    }
}
