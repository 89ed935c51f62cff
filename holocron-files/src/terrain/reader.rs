use std::io::Read;

use holocron_files_derive_parseable::Parse;
use log::debug;

use crate::ParserError;
use crate::common::iff::{IffChunk, IffForm, IffNode};
use crate::common::reader::{Parseable, expect_exhausted, read_counted_array, read_cstring};
use crate::common::types::{C2Vector, Tag};
use crate::terrain::types::{
    Affector, AffectorOperation, Boundary, LayerEntry, TerrainAsset, TerrainInfo, TerrainLayer,
};

const PTAT: Tag = *b"PTAT";
const PTAT_VERSION: Tag = *b"0001";
const LYRS: Tag = *b"LYRS";
const LAYR: Tag = *b"LAYR";

#[derive(Debug, Parse)]
struct CircleData {
    center_x: f32,
    center_y: f32,
    radius: f32,
    feather: f32,
}

#[derive(Debug, Parse)]
struct RectangleData {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    feather: f32,
}

#[derive(Debug, Parse)]
struct ConstantHeightData {
    operation: u32,
    height: f32,
}

#[derive(Debug, Parse)]
struct SlopeHeightData {
    operation: u32,
    base: f32,
    slope_x: f32,
    slope_y: f32,
}

pub struct TerrainReader {}

impl TerrainReader {
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<TerrainAsset, ParserError> {
        let root = IffForm::read_root(rdr, &PTAT)?;
        let version = root.version(&[PTAT_VERSION])?;

        let info = version.get_mandatory_chunk_by_name::<TerrainInfo>(b"INFO")?;
        if !(info.map_size > 0.0 && info.map_size <= TerrainInfo::MAX_MAP_SIZE) {
            return Err(ParserError::FormatError {
                reason: "Map size is out of range",
            });
        }
        let layers = match version.form(&LYRS) {
            Some(lyrs) => lyrs
                .forms_named(&LAYR)
                .map(parse_layer)
                .collect::<Result<Vec<_>, ParserError>>()?,
            None => Vec::new(),
        };

        Ok(TerrainAsset { info, layers })
    }
}

fn operation(raw: u32) -> Result<AffectorOperation, ParserError> {
    AffectorOperation::try_from(raw).map_err(|_| ParserError::FormatError {
        reason: "Unknown affector operation",
    })
}

fn parse_polygon(chunk: &IffChunk) -> Result<(Vec<C2Vector>, f32), ParserError> {
    let mut rdr = chunk.reader();
    let points = read_counted_array::<C2Vector, _>(&mut rdr)?;
    Ok((points, f32::parse(&mut rdr)?))
}

fn parse_layer(form: &IffForm) -> Result<TerrainLayer, ParserError> {
    let mut header = form.mandatory_chunk(b"IHDR")?.reader();
    let enabled = u32::parse(&mut header)? != 0;
    let name = read_cstring(&mut header)?;

    let mut boundaries = Vec::new();
    let mut entries = Vec::new();
    for node in &form.children {
        let chunk = match node {
            IffNode::Form(sub) if sub.form_type == LAYR => {
                entries.push(LayerEntry::Layer(parse_layer(sub)?));
                continue;
            }
            IffNode::Form(sub) => {
                debug!("Skipping FORM {} inside of layer {}", sub.form_type_str(), name);
                continue;
            }
            IffNode::Chunk(chunk) => chunk,
        };

        match &chunk.tag {
            b"IHDR" => {}
            b"BCIR" => {
                let data = chunk.parse::<CircleData>()?;
                boundaries.push(Boundary::Circle {
                    center: C2Vector {
                        x: data.center_x,
                        y: data.center_y,
                    },
                    radius: data.radius,
                    feather: data.feather,
                });
            }
            b"BREC" => {
                let data = chunk.parse::<RectangleData>()?;
                boundaries.push(Boundary::Rectangle {
                    min: C2Vector {
                        x: data.x1.min(data.x2),
                        y: data.y1.min(data.y2),
                    },
                    max: C2Vector {
                        x: data.x1.max(data.x2),
                        y: data.y1.max(data.y2),
                    },
                    feather: data.feather,
                });
            }
            b"BPOL" => {
                let (points, feather) = parse_polygon(chunk)?;
                boundaries.push(Boundary::Polygon { points, feather });
            }
            b"BPLN" => {
                let mut rdr = chunk.reader();
                let points = read_counted_array::<C2Vector, _>(&mut rdr)?;
                let width = f32::parse(&mut rdr)?;
                let feather = f32::parse(&mut rdr)?;
                expect_exhausted(&mut rdr, "Trailing data inside of BPLN")?;
                boundaries.push(Boundary::Polyline {
                    points,
                    width,
                    feather,
                });
            }
            b"AHCN" => {
                let data = chunk.parse::<ConstantHeightData>()?;
                entries.push(LayerEntry::Affector(Affector::ConstantHeight {
                    operation: operation(data.operation)?,
                    height: data.height,
                }));
            }
            b"AHSL" => {
                let data = chunk.parse::<SlopeHeightData>()?;
                entries.push(LayerEntry::Affector(Affector::SlopeHeight {
                    operation: operation(data.operation)?,
                    base: data.base,
                    slope_x: data.slope_x,
                    slope_y: data.slope_y,
                }));
            }
            _ => debug!("Skipping unsupported {} inside of layer {}", chunk.tag_str(), name),
        }
    }

    Ok(TerrainLayer {
        name,
        enabled,
        boundaries,
        entries,
    })
}
