//! Native line-oriented mesh text format.
//!
//! ```text
//! v <x> <y>              # vertex, 0-based implicit index
//! t <i0> <i1> <i2>       # triangle over vertex indices
//! l <i0> <i1> <i2> <lbl> # phase label for a declared triangle
//! ```
//!
//! Blank lines and `#` comments are skipped. Unlabeled triangles take the
//! default label. Writing emits vertices, triangles, then labels, each in
//! ascending handle order, so output is deterministic and `read(write(m))`
//! is isomorphic to `m`.

use std::io::{BufRead, Write};

use hashbrown::HashMap;

use crate::engine::MeshEngine;
use crate::mesh_error::MeshMorphError;
use crate::phase::PhaseLabel;

fn parse_token<T: std::str::FromStr>(
    token: Option<&str>,
    line: usize,
    what: &str,
) -> Result<T, MeshMorphError> {
    let token = token.ok_or_else(|| MeshMorphError::MeshIoParse {
        line,
        message: format!("missing {what}"),
    })?;
    token.parse().map_err(|_| MeshMorphError::MeshIoParse {
        line,
        message: format!("unparsable {what} `{token}`"),
    })
}

fn expect_end(
    mut tokens: std::str::SplitWhitespace<'_>,
    line: usize,
) -> Result<(), MeshMorphError> {
    match tokens.next() {
        None => Ok(()),
        Some(extra) => Err(MeshMorphError::MeshIoParse {
            line,
            message: format!("unexpected trailing token `{extra}`"),
        }),
    }
}

/// Parse a mesh from text and load it into an engine.
pub fn read_mesh<R: BufRead>(reader: R) -> Result<MeshEngine, MeshMorphError> {
    let mut coordinates: Vec<[f64; 2]> = Vec::new();
    let mut triangles: Vec<[usize; 3]> = Vec::new();
    let mut labels: Vec<PhaseLabel> = Vec::new();
    // Sorted vertex triple to triangle index, for label records.
    let mut triangle_index: HashMap<[usize; 3], usize> = HashMap::new();

    for (line_index, line) in reader.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line.map_err(|e| MeshMorphError::MeshIoRead(e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let x = parse_token(tokens.next(), line_number, "x coordinate")?;
                let y = parse_token(tokens.next(), line_number, "y coordinate")?;
                expect_end(tokens, line_number)?;
                coordinates.push([x, y]);
            }
            Some("t") => {
                let mut indices = [0usize; 3];
                for slot in &mut indices {
                    *slot = parse_token(tokens.next(), line_number, "vertex index")?;
                }
                expect_end(tokens, line_number)?;
                let mut key = indices;
                key.sort_unstable();
                triangle_index.insert(key, triangles.len());
                triangles.push(indices);
                labels.push(PhaseLabel::default());
            }
            Some("l") => {
                let mut indices = [0usize; 3];
                for slot in &mut indices {
                    *slot = parse_token(tokens.next(), line_number, "vertex index")?;
                }
                let label: u32 = parse_token(tokens.next(), line_number, "label")?;
                expect_end(tokens, line_number)?;
                let mut key = indices;
                key.sort_unstable();
                let &index = triangle_index.get(&key).ok_or(
                    MeshMorphError::LabelForUnknownTriangle {
                        i0: indices[0],
                        i1: indices[1],
                        i2: indices[2],
                    },
                )?;
                labels[index] = PhaseLabel(label);
            }
            Some(other) => {
                return Err(MeshMorphError::MeshIoParse {
                    line: line_number,
                    message: format!("unknown record `{other}`"),
                });
            }
            None => unreachable!("blank lines are skipped"),
        }
    }

    MeshEngine::from_static_mesh(&coordinates, &triangles, &labels)
}

/// Parse a mesh from an in-memory string.
pub fn read_mesh_str(text: &str) -> Result<MeshEngine, MeshMorphError> {
    read_mesh(text.as_bytes())
}

/// Write the mesh in the native text format, deterministically.
///
/// Vertices are emitted in ascending handle order under their current
/// positions; triangle and label records follow in ascending handle order.
pub fn write_mesh<W: Write>(engine: &MeshEngine, mut writer: W) -> Result<(), MeshMorphError> {
    let complex = engine.complex();
    let positions = engine.positions();
    let io_err = |e: std::io::Error| MeshMorphError::MeshIoWrite(e.to_string());

    let mut output_index: HashMap<u32, usize> = HashMap::new();
    for (index, v) in complex.vertices().enumerate() {
        output_index.insert(v.slot(), index);
        let [x, y] = positions.current(v)?;
        writeln!(writer, "v {x} {y}").map_err(io_err)?;
    }

    let mut label_records = Vec::new();
    for t in complex.triangles() {
        let indices = complex
            .triangle_vertices(t)?
            .map(|v| output_index[&v.slot()]);
        writeln!(writer, "t {} {} {}", indices[0], indices[1], indices[2]).map_err(io_err)?;
        label_records.push((indices, complex.triangle_label(t)?));
    }
    for (indices, label) in label_records {
        writeln!(
            writer,
            "l {} {} {} {}",
            indices[0], indices[1], indices[2], label
        )
        .map_err(io_err)?;
    }
    Ok(())
}

/// Write the mesh to a fresh string.
pub fn write_mesh_string(engine: &MeshEngine) -> Result<String, MeshMorphError> {
    let mut buffer = Vec::new();
    write_mesh(engine, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| MeshMorphError::MeshIoWrite(e.to_string()))
}
