/// STL scene source: binary and ASCII files into a core mesh
use std::path::{Path, PathBuf};

use log::debug;
use nalgebra::Point3;
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::{all_consuming, map},
    multi::{count, many0},
    number::complete::{double, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};
use plotview_core::{Mesh, Triangle};
use thiserror::Error;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum StlError {
    #[error("file too small to be a binary STL ({0} bytes)")]
    TooShort(usize),
    #[error("binary STL declares {declared} triangles but holds {available}")]
    TriangleCount { declared: usize, available: usize },
    #[error("malformed ASCII STL near '{0}'")]
    Ascii(String),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read and parse an STL file of either flavor.
pub fn load_stl(path: &Path) -> Result<Mesh, StlError> {
    let data = std::fs::read(path).map_err(|source| StlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_stl(&data)?;
    debug!("loaded {} triangles from {}", mesh.triangles.len(), path.display());
    Ok(mesh)
}

/// Detect and parse STL data (binary or ASCII).
///
/// Binary files may also start with `solid` in their header, so text that
/// fails to parse as ASCII is retried as binary before giving up.
pub fn parse_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            return match parse_ascii_stl(text) {
                Ok(mesh) => Ok(mesh),
                Err(ascii) => parse_binary_stl(data).map_err(|_| ascii),
            };
        }
    }

    parse_binary_stl(data)
}

/// Parse a binary STL file. Facet normals are ignored; the view computes
/// its own from the winding.
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooShort(data.len()));
    }

    let truncated = |_| StlError::TooShort(data.len());
    let (body, declared) = binary_header(data).map_err(truncated)?;

    let available = body.len() / FACET_LEN;
    if available < declared {
        return Err(StlError::TriangleCount {
            declared,
            available,
        });
    }

    let (_, triangles) = count(binary_facet, declared)(body).map_err(truncated)?;
    Ok(Mesh { triangles })
}

fn binary_header(input: &[u8]) -> IResult<&[u8], usize> {
    let (input, _) = take(HEADER_LEN)(input)?;
    map(le_u32, |n| n as usize)(input)
}

fn binary_vector(input: &[u8]) -> IResult<&[u8], Point3<f64>> {
    map(tuple((le_f32, le_f32, le_f32)), |(x, y, z)| {
        Point3::new(f64::from(x), f64::from(y), f64::from(z))
    })(input)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, _normal) = binary_vector(input)?;
    let (input, a) = binary_vector(input)?;
    let (input, b) = binary_vector(input)?;
    let (input, c) = binary_vector(input)?;
    let (input, _attribute_bytes) = le_u16(input)?;

    Ok((input, Triangle::new(a, b, c)))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, StlError> {
    match all_consuming(ascii_solid)(input) {
        Ok((_, triangles)) => Ok(Mesh { triangles }),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
            let near: String = e.input.trim_start().chars().take(32).collect();
            Err(StlError::Ascii(near))
        }
        Err(nom::Err::Incomplete(_)) => Err(StlError::Ascii(String::new())),
    }
}

fn ascii_solid(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(ascii_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, _) = multispace0(input)?;

    Ok((input, triangles))
}

fn ascii_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = ascii_vector(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, vertices) = count(ascii_vertex, 3)(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, Triangle::new(vertices[0], vertices[1], vertices[2])))
}

fn ascii_vertex(input: &str) -> IResult<&str, Point3<f64>> {
    preceded(preceded(multispace0, tag("vertex")), ascii_vector)(input)
}

fn ascii_vector(input: &str) -> IResult<&str, Point3<f64>> {
    let (input, x) = preceded(multispace1, double)(input)?;
    let (input, y) = preceded(multispace1, double)(input)?;
    let (input, z) = preceded(multispace1, double)(input)?;
    Ok((input, Point3::new(x, y, z)))
}
