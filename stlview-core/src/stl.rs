/// STL decoding for binary and ASCII files
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::{count, many0, many1},
    number::complete::{float, le_f32, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::StlError;
use crate::geometry::{Mesh, Triangle, Vertex};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, StlError> {
    let (body, declared) = triangle_count(data).map_err(|_| StlError::TooSmall(data.len()))?;
    let declared = declared as usize;
    let available = body.len() / FACET_LEN;
    if available < declared {
        return Err(StlError::Truncated {
            declared,
            available,
        });
    }

    match count(binary_facet, declared)(body) {
        Ok((_, triangles)) => Ok(Mesh { triangles }),
        // Lengths are checked above, so only a corrupt count can land here.
        Err(_) => Err(StlError::Truncated {
            declared,
            available,
        }),
    }
}

/// Skip the header and read the declared facet count
fn triangle_count(input: &[u8]) -> IResult<&[u8], u32> {
    preceded(take(HEADER_LEN), le_u32)(input)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, (nx, ny, nz)) = tuple((le_f32, le_f32, le_f32))(input)?;
    let (input, corners) = count(tuple((le_f32, le_f32, le_f32)), 3)(input)?;
    // Attribute byte count, unused
    let (input, _) = take(2usize)(input)?;

    let v = |(x, y, z): (f32, f32, f32)| Vertex::new(x, y, z, nx, ny, nz);
    Ok((input, Triangle::new(v(corners[0]), v(corners[1]), v(corners[2]))))
}

/// Parse an ASCII STL file. Consecutive `solid` blocks are merged into one
/// mesh; anything but whitespace after the last block is an error.
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, StlError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    match parse_ascii_stl_impl(input) {
        Ok(("", mesh)) => Ok(mesh),
        Ok((rest, _)) => {
            let line = rest.lines().next().unwrap_or(rest);
            Err(StlError::Ascii(format!("unexpected input after endsolid: {line:?}")))
        }
        Err(e) => Err(StlError::Ascii(format!("{:?}", e))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, solids) = many1(parse_solid)(input)?;
    let (input, _) = multispace0(input)?;
    let triangles = solids.into_iter().flatten().collect();
    Ok((input, Mesh { triangles }))
}

fn parse_solid(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    // Optional solid name runs to the end of the line
    let (input, _) = not_line_ending(input)?;
    let (input, triangles) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = not_line_ending(input)?;
    Ok((input, triangles))
}

fn parse_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input, normal)?;
    let (input, v2) = parse_vertex(input, normal)?;
    let (input, v3) = parse_vertex(input, normal)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, Triangle::new(v1, v2, v3)))
}

fn parse_vertex(input: &str, normal: (f32, f32, f32)) -> IResult<&str, Vertex> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, (x, y, z)) = parse_vector3(input)?;
    Ok((input, Vertex::new(x, y, z, normal.0, normal.1, normal.2)))
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

/// Detect and parse STL data (binary or ASCII).
///
/// Some exporters write binary files whose header starts with `solid`, so a
/// failed ASCII parse falls through to the binary decoder. If that fails
/// too, the ASCII error is the one reported.
pub fn parse_stl(data: &[u8]) -> Result<Mesh, StlError> {
    let mut ascii_error = None;
    if looks_like_ascii(data) {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text) {
                Ok(mesh) => return Ok(mesh),
                Err(err) => ascii_error = Some(err),
            }
        }
    }

    parse_binary_stl(data).map_err(|err| ascii_error.unwrap_or(err))
}

/// `solid` after an optional byte order mark and leading whitespace
fn looks_like_ascii(data: &[u8]) -> bool {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    data[start..].starts_with(b"solid")
}
