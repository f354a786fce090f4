//! GML geometry decoding.

use format_shared::{FormatReadError, FormatResult, SourcePosition};
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use roxmltree::Node;

const GEOMETRY_ELEMENTS: &[&str] = &[
    "Point",
    "LineString",
    "LinearRing",
    "Curve",
    "Polygon",
    "Surface",
    "MultiPoint",
    "MultiLineString",
    "MultiCurve",
    "MultiPolygon",
    "MultiSurface",
    "MultiGeometry",
];

/// Returns `true` if `node` is a GML geometry element this crate can decode.
#[must_use]
pub fn is_geometry_element(node: Node<'_, '_>) -> bool {
    node.is_element() && GEOMETRY_ELEMENTS.contains(&node.tag_name().name())
}

/// Decodes GML geometry elements into `geo-types` geometries.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryParser {
    swap_axes: bool,
}

impl GeometryParser {
    /// A parser that swaps the first two ordinates of every position when `swap_axes` is set,
    /// turning (lat, long) input into (x, y).
    #[must_use]
    pub fn new(swap_axes: bool) -> Self {
        Self { swap_axes }
    }

    /// Decodes the geometry rooted at `node`.
    ///
    /// # Errors
    ///
    /// Returns a parse error for unknown geometry elements, malformed numbers or
    /// geometries without positions.
    pub fn parse(&self, node: Node<'_, '_>) -> FormatResult<Geometry<f64>> {
        match node.tag_name().name() {
            "Point" => self.point(node).map(Geometry::Point),
            "LineString" | "LinearRing" | "Curve" => self.line_string(node).map(Geometry::LineString),
            "Polygon" | "PolygonPatch" => self.polygon(node).map(Geometry::Polygon),
            "Surface" => {
                let patch = node
                    .descendants()
                    .find(|n| n.is_element() && n.tag_name().name() == "PolygonPatch")
                    .ok_or_else(|| error_at(node, "Surface without a PolygonPatch"))?;
                self.polygon(patch).map(Geometry::Polygon)
            },
            "MultiPoint" => members(node)
                .map(|m| self.point(m))
                .collect::<FormatResult<Vec<_>>>()
                .map(|points| Geometry::MultiPoint(MultiPoint::new(points))),
            "MultiLineString" | "MultiCurve" => members(node)
                .map(|m| self.line_string(m))
                .collect::<FormatResult<Vec<_>>>()
                .map(|lines| Geometry::MultiLineString(MultiLineString::new(lines))),
            "MultiPolygon" | "MultiSurface" => members(node)
                .map(|m| match self.parse(m)? {
                    Geometry::Polygon(polygon) => Ok(polygon),
                    _ => Err(error_at(m, "Expected a polygon member")),
                })
                .collect::<FormatResult<Vec<_>>>()
                .map(|polygons| Geometry::MultiPolygon(MultiPolygon::new(polygons))),
            "MultiGeometry" => members(node)
                .map(|m| self.parse(m))
                .collect::<FormatResult<Vec<_>>>()
                .map(|parts| Geometry::GeometryCollection(GeometryCollection::from(parts))),
            other => Err(error_at(node, format!("Unsupported GML geometry '{other}'"))),
        }
    }

    fn point(&self, node: Node<'_, '_>) -> FormatResult<Point<f64>> {
        self.coords(node)?
            .first()
            .map(|c| Point::from(*c))
            .ok_or_else(|| error_at(node, "Point without a position"))
    }

    fn line_string(&self, node: Node<'_, '_>) -> FormatResult<LineString<f64>> {
        let coords = if node.tag_name().name() == "Curve" {
            let mut coords = Vec::new();
            for segment in node
                .descendants()
                .filter(|n| n.is_element() && n.tag_name().name() == "LineStringSegment")
            {
                coords.extend(self.coords(segment)?);
            }
            coords
        } else {
            self.coords(node)?
        };
        if coords.len() < 2 {
            return Err(error_at(node, "Line with fewer than two positions"));
        }
        Ok(LineString::new(coords))
    }

    fn polygon(&self, node: Node<'_, '_>) -> FormatResult<Polygon<f64>> {
        let mut exterior = None;
        let mut interiors = Vec::new();
        for boundary in node.children().filter(Node::is_element) {
            match boundary.tag_name().name() {
                "exterior" | "outerBoundaryIs" => exterior = Some(self.ring(boundary)?),
                "interior" | "innerBoundaryIs" => interiors.push(self.ring(boundary)?),
                _ => {},
            }
        }
        let exterior = exterior.ok_or_else(|| error_at(node, "Polygon without an exterior ring"))?;
        Ok(Polygon::new(exterior, interiors))
    }

    fn ring(&self, boundary: Node<'_, '_>) -> FormatResult<LineString<f64>> {
        let ring = boundary
            .children()
            .find(Node::is_element)
            .ok_or_else(|| error_at(boundary, "Empty polygon boundary"))?;
        if ring.tag_name().name() == "Ring" {
            let mut coords = Vec::new();
            for curve in members(ring) {
                coords.extend(self.line_string(curve)?.0);
            }
            return Ok(LineString::new(coords));
        }
        self.line_string(ring)
    }

    /// Positions held directly by `node`, in any of the GML 2/3 encodings.
    fn coords(&self, node: Node<'_, '_>) -> FormatResult<Vec<Coord<f64>>> {
        let mut out = Vec::new();
        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "pos" => {
                    let values = numbers(child)?;
                    if values.len() < 2 {
                        return Err(error_at(child, "Position with fewer than two ordinates"));
                    }
                    out.push(self.coord(values[0], values[1]));
                },
                "posList" => {
                    let dimension = srs_dimension(child)?;
                    let values = numbers(child)?;
                    if values.len() % dimension != 0 {
                        return Err(error_at(
                            child,
                            format!("posList holds {} values, not a multiple of {dimension}", values.len()),
                        ));
                    }
                    out.extend(values.chunks(dimension).map(|c| self.coord(c[0], c[1])));
                },
                "coordinates" => self.coordinates(child, &mut out)?,
                "coord" => {
                    let ordinate = |name: &str| -> FormatResult<f64> {
                        let text = child
                            .children()
                            .find(|n| n.is_element() && n.tag_name().name() == name)
                            .and_then(|n| n.text())
                            .ok_or_else(|| error_at(child, format!("coord without {name}")))?;
                        parse_number(child, text)
                    };
                    out.push(self.coord(ordinate("X")?, ordinate("Y")?));
                },
                "pointProperty" | "pointRep" => {
                    if let Some(point) = child.children().find(Node::is_element) {
                        out.push(self.point(point)?.0);
                    }
                },
                _ => {},
            }
        }
        Ok(out)
    }

    /// GML 2 `<coordinates>`, honouring the `cs`, `ts` and `decimal` attributes.
    fn coordinates(&self, node: Node<'_, '_>, out: &mut Vec<Coord<f64>>) -> FormatResult<()> {
        let text = node.text().unwrap_or_default();
        let cs = node.attribute("cs").unwrap_or(",");
        let decimal = node.attribute("decimal").unwrap_or(".");
        let tuples: Vec<&str> = match node.attribute("ts") {
            Some(ts) if !ts.trim().is_empty() => text.split(ts).collect(),
            _ => text.split_whitespace().collect(),
        };

        for tuple in tuples.into_iter().map(str::trim).filter(|t| !t.is_empty()) {
            let mut ordinates = tuple.split(cs).map(|value| {
                let value = value.trim();
                if decimal == "." {
                    parse_number(node, value)
                } else {
                    parse_number(node, &value.replace(decimal, "."))
                }
            });
            match (ordinates.next(), ordinates.next()) {
                (Some(x), Some(y)) => out.push(self.coord(x?, y?)),
                _ => return Err(error_at(node, format!("Coordinate tuple '{tuple}' needs two ordinates"))),
            }
        }
        Ok(())
    }

    fn coord(&self, first: f64, second: f64) -> Coord<f64> {
        if self.swap_axes {
            Coord { x: second, y: first }
        } else {
            Coord { x: first, y: second }
        }
    }
}

fn members<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(Node::is_element)
        .flat_map(|member| member.children().filter(Node::is_element))
}

fn srs_dimension(node: Node<'_, '_>) -> FormatResult<usize> {
    let Some(raw) = node.ancestors().find_map(|n| n.attribute("srsDimension")) else {
        return Ok(2);
    };
    match raw.trim().parse::<usize>() {
        Ok(dimension) if dimension >= 2 => Ok(dimension),
        _ => Err(error_at(node, format!("Unsupported srsDimension '{raw}'"))),
    }
}

fn numbers(node: Node<'_, '_>) -> FormatResult<Vec<f64>> {
    node.text()
        .unwrap_or_default()
        .split_whitespace()
        .map(|value| parse_number(node, value))
        .collect()
}

fn parse_number(node: Node<'_, '_>, value: &str) -> FormatResult<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| error_at(node, format!("Invalid number '{value}'")))
}

pub(crate) fn error_at(node: Node<'_, '_>, message: impl Into<String>) -> FormatReadError {
    let pos = node.document().text_pos_at(node.range().start);
    FormatReadError::parse(message).at(SourcePosition {
        line: Some(u64::from(pos.row)),
        column: Some(u64::from(pos.col)),
        record: None,
    })
}
