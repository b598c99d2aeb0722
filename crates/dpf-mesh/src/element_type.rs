//! Element type taxonomy.
//!
//! Integer codes are stable and match the codes stored by the solver, so
//! they can be used in property fields and on the wire.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MeshError;

/// Geometric family of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementShape {
    Solid,
    Shell,
    Beam,
    UnknownShape,
}

impl ElementShape {
    /// All shapes, in the order shape-split containers are labelled.
    pub const ALL: [ElementShape; 4] = [
        ElementShape::Solid,
        ElementShape::Shell,
        ElementShape::Beam,
        ElementShape::UnknownShape,
    ];

    /// Lower-case label (`solid`, `shell`, `beam`, `unknown_shape`).
    pub fn label(self) -> &'static str {
        match self {
            ElementShape::Solid => "solid",
            ElementShape::Shell => "shell",
            ElementShape::Beam => "beam",
            ElementShape::UnknownShape => "unknown_shape",
        }
    }
}

impl fmt::Display for ElementShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ElementShape::Solid => "Solid",
            ElementShape::Shell => "Shell",
            ElementShape::Beam => "Beam",
            ElementShape::UnknownShape => "Unknown_shape",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    General = -2,
    All = -1,
    Tet10 = 0,
    Hex20 = 1,
    Wedge15 = 2,
    Pyramid13 = 3,
    Tri6 = 4,
    TriShell6 = 5,
    Quad8 = 6,
    QuadShell8 = 7,
    Line3 = 8,
    Point1 = 9,
    Tet4 = 10,
    Hex8 = 11,
    Wedge6 = 12,
    Pyramid5 = 13,
    Tri3 = 14,
    TriShell3 = 15,
    Quad4 = 16,
    QuadShell4 = 17,
    Line2 = 18,
    NumElementTypes = 19,
    Unknown = 20,
    EMagLine = 21,
    EMagArc = 22,
    EMagCircle = 23,
    Surface3 = 24,
    Surface4 = 25,
    Surface6 = 26,
    Surface8 = 27,
    Edge2 = 28,
    Edge3 = 29,
    Beam3 = 30,
    Beam4 = 31,
    GeneralPlaceholder = 32,
    Polygon = 33,
    Polyhedron = 34,
}

/// Static information about an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementDescriptor {
    pub element_type: ElementType,
    pub description: &'static str,
    pub name: &'static str,
    pub shape: ElementShape,
    pub n_corner_nodes: Option<usize>,
    pub n_mid_nodes: Option<usize>,
    /// `None` for types with a variable node count (polygon, polyhedron)
    /// or no fixed topology.
    pub n_nodes: Option<usize>,
    pub is_solid: bool,
    pub is_shell: bool,
    pub is_beam: bool,
    pub is_quadratic: bool,
    pub is_point: bool,
}

const fn fixed(
    element_type: ElementType,
    description: &'static str,
    name: &'static str,
    shape: ElementShape,
    corner: usize,
    mid: usize,
    quadratic: bool,
) -> ElementDescriptor {
    ElementDescriptor {
        element_type,
        description,
        name,
        shape,
        n_corner_nodes: Some(corner),
        n_mid_nodes: Some(mid),
        n_nodes: Some(corner + mid),
        is_solid: matches!(shape, ElementShape::Solid),
        is_shell: matches!(shape, ElementShape::Shell),
        is_beam: matches!(shape, ElementShape::Beam),
        is_quadratic: quadratic,
        is_point: false,
    }
}

const fn open(
    element_type: ElementType,
    description: &'static str,
    name: &'static str,
    shape: ElementShape,
) -> ElementDescriptor {
    ElementDescriptor {
        element_type,
        description,
        name,
        shape,
        n_corner_nodes: None,
        n_mid_nodes: None,
        n_nodes: None,
        is_solid: matches!(shape, ElementShape::Solid),
        is_shell: matches!(shape, ElementShape::Shell),
        is_beam: matches!(shape, ElementShape::Beam),
        is_quadratic: false,
        is_point: false,
    }
}

impl ElementType {
    pub const ALL_TYPES: [ElementType; 37] = [
        ElementType::General,
        ElementType::All,
        ElementType::Tet10,
        ElementType::Hex20,
        ElementType::Wedge15,
        ElementType::Pyramid13,
        ElementType::Tri6,
        ElementType::TriShell6,
        ElementType::Quad8,
        ElementType::QuadShell8,
        ElementType::Line3,
        ElementType::Point1,
        ElementType::Tet4,
        ElementType::Hex8,
        ElementType::Wedge6,
        ElementType::Pyramid5,
        ElementType::Tri3,
        ElementType::TriShell3,
        ElementType::Quad4,
        ElementType::QuadShell4,
        ElementType::Line2,
        ElementType::NumElementTypes,
        ElementType::Unknown,
        ElementType::EMagLine,
        ElementType::EMagArc,
        ElementType::EMagCircle,
        ElementType::Surface3,
        ElementType::Surface4,
        ElementType::Surface6,
        ElementType::Surface8,
        ElementType::Edge2,
        ElementType::Edge3,
        ElementType::Beam3,
        ElementType::Beam4,
        ElementType::GeneralPlaceholder,
        ElementType::Polygon,
        ElementType::Polyhedron,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL_TYPES.iter().copied().find(|t| t.code() == code)
    }

    pub fn shape(self) -> ElementShape {
        self.descriptor().shape
    }

    /// Fixed node count of this type, if it has one.
    pub fn n_nodes(self) -> Option<usize> {
        self.descriptor().n_nodes
    }

    pub fn descriptor(self) -> ElementDescriptor {
        use ElementShape::*;
        use ElementType as T;
        match self {
            T::General => open(self, "General", "general", UnknownShape),
            T::All => open(self, "Unknown", "unknown", UnknownShape),
            T::Tet10 => fixed(self, "Quadratic 10-nodes Tetrahedron", "tet10", Solid, 4, 6, true),
            T::Hex20 => fixed(self, "Quadratic 20-nodes Hexa", "hex20", Solid, 8, 12, true),
            T::Wedge15 => fixed(self, "Quadratic 15-nodes Wedge", "wedge15", Solid, 6, 9, true),
            T::Pyramid13 => {
                fixed(self, "Quadratic 13-nodes Pyramid", "pyramid13", Solid, 5, 8, true)
            }
            T::Tri6 => fixed(self, "Quadratic 6-nodes Triangle", "tri6", Shell, 3, 3, true),
            T::TriShell6 => fixed(
                self,
                "Quadratic 6-nodes Triangle Shell",
                "triShell6",
                Shell,
                3,
                3,
                true,
            ),
            T::Quad8 => fixed(self, "Quadratic 8-nodes Quadrangle", "quad8", Shell, 4, 4, true),
            T::QuadShell8 => fixed(
                self,
                "Quadratic 8-nodes Quadrangle Shell",
                "quadShell8",
                Shell,
                4,
                4,
                true,
            ),
            T::Line3 => fixed(self, "Quadratic 3-nodes Line", "line3", Beam, 2, 1, true),
            T::Point1 => ElementDescriptor {
                is_point: true,
                ..fixed(self, "Point", "point1", UnknownShape, 1, 0, false)
            },
            T::Tet4 => fixed(self, "Linear 4-nodes Tetrahedron", "tet4", Solid, 4, 0, false),
            T::Hex8 => fixed(self, "Linear 8-nodes Hexa", "hex8", Solid, 8, 0, false),
            T::Wedge6 => fixed(self, "Linear 6-nodes Wedge", "wedge6", Solid, 6, 0, false),
            T::Pyramid5 => fixed(self, "Linear 5-nodes Pyramid", "pyramid5", Solid, 5, 0, false),
            T::Tri3 => fixed(self, "Linear 3-nodes Triangle", "tri3", Shell, 3, 0, false),
            T::TriShell3 => fixed(
                self,
                "Linear 3-nodes Triangle Shell",
                "triShell3",
                Shell,
                3,
                0,
                false,
            ),
            T::Quad4 => fixed(self, "Linear 4-nodes Quadrangle", "quad4", Shell, 4, 0, false),
            T::QuadShell4 => fixed(
                self,
                "Linear 4-nodes Quadrangle Shell",
                "quadShell4",
                Shell,
                4,
                0,
                false,
            ),
            T::Line2 => fixed(self, "Linear 2-nodes Line", "line2", Beam, 2, 0, false),
            T::NumElementTypes => open(self, "NumElementTypes", "numElementTypes", UnknownShape),
            T::Unknown => open(self, "Unknown", "unknown", UnknownShape),
            T::EMagLine => open(self, "EMagLine", "EMagLine", Beam),
            T::EMagArc => open(self, "EMagArc", "EMagArc", Beam),
            T::EMagCircle => open(self, "EMagCircle", "EMagCircle", Shell),
            T::Surface3 => open(self, "Surface3", "surface3", Shell),
            T::Surface4 => open(self, "Surface4", "surface4", Shell),
            T::Surface6 => open(self, "Surface6", "surface6", Shell),
            T::Surface8 => open(self, "Surface8", "surface8", Shell),
            T::Edge2 => open(self, "Edge2", "edge2", Beam),
            T::Edge3 => open(self, "Edge3", "edge3", Beam),
            T::Beam3 => open(self, "Beam3", "beam3", Beam),
            T::Beam4 => open(self, "Beam4", "beam4", Beam),
            T::GeneralPlaceholder => {
                open(self, "GeneralPlaceholder", "generalPlaceholder", UnknownShape)
            }
            T::Polygon => open(self, "Polygon", "polygon", Shell),
            T::Polyhedron => open(self, "Polyhedron", "polyhedron", Solid),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for ElementType {
    type Err = MeshError;

    /// Accepts the variant name (`Hex8`) or the descriptor name (`hex8`),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        let types = Self::ALL_TYPES.iter().copied();
        // variant names first: "unknown" is also the descriptor name of `All`
        types
            .clone()
            .find(|t| t.to_string().eq_ignore_ascii_case(wanted))
            .or_else(|| types.into_iter().find(|t| t.descriptor().name.eq_ignore_ascii_case(wanted)))
            .ok_or_else(|| MeshError::UnknownElementType {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for t in ElementType::ALL_TYPES {
            assert_eq!(ElementType::from_code(t.code()), Some(t));
        }
        assert_eq!(ElementType::from_code(99), None);
    }

    #[test]
    fn hex8_descriptor() {
        let d = ElementType::Hex8.descriptor();
        assert_eq!(d.name, "hex8");
        assert_eq!(d.description, "Linear 8-nodes Hexa");
        assert_eq!(d.n_nodes, Some(8));
        assert!(d.is_solid && !d.is_quadratic);
        assert_eq!(d.shape, ElementShape::Solid);
    }

    #[test]
    fn quadratic_counts_include_mid_nodes() {
        assert_eq!(ElementType::Hex20.n_nodes(), Some(20));
        assert_eq!(ElementType::Tet10.n_nodes(), Some(10));
        assert_eq!(ElementType::Line3.n_nodes(), Some(3));
        assert_eq!(ElementType::Polygon.n_nodes(), None);
    }

    #[test]
    fn point_is_unknown_shape() {
        let d = ElementType::Point1.descriptor();
        assert!(d.is_point);
        assert_eq!(d.shape, ElementShape::UnknownShape);
    }

    #[test]
    fn parse_accepts_both_spellings() {
        assert_eq!("Hex8".parse::<ElementType>().unwrap(), ElementType::Hex8);
        assert_eq!(
            "quadShell4".parse::<ElementType>().unwrap(),
            ElementType::QuadShell4
        );
        assert_eq!("LINE2".parse::<ElementType>().unwrap(), ElementType::Line2);
        assert!("hex9".parse::<ElementType>().is_err());
    }

    #[test]
    fn shape_display_is_capitalized() {
        assert_eq!(ElementShape::Solid.to_string(), "Solid");
        assert_eq!(format!("{:>7}", ElementShape::Beam), "   Beam");
    }
}
