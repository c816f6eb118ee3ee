//! Primitive type registry
//!
//! The closed set of primitive backing types a schema can mention. Used to
//! type-check enumeration backing types and property types.

/// Primitive types recognized by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Integer,
    Long,
    Double,
    String,
    Boolean,
    DateTime,
    Binary,
    Point2d,
    Point3d,
    IGeometry,
}

impl PrimitiveType {
    /// Look up a primitive type by its wire name.
    pub fn parse(name: &str) -> Option<Self> {
        // The geometry type is addressed by its fully-qualified name in
        // documents, with the short form accepted as well.
        if name == "Bentley.Geometry.Common.IGeometry" {
            return Some(PrimitiveType::IGeometry);
        }
        match name.to_ascii_lowercase().as_str() {
            "int" => Some(PrimitiveType::Integer),
            "long" => Some(PrimitiveType::Long),
            "double" => Some(PrimitiveType::Double),
            "string" => Some(PrimitiveType::String),
            "boolean" | "bool" => Some(PrimitiveType::Boolean),
            "datetime" => Some(PrimitiveType::DateTime),
            "binary" => Some(PrimitiveType::Binary),
            "point2d" => Some(PrimitiveType::Point2d),
            "point3d" => Some(PrimitiveType::Point3d),
            "igeometry" => Some(PrimitiveType::IGeometry),
            _ => None,
        }
    }

    /// The name used in documents (e.g. enumeration `type` fields).
    pub fn wire_name(&self) -> &'static str {
        match self {
            PrimitiveType::Integer => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Double => "double",
            PrimitiveType::String => "string",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::DateTime => "dateTime",
            PrimitiveType::Binary => "binary",
            PrimitiveType::Point2d => "point2d",
            PrimitiveType::Point3d => "point3d",
            PrimitiveType::IGeometry => "Bentley.Geometry.Common.IGeometry",
        }
    }

    /// The name used in diagnostics (e.g. "integer" rather than "int").
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveType::Integer => "integer",
            PrimitiveType::Long => "long",
            PrimitiveType::Double => "double",
            PrimitiveType::String => "string",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::DateTime => "dateTime",
            PrimitiveType::Binary => "binary",
            PrimitiveType::Point2d => "point2d",
            PrimitiveType::Point3d => "point3d",
            PrimitiveType::IGeometry => "IGeometry",
        }
    }

    /// Whether this type may back an enumeration.
    pub fn is_enumeration_backing(&self) -> bool {
        matches!(self, PrimitiveType::Integer | PrimitiveType::String)
    }
}
