/// Declared target shape for a coerced value.
///
/// Shapes form the schema table the dispatcher binds arguments against. They
/// are built once at registration time from plain constructor calls; nothing
/// is discovered at runtime.
///
/// Numeric and boolean shapes default to their zero value when the raw value
/// is absent; wrap a shape in [`Shape::Optional`] to get a null default
/// instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    String,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Bool,
    /// Nullable variant of the inner shape: absent coerces to null rather
    /// than the inner shape's zero value.
    Optional(Box<Shape>),
    /// Epoch milliseconds. Numeric raw values pass through; text is parsed.
    Timestamp,
    /// ISO-8601 calendar date (`2024-05-17`).
    Date,
    /// ISO-8601 wall-clock time (`13:45:00`).
    Time,
    /// ISO-8601 date-time without offset (`2024-05-17T13:45:00`).
    DateTime,
    Enum(EnumShape),
    /// Sequence of elements; absent coerces to an empty sequence, never null.
    List(Box<Shape>),
    /// String-keyed map; absent coerces to an empty map, never null.
    Map(Box<Shape>),
    /// Nested structure coerced by structural matching of map keys to field
    /// names.
    Record(RecordShape),
    /// File-like or pre-decoded values carried through unchanged.
    Opaque,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumShape {
    pub name: String,
    pub constants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    pub name: String,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordShape {
    pub name: String,
    pub fields: Vec<FieldShape>,
}

impl EnumShape {
    pub fn new(name: &str, constants: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            constants: constants.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl RecordShape {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, shape: Shape) -> Self {
        self.fields.push(FieldShape {
            name: name.to_string(),
            shape,
        });
        self
    }
}

impl Shape {
    pub fn optional(inner: Shape) -> Self {
        Shape::Optional(Box::new(inner))
    }

    pub fn list(element: Shape) -> Self {
        Shape::List(Box::new(element))
    }

    pub fn map(value: Shape) -> Self {
        Shape::Map(Box::new(value))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Shape::List(_))
    }

    /// Short name used in coercion error messages.
    pub(crate) fn expected(&self) -> &'static str {
        match self {
            Shape::String => "string",
            Shape::Byte => "byte",
            Shape::Short => "short",
            Shape::Int => "int",
            Shape::Long => "long",
            Shape::Float => "float",
            Shape::Double => "double",
            Shape::Bool => "bool",
            Shape::Optional(inner) => inner.expected(),
            Shape::Timestamp => "timestamp",
            Shape::Date => "date",
            Shape::Time => "time",
            Shape::DateTime => "date-time",
            Shape::Enum(_) => "enum",
            Shape::List(_) => "list",
            Shape::Map(_) => "map",
            Shape::Record(_) => "record",
            Shape::Opaque => "opaque",
        }
    }

    /// Checks that a declared shape is well formed. Called once per parameter
    /// during tree construction; malformed shapes are registration errors.
    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            Shape::Optional(inner) => match inner.as_ref() {
                Shape::Optional(_) => Err("nested Optional".to_string()),
                Shape::List(_) | Shape::Map(_) => Err(
                    "Optional collections are redundant; collections default to empty".to_string(),
                ),
                other => other.validate(),
            },
            Shape::Enum(e) => {
                if e.constants.is_empty() {
                    Err(format!("enum `{}` declares no constants", e.name))
                } else {
                    Ok(())
                }
            }
            Shape::List(element) | Shape::Map(element) => element.validate(),
            Shape::Record(record) => {
                for field in &record.fields {
                    field.shape.validate().map_err(|reason| {
                        format!("field `{}` of record `{}`: {reason}", field.name, record.name)
                    })?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
