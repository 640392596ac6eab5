use std::fmt;

use thiserror::Error;

use crate::convert::{FieldPath, InputFormat};

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors produced while loading descriptor tables and converting values.
#[derive(Debug, Error)]
pub enum ConvertError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Raw text was not well-formed structured data.
	#[error("malformed {format} input: {message}")]
	MalformedInput {
		/// Notation the text was parsed as.
		format: InputFormat,
		/// Parser diagnostic.
		message: String,
	},
	/// A value did not conform to its descriptor.
	#[error(transparent)]
	Conversion(#[from] Box<ConversionError>),
	/// A reference names a type absent from the descriptor table.
	#[error("unknown type reference {name:?}{}", origin_suffix(.referenced_from))]
	UnknownTypeReference {
		/// Requested type name.
		name: String,
		/// Table entry containing the dangling reference, when known.
		referenced_from: Option<String>,
	},
	/// A type name was registered twice.
	#[error("duplicate type {name:?}")]
	DuplicateType {
		/// Repeated type name.
		name: String,
	},
	/// An object descriptor repeats a serialized or typed field name.
	#[error("duplicate field {field:?} in {type_name}")]
	DuplicateField {
		/// Table entry containing the object descriptor.
		type_name: String,
		/// Repeated field name.
		field: String,
	},
	/// References and union alternatives loop without consuming input.
	#[error("reference cycle through {name:?}")]
	ReferenceCycle {
		/// Type name where the loop closes.
		name: String,
	},
	/// Interpreter recursion depth exceeded configured limit.
	#[error("conversion depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Value tree could not be rendered as text.
	#[error("cannot render {format} output: {message}")]
	Render {
		/// Requested output notation.
		format: InputFormat,
		/// Serializer diagnostic.
		message: String,
	},
	/// Converted tree did not fit the typed model, or the model failed to serialize.
	#[error("typed model: {0}")]
	Typed(#[source] serde_json::Error),
}

fn origin_suffix(origin: &Option<String>) -> String {
	origin.as_deref().map(|from| format!(" (from {from})")).unwrap_or_default()
}

impl From<ConversionError> for ConvertError {
	fn from(err: ConversionError) -> Self {
		Self::Conversion(Box::new(err))
	}
}

impl ConvertError {
	/// Borrow the conversion failure, if this is one.
	pub fn as_conversion(&self) -> Option<&ConversionError> {
		match self {
			Self::Conversion(err) => Some(err),
			_ => None,
		}
	}
}

/// A value, or nested sub-value, that does not conform to its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
	/// Description of the expected shape.
	pub expected: String,
	/// Compact rendering of the offending value, or `missing`.
	pub actual: String,
	/// Path from the root value to the failure point.
	pub path: FieldPath,
	/// Referenced type names traversed on the way, outermost first.
	pub parents: Vec<String>,
	/// Referenced type owning the failing field.
	pub parent: Option<String>,
}

impl ConversionError {
	/// Referenced type owning the failing field.
	pub fn parent(&self) -> Option<&str> {
		self.parent.as_deref()
	}

	/// Last field name on the path, ignoring trailing indexes.
	pub fn field(&self) -> Option<&str> {
		self.path.last_field()
	}
}

impl fmt::Display for ConversionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("invalid value")?;
		if let Some(field) = self.field() {
			write!(f, " for key {field:?}")?;
		}
		if let Some(parent) = self.parent() {
			write!(f, " on {parent}")?;
		}
		if !self.path.is_root() {
			write!(f, " at {}", self.path)?;
		}
		write!(f, ": expected {} but got {}", self.expected, self.actual)
	}
}

impl std::error::Error for ConversionError {}
