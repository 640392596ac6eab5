use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::convert::Direction;

/// Scalar kinds a primitive descriptor can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
	/// JSON string.
	String,
	/// JSON number, integer or floating point.
	Number,
	/// JSON boolean.
	Boolean,
}

impl Primitive {
	/// Kind name used in diagnostics and descriptor documents.
	pub fn name(self) -> &'static str {
		match self {
			Self::String => "string",
			Self::Number => "number",
			Self::Boolean => "boolean",
		}
	}

	/// Whether `value` has this runtime kind.
	pub fn matches(self, value: &Value) -> bool {
		matches!(
			(self, value),
			(Self::String, Value::String(_)) | (Self::Number, Value::Number(_)) | (Self::Boolean, Value::Bool(_))
		)
	}
}

/// Data-only description of an expected value shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DescriptorRepr", into = "DescriptorRepr")]
pub enum Descriptor {
	/// Scalar of one kind.
	Primitive(Primitive),
	/// String equal to one of a fixed, ordered set of literals.
	Literals(Vec<String>),
	/// Sequence whose every element conforms to the inner descriptor.
	Array(Box<Descriptor>),
	/// First alternative, in declared order, that converts without error.
	Union(Vec<Descriptor>),
	/// Map with declared fields and an additional-properties descriptor.
	Object(ObjectDescriptor),
	/// Indirection through the descriptor table.
	Reference(String),
	/// Point in time, carried as text.
	Date,
	/// Anything, passed through unchanged.
	Any,
	/// Exactly null.
	Null,
	/// Only the missing marker; the first alternative of an optional union.
	Absent,
	/// Nothing at all; the additional descriptor of a closed object.
	Never,
}

impl Descriptor {
	/// Primitive string descriptor.
	pub fn string() -> Self {
		Self::Primitive(Primitive::String)
	}

	/// Primitive number descriptor.
	pub fn number() -> Self {
		Self::Primitive(Primitive::Number)
	}

	/// Primitive boolean descriptor.
	pub fn boolean() -> Self {
		Self::Primitive(Primitive::Boolean)
	}

	/// Literal-set descriptor.
	pub fn literals<I, S>(cases: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Literals(cases.into_iter().map(Into::into).collect())
	}

	/// Array descriptor.
	pub fn array(items: Descriptor) -> Self {
		Self::Array(Box::new(items))
	}

	/// Union descriptor.
	pub fn union(members: Vec<Descriptor>) -> Self {
		Self::Union(members)
	}

	/// Union accepting a missing value or `inner`.
	pub fn optional(inner: Descriptor) -> Self {
		Self::Union(vec![Self::Absent, inner])
	}

	/// Object descriptor.
	pub fn object(fields: Vec<FieldDescriptor>, additional: Descriptor) -> Self {
		Self::Object(ObjectDescriptor::new(fields, additional))
	}

	/// Object without declared fields, every entry checked against `additional`.
	pub fn map(additional: Descriptor) -> Self {
		Self::object(Vec::new(), additional)
	}

	/// Reference descriptor.
	pub fn reference(name: impl Into<String>) -> Self {
		Self::Reference(name.into())
	}

	/// Human-readable description of the expected shape.
	pub fn describe(&self) -> String {
		match self {
			Self::Primitive(kind) => kind.name().to_owned(),
			Self::Literals(cases) => format!("one of [{}]", cases.iter().map(|case| format!("{case:?}")).collect::<Vec<_>>().join(", ")),
			Self::Array(_) => "array".to_owned(),
			Self::Union(members) => match members.as_slice() {
				[Self::Absent, inner] => format!("an optional {}", inner.describe()),
				_ => format!("one of [{}]", members.iter().map(Self::describe).collect::<Vec<_>>().join(", ")),
			},
			Self::Object(_) => "object".to_owned(),
			Self::Reference(name) => name.clone(),
			Self::Date => "Date".to_owned(),
			Self::Any => "anything".to_owned(),
			Self::Null => "null".to_owned(),
			Self::Absent => "absent".to_owned(),
			Self::Never => "nothing".to_owned(),
		}
	}
}

/// Process-unique identity of an object descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

/// Object shape: ordered declared fields plus the rule for undeclared keys.
#[derive(Debug, Clone)]
pub struct ObjectDescriptor {
	id: ObjectId,
	fields: Vec<FieldDescriptor>,
	additional: Box<Descriptor>,
}

impl ObjectDescriptor {
	/// Create an object descriptor with a fresh identity.
	pub fn new(fields: Vec<FieldDescriptor>, additional: Descriptor) -> Self {
		Self {
			id: ObjectId::next(),
			fields,
			additional: Box::new(additional),
		}
	}

	/// Identity used to key cached field maps.
	pub fn id(&self) -> ObjectId {
		self.id
	}

	/// Declared fields in declaration order.
	pub fn fields(&self) -> &[FieldDescriptor] {
		&self.fields
	}

	/// Descriptor applied to undeclared keys.
	pub fn additional(&self) -> &Descriptor {
		&self.additional
	}
}

impl PartialEq for ObjectDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.fields == other.fields && self.additional == other.additional
	}
}

/// One declared object field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
	/// Key in the serialized representation.
	pub serialized: String,
	/// Key in the typed representation.
	pub typed: String,
	/// Descriptor for the field value.
	pub descriptor: Descriptor,
}

impl FieldDescriptor {
	/// Field whose serialized and typed names differ.
	pub fn new(serialized: impl Into<String>, typed: impl Into<String>, descriptor: Descriptor) -> Self {
		Self {
			serialized: serialized.into(),
			typed: typed.into(),
			descriptor,
		}
	}

	/// Field carried under the same name on both sides.
	pub fn same(name: impl Into<String>, descriptor: Descriptor) -> Self {
		let name = name.into();
		Self::new(name.clone(), name, descriptor)
	}

	/// Key read from the input map.
	pub fn source_name(&self, direction: Direction) -> &str {
		match direction {
			Direction::Decode => &self.serialized,
			Direction::Encode => &self.typed,
		}
	}

	/// Key written to the output map.
	pub fn target_name(&self, direction: Direction) -> &str {
		match direction {
			Direction::Decode => &self.typed,
			Direction::Encode => &self.serialized,
		}
	}
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DescriptorRepr {
	String,
	Number,
	Boolean,
	Date,
	Any,
	Null,
	Absent,
	Never,
	Enum(Vec<String>),
	Array(Box<Descriptor>),
	Union(Vec<Descriptor>),
	Optional(Box<Descriptor>),
	Object(ObjectRepr),
	Ref(String),
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ObjectRepr {
	#[serde(default)]
	fields: Vec<FieldRepr>,
	#[serde(default = "closed")]
	additional: Box<Descriptor>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldRepr {
	json: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	name: Option<String>,
	#[serde(rename = "type")]
	descriptor: Descriptor,
}

fn closed() -> Box<Descriptor> {
	Box::new(Descriptor::Never)
}

impl From<DescriptorRepr> for Descriptor {
	fn from(repr: DescriptorRepr) -> Self {
		match repr {
			DescriptorRepr::String => Self::string(),
			DescriptorRepr::Number => Self::number(),
			DescriptorRepr::Boolean => Self::boolean(),
			DescriptorRepr::Date => Self::Date,
			DescriptorRepr::Any => Self::Any,
			DescriptorRepr::Null => Self::Null,
			DescriptorRepr::Absent => Self::Absent,
			DescriptorRepr::Never => Self::Never,
			DescriptorRepr::Enum(cases) => Self::Literals(cases),
			DescriptorRepr::Array(items) => Self::Array(items),
			DescriptorRepr::Union(members) => Self::Union(members),
			DescriptorRepr::Optional(inner) => Self::optional(*inner),
			DescriptorRepr::Object(object) => {
				let fields = object
					.fields
					.into_iter()
					.map(|field| {
						let typed = field.name.unwrap_or_else(|| field.json.clone());
						FieldDescriptor::new(field.json, typed, field.descriptor)
					})
					.collect();
				Self::object(fields, *object.additional)
			}
			DescriptorRepr::Ref(name) => Self::Reference(name),
		}
	}
}

impl From<Descriptor> for DescriptorRepr {
	fn from(descriptor: Descriptor) -> Self {
		match descriptor {
			Descriptor::Primitive(Primitive::String) => Self::String,
			Descriptor::Primitive(Primitive::Number) => Self::Number,
			Descriptor::Primitive(Primitive::Boolean) => Self::Boolean,
			Descriptor::Literals(cases) => Self::Enum(cases),
			Descriptor::Array(items) => Self::Array(items),
			Descriptor::Union(mut members) => {
				if matches!(members.as_slice(), [Descriptor::Absent, _]) {
					if let Some(inner) = members.pop() {
						return Self::Optional(Box::new(inner));
					}
				}
				Self::Union(members)
			}
			Descriptor::Object(object) => Self::Object(ObjectRepr {
				fields: object
					.fields
					.into_iter()
					.map(|field| FieldRepr {
						name: (field.typed != field.serialized).then_some(field.typed),
						json: field.serialized,
						descriptor: field.descriptor,
					})
					.collect(),
				additional: object.additional,
			}),
			Descriptor::Reference(name) => Self::Ref(name),
			Descriptor::Date => Self::Date,
			Descriptor::Any => Self::Any,
			Descriptor::Null => Self::Null,
			Descriptor::Absent => Self::Absent,
			Descriptor::Never => Self::Never,
		}
	}
}

#[cfg(test)]
mod tests;
