use serde_json::{Map, Value};

use crate::convert::{
	ConversionError, ConvertError, Descriptor, DescriptorTable, Direction, FieldPath, InputFormat, ObjectDescriptor, PathStep, PropertyCache,
	Result, Timestamp,
};

/// Runtime limits and presentation switches for conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
	/// Maximum nesting of array elements and object fields below the root.
	pub max_depth: u32,
	/// Notation used by the text entry points, for both input and output.
	pub format: InputFormat,
	/// Spaces per nesting level in rendered JSON; `0` renders compact.
	pub indent: usize,
	/// Maximum characters of the offending value quoted in diagnostics.
	pub max_actual_len: usize,
}

impl Default for ConvertOptions {
	fn default() -> Self {
		Self {
			max_depth: 128,
			format: InputFormat::Json,
			indent: 2,
			max_actual_len: 200,
		}
	}
}

impl ConvertOptions {
	/// Preset emitting single-line JSON.
	pub fn compact() -> Self {
		Self {
			indent: 0,
			..Self::default()
		}
	}
}

#[derive(Clone, Copy)]
enum Step<'a> {
	Field(&'a str),
	Index(usize),
}

/// Breadcrumb frame; errors walk the chain back to the root.
struct Scope<'a> {
	parent: Option<&'a Scope<'a>>,
	step: Option<Step<'a>>,
	type_name: Option<&'a str>,
	depth: u32,
}

impl<'a> Scope<'a> {
	fn root() -> Self {
		Self {
			parent: None,
			step: None,
			type_name: None,
			depth: 0,
		}
	}

	fn reference(&'a self, name: &'a str) -> Scope<'a> {
		Scope {
			parent: Some(self),
			step: None,
			type_name: Some(name),
			depth: self.depth,
		}
	}

	/// Name of the reference this value was reached through, if any.
	fn own_type(&self) -> Option<&'a str> {
		match self.step {
			None => self.type_name,
			Some(_) => None,
		}
	}
}

/// One decode or encode pass over a value tree.
pub(crate) struct Interpreter<'a> {
	pub(crate) table: &'a DescriptorTable,
	pub(crate) cache: &'a PropertyCache,
	pub(crate) options: &'a ConvertOptions,
	pub(crate) direction: Direction,
}

impl Interpreter<'_> {
	/// Convert `value` against an explicit descriptor.
	pub(crate) fn run(&self, value: &Value, descriptor: &Descriptor) -> Result<Value> {
		let root = Scope::root();
		Ok(self.transform(Some(value), descriptor, &root)?.unwrap_or(Value::Null))
	}

	/// Convert `value` against a named table entry.
	pub(crate) fn run_named(&self, value: &Value, type_name: &str) -> Result<Value> {
		let descriptor = self.table.resolve(type_name)?;
		let root = Scope::root();
		let scope = root.reference(type_name);
		Ok(self.transform(Some(value), descriptor, &scope)?.unwrap_or(Value::Null))
	}

	fn transform(&self, value: Option<&Value>, descriptor: &Descriptor, scope: &Scope<'_>) -> Result<Option<Value>> {
		match descriptor {
			Descriptor::Any => Ok(value.cloned()),
			Descriptor::Absent => match value {
				None => Ok(None),
				Some(_) => Err(self.mismatch(scope, descriptor.describe(), value)),
			},
			Descriptor::Never => Err(self.mismatch(scope, descriptor.describe(), value)),
			Descriptor::Null => match value {
				Some(Value::Null) => Ok(Some(Value::Null)),
				_ => Err(self.mismatch(scope, descriptor.describe(), value)),
			},
			Descriptor::Reference(name) => {
				let resolved = self.table.resolve(name)?;
				self.transform(value, resolved, &scope.reference(name))
			}
			Descriptor::Primitive(kind) => match value {
				Some(found) if kind.matches(found) => Ok(Some(found.clone())),
				_ => Err(self.mismatch(scope, descriptor.describe(), value)),
			},
			Descriptor::Literals(cases) => match value {
				Some(Value::String(found)) if cases.iter().any(|case| case == found) => Ok(Some(Value::String(found.clone()))),
				_ => Err(self.mismatch(scope, descriptor.describe(), value)),
			},
			Descriptor::Array(items) => self.transform_array(items, value, scope).map(Some),
			Descriptor::Union(members) => self.transform_union(descriptor, members, value, scope),
			Descriptor::Object(object) => self.transform_object(object, value, scope).map(Some),
			Descriptor::Date => self.transform_date(value, scope).map(Some),
		}
	}

	fn transform_array(&self, items: &Descriptor, value: Option<&Value>, scope: &Scope<'_>) -> Result<Value> {
		let Some(Value::Array(elements)) = value else {
			return Err(self.mismatch(scope, "array".to_owned(), value));
		};

		let mut out = Vec::with_capacity(elements.len());
		for (index, element) in elements.iter().enumerate() {
			let child = self.enter(scope, Step::Index(index))?;
			out.push(self.transform(Some(element), items, &child)?.unwrap_or(Value::Null));
		}
		Ok(Value::Array(out))
	}

	fn transform_union(&self, union: &Descriptor, members: &[Descriptor], value: Option<&Value>, scope: &Scope<'_>) -> Result<Option<Value>> {
		// A too-deep alternative does not end the search; it is reported only if nothing else fits.
		let mut too_deep = None;
		for (alternative, member) in members.iter().enumerate() {
			match self.transform(value, member, scope) {
				Ok(converted) => return Ok(converted),
				Err(ConvertError::Conversion(err)) => {
					tracing::trace!(alternative, reason = %err, "union alternative rejected");
				}
				Err(err @ ConvertError::DepthExceeded { .. }) => {
					tracing::trace!(alternative, "union alternative exceeded depth");
					too_deep.get_or_insert(err);
				}
				Err(other) => return Err(other),
			}
		}
		Err(too_deep.unwrap_or_else(|| self.mismatch(scope, union.describe(), value)))
	}

	fn transform_object(&self, object: &ObjectDescriptor, value: Option<&Value>, scope: &Scope<'_>) -> Result<Value> {
		let Some(Value::Object(input)) = value else {
			let expected = scope.own_type().unwrap_or("object").to_owned();
			return Err(self.mismatch(scope, expected, value));
		};

		let map = self.cache.field_map(object, self.direction);
		let mut out = Map::with_capacity(input.len().max(map.len()));

		for entry in map.entries() {
			let field = &object.fields()[entry.field];
			let child = self.enter(scope, Step::Field(&*entry.source))?;
			if let Some(converted) = self.transform(input.get(&*entry.source), &field.descriptor, &child)? {
				out.insert(entry.target.to_string(), converted);
			}
		}

		for (key, extra) in input {
			if map.contains(key) {
				continue;
			}
			let child = self.enter(scope, Step::Field(key))?;
			if let Some(converted) = self.transform(Some(extra), object.additional(), &child)? {
				out.insert(key.clone(), converted);
			}
		}

		Ok(Value::Object(out))
	}

	fn transform_date(&self, value: Option<&Value>, scope: &Scope<'_>) -> Result<Value> {
		match value {
			Some(Value::Null) => Ok(Value::Null),
			Some(Value::String(text)) => Timestamp::parse(text)
				.map(|ts| Value::String(ts.to_rfc3339()))
				.ok_or_else(|| self.mismatch(scope, Descriptor::Date.describe(), value)),
			_ => Err(self.mismatch(scope, Descriptor::Date.describe(), value)),
		}
	}

	fn enter<'s>(&self, scope: &'s Scope<'s>, step: Step<'s>) -> Result<Scope<'s>> {
		let depth = scope.depth + 1;
		if depth > self.options.max_depth {
			return Err(ConvertError::DepthExceeded {
				max_depth: self.options.max_depth,
			});
		}
		Ok(Scope {
			parent: Some(scope),
			step: Some(step),
			type_name: None,
			depth,
		})
	}

	fn mismatch(&self, scope: &Scope<'_>, expected: String, value: Option<&Value>) -> ConvertError {
		let mut steps = Vec::new();
		let mut parents = Vec::new();
		let mut parent = None;
		let mut cursor = Some(scope);
		while let Some(frame) = cursor {
			match frame.step {
				Some(Step::Field(name)) => steps.push(PathStep::Field(name.to_owned())),
				Some(Step::Index(index)) => steps.push(PathStep::Index(index)),
				None => {}
			}
			if let Some(name) = frame.type_name {
				if parent.is_none() && !steps.is_empty() {
					parent = Some(name.to_owned());
				}
				parents.push(name.to_owned());
			}
			cursor = frame.parent;
		}
		steps.reverse();
		parents.reverse();

		ConversionError {
			expected,
			actual: render_actual(value, self.options.max_actual_len),
			path: FieldPath::from_steps(steps),
			parents,
			parent,
		}
		.into()
	}
}

fn render_actual(value: Option<&Value>, max_len: usize) -> String {
	match value {
		None => "missing".to_owned(),
		Some(found) => truncate(&found.to_string(), max_len),
	}
}

fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}
