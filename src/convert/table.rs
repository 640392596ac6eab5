use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::convert::{ConvertError, Descriptor, InputFormat, ObjectDescriptor, Result, parse_text};

/// Closed, immutable set of named descriptors.
///
/// Serializes as a descriptor document. `serde_yaml` cannot serialize the
/// nested descriptor enums directly; convert with `serde_json::to_value` first
/// and render that tree, as [`render_text`](crate::convert::render_text) does.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DescriptorTable {
	types: BTreeMap<String, Descriptor>,
}

impl DescriptorTable {
	/// Start building a table.
	pub fn builder() -> DescriptorTableBuilder {
		DescriptorTableBuilder::default()
	}

	/// Parse a descriptor document of the form `{ "types": { "<Name>": <descriptor> } }`.
	pub fn from_text(text: &str, format: InputFormat) -> Result<Self> {
		let document = parse_text(text, format)?;
		Self::from_document(document, format)
	}

	/// Parse a JSON descriptor document.
	pub fn from_json_str(text: &str) -> Result<Self> {
		Self::from_text(text, InputFormat::Json)
	}

	/// Parse a YAML descriptor document.
	pub fn from_yaml_str(text: &str) -> Result<Self> {
		Self::from_text(text, InputFormat::Yaml)
	}

	/// Read a descriptor document from disk; `.yaml`/`.yml` files are read as YAML.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path)?;
		Self::from_text(&text, InputFormat::from_path(path))
	}

	fn from_document(document: Value, format: InputFormat) -> Result<Self> {
		let malformed = |message: String| ConvertError::MalformedInput { format, message };

		let Value::Object(mut root) = document else {
			return Err(malformed("descriptor document must be a map".to_owned()));
		};
		let Some(types) = root.remove("types") else {
			return Err(malformed("descriptor document has no `types` map".to_owned()));
		};
		if let Some(key) = root.keys().next() {
			return Err(malformed(format!("unexpected top-level key {key:?}")));
		}
		let Value::Object(types) = types else {
			return Err(malformed("`types` must be a map".to_owned()));
		};

		let mut builder = Self::builder();
		for (name, raw) in types {
			let descriptor = serde_json::from_value::<Descriptor>(raw).map_err(|err| malformed(format!("type {name}: {err}")))?;
			builder = builder.insert(name, descriptor);
		}
		builder.build()
	}

	/// Look up a descriptor by type name.
	pub fn resolve(&self, name: &str) -> Result<&Descriptor> {
		self.types.get(name).ok_or_else(|| ConvertError::UnknownTypeReference {
			name: name.to_owned(),
			referenced_from: None,
		})
	}

	/// Look up a descriptor by type name, if present.
	pub fn get(&self, name: &str) -> Option<&Descriptor> {
		self.types.get(name)
	}

	/// Whether `name` is defined.
	pub fn contains(&self, name: &str) -> bool {
		self.types.contains_key(name)
	}

	/// Defined type names in sorted order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.types.keys().map(String::as_str)
	}

	/// Entries in sorted name order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Descriptor)> {
		self.types.iter().map(|(name, descriptor)| (name.as_str(), descriptor))
	}

	/// Number of defined types.
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Whether no types are defined.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Every object descriptor nested anywhere in the table.
	pub fn object_descriptors(&self) -> Vec<&ObjectDescriptor> {
		let mut out = Vec::new();
		for descriptor in self.types.values() {
			collect_objects(descriptor, &mut out);
		}
		out
	}
}

/// Incremental construction of a [`DescriptorTable`], validated on [`build`](Self::build).
#[derive(Debug, Default)]
pub struct DescriptorTableBuilder {
	types: BTreeMap<String, Descriptor>,
	duplicate: Option<String>,
}

impl DescriptorTableBuilder {
	/// Register a named descriptor.
	pub fn insert(mut self, name: impl Into<String>, descriptor: Descriptor) -> Self {
		let name = name.into();
		if self.types.contains_key(&name) {
			self.duplicate.get_or_insert(name);
		} else {
			self.types.insert(name, descriptor);
		}
		self
	}

	/// Validate every entry and freeze the table.
	pub fn build(self) -> Result<DescriptorTable> {
		if let Some(name) = self.duplicate {
			return Err(ConvertError::DuplicateType { name });
		}

		for (name, descriptor) in &self.types {
			check_descriptor(&self.types, name, descriptor)?;
		}
		check_cycles(&self.types)?;

		tracing::debug!(types = self.types.len(), "descriptor table built");
		Ok(DescriptorTable { types: self.types })
	}
}

fn check_descriptor(types: &BTreeMap<String, Descriptor>, owner: &str, descriptor: &Descriptor) -> Result<()> {
	match descriptor {
		Descriptor::Reference(name) => {
			if !types.contains_key(name) {
				return Err(ConvertError::UnknownTypeReference {
					name: name.clone(),
					referenced_from: Some(owner.to_owned()),
				});
			}
		}
		Descriptor::Array(items) => check_descriptor(types, owner, items)?,
		Descriptor::Union(members) => {
			for member in members {
				check_descriptor(types, owner, member)?;
			}
		}
		Descriptor::Object(object) => {
			let mut serialized = HashSet::new();
			let mut typed = HashSet::new();
			for field in object.fields() {
				for (seen, name) in [(&mut serialized, &field.serialized), (&mut typed, &field.typed)] {
					if !seen.insert(name.as_str()) {
						return Err(ConvertError::DuplicateField {
							type_name: owner.to_owned(),
							field: name.clone(),
						});
					}
				}
				check_descriptor(types, owner, &field.descriptor)?;
			}
			check_descriptor(types, owner, object.additional())?;
		}
		Descriptor::Primitive(_)
		| Descriptor::Literals(_)
		| Descriptor::Date
		| Descriptor::Any
		| Descriptor::Null
		| Descriptor::Absent
		| Descriptor::Never => {}
	}
	Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
	Visiting,
	Done,
}

/// Reject loops of references and union alternatives that never reach an array or object.
fn check_cycles(types: &BTreeMap<String, Descriptor>) -> Result<()> {
	let mut marks = HashMap::new();
	for name in types.keys() {
		visit(types, name, &mut marks)?;
	}
	Ok(())
}

fn visit<'a>(types: &'a BTreeMap<String, Descriptor>, name: &'a str, marks: &mut HashMap<&'a str, Mark>) -> Result<()> {
	match marks.get(name) {
		Some(Mark::Done) => return Ok(()),
		Some(Mark::Visiting) => return Err(ConvertError::ReferenceCycle { name: name.to_owned() }),
		None => {}
	}
	marks.insert(name, Mark::Visiting);

	let mut next = Vec::new();
	if let Some(descriptor) = types.get(name) {
		eager_refs(descriptor, &mut next);
	}
	for target in next {
		visit(types, target, marks)?;
	}

	marks.insert(name, Mark::Done);
	Ok(())
}

fn eager_refs<'a>(descriptor: &'a Descriptor, out: &mut Vec<&'a str>) {
	match descriptor {
		Descriptor::Reference(name) => out.push(name),
		Descriptor::Union(members) => {
			for member in members {
				eager_refs(member, out);
			}
		}
		_ => {}
	}
}

fn collect_objects<'a>(descriptor: &'a Descriptor, out: &mut Vec<&'a ObjectDescriptor>) {
	match descriptor {
		Descriptor::Array(items) => collect_objects(items, out),
		Descriptor::Union(members) => {
			for member in members {
				collect_objects(member, out);
			}
		}
		Descriptor::Object(object) => {
			out.push(object);
			for field in object.fields() {
				collect_objects(&field.descriptor, out);
			}
			collect_objects(object.additional(), out);
		}
		_ => {}
	}
}
