use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::convert::transform::Interpreter;
use crate::convert::{
	ConvertError, ConvertOptions, Descriptor, DescriptorTable, Direction, FieldMap, ObjectDescriptor, PropertyCache, Result, parse_text,
	render_text,
};

/// Decodes and encodes values through a descriptor table.
///
/// Owns the table, its property-mapping cache, and conversion options. The
/// table is never mutated after construction and the cache is lock-protected,
/// so one converter can be shared across threads.
#[derive(Debug)]
pub struct Converter {
	table: DescriptorTable,
	cache: PropertyCache,
	options: ConvertOptions,
}

impl Converter {
	/// Create a converter with default options.
	pub fn new(table: DescriptorTable) -> Self {
		Self::with_options(table, ConvertOptions::default())
	}

	/// Create a converter with explicit options.
	pub fn with_options(table: DescriptorTable, options: ConvertOptions) -> Self {
		let cache = PropertyCache::for_table(&table);
		Self { table, cache, options }
	}

	/// Descriptor table backing this converter.
	pub fn table(&self) -> &DescriptorTable {
		&self.table
	}

	/// Active conversion options.
	pub fn options(&self) -> &ConvertOptions {
		&self.options
	}

	/// Property-mapping cache shared by all calls.
	pub fn cache(&self) -> &PropertyCache {
		&self.cache
	}

	/// Precompute field maps for every object descriptor in the table.
	pub fn warm(&self) {
		self.cache.warm(&self.table);
	}

	/// Field map for `object` read in `direction`; memoized when the table owns `object`.
	pub fn field_map(&self, object: &ObjectDescriptor, direction: Direction) -> Arc<FieldMap> {
		self.cache.field_map(object, direction)
	}

	/// Convert a value tree against an explicit descriptor.
	pub fn transform(&self, value: &Value, descriptor: &Descriptor, direction: Direction) -> Result<Value> {
		self.interpreter(direction).run(value, descriptor)
	}

	/// Convert a serialized tree into its typed shape.
	pub fn decode_value(&self, value: &Value, type_name: &str) -> Result<Value> {
		tracing::debug!(type_name, "decode");
		self.interpreter(Direction::Decode).run_named(value, type_name)
	}

	/// Convert a typed tree back into its serialized shape.
	pub fn encode_value(&self, value: &Value, type_name: &str) -> Result<Value> {
		tracing::debug!(type_name, "encode");
		self.interpreter(Direction::Encode).run_named(value, type_name)
	}

	/// Parse text and decode it into a typed-shape tree.
	pub fn decode_str(&self, text: &str, type_name: &str) -> Result<Value> {
		let parsed = parse_text(text, self.options.format)?;
		self.decode_value(&parsed, type_name)
	}

	/// Parse text, decode it, and deserialize the result into `T`.
	pub fn decode<T: DeserializeOwned>(&self, text: &str, type_name: &str) -> Result<T> {
		let decoded = self.decode_str(text, type_name)?;
		serde_json::from_value(decoded).map_err(ConvertError::Typed)
	}

	/// Serialize `value`, encode it, and render the result as text.
	pub fn encode<T: Serialize>(&self, value: &T, type_name: &str) -> Result<String> {
		let typed = serde_json::to_value(value).map_err(ConvertError::Typed)?;
		let encoded = self.encode_value(&typed, type_name)?;
		render_text(&encoded, self.options.format, self.options.indent)
	}

	fn interpreter(&self, direction: Direction) -> Interpreter<'_> {
		Interpreter {
			table: &self.table,
			cache: &self.cache,
			options: &self.options,
			direction,
		}
	}
}
