use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::convert::{DescriptorTable, ObjectDescriptor, ObjectId};

/// Which way field names are translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
	/// Serialized names in, typed names out.
	Decode,
	/// Typed names in, serialized names out.
	Encode,
}

impl Direction {
	/// Both directions, decode first.
	pub const ALL: [Self; 2] = [Self::Decode, Self::Encode];
}

/// One declared field seen from a fixed direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
	/// Key read from the input map.
	pub source: Box<str>,
	/// Key written to the output map.
	pub target: Box<str>,
	/// Position of the field in [`ObjectDescriptor::fields`].
	pub field: usize,
}

/// Source-name to target-name table for one object descriptor and direction.
#[derive(Debug, Clone)]
pub struct FieldMap {
	entries: Vec<FieldMapping>,
	index: HashMap<Box<str>, usize>,
}

impl FieldMap {
	/// Compute the mapping for `object` read in `direction`.
	pub fn build(object: &ObjectDescriptor, direction: Direction) -> Self {
		let mut entries = Vec::with_capacity(object.fields().len());
		let mut index = HashMap::with_capacity(object.fields().len());
		for (field_idx, field) in object.fields().iter().enumerate() {
			let source: Box<str> = field.source_name(direction).into();
			index.insert(source.clone(), entries.len());
			entries.push(FieldMapping {
				source,
				target: field.target_name(direction).into(),
				field: field_idx,
			});
		}
		Self { entries, index }
	}

	/// Mappings in field declaration order.
	pub fn entries(&self) -> &[FieldMapping] {
		&self.entries
	}

	/// Look up a mapping by its source key.
	pub fn get(&self, source: &str) -> Option<&FieldMapping> {
		self.index.get(source).map(|idx| &self.entries[*idx])
	}

	/// Whether `source` is a declared key.
	pub fn contains(&self, source: &str) -> bool {
		self.index.contains_key(source)
	}

	/// Number of declared fields.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether no fields are declared.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Memoized field maps keyed by object identity and direction.
///
/// Only object descriptors owned by the table the cache was created for are
/// memoized. Maps for any other object are built per call and dropped with
/// the caller's `Arc`, so the cache never grows past two entries per owned
/// object.
#[derive(Debug, Default)]
pub struct PropertyCache {
	owned: HashSet<ObjectId>,
	maps: RwLock<HashMap<(ObjectId, Direction), Arc<FieldMap>>>,
	builds: AtomicUsize,
}

impl PropertyCache {
	/// Create a cache for the object descriptors of `table`.
	pub fn for_table(table: &DescriptorTable) -> Self {
		Self {
			owned: table.object_descriptors().into_iter().map(ObjectDescriptor::id).collect(),
			..Self::default()
		}
	}

	/// Whether maps for `object` are memoized.
	pub fn owns(&self, object: &ObjectDescriptor) -> bool {
		self.owned.contains(&object.id())
	}

	/// Return the field map for `object`, computing it on first use.
	pub fn field_map(&self, object: &ObjectDescriptor, direction: Direction) -> Arc<FieldMap> {
		let key = (object.id(), direction);
		if !self.owned.contains(&key.0) {
			tracing::trace!(object = ?key.0, ?direction, "building uncached field map");
			return Arc::new(FieldMap::build(object, direction));
		}
		if let Some(map) = self.maps.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
			return Arc::clone(map);
		}

		let mut maps = self.maps.write().unwrap_or_else(PoisonError::into_inner);
		let map = maps.entry(key).or_insert_with(|| {
			tracing::trace!(object = ?key.0, ?direction, fields = object.fields().len(), "building field map");
			self.builds.fetch_add(1, Ordering::Relaxed);
			Arc::new(FieldMap::build(object, direction))
		});
		Arc::clone(map)
	}

	/// Precompute both directions for every object descriptor in `table`.
	pub fn warm(&self, table: &DescriptorTable) {
		let objects = table.object_descriptors();
		for object in &objects {
			for direction in Direction::ALL {
				self.field_map(object, direction);
			}
		}
		tracing::debug!(objects = objects.len(), cached = self.len(), "property cache warmed");
	}

	/// Number of cached maps.
	pub fn len(&self) -> usize {
		self.maps.read().unwrap_or_else(PoisonError::into_inner).len()
	}

	/// Whether nothing is cached yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Number of maps memoized since creation.
	pub fn builds(&self) -> usize {
		self.builds.load(Ordering::Relaxed)
	}
}
