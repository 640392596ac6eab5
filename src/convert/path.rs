use std::fmt;

/// One step from a parent value into a child value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
	/// Select a named map field.
	Field(String),
	/// Select a sequence element by zero-based index.
	Index(usize),
}

/// Breadcrumb from the root value to a nested value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
	/// Ordered sequence of path steps.
	pub steps: Vec<PathStep>,
}

impl FieldPath {
	/// Path of the root value.
	pub fn root() -> Self {
		Self::default()
	}

	/// Build a path from explicit steps.
	pub fn from_steps(steps: Vec<PathStep>) -> Self {
		Self { steps }
	}

	/// Whether this is the root path.
	pub fn is_root(&self) -> bool {
		self.steps.is_empty()
	}

	/// Last field name, skipping trailing index steps.
	pub fn last_field(&self) -> Option<&str> {
		self.steps.iter().rev().find_map(|step| match step {
			PathStep::Field(name) => Some(name.as_str()),
			PathStep::Index(_) => None,
		})
	}

	/// Index of the final step, if it selects a sequence element.
	pub fn last_index(&self) -> Option<usize> {
		match self.steps.last() {
			Some(PathStep::Index(index)) => Some(*index),
			_ => None,
		}
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.steps.is_empty() {
			return f.write_str("(root)");
		}
		for (idx, step) in self.steps.iter().enumerate() {
			match step {
				PathStep::Field(name) if is_plain_ident(name) => {
					if idx > 0 {
						f.write_str(".")?;
					}
					f.write_str(name)?;
				}
				PathStep::Field(name) => write!(f, "[{name:?}]")?,
				PathStep::Index(index) => write!(f, "[{index}]")?,
			}
		}
		Ok(())
	}
}

fn is_plain_ident(name: &str) -> bool {
	!name.is_empty() && name.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$')
}
