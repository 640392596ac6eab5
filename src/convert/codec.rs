use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::convert::{ConvertError, Result};

/// Text notation for serialized input and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
	/// JSON text.
	#[default]
	Json,
	/// YAML text; only the JSON-compatible subset round-trips.
	Yaml,
}

impl InputFormat {
	/// Pick a notation from a file extension, defaulting to JSON.
	pub fn from_path(path: &Path) -> Self {
		match path.extension().and_then(|ext| ext.to_str()) {
			Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => Self::Yaml,
			_ => Self::Json,
		}
	}
}

impl fmt::Display for InputFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Json => "json",
			Self::Yaml => "yaml",
		})
	}
}

/// Parse raw text into a generic value tree.
pub fn parse_text(text: &str, format: InputFormat) -> Result<Value> {
	let parsed = match format {
		InputFormat::Json => serde_json::from_str(text).map_err(|err| err.to_string()),
		InputFormat::Yaml => serde_yaml::from_str(text).map_err(|err| err.to_string()),
	};
	parsed.map_err(|message| ConvertError::MalformedInput { format, message })
}

/// Render a value tree as text; `indent` spaces per level, `0` for compact JSON.
pub fn render_text(value: &Value, format: InputFormat, indent: usize) -> Result<String> {
	let rendered = match format {
		InputFormat::Yaml => serde_yaml::to_string(value).map_err(|err| err.to_string()),
		InputFormat::Json => render_json(value, indent),
	};
	rendered.map_err(|message| ConvertError::Render { format, message })
}

fn render_json(value: &Value, indent: usize) -> std::result::Result<String, String> {
	let mut out = Vec::new();
	if indent == 0 {
		value.serialize(&mut Serializer::new(&mut out)).map_err(|err| err.to_string())?;
	} else {
		let pad = vec![b' '; indent];
		let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&pad));
		value.serialize(&mut serializer).map_err(|err| err.to_string())?;
	}
	String::from_utf8(out).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use serde_json::json;

	use crate::convert::{ConvertError, InputFormat, parse_text, render_text};

	#[test]
	fn json_and_yaml_parse_to_the_same_tree() {
		let from_json = parse_text(r#"{"kind": "const-value", "tags": ["a", 1, true, null]}"#, InputFormat::Json).expect("json parses");
		let from_yaml = parse_text("kind: const-value\ntags: [a, 1, true, null]\n", InputFormat::Yaml).expect("yaml parses");
		assert_eq!(from_json, from_yaml);
	}

	#[test]
	fn malformed_text_reports_format() {
		let err = parse_text("{\"kind\": ", InputFormat::Json).expect_err("truncated json fails");
		assert!(matches!(err, ConvertError::MalformedInput { format: InputFormat::Json, .. }));

		let err = parse_text("kind: [unclosed", InputFormat::Yaml).expect_err("bad yaml fails");
		assert!(matches!(err, ConvertError::MalformedInput { format: InputFormat::Yaml, .. }));
	}

	#[test]
	fn render_honours_indent() {
		let value = json!({ "a": [1] });
		assert_eq!(render_text(&value, InputFormat::Json, 0).expect("renders"), r#"{"a":[1]}"#);
		assert_eq!(render_text(&value, InputFormat::Json, 2).expect("renders"), "{\n  \"a\": [\n    1\n  ]\n}");
		assert_eq!(render_text(&value, InputFormat::Json, 4).expect("renders"), "{\n    \"a\": [\n        1\n    ]\n}");
	}

	#[test]
	fn render_keeps_insertion_order() {
		let value = json!({ "zeta": 1, "alpha": 2 });
		assert_eq!(render_text(&value, InputFormat::Json, 0).expect("renders"), r#"{"zeta":1,"alpha":2}"#);
	}

	#[test]
	fn format_follows_extension() {
		assert_eq!(InputFormat::from_path(Path::new("schema.yml")), InputFormat::Yaml);
		assert_eq!(InputFormat::from_path(Path::new("schema.YAML")), InputFormat::Yaml);
		assert_eq!(InputFormat::from_path(Path::new("schema.json")), InputFormat::Json);
		assert_eq!(InputFormat::from_path(Path::new("schema")), InputFormat::Json);
	}
}
