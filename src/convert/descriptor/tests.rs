use serde_json::json;

use crate::convert::{Descriptor, Direction, FieldDescriptor, Primitive};

#[test]
fn unit_kinds_parse_from_bare_strings() {
	let parsed: Vec<Descriptor> = serde_json::from_value(json!(["string", "number", "boolean", "date", "any", "null", "absent", "never"])).expect("descriptors parse");
	assert_eq!(
		parsed,
		vec![
			Descriptor::string(),
			Descriptor::number(),
			Descriptor::boolean(),
			Descriptor::Date,
			Descriptor::Any,
			Descriptor::Null,
			Descriptor::Absent,
			Descriptor::Never,
		]
	);
}

#[test]
fn object_document_defaults_typed_name_and_closes_object() {
	let parsed: Descriptor = serde_json::from_value(json!({
		"object": {
			"fields": [
				{ "json": "$schema", "name": "schema", "type": "string" },
				{ "json": "pattern", "type": { "optional": "string" } }
			]
		}
	}))
	.expect("object parses");

	let Descriptor::Object(object) = parsed else {
		panic!("expected object descriptor");
	};
	assert_eq!(object.fields().len(), 2);
	assert_eq!(object.fields()[0].serialized, "$schema");
	assert_eq!(object.fields()[0].typed, "schema");
	assert_eq!(object.fields()[1].typed, "pattern");
	assert_eq!(object.fields()[1].descriptor, Descriptor::optional(Descriptor::string()));
	assert_eq!(*object.additional(), Descriptor::Never);
}

#[test]
fn unknown_object_keys_are_rejected() {
	let parsed = serde_json::from_value::<Descriptor>(json!({ "object": { "fields": [], "extra": true } }));
	assert!(parsed.is_err());
}

#[test]
fn optional_union_serializes_as_optional() {
	let value = serde_json::to_value(Descriptor::optional(Descriptor::reference("Prompt"))).expect("descriptor serializes");
	assert_eq!(value, json!({ "optional": { "ref": "Prompt" } }));

	let value = serde_json::to_value(Descriptor::union(vec![Descriptor::number(), Descriptor::string()])).expect("descriptor serializes");
	assert_eq!(value, json!({ "union": ["number", "string"] }));
}

#[test]
fn renamed_fields_keep_both_names_when_serialized() {
	let descriptor = Descriptor::object(
		vec![FieldDescriptor::new("$ref", "reference", Descriptor::string()), FieldDescriptor::same("description", Descriptor::string())],
		Descriptor::Any,
	);
	let value = serde_json::to_value(&descriptor).expect("descriptor serializes");
	assert_eq!(
		value,
		json!({
			"object": {
				"fields": [
					{ "json": "$ref", "name": "reference", "type": "string" },
					{ "json": "description", "type": "string" }
				],
				"additional": "any"
			}
		})
	);
	let back: Descriptor = serde_json::from_value(value).expect("descriptor parses back");
	assert_eq!(back, descriptor);
}

#[test]
fn object_identity_is_unique_per_construction_and_shared_by_clones() {
	let Descriptor::Object(first) = Descriptor::map(Descriptor::Any) else {
		unreachable!()
	};
	let Descriptor::Object(second) = Descriptor::map(Descriptor::Any) else {
		unreachable!()
	};
	assert_ne!(first.id(), second.id());
	assert_eq!(first.clone().id(), first.id());
	assert_eq!(first, second, "equality ignores identity");
}

#[test]
fn describe_matches_diagnostic_wording() {
	assert_eq!(Descriptor::string().describe(), "string");
	assert_eq!(Descriptor::literals(["cron", "manual"]).describe(), "one of [\"cron\", \"manual\"]");
	assert_eq!(Descriptor::optional(Descriptor::number()).describe(), "an optional number");
	assert_eq!(Descriptor::union(vec![Descriptor::boolean(), Descriptor::reference("Prompt")]).describe(), "one of [boolean, Prompt]");
	assert_eq!(Descriptor::array(Descriptor::string()).describe(), "array");
	assert_eq!(Descriptor::Date.describe(), "Date");
}

#[test]
fn primitive_kinds_match_runtime_values() {
	assert!(Primitive::String.matches(&json!("a")));
	assert!(Primitive::Number.matches(&json!(1.5)));
	assert!(Primitive::Boolean.matches(&json!(false)));
	assert!(!Primitive::Number.matches(&json!("1")));
	assert!(!Primitive::String.matches(&json!(null)));
}

#[test]
fn field_names_follow_direction() {
	let field = FieldDescriptor::new("display_name", "displayName", Descriptor::string());
	assert_eq!(field.source_name(Direction::Decode), "display_name");
	assert_eq!(field.target_name(Direction::Decode), "displayName");
	assert_eq!(field.source_name(Direction::Encode), "displayName");
	assert_eq!(field.target_name(Direction::Encode), "display_name");
}
