#![allow(missing_docs)]

use chrono::DateTime;
use proptest::prelude::*;
use serde_json::{Map, Value, json};
use typecast::convert::{Converter, Descriptor, DescriptorTable, Direction, FieldDescriptor, Timestamp};

const MODES: [&str; 3] = ["manual", "schedule", "event"];

fn job_converter() -> Converter {
	let table = DescriptorTable::builder()
		.insert(
			"Job",
			Descriptor::object(
				vec![
					FieldDescriptor::new("jobName", "job_name", Descriptor::string()),
					FieldDescriptor::same("retries", Descriptor::number()),
					FieldDescriptor::same("mode", Descriptor::literals(MODES)),
					FieldDescriptor::same("tags", Descriptor::optional(Descriptor::array(Descriptor::string()))),
					FieldDescriptor::same("limit", Descriptor::union(vec![Descriptor::string(), Descriptor::number()])),
					FieldDescriptor::same("labels", Descriptor::reference("Labels")),
					FieldDescriptor::new("startAt", "start_at", Descriptor::optional(Descriptor::Date)),
				],
				Descriptor::Never,
			),
		)
		.insert("Labels", Descriptor::map(Descriptor::string()))
		.build()
		.expect("job table builds");
	Converter::new(table)
}

/// Typed-side job values; dates are generated already normalized.
fn typed_job() -> impl Strategy<Value = Value> {
	(
		"[a-z][a-z0-9-]{0,20}",
		any::<i64>(),
		prop::sample::select(MODES.to_vec()),
		prop::option::of(prop::collection::vec("[a-z]{1,8}", 0..4)),
		prop_oneof![any::<i64>().prop_map(|n| json!(n)), "[a-z0-9 ]{0,12}".prop_map(Value::String)],
		prop::collection::btree_map("[a-z]{1,8}", "[a-zA-Z0-9 ]{0,16}", 0..4),
		prop::option::of(0i64..4_102_444_800),
	)
		.prop_map(|(name, retries, mode, tags, limit, labels, start)| {
			let mut job = Map::new();
			job.insert("job_name".to_owned(), json!(name));
			job.insert("retries".to_owned(), json!(retries));
			job.insert("mode".to_owned(), json!(mode));
			if let Some(tags) = tags {
				job.insert("tags".to_owned(), json!(tags));
			}
			job.insert("limit".to_owned(), limit);
			job.insert("labels".to_owned(), json!(labels));
			if let Some(at) = start.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
				job.insert("start_at".to_owned(), json!(Timestamp::from(at).to_rfc3339()));
			}
			Value::Object(job)
		})
}

/// JSON-compatible values without floats.
fn json_value_no_floats() -> impl Strategy<Value = Value> {
	let leaf = prop_oneof![
		Just(Value::Null),
		any::<bool>().prop_map(Value::Bool),
		any::<i64>().prop_map(|n| json!(n)),
		"[a-zA-Z0-9_ ]{0,50}".prop_map(Value::String),
	];
	leaf.prop_recursive(4, 64, 8, |inner| {
		prop_oneof![
			prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
			prop::collection::btree_map("[a-z]{1,10}", inner, 0..8).prop_map(|m| Value::Object(m.into_iter().collect())),
		]
	})
}

fn non_string() -> impl Strategy<Value = Value> {
	json_value_no_floats().prop_filter("strings are accepted", |value| !value.is_string())
}

proptest! {
	/// Encoding a typed value and decoding it again yields the same value.
	#[test]
	fn encode_then_decode_restores_typed_value(job in typed_job()) {
		let conv = job_converter();
		let encoded = conv.encode_value(&job, "Job").expect("typed job encodes");
		prop_assert!(encoded.get("jobName").is_some());
		prop_assert!(encoded.get("job_name").is_none());
		prop_assert_eq!(encoded.get("startAt").is_some(), job.get("start_at").is_some());

		let decoded = conv.decode_value(&encoded, "Job").expect("encoded job decodes");
		prop_assert_eq!(decoded, job);
	}

	#[test]
	fn any_descriptor_passes_values_through(value in json_value_no_floats()) {
		let conv = job_converter();
		for direction in Direction::ALL {
			let out = conv.transform(&value, &Descriptor::Any, direction).expect("any accepts everything");
			prop_assert_eq!(&out, &value);
		}
	}

	#[test]
	fn string_descriptor_rejects_other_kinds(value in non_string()) {
		let conv = job_converter();
		let err = conv.transform(&value, &Descriptor::string(), Direction::Decode).expect_err("only strings pass");
		let err = err.as_conversion().expect("conversion error");
		prop_assert_eq!(err.expected.as_str(), "string");
	}

	#[test]
	fn literal_sets_accept_exactly_their_members(text in "[a-z]{1,9}") {
		let conv = job_converter();
		let accepted = conv.transform(&json!(text), &Descriptor::literals(MODES), Direction::Decode).is_ok();
		prop_assert_eq!(accepted, MODES.contains(&text.as_str()));
	}
}
