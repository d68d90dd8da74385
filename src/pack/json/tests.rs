mod parsing {

	use crate::pack::{PackError, Value, ValueKind, json_parse};

	#[test]
	fn comments_and_trailing_commas_are_accepted() {
		let dict = json_parse(
			r#"
			// leading comment
			{
				"list": [1, 2, 3,], /* inline */
				"nested": { "a": true, },
			}
			"#,
		)
		.expect("relaxed json parses");

		assert_eq!(dict.get("/list[2]"), Some(Value::Int(3)));
		assert_eq!(dict.get("/nested/a"), Some(Value::Bool(true)));
	}

	#[test]
	fn integral_numbers_in_range_become_ints() {
		let dict = json_parse(r#"{"a": 2, "b": 2.0, "c": 2.5, "d": 3000000000, "e": -1e2, "f": 1.5e300}"#).expect("numbers parse");

		assert_eq!(dict.get("a"), Some(Value::Int(2)));
		assert_eq!(dict.get("b"), Some(Value::Int(2)));
		assert_eq!(dict.get("c"), Some(Value::Double(2.5)));
		assert_eq!(dict.get("d").map(|value| value.kind()), Some(ValueKind::Double));
		assert_eq!(dict.get("e"), Some(Value::Int(-100)));
		assert_eq!(dict.get("f"), Some(Value::Double(1.5e300)));
	}

	#[test]
	fn escapes_and_surrogate_pairs_decode() {
		let dict = json_parse(r#"{"s": "tab\there \"q\" é 😀 \/"}"#).expect("escapes parse");
		assert_eq!(dict.get_as::<String>("s").as_deref(), Some("tab\there \"q\" é 😀 /"));
	}

	#[test]
	fn duplicate_keys_keep_the_last_value() {
		let dict = json_parse(r#"{"k": 1, "k": 2}"#).expect("duplicates parse");
		assert_eq!(dict.len(), 1);
		assert_eq!(dict.get("k"), Some(Value::Int(2)));
	}

	#[test]
	fn errors_report_offset_and_excerpt() {
		let err = json_parse(r#"{"a": 1 "b": 2}"#).expect_err("missing comma fails");
		let PackError::JsonParse { offset, excerpt } = &err else {
			panic!("expected json parse error, got {err:?}");
		};
		assert_eq!(*offset, 8);
		assert_eq!(excerpt, r#""b": 2}"#);
		assert!(err.to_string().starts_with("Failed parsing JSON at pos: 8"));
	}

	#[test]
	fn malformed_inputs_fail() {
		for text in ["", "[1, 2]", "{", r#"{"a": }"#, r#"{"a": 1} trailing"#, r#"{"a": tru}"#, r#"{"a": "open}"#, "{ /* open", r#"{"a": 01x}"#] {
			assert!(json_parse(text).is_err(), "{text:?} should fail");
		}
	}

	#[test]
	fn nesting_beyond_the_limit_fails() {
		let text = format!(r#"{{"a": {}{}}}"#, "[".repeat(300), "]".repeat(300));
		assert!(json_parse(&text).is_err());
	}
}

mod writing {

	use crate::pack::{Dict, SavedData, Value, json_parse, json_write};

	#[test]
	fn output_is_sorted_and_indented() {
		let dict = json_parse(r#"{"b": [1, {"y": null, "x": "s"}], "a": 0.5, "c": {}}"#).expect("input parses");
		let expected = "{\n  \"a\": 0.5,\n  \"b\": [\n    1,\n    {\n      \"x\": \"s\",\n      \"y\": null\n    }\n  ],\n  \"c\": {}\n}\n";
		assert_eq!(json_write(&dict), expected);
	}

	#[test]
	fn reparsing_written_output_is_stable() {
		let text = r#"{"z": [1, 2.25, "x\ny", true, null], "big": 1e20, "tiny": -2.5e-7, "n": {"k": [[]]}}"#;
		let first = json_parse(text).expect("input parses");
		let written = json_write(&first);
		let second = json_parse(&written).expect("output reparses");

		assert_eq!(first, second);
		assert_eq!(json_write(&second), written);
	}

	#[test]
	fn non_json_values_degrade() {
		let mut saved = Dict::new();
		saved.set("inner", 1);

		let mut dict = Dict::new();
		dict.set("bytes", vec![1_u8, 2]);
		dict.set("ref", Value::reference("target"));
		dict.set("nan", f64::NAN);
		dict.set("saved", SavedData::from_dict(&saved, true).expect("dict compresses"));

		let reparsed = json_parse(&json_write(&dict)).expect("output reparses");
		assert_eq!(reparsed.get("bytes"), Some(Value::Null));
		assert_eq!(reparsed.get("nan"), Some(Value::Null));
		assert_eq!(reparsed.get_as::<String>("ref").as_deref(), Some("ref:target"));
		assert_eq!(reparsed.get("/saved/inner"), Some(Value::Int(1)));
	}
}
