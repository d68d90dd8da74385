mod persistence {

	use crate::pack::{DICT_MAGIC, Dict, PackError, PackWriter, Value, json_parse};

	fn sample() -> Dict {
		json_parse(
			r#"{
				"name": "hero",
				"hp": 120,
				"speed": 1.5,
				"tags": ["a", "b"],
				"stats": { "str": 4, "inner": { "deep": true } },
				"slots": [{ "item": "sword" }, null]
			}"#,
		)
		.expect("sample parses")
	}

	#[test]
	fn save_then_load_child_dicts_round_trips() {
		let dict = sample();
		let bytes = dict.to_bytes();
		assert_eq!(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), DICT_MAGIC);

		let mut loaded = Dict::load(&bytes).expect("dict loads");
		loaded.load_child_dicts().expect("children load");
		assert_eq!(loaded, dict);
		assert_eq!(loaded.child_names(false), dict.child_names(false));
	}

	#[test]
	fn raw_children_resave_verbatim() {
		let bytes = sample().to_bytes();
		let loaded = Dict::load(&bytes).expect("dict loads");
		assert_eq!(loaded.to_bytes(), bytes);
	}

	#[test]
	fn locations_cover_each_top_level_value() {
		let dict = sample();
		let mut writer = PackWriter::new();
		let mut locations = Vec::new();
		dict.save(&mut writer, Some(&mut locations));
		let bytes = writer.into_bytes();

		assert_eq!(locations.len(), dict.len());
		for location in &locations {
			let encoded = &bytes[location.offset..location.offset + location.size];
			let value = Value::load_typed(encoded).expect("location spans one value");
			assert_eq!(Some(value), dict.get(&location.name));
		}
	}

	#[test]
	fn dicts_inside_nested_lists_are_materialized() {
		let dict = json_parse(r#"{"grid": [[{"x": 1}], [[{"y": 2}]]]}"#).expect("grid parses");
		let mut loaded = Dict::load(&dict.to_bytes()).expect("dict loads");
		loaded.load_child_dicts().expect("children load");

		let grid = loaded.get_ref("grid").and_then(Value::as_list).expect("grid list");
		let first = grid[0].as_list().expect("first row");
		let second = grid[1].as_list().and_then(|row| row[0].as_list()).expect("second row");
		for cell in [&first[0], &second[0]] {
			assert!(matches!(cell, Value::Dict(slot) if slot.is_loaded()), "{cell:?} is still raw");
		}
		assert_eq!(loaded, dict);
	}

	#[test]
	fn corrupt_blocks_are_rejected() {
		assert!(matches!(Dict::load(&[0, 0, 0, 0, 0, 0, 0, 0]), Err(PackError::BadDictMagic { at: 0, got: 0 })));

		let mut bytes = sample().to_bytes();
		bytes.push(0);
		assert!(matches!(Dict::load(&bytes), Err(PackError::TrailingBytes { .. })));

		let bytes = sample().to_bytes();
		assert!(Dict::load(&bytes[..bytes.len() - 1]).is_err());
	}
}

mod access {

	use crate::pack::{Dict, PackStruct, Value, json_parse};

	#[derive(Debug, PartialEq)]
	struct Extent {
		width: u16,
		height: u16,
	}

	impl PackStruct for Extent {
		const SIZE: usize = 4;

		fn write_bytes(&self, out: &mut Vec<u8>) {
			out.extend_from_slice(&self.width.to_le_bytes());
			out.extend_from_slice(&self.height.to_le_bytes());
		}

		fn read_bytes(bytes: &[u8]) -> Option<Self> {
			Some(Self {
				width: u16::from_le_bytes([*bytes.first()?, *bytes.get(1)?]),
				height: u16::from_le_bytes([*bytes.get(2)?, *bytes.get(3)?]),
			})
		}
	}

	#[test]
	fn deep_paths_traverse_dicts_and_lists() {
		let dict = json_parse(r#"{"first":[1,"two",{"three":[10,20,30]}]}"#).expect("dict parses");

		assert_eq!(dict.get("/first[2]/three[1]"), Some(Value::Int(20)));
		assert_eq!(dict.get("/first[1]/"), None);
		assert_eq!(dict.get("/missing"), None);
		assert_eq!(dict.get("/first[9]"), None);
		assert_eq!(dict.get("/first[x]"), None);
		assert_eq!(dict.get_as::<String>("/first[1]").as_deref(), Some("two"));
	}

	#[test]
	fn deep_paths_reach_into_loaded_raw_dicts() {
		let source = json_parse(r#"{"outer":{"inner":{"leaf":[5]}}}"#).expect("dict parses");
		let loaded = Dict::load(&source.to_bytes()).expect("dict loads");
		assert_eq!(loaded.get("/outer/inner/leaf[0]"), Some(Value::Int(5)));
	}

	#[test]
	fn typed_getters_coerce_and_default() {
		let mut dict = Dict::new();
		dict.set("count", "12");
		dict.set("ratio", 2);

		assert_eq!(dict.get_as::<i32>("count"), Some(12));
		assert_eq!(dict.get_as::<f64>("ratio"), Some(2.0));
		assert_eq!(dict.get_or("absent", 7), 7);
		assert_eq!(dict.get_or_default::<String>("absent"), "");
		assert!(!dict.get_or("count", false));
	}

	#[test]
	fn structs_round_trip_with_size_check() {
		let mut dict = Dict::new();
		dict.set_struct("extent", &Extent { width: 640, height: 480 });
		dict.set("short", Value::struct_bytes(&[1, 2]));

		assert_eq!(dict.get_struct::<Extent>("extent"), Some(Extent { width: 640, height: 480 }));
		assert_eq!(dict.get_struct::<Extent>("short"), None);
		assert_eq!(dict.get_struct::<Extent>("missing"), None);
	}

	#[test]
	fn set_replaces_in_place_and_remove_keeps_order() {
		let mut dict: Dict = [("a", Value::Int(1)), ("b", Value::Int(2)), ("c", Value::Int(3))].into_iter().collect();
		dict.set("a", 10);
		dict.remove("b");

		let names: Vec<String> = dict.child_names(false).iter().map(|name| name.to_string()).collect();
		assert_eq!(names, ["a", "c"]);
		assert_eq!(dict.get("a"), Some(Value::Int(10)));
	}
}

mod merging {

	use crate::pack::{Dict, Value, json_parse};

	#[test]
	fn shallow_merge_replaces_child_dicts() {
		let mut base = json_parse(r#"{"a":1,"child":{"x":1,"y":2}}"#).expect("base parses");
		let other = json_parse(r#"{"b":2,"child":{"y":3}}"#).expect("other parses");
		base.merge(&other, false);

		assert_eq!(base.get("b"), Some(Value::Int(2)));
		assert_eq!(base.get("/child/x"), None);
		assert_eq!(base.get("/child/y"), Some(Value::Int(3)));
	}

	#[test]
	fn deep_merge_combines_child_dicts() {
		let mut base = json_parse(r#"{"child":{"x":1,"y":2,"grand":{"k":1}}}"#).expect("base parses");
		let other = json_parse(r#"{"child":{"y":3,"grand":{"j":2}}}"#).expect("other parses");
		base.merge(&other, true);

		assert_eq!(base.get("/child/x"), Some(Value::Int(1)));
		assert_eq!(base.get("/child/y"), Some(Value::Int(3)));
		assert_eq!(base.get("/child/grand/k"), Some(Value::Int(1)));
		assert_eq!(base.get("/child/grand/j"), Some(Value::Int(2)));
	}

	#[test]
	fn print_lists_children_sorted_and_indented() {
		let mut child = Dict::new();
		child.set("z", 1);
		child.set("a", "text");

		let mut dict = Dict::new();
		dict.set("list", Value::list([Value::Bool(true)]));
		dict.set("child", child);

		let expected = "child = <dict[2]>\n    a = text\n    z = 1\nlist = <list[1]>\n    [0] = true\n";
		assert_eq!(dict.to_string(), expected);
	}
}
