mod file_resource {

	use std::path::Path;

	use respack_testkit::Scratch;

	use crate::pack::{Dict, FileFactory, FileResource, LoadContext, ResourceFactory, SavedData, Value, ValueKind};

	fn descriptor(path: &Path) -> Dict {
		let mut dict = Dict::new();
		dict.set("res:type", "file");
		dict.set("file", path.display().to_string());
		dict
	}

	#[test]
	fn cached_form_round_trips() {
		let scratch = Scratch::new();
		let path = scratch.write("notes.txt", "some notes");
		let mut context = LoadContext::new(&scratch.root(), false);

		let object = FileFactory.load_from_source(&descriptor(&path), &mut context).expect("file loads");
		assert!(context.errors().is_empty());

		let mut cached = Dict::new();
		assert!(object.save_to_cache(&mut cached));
		assert!(cached.get("data").is_some_and(|data| data.is(ValueKind::Saved)));
		assert_eq!(cached.get("extension"), Some(Value::from(".txt")));

		let reloaded = FileFactory.load_from_cache(&cached).expect("cached form loads");
		let file = reloaded.as_any().downcast_ref::<FileResource>().expect("file resource");
		assert_eq!(file.data(), b"some notes");
		assert!(file.compress());
	}

	#[test]
	fn explicit_compress_flag_wins() {
		let scratch = Scratch::new();
		let path = scratch.write("notes.txt", "raw");
		let mut dict = descriptor(&path);
		dict.set("compress", false);

		let object = FileFactory.load_from_source(&dict, &mut LoadContext::new(&scratch.root(), false)).expect("file loads");
		let mut cached = Dict::new();
		assert!(object.save_to_cache(&mut cached));
		assert_eq!(cached.get("data"), Some(Value::from(b"raw".as_slice())));
	}

	#[test]
	fn cache_accepts_plain_or_saved_bytes() {
		let mut plain = Dict::new();
		plain.set("data", vec![1_u8, 2]);
		let object = FileFactory.load_from_cache(&plain).expect("plain bytes load");
		assert_eq!(object.as_any().downcast_ref::<FileResource>().map(FileResource::data), Some([1_u8, 2].as_slice()));

		let mut saved = Dict::new();
		saved.set("data", SavedData::from_bytes(&[3, 4], true).expect("bytes compress"));
		let object = FileFactory.load_from_cache(&saved).expect("saved bytes load");
		assert_eq!(object.as_any().downcast_ref::<FileResource>().map(FileResource::data), Some([3_u8, 4].as_slice()));

		assert!(FileFactory.load_from_cache(&Dict::new()).is_none());
	}

	#[test]
	fn unreadable_files_record_errors() {
		let scratch = Scratch::new();
		let mut context = LoadContext::new(&scratch.root(), false);
		assert!(FileFactory.load_from_source(&descriptor(&scratch.path("gone.bin")), &mut context).is_none());
		assert!(context.errors()[0].starts_with("Failed to read file:"));
	}

	#[test]
	fn save_to_file_keeps_the_extension() {
		let scratch = Scratch::new();
		let mut cached = Dict::new();
		cached.set("data", vec![7_u8]);
		cached.set("extension", ".bin");

		let object = FileFactory.load_from_cache(&cached).expect("cached form loads");
		let written = object.save_to_file(&scratch.path("out"), "blob").expect("file writes").expect("file form exists");
		assert_eq!(written, scratch.path("out/blob.bin"));
		assert_eq!(std::fs::read(written).expect("written file reads"), vec![7_u8]);
	}
}

mod dict_resource {

	use std::sync::Arc;

	use crate::pack::{DictFactory, DictResource, ResourceFactory, Value, json_parse};

	#[test]
	fn fields_drop_reserved_keys_and_refs_become_dependencies() {
		let mut descriptor = json_parse(r#"{"res:type": "dict", "speed": 3}"#).expect("descriptor parses");
		descriptor.set("weapon", Value::reference("sword"));
		descriptor.set("extras", Value::list([Value::reference("shield"), Value::reference("sword")]));

		let object = DictFactory.load_from_cache(&descriptor).expect("dict loads");
		let resource = object.as_any().downcast_ref::<DictResource>().expect("dict resource");

		assert!(!resource.fields().contains("res:type"));
		assert_eq!(resource.fields().get("speed"), Some(Value::Int(3)));
		assert_eq!(object.dependencies(), vec![Arc::<str>::from("sword"), Arc::from("shield")]);
		assert_eq!(object.type_name(), "dict");
	}
}
