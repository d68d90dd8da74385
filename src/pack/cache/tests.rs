mod validation {

	use std::path::PathBuf;

	use respack_testkit::{Offset, Scratch};

	use crate::pack::{CacheMode, CompileOptions, default_cache_path, is_resource_cache_updated, load_cached_resources, load_resources_from_file};

	fn build(scratch: &Scratch) -> (PathBuf, PathBuf) {
		scratch.write("hello.txt", "hi");
		let source = scratch.write("res.json", r#"{"greeting":{"res:type":"file","file":"file:hello.txt"}}"#);
		scratch.set_mtime("hello.txt", Offset::Past(60));
		scratch.set_mtime("res.json", Offset::Past(60));

		let cache = scratch.path("out/res.pack");
		let result = load_resources_from_file(&source, &CompileOptions::default(), &CacheMode::Rebuild(cache.clone()));
		assert!(result.status, "errors: {:?}", result.errors);
		(source, cache)
	}

	#[test]
	fn untouched_cache_is_current() {
		let scratch = Scratch::new();
		let (source, cache) = build(&scratch);

		assert!(is_resource_cache_updated(&source, &cache));
		assert!(load_cached_resources(&cache).is_some_and(|dict| dict.contains("greeting")));
	}

	#[test]
	fn touched_dependency_invalidates() {
		let scratch = Scratch::new();
		let (source, cache) = build(&scratch);

		scratch.set_mtime("hello.txt", Offset::Future(60));
		assert!(!is_resource_cache_updated(&source, &cache));
		assert!(load_cached_resources(&cache).is_none());
	}

	#[test]
	fn removed_dependency_invalidates() {
		let scratch = Scratch::new();
		let (source, cache) = build(&scratch);

		std::fs::remove_file(scratch.path("hello.txt")).expect("dependency removed");
		assert!(!is_resource_cache_updated(&source, &cache));
	}

	#[test]
	fn touched_source_invalidates() {
		let scratch = Scratch::new();
		let (source, cache) = build(&scratch);

		scratch.set_mtime("res.json", Offset::Future(60));
		assert!(!is_resource_cache_updated(&source, &cache));
	}

	#[test]
	fn cache_must_list_the_input() {
		let scratch = Scratch::new();
		let (_, cache) = build(&scratch);

		let stranger = scratch.write("other.json", "{}");
		scratch.set_mtime("other.json", Offset::Past(60));
		assert!(!is_resource_cache_updated(&stranger, &cache));
	}

	#[test]
	fn missing_or_corrupt_caches_miss() {
		let scratch = Scratch::new();
		let source = scratch.write("res.json", "{}");
		assert!(!is_resource_cache_updated(&source, &scratch.path("absent.pack")));

		let corrupt = scratch.write("corrupt.pack", b"not a pack");
		assert!(load_cached_resources(&corrupt).is_none());
		assert!(!is_resource_cache_updated(&source, &corrupt));
	}

	#[test]
	fn default_paths_depend_on_source_and_mode() {
		let scratch = Scratch::new();
		let first = scratch.write("a/res.json", "{}");
		let second = scratch.write("b/res.json", "{}");

		let release = default_cache_path(&first, false);
		let debug = default_cache_path(&first, true);
		assert_ne!(release, default_cache_path(&second, false));
		assert_eq!(release, default_cache_path(&first, false));
		assert!(release.to_string_lossy().ends_with(".pack"));
		assert!(debug.to_string_lossy().ends_with(".debug.pack"));
		assert!(release.file_name().is_some_and(|name| name.to_string_lossy().starts_with("res.")));
	}
}
