#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use respack::pack::{
	CacheMode, CompileOptions, DictResource, FactoryRegistry, FileResource, GlobalResources, ResourceObjects, Value, load_resources_from_file, read_pack,
	write_pack,
};
use respack_testkit::Scratch;

fn description(scratch: &Scratch, greeting: &str) -> std::path::PathBuf {
	scratch.write("hello.txt", greeting);
	scratch.write(
		"res.json",
		r#"{
			"res:values": {"hp": 12},
			"greeting": {"res:type": "file", "file": "file:hello.txt"},
			"hero": {"res:type": "dict", "hp": "res:hp", "voice": "ref:greeting"},
			"note": {"text": "plain"}
		}"#,
	)
}

#[test]
fn compiled_pack_loads_lazily_from_disk() {
	let scratch = Scratch::new();
	let source = description(&scratch, "hello");
	let pack = scratch.path("res.pack");

	let compiled = load_resources_from_file(&source, &CompileOptions::default(), &CacheMode::None);
	assert!(compiled.status, "errors: {:?}", compiled.errors);
	write_pack(&pack, &compiled.dict).expect("pack written");

	let dict = read_pack(&pack).expect("pack read");
	let objects = ResourceObjects::new(&dict, FactoryRegistry::global());
	assert_eq!(objects.names().len(), 3);

	let hero = objects.get_resource_object("hero");
	assert!(hero.is_valid());
	assert!(!hero.is_loaded());

	let object = hero.object().expect("hero constructs");
	let fields = object.as_any().downcast_ref::<DictResource>().expect("dict resource").fields();
	assert_eq!(fields.get("hp"), Some(Value::Int(12)));
	assert!(hero.is_loaded());
	assert_eq!(objects.resource_get_dependencies("hero"), vec![Arc::<str>::from("greeting")]);

	let greeting = objects.get_resource_object("greeting").object().expect("greeting constructs");
	assert_eq!(greeting.as_any().downcast_ref::<FileResource>().expect("file resource").data(), b"hello");

	let note = objects.get_resource_object("note");
	assert!(note.object().is_none(), "untyped entries have no object");
	assert_eq!(note.value().and_then(|value| value.as_dict().and_then(|dict| dict.get_as::<String>("text"))).as_deref(), Some("plain"));

	assert!(!objects.get_resource_object("missing").is_valid());
	assert_eq!(objects.flush_all_resources(), Ok(()));
	assert!(objects.take_errors().is_empty());
}

#[test]
fn global_snapshot_follows_source_edits() {
	let scratch = Scratch::new();
	let source = description(&scratch, "first");

	let global = GlobalResources::default();
	let swaps = Arc::new(AtomicUsize::new(0));
	let counter = swaps.clone();
	global.on_rebuilt(move |_| {
		counter.fetch_add(1, Ordering::SeqCst);
	});

	let held = global.get();
	assert!(held.names().is_empty());

	global.rebuild_from_file(source.clone(), CompileOptions::default(), CacheMode::None);
	global.wait_for_rebuild();
	let first = global.get();
	let data = |objects: &ResourceObjects| {
		let object = objects.get_resource_object("greeting").object().expect("greeting constructs");
		object.as_any().downcast_ref::<FileResource>().expect("file resource").data().to_vec()
	};
	assert_eq!(data(&first), b"first");

	scratch.write("hello.txt", "second");
	global.rebuild_from_file(source.clone(), CompileOptions::default(), CacheMode::None);
	global.wait_for_rebuild();
	assert_eq!(data(&global.get()), b"second");
	assert_eq!(data(&first), b"first", "held snapshots do not change");

	std::fs::remove_file(scratch.path("hello.txt")).expect("dependency removed");
	global.rebuild_from_file(source, CompileOptions::default(), CacheMode::None);
	global.wait_for_rebuild();
	assert_eq!(data(&global.get()), b"second", "failed rebuild keeps the snapshot");

	assert_eq!(swaps.load(Ordering::SeqCst), 2);
	assert!(held.names().is_empty());
}
