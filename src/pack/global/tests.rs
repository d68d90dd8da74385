mod snapshots {

	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::mpsc;
	use std::sync::{Arc, Mutex};
	use std::time::Duration;

	use respack_testkit::Scratch;

	use crate::pack::{CacheMode, CompileOptions, Dict, FactoryRegistry, GlobalResources, ResourceObjects, Value};

	fn snapshot(name: &str) -> ResourceObjects {
		let mut dict = Dict::new();
		dict.set(name, Value::Int(1));
		ResourceObjects::new(&dict, FactoryRegistry::global())
	}

	#[test]
	fn readers_keep_their_snapshot_across_replace() {
		let global = GlobalResources::new(snapshot("old"));
		let held = global.get();

		let previous = global.replace(snapshot("new"));
		assert!(previous.contains("old"));
		assert!(held.contains("old"));
		assert!(held.get_resource_object("old").value().is_some());
		assert!(global.get().contains("new"));
		assert!(!global.get().contains("old"));
	}

	#[test]
	fn rebuild_swaps_and_notifies() {
		let global = GlobalResources::default();
		let notified = Arc::new(AtomicUsize::new(0));
		let counter = notified.clone();
		global.on_rebuilt(move |resources| {
			assert!(resources.contains("fresh"));
			counter.fetch_add(1, Ordering::SeqCst);
		});

		assert!(global.rebuild_async(|| Some(snapshot("fresh"))));
		global.wait_for_rebuild();

		assert!(global.get().contains("fresh"));
		assert_eq!(notified.load(Ordering::SeqCst), 1);
		assert!(!global.is_rebuilding());
	}

	#[test]
	fn failed_rebuild_keeps_the_current_snapshot() {
		let global = GlobalResources::new(snapshot("stable"));
		assert!(global.rebuild_async(|| None));
		global.wait_for_rebuild();
		assert!(global.get().contains("stable"));
	}

	#[test]
	fn requests_during_a_rebuild_coalesce_into_one_follow_up() {
		let global = GlobalResources::default();
		let (started_tx, started_rx) = mpsc::channel();
		let (release_tx, release_rx) = mpsc::channel::<()>();
		let release_rx = Mutex::new(release_rx);
		let runs = Arc::new(AtomicUsize::new(0));

		let first_runs = runs.clone();
		assert!(global.rebuild_async(move || {
			first_runs.fetch_add(1, Ordering::SeqCst);
			let _ = started_tx.send(());
			let _ = release_rx.lock().expect("release lock").recv_timeout(Duration::from_secs(5));
			Some(snapshot("first"))
		}));
		started_rx.recv_timeout(Duration::from_secs(5)).expect("first rebuild starts");

		for name in ["second", "third", "fourth"] {
			let runs = runs.clone();
			assert!(!global.rebuild_async(move || {
				runs.fetch_add(1, Ordering::SeqCst);
				Some(snapshot(name))
			}));
		}
		assert!(global.is_rebuilding());

		release_tx.send(()).expect("release first rebuild");
		global.wait_for_rebuild();

		assert_eq!(runs.load(Ordering::SeqCst), 2);
		assert!(global.get().contains("fourth"));
	}

	#[test]
	fn panicking_build_does_not_block_later_rebuilds() {
		let global = GlobalResources::new(snapshot("stable"));
		assert!(global.rebuild_async(|| panic!("factory bug")));
		global.wait_for_rebuild();
		assert!(!global.is_rebuilding());
		assert!(global.get().contains("stable"));

		assert!(global.rebuild_async(|| Some(snapshot("after"))));
		global.wait_for_rebuild();
		assert!(global.get().contains("after"));
	}

	#[test]
	fn listeners_may_register_listeners() {
		let global = GlobalResources::default();
		let nested = Arc::new(AtomicUsize::new(0));

		let registrar = global.clone();
		let counter = nested.clone();
		global.on_rebuilt(move |_| {
			let counter = counter.clone();
			registrar.on_rebuilt(move |_| {
				counter.fetch_add(1, Ordering::SeqCst);
			});
		});

		global.rebuild_async(|| Some(snapshot("one")));
		global.wait_for_rebuild();
		assert_eq!(nested.load(Ordering::SeqCst), 0);

		global.rebuild_async(|| Some(snapshot("two")));
		global.wait_for_rebuild();
		assert_eq!(nested.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn rebuild_from_file_compiles_the_description() {
		let scratch = Scratch::new();
		let source = scratch.write("res.json", r#"{"greeting": {"text": "hi"}}"#);

		let global = GlobalResources::default();
		assert!(global.rebuild_from_file(source, CompileOptions::default(), CacheMode::None));
		global.wait_for_rebuild();

		let resources = global.get();
		assert!(resources.contains("greeting"));
		assert!(!resources.contains("res:files"));
		assert_eq!(resources.get_resource_object("greeting").value().and_then(|value| value.named_child("text")), Some(Value::from("hi")));
	}
}
