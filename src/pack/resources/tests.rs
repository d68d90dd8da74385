mod support {

	use std::any::Any;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::{Arc, Mutex};
	use std::thread;
	use std::time::Duration;

	use crate::pack::{Dict, FactoryRegistry, LoadContext, ResourceFactory, ResourceObject, Value};

	/// Object that records its name and declared dependencies.
	#[derive(Debug)]
	pub struct Counted {
		pub name: String,
		pub needs: Vec<Arc<str>>,
	}

	impl ResourceObject for Counted {
		fn type_name(&self) -> &str {
			"counted"
		}

		fn save_to_cache(&self, dict: &mut Dict) -> bool {
			dict.set("name", self.name.as_str());
			true
		}

		fn dependencies(&self) -> Vec<Arc<str>> {
			self.needs.clone()
		}

		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	/// Factory counting every construction, slowed down to widen race windows.
	#[derive(Default)]
	pub struct CountingFactory {
		pub builds: Arc<AtomicUsize>,
		pub order: Arc<Mutex<Vec<String>>>,
	}

	impl ResourceFactory for CountingFactory {
		fn load_from_source(&self, dict: &Dict, _context: &mut LoadContext) -> Option<Arc<dyn ResourceObject>> {
			self.load_from_cache(dict)
		}

		fn load_from_cache(&self, dict: &Dict) -> Option<Arc<dyn ResourceObject>> {
			self.builds.fetch_add(1, Ordering::SeqCst);
			thread::sleep(Duration::from_millis(20));

			let name: String = dict.get_as("name")?;
			if name == "broken" {
				return None;
			}
			self.order.lock().expect("order lock").push(name.clone());

			let needs = dict.get_as::<Vec<String>>("needs").unwrap_or_default().into_iter().map(Arc::from).collect();
			Some(Arc::new(Counted { name, needs }))
		}
	}

	pub fn registry() -> (Arc<FactoryRegistry>, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>) {
		let factory = CountingFactory::default();
		let builds = factory.builds.clone();
		let order = factory.order.clone();

		let mut registry = FactoryRegistry::with_builtins();
		registry.register("counted", factory);
		(Arc::new(registry), builds, order)
	}

	pub fn entry(name: &str, needs: &[&str]) -> Value {
		let mut dict = Dict::new();
		dict.set("res:type", "counted");
		dict.set("name", name);
		dict.set("needs", needs.iter().map(|need| need.to_string()).collect::<Vec<_>>());
		Value::from(dict)
	}
}

mod construction {

	use std::sync::Arc;
	use std::sync::atomic::Ordering;
	use std::thread;

	use super::support::{Counted, entry, registry};
	use crate::pack::{Dict, ResourceObjects, SavedData, Value};

	#[test]
	fn concurrent_requests_construct_once() {
		let (factories, builds, _) = registry();
		let mut dict = Dict::new();
		dict.set("x", entry("x", &[]));
		let resources = ResourceObjects::new(&dict, factories);

		let handles: Vec<_> = (0..16)
			.map(|_| {
				let resources = resources.clone();
				thread::spawn(move || resources.get_resource_object("x").object().is_some())
			})
			.collect();

		for handle in handles {
			assert!(handle.join().expect("worker joins"));
		}
		assert_eq!(builds.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn handles_are_lazy_and_memoized() {
		let (factories, builds, _) = registry();
		let mut dict = Dict::new();
		dict.set("x", entry("x", &[]));
		dict.set("res:files", vec!["a".to_owned()]);
		let resources = ResourceObjects::new(&dict, factories);

		assert_eq!(resources.names(), vec![Arc::<str>::from("x")]);
		let handle = resources.get_resource_object("x");
		assert!(handle.is_valid());
		assert!(!handle.is_loaded());
		assert_eq!(builds.load(Ordering::SeqCst), 0);

		let first = handle.object().expect("object builds");
		let second = resources.get_resource_object("x").object().expect("object is memoized");
		assert!(Arc::ptr_eq(&first, &second));
		assert!(handle.is_loaded());
		assert_eq!(first.as_any().downcast_ref::<Counted>().map(|counted| counted.name.as_str()), Some("x"));
		assert_eq!(builds.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn unknown_names_and_untyped_entries_have_no_object() {
		let (factories, _, _) = registry();
		let mut dict = Dict::new();
		dict.set("plain", Value::Int(3));
		let resources = ResourceObjects::new(&dict, factories);

		let missing = resources.get_resource_object("nope");
		assert!(!missing.is_valid());
		assert!(missing.object().is_none());
		assert!(missing.value().is_none());

		let plain = resources.get_resource_object("plain");
		assert!(plain.object().is_none());
		assert_eq!(plain.value(), Some(Value::Int(3)));
		assert!(resources.take_errors().is_empty());
	}

	#[test]
	fn failures_are_logged_not_raised() {
		let (factories, _, _) = registry();
		let mut dict = Dict::new();
		dict.set("bad", entry("broken", &[]));
		let mut unknown = Dict::new();
		unknown.set("res:type", "texture");
		dict.set("odd", unknown);
		let resources = ResourceObjects::new(&dict, factories);

		assert!(resources.get_resource_object("bad").object().is_none());
		assert!(resources.get_resource_object("odd").object().is_none());

		let errors = resources.take_errors();
		assert_eq!(
			errors,
			vec![
				"Failed to create object of type: counted (resource: bad)".to_owned(),
				"No factory registered for type: texture (resource: odd)".to_owned(),
			]
		);
		assert_eq!(
			resources.flush_all_resources(),
			Err(vec!["Failed to construct resource: bad".to_owned(), "Failed to construct resource: odd".to_owned()])
		);
	}

	#[test]
	fn saved_entries_are_decoded_before_construction() {
		let (factories, _, _) = registry();
		let entry = entry("packed", &[]);
		let saved = SavedData::from_dict(entry.as_dict().expect("entry dict"), true).expect("entry compresses");

		let mut dict = Dict::new();
		dict.set("packed", saved);
		let resources = ResourceObjects::new(&dict, factories);

		let handle = resources.get_resource_object("packed");
		assert!(handle.object().is_some());
		assert_eq!(handle.value().and_then(|value| value.named_child("name")), Some(Value::from("packed")));
	}

	#[test]
	fn prefetch_constructs_in_the_background() {
		let (factories, builds, _) = registry();
		let mut dict = Dict::new();
		dict.set("x", entry("x", &[]));
		let resources = ResourceObjects::new(&dict, factories);

		let handle = resources.prefetch("x");
		assert!(handle.object().is_some());
		assert_eq!(builds.load(Ordering::SeqCst), 1);
	}
}

mod dependencies {

	use std::sync::Arc;
	use std::sync::atomic::Ordering;

	use super::support::{entry, registry};
	use crate::pack::{Dict, ResourceObjects, Value};

	fn names(items: &[Arc<str>]) -> Vec<&str> {
		items.iter().map(|item| item.as_ref()).collect()
	}

	fn with_ref(name: &str, field: &str, target: &str) -> Value {
		let mut dict = entry(name, &[]).as_dict().cloned().expect("entry dict");
		dict.set(field, Value::reference(target));
		Value::from(dict)
	}

	#[test]
	fn flush_builds_referenced_entries_first() {
		let (factories, builds, order) = registry();
		let mut dict = Dict::new();
		dict.set("hero", with_ref("hero", "weapon", "sword"));
		dict.set("sword", with_ref("sword", "material", "steel"));
		dict.set("steel", entry("steel", &[]));
		let resources = ResourceObjects::new(&dict, factories);

		assert_eq!(resources.flush_all_resources(), Ok(()));
		assert_eq!(builds.load(Ordering::SeqCst), 3);
		assert_eq!(*order.lock().expect("order lock"), ["steel", "sword", "hero"]);

		assert_eq!(resources.flush_all_resources(), Ok(()));
		assert_eq!(builds.load(Ordering::SeqCst), 3);
	}

	#[test]
	fn dependencies_come_from_objects_or_descriptor_refs() {
		let (factories, _, _) = registry();
		let mut plain = Dict::new();
		plain.set("target", Value::reference("sword"));

		let mut dict = Dict::new();
		dict.set("hero", entry("hero", &["sword", "shield"]));
		dict.set("sword", entry("sword", &[]));
		dict.set("shield", entry("shield", &[]));
		dict.set("note", plain);
		let resources = ResourceObjects::new(&dict, factories);

		assert_eq!(names(&resources.resource_get_dependencies("hero")), ["sword", "shield"]);
		assert_eq!(names(&resources.resource_get_dependencies("note")), ["sword"]);
		assert!(resources.resource_get_dependencies("missing").is_empty());
	}

	#[test]
	fn invalidate_rebuilds_the_entry_and_its_dependents() {
		let (factories, builds, _) = registry();
		let mut dict = Dict::new();
		dict.set("hero", entry("hero", &["sword"]));
		dict.set("sword", entry("sword", &[]));
		dict.set("bystander", entry("bystander", &[]));
		let resources = ResourceObjects::new(&dict, factories);

		assert_eq!(resources.flush_all_resources(), Ok(()));
		assert_eq!(builds.load(Ordering::SeqCst), 3);

		let invalidated = resources.invalidate("sword");
		assert_eq!(names(&invalidated), ["sword", "hero"]);
		assert!(!resources.get_resource_object("hero").is_loaded());
		assert!(resources.get_resource_object("bystander").is_loaded());

		assert!(resources.get_resource_object("hero").object().is_some());
		assert_eq!(builds.load(Ordering::SeqCst), 4);
		assert!(resources.invalidate("missing").is_empty());
	}
}
