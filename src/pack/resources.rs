//! Runtime container of compiled resources with lazy, single-flight construction.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread;

use indexmap::IndexMap;

use crate::pack::{Dict, FactoryRegistry, RES_PREFIX, RES_TYPE, ResourceObject, SavedKind, Value, ValueKind};

/// Result of constructing one entry.
struct Resolved {
	value: Value,
	object: Option<Arc<dyn ResourceObject>>,
}

type Slot = OnceLock<Arc<Resolved>>;

struct Inner {
	descriptors: IndexMap<Arc<str>, Value>,
	factories: Arc<FactoryRegistry>,
	slots: Mutex<HashMap<Arc<str>, Arc<Slot>>>,
	errors: Mutex<Vec<String>>,
}

/// Compiled dict plus memoized objects built from it.
///
/// Cloning shares the same container.
#[derive(Clone)]
pub struct ResourceObjects {
	inner: Arc<Inner>,
}

impl ResourceObjects {
	/// Hold every non-`res:` top-level entry of `dict`.
	pub fn new(dict: &Dict, factories: Arc<FactoryRegistry>) -> Self {
		let descriptors: IndexMap<_, _> = dict.iter().filter(|(name, _)| !name.starts_with(RES_PREFIX)).map(|(name, value)| (name.clone(), value.clone())).collect();
		let slots = descriptors.keys().map(|name| (name.clone(), Arc::new(Slot::new()))).collect();

		Self {
			inner: Arc::new(Inner {
				descriptors,
				factories,
				slots: Mutex::new(slots),
				errors: Mutex::new(Vec::new()),
			}),
		}
	}

	/// Container with no entries.
	pub fn empty() -> Self {
		Self::new(&Dict::new(), FactoryRegistry::global())
	}

	/// Entry names in pack order.
	pub fn names(&self) -> Vec<Arc<str>> {
		self.inner.descriptors.keys().cloned().collect()
	}

	/// True when `name` is an entry.
	pub fn contains(&self, name: &str) -> bool {
		self.inner.descriptors.contains_key(name)
	}

	/// Stored descriptor of `name`, as compiled.
	pub fn descriptor(&self, name: &str) -> Option<Value> {
		self.inner.descriptors.get(name).cloned()
	}

	/// Handle to `name`. Nothing is constructed until the handle is read.
	pub fn get_resource_object(&self, name: &str) -> ResourceHandle {
		ResourceHandle {
			name: Arc::from(name),
			owner: self.clone(),
		}
	}

	/// Like [`ResourceObjects::get_resource_object`], and start constructing on
	/// a background thread.
	pub fn prefetch(&self, name: &str) -> ResourceHandle {
		let handle = self.get_resource_object(name);
		let worker = handle.clone();
		thread::spawn(move || {
			worker.object();
		});
		handle
	}

	/// Construct every entry, dependencies first.
	///
	/// Returns one message per entry whose typed descriptor did not produce an object.
	pub fn flush_all_resources(&self) -> Result<(), Vec<String>> {
		let mut failures = Vec::new();

		for name in self.dependency_order() {
			let Some(resolved) = self.resolve(&name) else {
				continue;
			};
			if resolved.object.is_none() && type_name_of(&resolved.value).is_some() {
				failures.push(format!("Failed to construct resource: {name}"));
			}
		}

		if failures.is_empty() { Ok(()) } else { Err(failures) }
	}

	/// Direct dependencies of `name`: what its object declares, or the
	/// references inside a plain entry.
	pub fn resource_get_dependencies(&self, name: &str) -> Vec<Arc<str>> {
		match self.resolve(name) {
			Some(resolved) => match &resolved.object {
				Some(object) => object.dependencies(),
				None => descriptor_refs(&resolved.value),
			},
			None => Vec::new(),
		}
	}

	/// Drop the memoized object of `name` and of everything that depends on it.
	///
	/// Returns the invalidated names, `name` first.
	pub fn invalidate(&self, name: &str) -> Vec<Arc<str>> {
		let Some((name, _)) = self.inner.descriptors.get_key_value(name) else {
			return Vec::new();
		};

		let mut dependents: HashMap<Arc<str>, Vec<Arc<str>>> = HashMap::new();
		for entry in self.inner.descriptors.keys() {
			for dependency in self.known_dependencies(entry) {
				dependents.entry(dependency).or_default().push(entry.clone());
			}
		}

		let mut invalidated = vec![name.clone()];
		let mut seen: BTreeSet<Arc<str>> = BTreeSet::from([name.clone()]);
		let mut queue = VecDeque::from([name.clone()]);
		while let Some(next) = queue.pop_front() {
			for dependent in dependents.get(&next).into_iter().flatten() {
				if seen.insert(dependent.clone()) {
					invalidated.push(dependent.clone());
					queue.push_back(dependent.clone());
				}
			}
		}

		let mut slots = self.slots();
		for name in &invalidated {
			slots.insert(name.clone(), Arc::new(Slot::new()));
		}

		invalidated
	}

	/// Drain construction errors recorded so far.
	pub fn take_errors(&self) -> Vec<String> {
		std::mem::take(&mut *self.inner.errors.lock().unwrap_or_else(PoisonError::into_inner))
	}

	fn slots(&self) -> MutexGuard<'_, HashMap<Arc<str>, Arc<Slot>>> {
		self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn add_error(&self, message: String) {
		self.inner.errors.lock().unwrap_or_else(PoisonError::into_inner).push(message);
	}

	/// Memoized construction; concurrent callers for one name wait for a single build.
	fn resolve(&self, name: &str) -> Option<Arc<Resolved>> {
		let slot = self.slots().get(name).cloned()?;
		let descriptor = self.inner.descriptors.get(name)?;
		Some(slot.get_or_init(|| Arc::new(self.construct(name, descriptor))).clone())
	}

	fn is_constructed(&self, name: &str) -> Option<Arc<Resolved>> {
		self.slots().get(name).and_then(|slot| slot.get().cloned())
	}

	fn construct(&self, name: &str, descriptor: &Value) -> Resolved {
		let value = match descriptor {
			Value::Saved(saved) => {
				let target = match saved.kind() {
					SavedKind::Bytes => ValueKind::Bytes,
					SavedKind::Dict => ValueKind::Dict,
				};
				match descriptor.try_convert(target) {
					Some(value) => value,
					None => {
						self.add_error(format!("Failed to decode saved data for resource: {name}"));
						return Resolved {
							value: descriptor.clone(),
							object: None,
						};
					}
				}
			}
			_ => descriptor.clone(),
		};

		let Some(type_name) = type_name_of(&value) else {
			return Resolved { value, object: None };
		};

		let object = match (self.inner.factories.get(&type_name), value.as_dict()) {
			(Some(factory), Some(dict)) => factory.load_from_cache(dict),
			(None, _) => {
				self.add_error(format!("No factory registered for type: {type_name} (resource: {name})"));
				return Resolved { value, object: None };
			}
			(Some(_), None) => None,
		};

		if object.is_none() {
			self.add_error(format!("Failed to create object of type: {type_name} (resource: {name})"));
		}

		Resolved { value, object }
	}

	fn known_dependencies(&self, name: &str) -> Vec<Arc<str>> {
		let mut dependencies = self.inner.descriptors.get(name).map(descriptor_refs).unwrap_or_default();
		if let Some(object) = self.is_constructed(name).and_then(|resolved| resolved.object.clone()) {
			for dependency in object.dependencies() {
				if !dependencies.contains(&dependency) {
					dependencies.push(dependency);
				}
			}
		}
		dependencies
	}

	/// Post-order over descriptor references; cycles are cut where they close.
	fn dependency_order(&self) -> Vec<Arc<str>> {
		fn visit(owner: &ResourceObjects, name: &Arc<str>, visiting: &mut BTreeSet<Arc<str>>, done: &mut BTreeSet<Arc<str>>, order: &mut Vec<Arc<str>>) {
			if done.contains(name) || !visiting.insert(name.clone()) {
				return;
			}
			for dependency in owner.known_dependencies(name) {
				if owner.contains(&dependency) {
					visit(owner, &dependency, visiting, done, order);
				}
			}
			visiting.remove(name);
			done.insert(name.clone());
			order.push(name.clone());
		}

		let mut order = Vec::with_capacity(self.inner.descriptors.len());
		let mut visiting = BTreeSet::new();
		let mut done = BTreeSet::new();
		for name in self.inner.descriptors.keys() {
			visit(self, name, &mut visiting, &mut done, &mut order);
		}
		order
	}
}

impl fmt::Debug for ResourceObjects {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResourceObjects").field("names", &self.names()).finish()
	}
}

/// Live reference to one named resource.
///
/// Reading the handle constructs the resource on first use; after
/// [`ResourceObjects::invalidate`] it constructs again.
#[derive(Clone)]
pub struct ResourceHandle {
	name: Arc<str>,
	owner: ResourceObjects,
}

impl ResourceHandle {
	/// Resource name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// True when `name` exists in the owning container.
	pub fn is_valid(&self) -> bool {
		self.owner.contains(&self.name)
	}

	/// True when construction already finished.
	pub fn is_loaded(&self) -> bool {
		self.owner.is_constructed(&self.name).is_some()
	}

	/// Constructed object, or `None` for unknown names, untyped entries and
	/// construction failures.
	pub fn object(&self) -> Option<Arc<dyn ResourceObject>> {
		self.owner.resolve(&self.name)?.object.clone()
	}

	/// Entry value with saved payloads decoded.
	pub fn value(&self) -> Option<Value> {
		self.owner.resolve(&self.name).map(|resolved| resolved.value.clone())
	}
}

impl fmt::Debug for ResourceHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResourceHandle").field("name", &self.name).field("loaded", &self.is_loaded()).finish()
	}
}

fn type_name_of(value: &Value) -> Option<String> {
	value.as_dict()?.get_as::<String>(RES_TYPE)
}

fn descriptor_refs(value: &Value) -> Vec<Arc<str>> {
	let mut refs = Vec::new();
	match value {
		Value::Saved(_) => {
			if let Some(dict) = value.dict_value() {
				dict.collect_refs(&mut refs);
			}
		}
		_ => value.collect_refs(&mut refs),
	}
	refs
}

#[cfg(test)]
mod tests;
