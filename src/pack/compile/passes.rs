use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pack::{
	Dict, DictVisitor, FactoryRegistry, Localizer, LoadContext, ResourceObject, SavedData, Value, VisitContext, descend_dict, descend_value,
	json_parse, make_symbol_from_name,
};

pub(super) const FILE_PREFIX: &str = "file:";
pub(super) const LOC_PREFIX: &str = "loc:";
pub(super) const REF_PREFIX: &str = "ref:";
pub(crate) const RES_PREFIX: &str = "res:";

pub(super) const RES_BASE: &str = "res:base";
pub(super) const RES_COMPRESS: &str = "res:compress";
pub(super) const RES_IMPORT: &str = "res:import";
pub(super) const RES_LOAD_LISTENER: &str = "res:loadListener";
pub(super) const RES_SYMBOL: &str = "res:symbol";
pub(super) const RES_TEMPLATE: &str = "res:template";
pub(crate) const RES_TYPE: &str = "res:type";
pub(super) const RES_VALUES: &str = "res:values";

/// Imports, templates, `res:values` scopes and `res:`/`loc:` value lookups.
pub(super) struct ExpandTemplates<'a> {
	pub context: &'a mut LoadContext,
	pub localizer: Option<&'a dyn Localizer>,
	pub root: &'a Dict,
	scopes: Vec<Dict>,
	templates: Vec<String>,
	imports: Vec<PathBuf>,
}

impl<'a> ExpandTemplates<'a> {
	pub fn new(context: &'a mut LoadContext, localizer: Option<&'a dyn Localizer>, root: &'a Dict) -> Self {
		Self {
			context,
			localizer,
			root,
			scopes: Vec::new(),
			templates: Vec::new(),
			imports: Vec::new(),
		}
	}

	fn scope_get(&self, name: &str) -> Option<Value> {
		self.scopes.last().and_then(|scope| scope.get(name))
	}

	fn expand(&mut self, cx: &mut VisitContext, dict: &Dict) -> Option<Value> {
		let mut input = dict.clone();

		if let Some(import) = input.remove(RES_IMPORT) {
			let Some(import) = import.as_str() else {
				cx.add_error(format!("Invalid {RES_IMPORT} value at: {}", cx.path()));
				return None;
			};
			let mut imported = self.import_file(cx, Path::new(import))?;
			imported.merge(&input, false);
			input = imported;
		}

		let template = match input.remove(RES_TEMPLATE).or_else(|| input.remove(RES_BASE)) {
			Some(Value::String(name)) => Some(name.to_string()),
			Some(_) => {
				cx.add_error(format!("Invalid template name at: {}", cx.path()));
				return None;
			}
			None => None,
		};

		let Some(template) = template else {
			return descend_dict(self, cx, &input);
		};

		if self.templates.contains(&template) {
			cx.add_error(format!("Template cycle: {} -> {template}", self.templates.join(" -> ")));
			return None;
		}

		let Some(template_value) = self.scope_get(&template).or_else(|| self.root.get(&template)) else {
			cx.add_error(format!("Invalid template name: {template}"));
			return None;
		};

		self.templates.push(template.clone());
		let output = match template_value.dict_value().and_then(|value| value.as_dict().cloned()) {
			Some(mut merged) => {
				merged.merge(&input, false);
				self.transform_dict(cx, &merged)
			}
			None if input.is_empty() => self.transform_value(cx, &template_value),
			None => {
				cx.add_error(format!("Unexpected extra values for template: {template}"));
				None
			}
		};
		self.templates.pop();
		output
	}

	fn import_file(&mut self, cx: &mut VisitContext, path: &Path) -> Option<Dict> {
		let path = self.context.base_path().join(path);
		let path = path.canonicalize().unwrap_or(path);

		if self.imports.contains(&path) {
			cx.add_error(format!("Recursive JSON import: {}", path.display()));
			return None;
		}

		let text = match fs::read_to_string(&path) {
			Ok(text) => text,
			Err(err) => {
				cx.add_error(format!("Failed to read JSON import file: {}: {err}", path.display()));
				return None;
			}
		};

		let parsed = match json_parse(&text) {
			Ok(parsed) => parsed,
			Err(err) => {
				cx.add_error(format!("Failed to read JSON import file: {}\n{err}", path.display()));
				return None;
			}
		};

		self.context.add_file(cx.root_name(), &path);
		self.imports.push(path.clone());
		let output = self.transform_dict(cx, &parsed);
		self.imports.pop();

		match output.and_then(|value| value.as_dict().cloned()) {
			Some(dict) => Some(dict),
			None => {
				cx.add_error(format!("Imported JSON is not a dict: {}", path.display()));
				None
			}
		}
	}
}

impl DictVisitor for ExpandTemplates<'_> {
	fn transform_dict(&mut self, cx: &mut VisitContext, dict: &Dict) -> Option<Value> {
		let Some(values) = dict.get_ref(RES_VALUES) else {
			return self.expand(cx, dict);
		};

		let Some(values) = values.as_dict() else {
			cx.add_error(format!("{RES_VALUES} must be a dict at: {}", cx.path()));
			return None;
		};

		let mut scope = self.scopes.last().cloned().unwrap_or_default();
		scope.merge(values, false);
		self.scopes.push(scope);

		let mut input = dict.clone();
		input.remove(RES_VALUES);
		let output = self.expand(cx, &input);

		self.scopes.pop();
		output
	}

	fn transform_value(&mut self, cx: &mut VisitContext, value: &Value) -> Option<Value> {
		let value = descend_value(self, cx, value)?;
		let Some(text) = value.as_str() else {
			return Some(value);
		};

		if let Some(name) = text.strip_prefix(RES_PREFIX) {
			return match self.scope_get(name) {
				Some(found) => self.transform_value(cx, &found),
				None => {
					cx.add_error(format!("Undefined value: {text}"));
					None
				}
			};
		}

		if let Some(name) = text.strip_prefix(LOC_PREFIX) {
			return match self.localizer.and_then(|localizer| localizer.localize(name)) {
				Some(found) => Some(found),
				None => {
					cx.add_error(format!("Missing localized value: {text}"));
					None
				}
			};
		}

		Some(value)
	}
}

/// `file:` strings become canonical absolute paths and are recorded as dependencies.
pub(super) struct ExpandFilePaths<'a> {
	pub context: &'a mut LoadContext,
}

impl DictVisitor for ExpandFilePaths<'_> {
	fn transform_value(&mut self, cx: &mut VisitContext, value: &Value) -> Option<Value> {
		let value = descend_value(self, cx, value)?;
		let Some(relative) = value.as_str().and_then(|text| text.strip_prefix(FILE_PREFIX)) else {
			return Some(value);
		};

		let joined = self.context.base_path().join(relative);
		let full_path = match joined.canonicalize() {
			Ok(path) => {
				self.context.add_file(cx.root_name(), &path);
				path
			}
			Err(_) => {
				cx.add_error(format!("File not found: {}", joined.display()));
				joined
			}
		};

		Some(Value::from(full_path.to_string_lossy().into_owned()))
	}
}

/// `ref:` strings become typed references to existing top-level entries.
pub(super) struct ResolveRefs<'a> {
	pub root: &'a Dict,
	pub graph: BTreeMap<String, BTreeSet<String>>,
}

impl DictVisitor for ResolveRefs<'_> {
	fn transform_value(&mut self, cx: &mut VisitContext, value: &Value) -> Option<Value> {
		let value = descend_value(self, cx, value)?;
		let Some(name) = value.as_str().and_then(|text| text.strip_prefix(REF_PREFIX)) else {
			return Some(value);
		};

		if name.starts_with(RES_PREFIX) || !self.root.contains(name) {
			cx.add_error(format!("Missing reference: {name} (at {})", cx.path()));
			return None;
		}

		if let Some(owner) = cx.root_name() {
			self.graph.entry(owner.to_owned()).or_default().insert(name.to_owned());
		}

		Some(Value::reference(name))
	}
}

/// Report every reference cycle between top-level entries once.
pub(super) fn find_reference_cycles(graph: &BTreeMap<String, BTreeSet<String>>) -> Vec<String> {
	fn visit<'g>(
		name: &'g str,
		graph: &'g BTreeMap<String, BTreeSet<String>>,
		stack: &mut Vec<&'g str>,
		done: &mut BTreeSet<&'g str>,
		errors: &mut Vec<String>,
	) {
		if done.contains(name) {
			return;
		}
		if let Some(start) = stack.iter().position(|entry| *entry == name) {
			let mut cycle = stack[start..].to_vec();
			cycle.push(name);
			errors.push(format!("Reference cycle: {}", cycle.join(" -> ")));
			return;
		}

		stack.push(name);
		for next in graph.get(name).into_iter().flatten() {
			visit(next, graph, stack, done, errors);
		}
		stack.pop();
		done.insert(name);
	}

	let mut errors = Vec::new();
	let mut done = BTreeSet::new();
	for name in graph.keys() {
		visit(name, graph, &mut Vec::new(), &mut done, &mut errors);
	}
	errors
}

/// Builds every typed dict through its factory.
///
/// Nested objects finish loading at once and are replaced by their cached
/// form. Top-level objects are kept in `roots` and stay as descriptors until
/// [`finish_loading_objects`] and [`save_objects`] ran.
pub(super) struct LoadObjects<'a> {
	pub context: &'a mut LoadContext,
	pub factories: &'a FactoryRegistry,
	pub roots: Vec<(Arc<str>, Arc<dyn ResourceObject>)>,
}

impl LoadObjects<'_> {
	fn record_symbol(&mut self, cx: &VisitContext, dict: &Dict) {
		let Some(name) = cx.root_name() else {
			return;
		};
		if name.starts_with(RES_PREFIX) {
			return;
		}

		let symbol = dict.get_ref(RES_SYMBOL).and_then(Value::as_str).map(str::to_owned).unwrap_or_else(|| make_symbol_from_name(name));
		if !symbol.is_empty() {
			self.context.set_id_symbol(symbol, name);
		}
	}

	fn load(&mut self, cx: &mut VisitContext, dict: &Dict, type_name: &str) -> Option<Value> {
		let Some(factory) = self.factories.get(type_name) else {
			cx.add_error(format!("Failed to create object of type: {type_name} (no factory, at {})", cx.path()));
			return None;
		};

		let Some(object) = factory.load_from_source(dict, self.context) else {
			cx.add_error(format!("Failed to create object of type: {type_name} (at {})", cx.path()));
			return None;
		};

		if cx.depth() == 1
			&& let Some(name) = cx.root_name()
		{
			self.roots.push((Arc::from(name), object));
			return Some(Value::from(dict.clone()));
		}

		if !object.load_from_source_complete(self.context) {
			cx.add_error(format!("Failed to finish loading resource: {}", cx.path()));
			return None;
		}
		match cached_value(dict, type_name, object.as_ref()) {
			Ok(value) => Some(value),
			Err(err) => {
				cx.add_error(format!("{err}: {}", cx.path()));
				None
			}
		}
	}
}

impl DictVisitor for LoadObjects<'_> {
	fn transform_dict(&mut self, cx: &mut VisitContext, dict: &Dict) -> Option<Value> {
		let output = descend_dict(self, cx, dict)?;
		if cx.is_root() {
			return Some(output);
		}

		let dict = output.as_dict()?;
		if cx.depth() == 1 {
			self.record_symbol(cx, dict);
		}

		match dict.get_ref(RES_TYPE).and_then(Value::as_str) {
			Some(type_name) => {
				let type_name = type_name.to_owned();
				self.load(cx, dict, &type_name)
			}
			None => Some(output.clone()),
		}
	}
}

/// Run [`ResourceObject::load_from_source_complete`] on every top-level
/// object, dependencies first. Returns the errors.
pub(super) fn finish_loading_objects(roots: &[(Arc<str>, Arc<dyn ResourceObject>)], context: &mut LoadContext) -> Vec<String> {
	#[derive(Clone, Copy)]
	enum State {
		Finishing,
		Finished(bool),
	}

	fn finish(
		name: &Arc<str>,
		objects: &HashMap<Arc<str>, Arc<dyn ResourceObject>>,
		states: &mut HashMap<Arc<str>, State>,
		context: &mut LoadContext,
		errors: &mut Vec<String>,
	) -> bool {
		match states.get(name) {
			Some(State::Finished(ok)) => return *ok,
			Some(State::Finishing) => {
				errors.push(format!("Can't finish loading a resource that depends on itself: {name}"));
				return false;
			}
			None => {}
		}
		let Some(object) = objects.get(name) else {
			return true;
		};

		states.insert(name.clone(), State::Finishing);
		let mut ok = true;
		for dependency in object.dependencies() {
			if !finish(&dependency, objects, states, context, errors) {
				errors.push(format!("Failed to finish loading dependent resource: {dependency} (needed by {name})"));
				ok = false;
				break;
			}
		}

		if ok && !object.load_from_source_complete(context) {
			errors.push(format!("Failed to finish loading resource: {name}"));
			ok = false;
		}
		states.insert(name.clone(), State::Finished(ok));
		ok
	}

	let objects: HashMap<Arc<str>, Arc<dyn ResourceObject>> = roots.iter().cloned().collect();
	let mut states = HashMap::new();
	let mut errors = Vec::new();
	for (name, _) in roots {
		finish(name, &objects, &mut states, context, &mut errors);
	}
	errors
}

/// Add the siblings of every top-level object to `dict`.
///
/// A sibling may not reuse the name of an existing entry.
pub(super) fn add_siblings(dict: &mut Dict, roots: &[(Arc<str>, Arc<dyn ResourceObject>)], context: &mut LoadContext) -> Vec<String> {
	let mut errors = Vec::new();
	for (owner, object) in roots {
		for (name, value) in object.siblings(owner).iter() {
			if dict.contains(name) {
				errors.push(format!("Sibling resource name already in use: {name} (from {owner})"));
				continue;
			}
			if !name.starts_with(RES_PREFIX) {
				let symbol = make_symbol_from_name(name);
				if !symbol.is_empty() {
					context.set_id_symbol(symbol, name);
				}
			}
			dict.set_value(name.clone(), value.clone());
		}
	}
	errors
}

/// Replace each top-level object's descriptor in `dict` by its cached form.
pub(super) fn save_objects(dict: &mut Dict, roots: &[(Arc<str>, Arc<dyn ResourceObject>)]) -> Vec<String> {
	let mut errors = Vec::new();
	for (name, object) in roots {
		let Some(descriptor) = dict.get_ref(name).and_then(Value::as_dict).cloned() else {
			continue;
		};
		let type_name: String = descriptor.get_or_default(RES_TYPE);

		match cached_value(&descriptor, &type_name, object.as_ref()) {
			Ok(value) => dict.set_value(name.clone(), value),
			Err(err) => errors.push(format!("{err}: /{name}")),
		}
	}
	errors
}

/// Cached form of `object`, compressed when `descriptor` asks for it.
fn cached_value(descriptor: &Dict, type_name: &str, object: &dyn ResourceObject) -> Result<Value, String> {
	let mut cached = Dict::new();
	cached.set(RES_TYPE, type_name);
	if !object.save_to_cache(&mut cached) {
		return Err("Failed to save resource".to_owned());
	}

	if let Some(listener) = descriptor.get_ref(RES_LOAD_LISTENER) {
		cached.set_value(Arc::from(RES_LOAD_LISTENER), listener.clone());
	}

	if !descriptor.get_or(RES_COMPRESS, false) {
		return Ok(Value::from(cached));
	}

	SavedData::from_dict(&cached, true)
		.map(Value::from)
		.map_err(|err| format!("Failed to compress resource ({err})"))
}
