//! Recursive dict tree rewriting.
//!
//! A [`DictVisitor`] gets two hooks: one for every value and one for every
//! dict node. The defaults rebuild the tree unchanged, so implementors only
//! override the hook they need and call [`descend_value`] / [`descend_dict`]
//! to keep recursing.

use std::fmt::Write;
use std::sync::Arc;

use crate::pack::{Dict, SavedKind, Value, ValueKind};

/// One step of the path from the visited root to the current node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitStep {
	/// Dict entry name.
	Name(Arc<str>),
	/// List index.
	Index(usize),
}

/// Traversal state handed to visitor hooks.
#[derive(Debug, Default)]
pub struct VisitContext {
	steps: Vec<VisitStep>,
	errors: Vec<String>,
}

impl VisitContext {
	/// Current path in `/name[index]` form; the root is an empty string.
	pub fn path(&self) -> String {
		let mut out = String::new();
		for step in &self.steps {
			let _ = match step {
				VisitStep::Name(name) => write!(out, "/{name}"),
				VisitStep::Index(index) => write!(out, "[{index}]"),
			};
		}
		out
	}

	/// Steps from the root to the current node.
	pub fn steps(&self) -> &[VisitStep] {
		&self.steps
	}

	/// Name of the top-level entry that contains the current node.
	pub fn root_name(&self) -> Option<&str> {
		match self.steps.first()? {
			VisitStep::Name(name) => Some(name),
			VisitStep::Index(_) => None,
		}
	}

	/// Number of steps below the root.
	pub fn depth(&self) -> usize {
		self.steps.len()
	}

	/// True while visiting the root dict itself.
	pub fn is_root(&self) -> bool {
		self.steps.is_empty()
	}

	/// Record a failure for the current node; traversal continues.
	pub fn add_error(&mut self, message: impl Into<String>) {
		let message = message.into();
		if !message.is_empty() {
			self.errors.push(message);
		}
	}

	/// Errors recorded so far.
	pub fn errors(&self) -> &[String] {
		&self.errors
	}

	fn push(&mut self, step: VisitStep) {
		self.steps.push(step);
	}

	fn pop(&mut self) {
		self.steps.pop();
	}
}

/// Value- and dict-level rewrite hooks.
///
/// Returning `None` drops a dict entry (or nulls a list item).
pub trait DictVisitor {
	/// Called for every value. The default descends into lists and dicts.
	fn transform_value(&mut self, cx: &mut VisitContext, value: &Value) -> Option<Value> {
		descend_value(self, cx, value)
	}

	/// Called for every dict node. The default rebuilds it from transformed children.
	fn transform_dict(&mut self, cx: &mut VisitContext, dict: &Dict) -> Option<Value> {
		descend_dict(self, cx, dict)
	}
}

/// Default value traversal: dicts (including saved dicts) go to
/// [`DictVisitor::transform_dict`], lists are rebuilt item by item, everything
/// else is returned unchanged.
pub fn descend_value<V: DictVisitor + ?Sized>(visitor: &mut V, cx: &mut VisitContext, value: &Value) -> Option<Value> {
	match value {
		Value::Dict(slot) => match slot.get() {
			Some(dict) => visitor.transform_dict(cx, dict),
			None => {
				cx.add_error(format!("Failed to load dict at: {}", cx.path()));
				None
			}
		},
		Value::Saved(saved) if saved.kind() == SavedKind::Dict => match value.try_convert(ValueKind::Dict) {
			Some(Value::Dict(slot)) => slot.get().and_then(|dict| visitor.transform_dict(cx, dict)),
			_ => {
				cx.add_error(format!("Failed to load saved dict at: {}", cx.path()));
				None
			}
		},
		Value::List(items) => {
			let mut out = Vec::with_capacity(items.len());
			for (index, item) in items.iter().enumerate() {
				cx.push(VisitStep::Index(index));
				out.push(visitor.transform_value(cx, item).unwrap_or(Value::Null));
				cx.pop();
			}
			Some(Value::from(out))
		}
		_ => Some(value.clone()),
	}
}

/// Default dict traversal: transform every entry and rebuild the dict.
pub fn descend_dict<V: DictVisitor + ?Sized>(visitor: &mut V, cx: &mut VisitContext, dict: &Dict) -> Option<Value> {
	let mut out = Dict::new();
	for (name, value) in dict.iter() {
		cx.push(VisitStep::Name(name.clone()));
		if let Some(value) = visitor.transform_value(cx, value) {
			out.set_value(name.clone(), value);
		}
		cx.pop();
	}
	Some(Value::from(out))
}

/// Output of a full tree visit.
#[derive(Debug)]
pub struct Visited {
	/// Rewritten root, `None` when the root did not stay a dict.
	pub dict: Option<Dict>,
	/// Every error recorded by the hooks.
	pub errors: Vec<String>,
}

impl Visited {
	/// True when the root survived and no hook reported an error.
	pub fn is_ok(&self) -> bool {
		self.dict.is_some() && self.errors.is_empty()
	}
}

/// Visit `dict` as a root.
pub fn visit_dict<V: DictVisitor + ?Sized>(visitor: &mut V, dict: &Dict) -> Visited {
	let mut cx = VisitContext::default();
	let dict = visitor.transform_dict(&mut cx, dict).and_then(|value| value.dict_value()).and_then(|value| value.as_dict().cloned());

	Visited { dict, errors: cx.errors }
}

/// Visit with a pair of closures instead of a visitor type.
///
/// `on_value` sees every non-dict value after its own children were visited;
/// `on_dict` sees every dict node after it was rebuilt from its children.
pub fn transform_tree<F, G>(dict: &Dict, on_value: F, on_dict: G) -> Visited
where
	F: FnMut(&mut VisitContext, Value) -> Option<Value>,
	G: FnMut(&mut VisitContext, Dict) -> Option<Value>,
{
	let mut hooks = Hooks { on_value, on_dict };
	visit_dict(&mut hooks, dict)
}

struct Hooks<F, G> {
	on_value: F,
	on_dict: G,
}

impl<F, G> DictVisitor for Hooks<F, G>
where
	F: FnMut(&mut VisitContext, Value) -> Option<Value>,
	G: FnMut(&mut VisitContext, Dict) -> Option<Value>,
{
	fn transform_value(&mut self, cx: &mut VisitContext, value: &Value) -> Option<Value> {
		let is_dict = value.dict_value().is_some();
		let value = descend_value(self, cx, value)?;
		if is_dict { Some(value) } else { (self.on_value)(cx, value) }
	}

	fn transform_dict(&mut self, cx: &mut VisitContext, dict: &Dict) -> Option<Value> {
		let rebuilt = descend_dict(self, cx, dict)?.as_dict().cloned()?;
		(self.on_dict)(cx, rebuilt)
	}
}
