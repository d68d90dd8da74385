use crate::pack::{Dict, Value};

/// One parsed operation in a dict path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
	/// Select a named dict entry. An empty name selects the current dict itself.
	Name(String),
	/// Select a list element by zero-based index.
	Index(usize),
}

/// Parsed `/name[index]/name` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictPath {
	/// Ordered sequence of path steps.
	pub steps: Vec<PathStep>,
}

impl DictPath {
	/// Parse slash-separated names with optional `[index]` selectors.
	///
	/// The expression must start with `/`. Returns `None` when malformed.
	pub fn parse(input: &str) -> Option<Self> {
		let bytes = input.as_bytes();
		if bytes.first() != Some(&b'/') {
			return None;
		}

		let mut idx = 0_usize;
		let mut steps = Vec::new();

		while idx < bytes.len() {
			match bytes[idx] {
				b'/' => {
					idx += 1;
					let start = idx;
					while idx < bytes.len() && bytes[idx] != b'/' && bytes[idx] != b'[' {
						idx += 1;
					}
					steps.push(PathStep::Name(input[start..idx].to_owned()));
				}
				b'[' => {
					idx += 1;
					let n_start = idx;
					while idx < bytes.len() && bytes[idx].is_ascii_digit() {
						idx += 1;
					}
					if idx == n_start || idx >= bytes.len() || bytes[idx] != b']' {
						return None;
					}

					steps.push(PathStep::Index(input[n_start..idx].parse().ok()?));
					idx += 1;
				}
				_ => return None,
			}
		}

		Some(Self { steps })
	}

	/// Walk the steps starting at `root`.
	pub fn resolve(&self, root: &Dict) -> Option<Value> {
		let mut steps = self.steps.iter();
		let mut current = match steps.next()? {
			PathStep::Name(name) if name.is_empty() => Value::from(root.clone()),
			PathStep::Name(name) => root.get_ref(name)?.clone(),
			PathStep::Index(_) => return None,
		};

		for step in steps {
			current = match step {
				PathStep::Name(name) if name.is_empty() => current.dict_value()?,
				PathStep::Name(name) => current.dict_value()?.named_child(name)?,
				PathStep::Index(index) => current.index_child(*index)?,
			};
		}

		Some(current)
	}
}
