use std::path::Path;

use crate::pack::{Dict, DictVisitor, FactoryRegistry, RES_TYPE, Value, VisitContext, Visited, descend_dict, visit_dict};

/// Options for [`extract_binaries`].
#[derive(Debug, Clone, Copy)]
pub struct DumpOptions<'a> {
	/// Directory receiving the extracted files.
	pub dir: &'a Path,
	/// Factories used to rebuild typed nodes from their cached form.
	pub factories: &'a FactoryRegistry,
}

/// Write every typed node of `dict` to a file under `options.dir` and replace
/// the node with a `file:<path>` marker.
///
/// Nodes whose object has no file form are kept. Failures are collected in the
/// returned errors and do not stop the walk.
pub fn extract_binaries(dict: &Dict, options: DumpOptions<'_>) -> Visited {
	visit_dict(&mut ExtractBinaries { options }, dict)
}

/// Turn a visit path such as `/sprites/hero[2]` into a portable file name.
pub fn clean_file_name(path: &str) -> String {
	let trimmed = path.trim_start_matches('/');
	let cleaned: String = trimmed
		.chars()
		.map(|ch| if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') { ch } else { '_' })
		.collect();

	if cleaned.is_empty() { "root".to_owned() } else { cleaned }
}

struct ExtractBinaries<'a> {
	options: DumpOptions<'a>,
}

impl DictVisitor for ExtractBinaries<'_> {
	fn transform_dict(&mut self, cx: &mut VisitContext, dict: &Dict) -> Option<Value> {
		let output = descend_dict(self, cx, dict)?;
		if cx.is_root() {
			return Some(output);
		}

		let Some(type_name) = output.as_dict().and_then(|dict| dict.get_as::<String>(RES_TYPE)) else {
			return Some(output);
		};
		let Some(factory) = self.options.factories.get(&type_name) else {
			return Some(output);
		};

		let object = output.as_dict().and_then(|dict| factory.load_from_cache(dict));
		let Some(object) = object else {
			cx.add_error(format!("Failed to load {type_name} from cache: {}", cx.path()));
			return Some(output);
		};

		match object.save_to_file(self.options.dir, &clean_file_name(&cx.path())) {
			Ok(Some(path)) => Some(Value::from(format!("file:{}", path.display()))),
			Ok(None) => Some(output),
			Err(err) => {
				cx.add_error(format!("Failed to write {}: {err}", cx.path()));
				Some(output)
			}
		}
	}
}
