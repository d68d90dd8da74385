//! Process-wide current resource snapshot with coalesced background rebuilds.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread;

use crate::pack::{CacheMode, CompileOptions, ResourceObjects, load_resources_from_file};

type BuildFn = Arc<dyn Fn() -> Option<ResourceObjects> + Send + Sync>;
type Listener = Arc<dyn Fn(&ResourceObjects) + Send + Sync>;

#[derive(Default)]
struct RebuildState {
	running: bool,
	pending: Option<BuildFn>,
}

struct Shared {
	current: RwLock<ResourceObjects>,
	rebuild: Mutex<RebuildState>,
	idle: Condvar,
	listeners: Mutex<Vec<Listener>>,
}

/// Holder of the current [`ResourceObjects`] snapshot.
///
/// Readers clone the snapshot and keep using it even after a rebuild swaps in
/// a new one. Cloning the holder shares it.
#[derive(Clone)]
pub struct GlobalResources {
	shared: Arc<Shared>,
}

impl GlobalResources {
	/// Start with `initial` as the current snapshot.
	pub fn new(initial: ResourceObjects) -> Self {
		Self {
			shared: Arc::new(Shared {
				current: RwLock::new(initial),
				rebuild: Mutex::new(RebuildState::default()),
				idle: Condvar::new(),
				listeners: Mutex::new(Vec::new()),
			}),
		}
	}

	/// Current snapshot.
	pub fn get(&self) -> ResourceObjects {
		self.shared.current.read().unwrap_or_else(PoisonError::into_inner).clone()
	}

	/// Swap in `next` and return the previous snapshot.
	pub fn replace(&self, next: ResourceObjects) -> ResourceObjects {
		let mut current = self.shared.current.write().unwrap_or_else(PoisonError::into_inner);
		std::mem::replace(&mut *current, next)
	}

	/// Register a callback run after every successful rebuild swap.
	pub fn on_rebuilt(&self, listener: impl Fn(&ResourceObjects) + Send + Sync + 'static) {
		self.shared.listeners.lock().unwrap_or_else(PoisonError::into_inner).push(Arc::new(listener));
	}

	/// Run `build` on a worker thread, swap in its result and notify listeners.
	///
	/// While a rebuild runs, further requests collapse into one follow-up
	/// rebuild using the most recent `build`. A `build` that panics counts as
	/// a failed rebuild. Returns true when this call started a worker, false
	/// when it was coalesced.
	pub fn rebuild_async(&self, build: impl Fn() -> Option<ResourceObjects> + Send + Sync + 'static) -> bool {
		let build: BuildFn = Arc::new(build);
		{
			let mut state = self.state();
			if state.running {
				state.pending = Some(build);
				return false;
			}
			state.running = true;
		}

		let shared = self.clone();
		thread::spawn(move || shared.rebuild_loop(build));
		true
	}

	/// Rebuild from a description file through [`load_resources_from_file`].
	///
	/// A failed compile keeps the current snapshot.
	pub fn rebuild_from_file(&self, path: PathBuf, options: CompileOptions, cache: CacheMode) -> bool {
		self.rebuild_async(move || {
			let result = load_resources_from_file(&path, &options, &cache);
			result.status.then(|| ResourceObjects::new(&result.dict, options.factories.clone()))
		})
	}

	/// True while a rebuild is running or queued.
	pub fn is_rebuilding(&self) -> bool {
		self.state().running
	}

	/// Block until no rebuild is running or queued.
	pub fn wait_for_rebuild(&self) {
		let mut state = self.state();
		while state.running {
			state = self.shared.idle.wait(state).unwrap_or_else(PoisonError::into_inner);
		}
	}

	fn state(&self) -> MutexGuard<'_, RebuildState> {
		self.shared.rebuild.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn rebuild_loop(&self, mut build: BuildFn) {
		loop {
			if let Ok(Some(next)) = catch_unwind(AssertUnwindSafe(|| build())) {
				self.replace(next.clone());
				let listeners = self.shared.listeners.lock().unwrap_or_else(PoisonError::into_inner).clone();
				for listener in &listeners {
					let _ = catch_unwind(AssertUnwindSafe(|| listener(&next)));
				}
			}

			let mut state = self.state();
			match state.pending.take() {
				Some(pending) => build = pending,
				None => {
					state.running = false;
					self.shared.idle.notify_all();
					return;
				}
			}
		}
	}
}

impl Default for GlobalResources {
	fn default() -> Self {
		Self::new(ResourceObjects::empty())
	}
}

#[cfg(test)]
mod tests;
