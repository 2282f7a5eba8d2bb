//! Simple file-backed [`TokenStore`] for desktop tools and bots.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	marker::PhantomData,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture, TokenStore},
};

/// Persists the token as JSON, replacing the file atomically on every save.
///
/// Nothing is cached in memory: every fetch reads the file, so a fresh [`FileStore`] over the same
/// path observes what a previous one saved.
#[derive(Debug)]
pub struct FileStore<T> {
	path: PathBuf,
	io_guard: Arc<Mutex<()>>,
	_token: PhantomData<fn() -> T>,
}
impl<T> FileStore<T> {
	/// Opens a store at the provided path, creating parent directories when needed.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		ensure_parent_exists(&path)?;

		Ok(Self { path, io_guard: Default::default(), _token: PhantomData })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn remove_locked(&self) -> Result<(), StoreError> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to remove {}: {e}", self.path.display()),
			}),
		}
	}
}
impl<T> FileStore<T>
where
	T: Serialize + DeserializeOwned,
{
	fn load_locked(&self) -> Result<Option<T>, StoreError> {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) =>
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", self.path.display()),
				}),
		};

		if bytes.is_empty() {
			return Ok(None);
		}

		serde_json::from_slice(&bytes).map(Some).map_err(|e| StoreError::Decode {
			message: format!("Failed to parse {}: {e}", self.path.display()),
		})
	}

	fn persist_locked(&self, token: &T) -> Result<(), StoreError> {
		ensure_parent_exists(&self.path)?;

		let serialized = serde_json::to_vec_pretty(token).map_err(|e| StoreError::Backend {
			message: format!("Failed to serialize token: {e}"),
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl<T> Clone for FileStore<T> {
	fn clone(&self) -> Self {
		Self { path: self.path.clone(), io_guard: self.io_guard.clone(), _token: PhantomData }
	}
}
impl<T> TokenStore<T> for FileStore<T>
where
	T: 'static + Serialize + DeserializeOwned + Send + Sync,
{
	fn fetch(&self) -> StoreFuture<'_, Option<T>> {
		Box::pin(async move {
			let _guard = self.io_guard.lock();

			self.load_locked()
		})
	}

	fn save(&self, token: T) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let _guard = self.io_guard.lock();

			self.persist_locked(&token)
		})
	}

	fn delete(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let _guard = self.io_guard.lock();

			self.remove_locked()
		})
	}
}

fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
			message: format!("Failed to create store directory {}: {e}", parent.display()),
		})?;
	}

	Ok(())
}
