//! Opaque presentation-surface handles.

// std
use std::any::Any;
// self
use crate::_prelude::*;

/// Handle to the UI surface an authentication challenge is presented on.
///
/// The authorizer never inspects the surface; providers downcast it back to whatever their UI
/// toolkit handed to the [`SurfaceLocator`].
#[derive(Clone)]
pub struct PresentationSurface {
	label: Arc<str>,
	handle: Arc<dyn Any + Send + Sync>,
}
impl PresentationSurface {
	/// Wraps a toolkit-specific handle.
	pub fn new<S>(label: impl Into<Arc<str>>, handle: S) -> Self
	where
		S: 'static + Send + Sync,
	{
		Self { label: label.into(), handle: Arc::new(handle) }
	}

	/// Diagnostic label of the surface.
	pub fn label(&self) -> &str {
		&self.label
	}

	/// Borrows the wrapped handle as `S`, if that is its type.
	pub fn downcast_ref<S>(&self) -> Option<&S>
	where
		S: 'static,
	{
		self.handle.downcast_ref()
	}
}
impl Debug for PresentationSurface {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PresentationSurface").field("label", &self.label).finish()
	}
}

/// Yields the topmost surface a challenge can be presented on.
///
/// Called on the UI context right before each challenge; `None` makes the cycle fail with
/// [`Error::UserInteractionRequired`](crate::error::Error::UserInteractionRequired).
pub trait SurfaceLocator
where
	Self: Send + Sync,
{
	/// Returns the topmost presentable surface, if any.
	fn topmost_surface(&self) -> Option<PresentationSurface>;
}

/// Locator that always returns the same surface.
#[derive(Clone, Debug)]
pub struct FixedSurface(pub PresentationSurface);
impl SurfaceLocator for FixedSurface {
	fn topmost_surface(&self) -> Option<PresentationSurface> {
		Some(self.0.clone())
	}
}

/// Locator for headless environments where no surface ever exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;
impl SurfaceLocator for Headless {
	fn topmost_surface(&self) -> Option<PresentationSurface> {
		None
	}
}
