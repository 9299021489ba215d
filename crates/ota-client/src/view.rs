//! Rendering seam for upload front ends

use std::sync::Arc;

use ota_core::UploadPanel;

/// Front end showing an [`UploadPanel`]
///
/// `render` is called with the complete panel after every state change.
/// Implementations redraw whatever changed.
pub trait UploadView: Send + Sync {
    fn render(&self, panel: &UploadPanel);
}

impl<V: UploadView + ?Sized> UploadView for Arc<V> {
    fn render(&self, panel: &UploadPanel) {
        (**self).render(panel)
    }
}

/// View that discards every frame (headless uploads)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl UploadView for NullView {
    fn render(&self, _panel: &UploadPanel) {}
}
