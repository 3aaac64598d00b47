// Application layer - Use case interactors

pub mod container;
pub mod editor_interactor;
pub mod session_handle;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer, PickerPresets};
pub use editor_interactor::EditorInteractor;
pub use session_handle::SessionHandle;
