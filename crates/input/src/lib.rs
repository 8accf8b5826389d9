//! Input dispatch: raw keyboard and mouse events become camera actions.
//!
//! # Invariants
//! - The dispatcher never touches camera state. It returns an [`Action`] and
//!   the owner of the camera applies it.
//! - The binding table is fixed; there is no remapping.

pub mod action;
pub mod binding;
pub mod dispatcher;
pub mod event;

pub use action::Action;
pub use binding::{Binding, binding_for};
pub use dispatcher::{Dispatch, InputDispatcher};
pub use event::{InputEvent, Key, MouseButton};

pub fn crate_info() -> &'static str {
    "nutshell-input v0.1.0"
}
