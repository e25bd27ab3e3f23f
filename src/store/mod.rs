//! In-memory stores for users, sessions, and images.
//!
//! Each store owns its data behind its own `RwLock` and is the only place
//! that data is mutated. Stores are created once at startup and shared with
//! request handlers through `AppState`.
//!
//! # Lock ordering
//!
//! Operations spanning two stores always lock [`UserStore`] before
//! [`SessionStore`]. No lock is held across outbound network I/O.

mod images;
mod sessions;
mod users;

pub use images::{sample_images, Image, ImageStore};
pub use sessions::SessionStore;
pub use users::{User, UserCreation, UserStore};
