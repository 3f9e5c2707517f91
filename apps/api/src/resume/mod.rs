// Resume content-synchronization engine.
// Composer and schema are pure; the synchronizer owns editor state; persistence
// and export sit behind traits so storage and print backends can be swapped.

pub mod composer;
pub mod export;
pub mod handlers;
pub mod identity;
pub mod notification;
pub mod persistence;
pub mod print_style;
pub mod render;
pub mod schema;
pub mod sections;
pub mod session;
pub mod sync;
