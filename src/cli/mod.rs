mod commands;
mod format;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_add, handle_delete, handle_get, handle_init, handle_list, handle_progress,
    handle_remind, handle_toggle, handle_update, handle_watch,
};
