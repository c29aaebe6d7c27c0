//! HTTP request handlers.

mod groups;
mod health;
mod tasks;

pub use groups::{create_group, delete_group, fetch_group, trigger_chord};
pub use health::health_check;
pub use tasks::{
    create_grouped_task, create_task, delete_task, fetch_task, fetch_tasks, update_task,
};
