pub mod docs;
pub mod todo_items;
