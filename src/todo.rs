use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

/// In-memory task list. Intentionally unpersisted; it empties with the
/// process.
#[derive(Debug, Default)]
pub struct TodoList {
    items: Vec<TodoItem>,
    last_id: u64,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task and returns its id. Whitespace-only text is ignored.
    pub fn add(&mut self, text: &str) -> Option<u64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        // creation-time id, bumped when two adds land on the same millisecond
        let id = millis.max(self.last_id + 1);
        self.last_id = id;

        self.items.push(TodoItem {
            id,
            text: trimmed.to_string(),
            completed: false,
        });
        Some(id)
    }

    /// Flips completion for the matching item; unknown ids are ignored.
    pub fn toggle(&mut self, id: u64) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.completed = !item.completed;
        }
    }

    /// Deletes the matching item; unknown ids are ignored.
    pub fn remove(&mut self, id: u64) {
        self.items.retain(|item| item.id != id);
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }
}
