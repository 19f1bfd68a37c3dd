//! Onboarding template merge rules.
//!
//! Templates stay editable after sessions reference them. Materialized tasks
//! copy a todo's title and description when they are created, so edits never
//! reach an in-flight checklist; only todos added later produce new tasks.
//! A todo that any task points at can no longer be removed.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum length of a todo title.
pub const MAX_TODO_TITLE_LEN: usize = 255;

/// A todo item as submitted by an admin in a create or update request.
#[derive(Debug, Clone, Deserialize)]
pub struct TodoInput {
    /// Present when updating an item that already exists on the template.
    pub id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}

/// A todo with its display position settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTodo {
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
}

/// Result of reconciling an incoming todo list with the stored one.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TodoSyncPlan {
    pub updates: Vec<(DbId, ResolvedTodo)>,
    pub inserts: Vec<ResolvedTodo>,
    pub deletes: Vec<DbId>,
}

/// `order_index` for the item at `position` of the request list `list`.
pub fn order_index_for(list: &str, position: usize, given: Option<i32>) -> Result<i32, CoreError> {
    match given {
        Some(index) => Ok(index),
        None => i32::try_from(position).map_err(|_| {
            CoreError::Validation(format!(
                "Field '{list}[{position}].order_index': position is out of range"
            ))
        }),
    }
}

fn resolve(position: usize, input: &TodoInput) -> Result<ResolvedTodo, CoreError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation(format!(
            "Field 'todos[{position}].title': must not be empty"
        )));
    }
    if title.len() > MAX_TODO_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Field 'todos[{position}].title': must be at most {MAX_TODO_TITLE_LEN} characters"
        )));
    }
    Ok(ResolvedTodo {
        title: title.to_string(),
        description: input.description.clone(),
        order_index: order_index_for("todos", position, input.order_index)?,
    })
}

/// Settle titles and positions for a brand-new template's todo list.
pub fn resolve_todos(items: &[TodoInput]) -> Result<Vec<ResolvedTodo>, CoreError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| resolve(i, item))
        .collect()
}

/// Plan how to turn the stored todo list into `incoming`.
///
/// - items with an `id` of a stored todo are updated in place
/// - items without an `id` are inserted
/// - stored todos missing from `incoming` are deleted
///
/// Fails with `Validation` when an incoming id is not on this template, and
/// with `Conflict` when a todo to delete is in `referenced` (has tasks).
pub fn plan_todo_sync(
    existing: &[DbId],
    incoming: &[TodoInput],
    referenced: &[DbId],
) -> Result<TodoSyncPlan, CoreError> {
    let existing_set: HashSet<DbId> = existing.iter().copied().collect();
    let mut kept = HashSet::new();
    let mut plan = TodoSyncPlan::default();

    for (i, item) in incoming.iter().enumerate() {
        let resolved = resolve(i, item)?;
        match item.id {
            Some(id) => {
                if !existing_set.contains(&id) {
                    return Err(CoreError::Validation(format!(
                        "Todo item {id} does not belong to this template"
                    )));
                }
                if !kept.insert(id) {
                    return Err(CoreError::Validation(format!(
                        "Todo item {id} appears more than once"
                    )));
                }
                plan.updates.push((id, resolved));
            }
            None => plan.inserts.push(resolved),
        }
    }

    plan.deletes = existing
        .iter()
        .copied()
        .filter(|id| !kept.contains(id))
        .collect();

    let referenced: HashSet<DbId> = referenced.iter().copied().collect();
    let blocked: Vec<String> = plan
        .deletes
        .iter()
        .filter(|id| referenced.contains(id))
        .map(|id| id.to_string())
        .collect();
    if !blocked.is_empty() {
        return Err(CoreError::Conflict(format!(
            "Cannot remove todo items already assigned to onboarding sessions: {}",
            blocked.join(", ")
        )));
    }

    Ok(plan)
}

/// Todo ids that still need a task, in materialization order.
///
/// `todos` holds `(id, order_index)` pairs. Ordering is by `order_index`,
/// ties broken by id (insertion order).
pub fn todos_to_materialize(todos: &[(DbId, i32)], materialized: &[DbId]) -> Vec<DbId> {
    let done: HashSet<DbId> = materialized.iter().copied().collect();
    let mut pending: Vec<(DbId, i32)> = todos
        .iter()
        .copied()
        .filter(|(id, _)| !done.contains(id))
        .collect();
    pending.sort_by_key(|&(id, order)| (order, id));
    pending.into_iter().map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn todo(id: Option<DbId>, title: &str, order: Option<i32>) -> TodoInput {
        TodoInput {
            id,
            title: title.to_string(),
            description: None,
            order_index: order,
        }
    }

    #[test]
    fn order_index_defaults_to_position() {
        let resolved = resolve_todos(&[
            todo(None, "Sign NDA", None),
            todo(None, "Upload ID", Some(7)),
            todo(None, "Meet team", None),
        ])
        .unwrap();
        let orders: Vec<i32> = resolved.iter().map(|t| t.order_index).collect();
        assert_eq!(orders, vec![0, 7, 2]);
    }

    #[test]
    fn order_index_position_must_fit() {
        let beyond = i32::MAX as usize + 1;
        assert_eq!(order_index_for("todos", beyond, Some(3)).unwrap(), 3);
        assert_eq!(order_index_for("todos", 4, None).unwrap(), 4);
        assert_matches!(
            order_index_for("fields", beyond, None),
            Err(CoreError::Validation(msg)) if msg.starts_with("Field 'fields[")
        );
    }

    #[test]
    fn blank_title_rejected() {
        assert_matches!(
            resolve_todos(&[todo(None, "   ", None)]),
            Err(CoreError::Validation(msg)) if msg.contains("todos[0].title")
        );
    }

    #[test]
    fn sync_classifies_updates_inserts_deletes() {
        let plan = plan_todo_sync(
            &[1, 2, 3],
            &[todo(Some(2), "Renamed", Some(0)), todo(None, "New", None)],
            &[],
        )
        .unwrap();

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].0, 2);
        assert_eq!(plan.updates[0].1.title, "Renamed");
        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.inserts[0].order_index, 1);
        assert_eq!(plan.deletes, vec![1, 3]);
    }

    #[test]
    fn sync_refuses_to_delete_referenced_todo() {
        let err = plan_todo_sync(&[1, 2], &[todo(Some(2), "Keep", None)], &[1]).unwrap_err();
        assert_matches!(err, CoreError::Conflict(msg) if msg.contains('1'));
    }

    #[test]
    fn sync_allows_keeping_referenced_todo() {
        let plan = plan_todo_sync(&[1, 2], &[todo(Some(1), "Still here", None)], &[1]).unwrap();
        assert_eq!(plan.deletes, vec![2]);
    }

    #[test]
    fn sync_rejects_foreign_or_duplicate_ids() {
        assert_matches!(
            plan_todo_sync(&[1], &[todo(Some(99), "x", None)], &[]),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            plan_todo_sync(&[1], &[todo(Some(1), "a", None), todo(Some(1), "b", None)], &[]),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn materialize_skips_existing_and_orders_stably() {
        let todos = [(10, 1), (11, 0), (12, 1), (13, 0)];
        assert_eq!(todos_to_materialize(&todos, &[]), vec![11, 13, 10, 12]);
        assert_eq!(todos_to_materialize(&todos, &[11, 12]), vec![13, 10]);
        assert!(todos_to_materialize(&todos, &[10, 11, 12, 13]).is_empty());
    }
}
