//! Condition trees shared by `WHERE` and `HAVING`.
//!
//! A [`ConditionTree`] is an arena of groups. Group 0 is the root; every other group is a
//! parenthesized subgroup addressed by a [`GroupId`] that stays valid however many siblings
//! are appended after it.
//!
//! Each group keeps one ordered child list, so conditions and subgroups render in the order
//! they were added:
//!
//! ```rust
//! use quarry_query::condition::ConditionTree;
//! use quarry_query::filter::{Connector, Operator};
//!
//! let mut tree = ConditionTree::new();
//! let root = tree.root();
//! tree.add_condition(root, "a", Operator::Eq, 1, Connector::And).unwrap();
//! let group = tree.open_subgroup(root, Connector::And);
//! tree.add_condition(group, "x", Operator::Eq, 2, Connector::And).unwrap();
//! tree.add_condition(group, "y", Operator::Eq, 3, Connector::Or).unwrap();
//!
//! let (sql, args) = tree.render();
//! assert_eq!(sql, "a = ? AND (x = ? OR y = ?)");
//! assert_eq!(args.len(), 3);
//! ```

use crate::error::QueryResult;
use crate::filter::{Condition, Connector, FilterValue, Operator};

/// Stable handle to a group inside a [`ConditionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

impl GroupId {
    /// The root group of every tree.
    pub const ROOT: GroupId = GroupId(0);

    /// Arena index of this group.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A child of a group, in creation order.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// A leaf condition.
    Condition(Condition),
    /// A nested group.
    Group(GroupId),
}

/// One group of the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupNode {
    /// How this group joins the item before it in its parent.
    pub connector: Connector,
    /// Conditions and subgroups in the order they were added.
    pub children: Vec<Child>,
}

/// Tree size recorded by [`ConditionTree::savepoint`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Savepoint {
    parent: GroupId,
    groups: usize,
    children: usize,
}

/// Arena-backed tree of AND/OR conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionTree {
    groups: Vec<GroupNode>,
}

impl Default for ConditionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionTree {
    /// Create a tree holding only an empty root group.
    pub fn new() -> Self {
        Self {
            groups: vec![GroupNode::default()],
        }
    }

    /// Handle of the root group.
    pub fn root(&self) -> GroupId {
        GroupId::ROOT
    }

    /// Look up a group.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different tree and is out of range.
    pub fn group(&self, id: GroupId) -> &GroupNode {
        &self.groups[id.0]
    }

    /// Number of groups, root included.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Whether no conditions were ever added anywhere in the tree.
    ///
    /// A tree made only of empty groups is "empty" here as well, since it renders nothing.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| {
            group
                .children
                .iter()
                .all(|child| matches!(child, Child::Group(_)))
        })
    }

    /// Validate and append a condition to `group`.
    ///
    /// The first child of a group is stored without a connector; later ones keep `requested`.
    pub fn add_condition(
        &mut self,
        group: GroupId,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
        requested: Connector,
    ) -> QueryResult<()> {
        let connector = self.connector_for(group, requested);
        let condition = Condition::new(column, operator, value, connector)?;
        self.groups[group.0].children.push(Child::Condition(condition));
        Ok(())
    }

    /// Append a new, empty subgroup to `parent` and return its handle.
    pub fn open_subgroup(&mut self, parent: GroupId, requested: Connector) -> GroupId {
        let connector = self.connector_for(parent, requested);
        let id = GroupId(self.groups.len());
        self.groups.push(GroupNode {
            connector,
            children: Vec::new(),
        });
        self.groups[parent.0].children.push(Child::Group(id));
        id
    }

    /// Record the current size of the tree and of `parent`'s child list.
    pub(crate) fn savepoint(&self, parent: GroupId) -> Savepoint {
        Savepoint {
            parent,
            groups: self.groups.len(),
            children: self.groups[parent.0].children.len(),
        }
    }

    /// Drop everything appended to the tree and to the savepoint's parent since it was taken.
    ///
    /// Handles issued after the savepoint become invalid.
    pub(crate) fn rollback(&mut self, savepoint: Savepoint) {
        self.groups.truncate(savepoint.groups);
        self.groups[savepoint.parent.0]
            .children
            .truncate(savepoint.children);
    }

    fn connector_for(&self, group: GroupId, requested: Connector) -> Connector {
        if self.groups[group.0].children.is_empty() {
            Connector::None
        } else {
            requested
        }
    }

    /// Render the root group into SQL text and its ordered arguments.
    ///
    /// Rendering is a pure function of the tree; calling it twice gives identical output.
    pub fn render(&self) -> (String, Vec<FilterValue>) {
        let mut params = Vec::new();
        let sql = self.render_group(GroupId::ROOT, true, &mut params);
        (sql, params)
    }

    fn render_group(&self, id: GroupId, is_root: bool, params: &mut Vec<FilterValue>) -> String {
        let mut sql = String::new();
        let mut first = true;

        for child in &self.groups[id.0].children {
            let (connector, fragment) = match child {
                Child::Condition(condition) => {
                    let mut fragment = String::new();
                    condition.write_sql(&mut fragment, params);
                    (condition.connector, fragment)
                }
                Child::Group(sub) => {
                    let fragment = self.render_group(*sub, false, params);
                    if fragment.is_empty() {
                        continue;
                    }
                    (self.groups[sub.0].connector, fragment)
                }
            };

            if first {
                first = false;
            } else {
                sql.push(' ');
                sql.push_str(connector.as_sql().unwrap_or("AND"));
                sql.push(' ');
            }
            sql.push_str(&fragment);
        }

        if sql.is_empty() || is_root {
            sql
        } else {
            format!("({})", sql)
        }
    }
}
