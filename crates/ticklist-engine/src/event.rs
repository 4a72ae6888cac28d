/// Reversible mutation events.
///
/// Each variant carries exactly the snapshots needed for both directions of
/// replay: `previous`/`removed` for the inverse transform, `edited` for the
/// forward one. Check/uncheck constructors stamp or clear timestamps at
/// construction time, so replay never recomputes them and an undo-then-redo
/// cycle reproduces the state bit for bit.
use crate::model::{Group, Item, State};

/// The closed union of checklist mutations.
///
/// `apply`/`revert` match exhaustively with no wildcard arm, so adding a
/// variant without handling it is a compile error rather than a runtime
/// "unreachable" assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    AddItem {
        group_index: usize,
        item_index: usize,
        item: Item,
    },
    RemoveItem {
        group_index: usize,
        item_index: usize,
        removed: Item,
    },
    EditItem {
        group_index: usize,
        item_index: usize,
        previous: Item,
        edited: Item,
    },
    CheckItem {
        group_index: usize,
        item_index: usize,
        previous: Item,
        edited: Item,
    },
    UncheckItem {
        group_index: usize,
        item_index: usize,
        previous: Item,
        edited: Item,
    },
    AddGroup {
        group_index: usize,
        group: Group,
    },
    RemoveGroup {
        group_index: usize,
        removed: Group,
    },
    EditGroup {
        group_index: usize,
        previous: Group,
        edited: Group,
    },
    CheckGroup {
        group_index: usize,
        previous: Group,
        edited: Group,
    },
    UncheckGroup {
        group_index: usize,
        previous: Group,
        edited: Group,
    },
    RemoveAll {
        removed: Vec<Group>,
    },
    CheckAll {
        previous: Vec<Group>,
        edited: Vec<Group>,
    },
    UncheckAll {
        previous: Vec<Group>,
        edited: Vec<Group>,
    },
}

// Snapshot-capturing constructors. All of them read the current state the
// event will be recorded against; indices out of range are a caller bug and
// panic.
impl Event {
    pub fn add_item(group_index: usize, item_index: usize, item: Item) -> Self {
        Self::AddItem {
            group_index,
            item_index,
            item,
        }
    }

    /// Captures the item at the target position as the `removed` snapshot.
    pub fn remove_item(state: &State, group_index: usize, item_index: usize) -> Self {
        Self::RemoveItem {
            group_index,
            item_index,
            removed: state.groups[group_index].items[item_index].clone(),
        }
    }

    /// Captures the current item as `previous` alongside the caller's edit.
    pub fn edit_item(state: &State, group_index: usize, item_index: usize, edited: Item) -> Self {
        Self::EditItem {
            group_index,
            item_index,
            previous: state.groups[group_index].items[item_index].clone(),
            edited,
        }
    }

    /// Checks the target item, stamping it with the current instant.
    pub fn check_item(state: &State, group_index: usize, item_index: usize) -> Self {
        let previous = state.groups[group_index].items[item_index].clone();
        let edited = previous.checked_now();
        Self::CheckItem {
            group_index,
            item_index,
            previous,
            edited,
        }
    }

    /// Unchecks the target item, clearing its timestamp.
    pub fn uncheck_item(state: &State, group_index: usize, item_index: usize) -> Self {
        let previous = state.groups[group_index].items[item_index].clone();
        let edited = previous.unchecked();
        Self::UncheckItem {
            group_index,
            item_index,
            previous,
            edited,
        }
    }

    pub fn add_group(group_index: usize, group: Group) -> Self {
        Self::AddGroup { group_index, group }
    }

    pub fn remove_group(state: &State, group_index: usize) -> Self {
        Self::RemoveGroup {
            group_index,
            removed: state.groups[group_index].clone(),
        }
    }

    pub fn edit_group(state: &State, group_index: usize, edited: Group) -> Self {
        Self::EditGroup {
            group_index,
            previous: state.groups[group_index].clone(),
            edited,
        }
    }

    /// Checks every item in the target group.
    pub fn check_group(state: &State, group_index: usize) -> Self {
        let previous = state.groups[group_index].clone();
        let edited = previous.checked_now();
        Self::CheckGroup {
            group_index,
            previous,
            edited,
        }
    }

    /// Unchecks every item in the target group.
    pub fn uncheck_group(state: &State, group_index: usize) -> Self {
        let previous = state.groups[group_index].clone();
        let edited = previous.unchecked();
        Self::UncheckGroup {
            group_index,
            previous,
            edited,
        }
    }

    /// Removes every group, keeping the full sequence for undo.
    pub fn remove_all(state: &State) -> Self {
        Self::RemoveAll {
            removed: state.groups.clone(),
        }
    }

    /// Checks every item in every group.
    pub fn check_all(state: &State) -> Self {
        Self::CheckAll {
            previous: state.groups.clone(),
            edited: state.groups.iter().map(Group::checked_now).collect(),
        }
    }

    /// Unchecks every item in every group.
    pub fn uncheck_all(state: &State) -> Self {
        Self::UncheckAll {
            previous: state.groups.clone(),
            edited: state.groups.iter().map(Group::unchecked).collect(),
        }
    }

    /// Forward (redo) transform.
    pub(crate) fn apply(&self, state: &mut State) {
        match self {
            Self::AddItem {
                group_index,
                item_index,
                item,
            } => state.groups[*group_index].items.insert(*item_index, item.clone()),
            Self::RemoveItem {
                group_index,
                item_index,
                ..
            } => {
                state.groups[*group_index].items.remove(*item_index);
            }
            Self::EditItem {
                group_index,
                item_index,
                edited,
                ..
            }
            | Self::CheckItem {
                group_index,
                item_index,
                edited,
                ..
            }
            | Self::UncheckItem {
                group_index,
                item_index,
                edited,
                ..
            } => state.groups[*group_index].items[*item_index] = edited.clone(),
            Self::AddGroup { group_index, group } => {
                state.groups.insert(*group_index, group.clone())
            }
            Self::RemoveGroup { group_index, .. } => {
                state.groups.remove(*group_index);
            }
            Self::EditGroup {
                group_index,
                edited,
                ..
            }
            | Self::CheckGroup {
                group_index,
                edited,
                ..
            }
            | Self::UncheckGroup {
                group_index,
                edited,
                ..
            } => state.groups[*group_index] = edited.clone(),
            Self::RemoveAll { .. } => state.groups.clear(),
            Self::CheckAll { edited, .. } | Self::UncheckAll { edited, .. } => {
                state.groups = edited.clone()
            }
        }
    }

    /// Inverse (undo) transform.
    pub(crate) fn revert(&self, state: &mut State) {
        match self {
            Self::AddItem {
                group_index,
                item_index,
                ..
            } => {
                state.groups[*group_index].items.remove(*item_index);
            }
            Self::RemoveItem {
                group_index,
                item_index,
                removed,
            } => state.groups[*group_index]
                .items
                .insert(*item_index, removed.clone()),
            Self::EditItem {
                group_index,
                item_index,
                previous,
                ..
            }
            | Self::CheckItem {
                group_index,
                item_index,
                previous,
                ..
            }
            | Self::UncheckItem {
                group_index,
                item_index,
                previous,
                ..
            } => state.groups[*group_index].items[*item_index] = previous.clone(),
            Self::AddGroup { group_index, .. } => {
                state.groups.remove(*group_index);
            }
            Self::RemoveGroup {
                group_index,
                removed,
            } => state.groups.insert(*group_index, removed.clone()),
            Self::EditGroup {
                group_index,
                previous,
                ..
            }
            | Self::CheckGroup {
                group_index,
                previous,
                ..
            }
            | Self::UncheckGroup {
                group_index,
                previous,
                ..
            } => state.groups[*group_index] = previous.clone(),
            Self::RemoveAll { removed } => state.groups = removed.clone(),
            Self::CheckAll { previous, .. } | Self::UncheckAll { previous, .. } => {
                state.groups = previous.clone()
            }
        }
    }
}
