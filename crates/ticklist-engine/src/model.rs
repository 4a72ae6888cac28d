/// Core data model: items, groups, and the checklist state snapshot.
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single checklist entry.
///
/// `timestamp` is the check instant in Unix milliseconds; it is set when the
/// item is checked and cleared when it is unchecked, so it serializes as
/// `<int|null>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub value: String,
    pub checked: bool,
    pub timestamp: Option<i64>,
}

impl Item {
    /// Creates an unchecked item with no timestamp.
    pub fn new(id: u64, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
            checked: false,
            timestamp: None,
        }
    }

    /// Returns a checked copy stamped with the current instant.
    pub fn checked_now(&self) -> Self {
        Self {
            checked: true,
            timestamp: Some(Utc::now().timestamp_millis()),
            ..self.clone()
        }
    }

    /// Returns an unchecked copy with the timestamp cleared.
    pub fn unchecked(&self) -> Self {
        Self {
            checked: false,
            timestamp: None,
            ..self.clone()
        }
    }
}

/// An ordered group of items. List position is display position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub items: Vec<Item>,
}

impl Group {
    /// Creates an empty group.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Returns a copy with every item checked and stamped.
    pub fn checked_now(&self) -> Self {
        Self {
            items: self.items.iter().map(Item::checked_now).collect(),
            ..self.clone()
        }
    }

    /// Returns a copy with every item unchecked.
    pub fn unchecked(&self) -> Self {
        Self {
            items: self.items.iter().map(Item::unchecked).collect(),
            ..self.clone()
        }
    }
}

/// The externally visible checklist snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub groups: Vec<Group>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_is_unchecked() {
        let item = Item::new(1, "milk");
        assert!(!item.checked);
        assert!(item.timestamp.is_none());
    }

    #[test]
    fn test_checked_now_stamps_timestamp() {
        let item = Item::new(1, "milk").checked_now();
        assert!(item.checked);
        assert!(item.timestamp.is_some());
    }

    #[test]
    fn test_unchecked_clears_timestamp() {
        let item = Item::new(1, "milk").checked_now().unchecked();
        assert!(!item.checked);
        assert!(item.timestamp.is_none());
    }

    #[test]
    fn test_group_checked_now_covers_all_items() {
        let mut group = Group::new(1, "Home");
        group.items.push(Item::new(10, "milk"));
        group.items.push(Item::new(11, "eggs"));

        let checked = group.checked_now();
        assert!(checked.items.iter().all(|i| i.checked));
        assert!(checked.items.iter().all(|i| i.timestamp.is_some()));
        // Identity fields are untouched
        assert_eq!(checked.id, 1);
        assert_eq!(checked.name, "Home");
    }

    #[test]
    fn test_state_wire_shape() {
        let mut group = Group::new(1, "Home");
        group.items.push(Item {
            id: 10,
            value: "milk".to_string(),
            checked: true,
            timestamp: Some(1_700_000_000_000),
        });
        let state = State {
            groups: vec![group],
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "groups": [{
                    "id": 1,
                    "name": "Home",
                    "items": [{
                        "id": 10,
                        "value": "milk",
                        "checked": true,
                        "timestamp": 1_700_000_000_000_i64
                    }]
                }]
            })
        );

        let back: State = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_null_timestamp_wire_shape() {
        let item = Item::new(2, "eggs");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["timestamp"], serde_json::Value::Null);
    }
}
