//! Attribute conversion between `User` and DynamoDB items.
//!
//! Pure functions, testable without a table.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use domain::User;

use crate::keys::{self, KeySchema, ENTITY_TYPE_ATTR, ENTITY_TYPE_USER};

pub type Item = HashMap<String, AttributeValue>;

/// Why a stored item could not be read back as a `User`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("missing attribute {0}")]
    MissingAttribute(String),
    #[error("attribute {attribute} is not of type {expected}")]
    WrongType {
        attribute: String,
        expected: &'static str,
    },
    #[error("attribute {attribute} has invalid number {value:?}")]
    InvalidNumber { attribute: String, value: String },
    #[error("partition key {0:?} is not a user key")]
    InvalidKey(String),
}

/// Convert a User to a full DynamoDB item.
pub fn user_to_item(schema: &KeySchema, user: &User) -> Item {
    let mut item = keys::user_key(schema, &user.id);
    item.insert(
        ENTITY_TYPE_ATTR.to_string(),
        AttributeValue::S(ENTITY_TYPE_USER.to_string()),
    );
    item.insert("username".to_string(), AttributeValue::S(user.username.clone()));
    item.insert("name".to_string(), AttributeValue::S(user.name.clone()));
    item.insert("age".to_string(), AttributeValue::N(user.age.to_string()));
    item
}

/// Attributes rewritten by an update. Keys and the entity type never change.
pub fn user_update_attrs(user: &User) -> Vec<(String, AttributeValue)> {
    vec![
        ("username".to_string(), AttributeValue::S(user.username.clone())),
        ("name".to_string(), AttributeValue::S(user.name.clone())),
        ("age".to_string(), AttributeValue::N(user.age.to_string())),
    ]
}

/// Convert a DynamoDB item to User.
pub fn item_to_user(schema: &KeySchema, item: &Item) -> Result<User, DecodeError> {
    let pk = get_string(item, &schema.partition_key)?;
    Ok(User {
        id: keys::id_from_pk(pk)?,
        name: get_string(item, "name")?.to_string(),
        username: get_string(item, "username")?.to_string(),
        age: get_u32(item, "age")?,
    })
}

fn get_attr<'a>(item: &'a Item, name: &str) -> Result<&'a AttributeValue, DecodeError> {
    item.get(name)
        .ok_or_else(|| DecodeError::MissingAttribute(name.to_string()))
}

fn get_string<'a>(item: &'a Item, name: &str) -> Result<&'a str, DecodeError> {
    get_attr(item, name)?
        .as_s()
        .map(String::as_str)
        .map_err(|_| DecodeError::WrongType {
            attribute: name.to_string(),
            expected: "S",
        })
}

fn get_u32(item: &Item, name: &str) -> Result<u32, DecodeError> {
    let raw = get_attr(item, name)?
        .as_n()
        .map_err(|_| DecodeError::WrongType {
            attribute: name.to_string(),
            expected: "N",
        })?;
    raw.parse::<u32>().map_err(|_| DecodeError::InvalidNumber {
        attribute: name.to_string(),
        value: raw.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> User {
        User::new("42", "Ada", "ada", 30)
    }

    fn s(v: &str) -> AttributeValue {
        AttributeValue::S(v.to_string())
    }

    #[test]
    fn user_to_item_writes_single_table_layout() {
        let item = user_to_item(&KeySchema::default(), &ada());
        assert_eq!(item.len(), 6);
        assert_eq!(item.get("PK"), Some(&s("USER_42")));
        assert_eq!(item.get("SK"), Some(&s("USER_42")));
        assert_eq!(item.get("ENTITY_TYPE"), Some(&s("USER")));
        assert_eq!(item.get("username"), Some(&s("ada")));
        assert_eq!(item.get("name"), Some(&s("Ada")));
        assert_eq!(item.get("age"), Some(&AttributeValue::N("30".into())));
    }

    #[test]
    fn roundtrip_item_mapping() {
        let schema = KeySchema::default();
        for user in [
            ada(),
            User::new("a_b", "Under Score", "u_s", 0),
            User::new("", "", "", u32::MAX),
        ] {
            let back = item_to_user(&schema, &user_to_item(&schema, &user)).unwrap();
            assert_eq!(back, user);
        }
    }

    #[test]
    fn roundtrip_with_legacy_schema() {
        let schema = KeySchema::legacy();
        let item = user_to_item(&schema, &ada());
        assert!(item.contains_key("TABLE-USER_PK"));
        assert!(!item.contains_key("PK"));
        assert_eq!(item_to_user(&schema, &item).unwrap(), ada());
    }

    #[test]
    fn update_attrs_leave_keys_and_entity_type_alone() {
        let attrs = user_update_attrs(&ada());
        let names: Vec<_> = attrs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["username", "name", "age"]);
    }

    #[test]
    fn missing_age_is_an_error() {
        let mut item = user_to_item(&KeySchema::default(), &ada());
        item.remove("age");
        assert_eq!(
            item_to_user(&KeySchema::default(), &item),
            Err(DecodeError::MissingAttribute("age".into()))
        );
    }

    #[test]
    fn malformed_age_is_an_error() {
        let schema = KeySchema::default();
        for bad in ["", "abc", "-1", "30.5", "4294967296"] {
            let mut item = user_to_item(&schema, &ada());
            item.insert("age".into(), AttributeValue::N(bad.into()));
            assert_eq!(
                item_to_user(&schema, &item),
                Err(DecodeError::InvalidNumber {
                    attribute: "age".into(),
                    value: bad.into()
                })
            );
        }
    }

    #[test]
    fn wrong_attribute_type_is_an_error() {
        let schema = KeySchema::default();
        let mut item = user_to_item(&schema, &ada());
        item.insert("age".into(), s("30"));
        assert_eq!(
            item_to_user(&schema, &item),
            Err(DecodeError::WrongType {
                attribute: "age".into(),
                expected: "N"
            })
        );
    }

    #[test]
    fn missing_strings_are_errors() {
        let schema = KeySchema::default();
        for attr in ["PK", "name", "username"] {
            let mut item = user_to_item(&schema, &ada());
            item.remove(attr);
            assert_eq!(
                item_to_user(&schema, &item),
                Err(DecodeError::MissingAttribute(attr.into()))
            );
        }
    }

    #[test]
    fn foreign_partition_key_is_an_error() {
        let schema = KeySchema::default();
        let mut item = user_to_item(&schema, &ada());
        item.insert("PK".into(), s("ORDER_42"));
        assert_eq!(
            item_to_user(&schema, &item),
            Err(DecodeError::InvalidKey("ORDER_42".into()))
        );
    }
}
