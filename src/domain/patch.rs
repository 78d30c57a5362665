//! Tri-state field for partial updates.
//!
//! A plain `Option<T>` cannot tell "key omitted" from "key sent as null".
//! Struct fields of this type must carry
//! `#[serde(default, skip_serializing_if = "Patch::is_absent")]` so that an
//! absent field never reaches the wire.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    /// 不在請求中：欄位保持不變
    #[default]
    Absent,
    /// 明確送出 `null`
    Null,
    /// 帶值送出，即使與目前值相同也會套用
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }

    /// `None` 對應 `Absent`：未指定即不變更
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Set(value),
            None => Patch::Absent,
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Set(value)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(value) => value.serialize(serializer),
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    /// 只有鍵存在時才會呼叫；缺少的鍵走 `Default`，即 `Absent`
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Set(value),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Probe {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        name: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        count: Patch<u32>,
    }

    #[test]
    fn test_three_states_survive_serialization() {
        let probe = Probe {
            name: Patch::Null,
            count: Patch::Set(0),
        };
        let value = serde_json::to_value(&probe).unwrap();
        assert_eq!(value, json!({"name": null, "count": 0}));

        let back: Probe = serde_json::from_value(value).unwrap();
        assert_eq!(back, probe);
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let probe = Probe {
            name: Patch::Absent,
            count: Patch::Set(3),
        };
        assert_eq!(serde_json::to_string(&probe).unwrap(), r#"{"count":3}"#);

        let back: Probe = serde_json::from_str(r#"{"count":3}"#).unwrap();
        assert_eq!(back.name, Patch::Absent);
    }

    #[test]
    fn test_falsy_values_stay_present() {
        let probe: Probe = serde_json::from_str(r#"{"name":"","count":0}"#).unwrap();
        assert_eq!(probe.name, Patch::Set(String::new()));
        assert_eq!(probe.count, Patch::Set(0));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Patch::from_option(Some(5)), Patch::Set(5));
        assert_eq!(Patch::<i32>::from_option(None), Patch::Absent);
        assert_eq!(Patch::from(7), Patch::Set(7));
    }
}
