//! The node gateway encodes every 64-bit integer as a decimal string.

use serde::{Deserialize, Deserializer, Serializer, de::Error as SerdeError};

pub mod quoted_u64 {
    use super::{Deserialize, Deserializer, SerdeError, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value
            .parse::<u64>()
            .map_err(|err| SerdeError::custom(format!("invalid u64: {err}")))
    }
}

pub mod quoted_u64_vec {
    use super::{Deserialize, Deserializer, SerdeError, Serializer};
    use serde::ser::SerializeSeq as _;

    pub fn serialize<S>(values: &[u64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer)?
            .into_iter()
            .map(|value| {
                value
                    .parse::<u64>()
                    .map_err(|err| SerdeError::custom(format!("invalid u64: {err}")))
            })
            .collect()
    }
}
