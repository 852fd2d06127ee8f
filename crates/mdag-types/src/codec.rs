//! Wire encoding for [`Object`].
//!
//! An object is a JSON record with exactly two keys:
//!
//! ```text
//! {"Links":[{"Name":"a.txt","Hash":"<base64>","Size":5}],"Data":"<base64>"}
//! ```
//!
//! An empty link list is written as `null`. Byte fields use standard padded
//! base64. An object with neither links nor data, which is how an empty
//! directory is stored, writes `"Data":null`; an empty file writes
//! `"Data":""`, so the two have distinct digests. There is no header, version tag or magic number.

use crate::error::{CodecError, CodecResult};
use crate::object::Object;

/// Serialize an object to its storage bytes.
pub fn encode(object: &Object) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(object).map_err(CodecError::Encode)
}

/// Deserialize storage bytes back into an object.
pub fn decode(bytes: &[u8]) -> CodecResult<Object> {
    serde_json::from_slice(bytes).map_err(CodecError::Decode)
}

pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map(Some)
                .map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

pub(crate) mod nullable_links {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::object::Link;

    pub fn serialize<S>(links: &[Link], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if links.is_empty() {
            serializer.serialize_none()
        } else {
            links.serialize(serializer)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Link>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Vec<Link>>::deserialize(deserializer)?.unwrap_or_default())
    }
}
