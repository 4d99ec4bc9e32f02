//! `0x`-prefixed hex serialization for fixed-size byte arrays.
//!
//! Use with `serde_with`:
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use serde_with::serde_as;
//! use smoothing_types::hex::PrefixedHex;
//!
//! #[serde_as]
//! #[derive(Serialize, Deserialize)]
//! struct Holder {
//!     #[serde_as(as = "PrefixedHex")]
//!     addr: [u8; 20],
//! }
//!
//! let h: Holder = serde_json::from_str(r#"{"addr":"0x0000000000000000000000000000000000000001"}"#).unwrap();
//! assert_eq!(h.addr[19], 1);
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use serde_with::{DeserializeAs, SerializeAs};

/// Serializes `[u8; N]` as a `0x`-prefixed hex string. The prefix is optional
/// when deserializing.
pub struct PrefixedHex;

impl<const N: usize> SerializeAs<[u8; N]> for PrefixedHex {
    fn serialize_as<S>(source: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", ::hex::encode(source)))
    }
}

impl<'de, const N: usize> DeserializeAs<'de, [u8; N]> for PrefixedHex {
    fn deserialize_as<D>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        let mut out = [0u8; N];
        ::hex::decode_to_slice(digits, &mut out).map_err(D::Error::custom)?;
        Ok(out)
    }
}
