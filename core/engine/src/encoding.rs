//! Textual encodings for string payloads.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use cryptoshield_common::{Error, Result};

/// How framed bytes are rendered as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Hex,
    Base64,
    /// URL-safe alphabet without padding.
    Base64Url,
}

impl Encoding {
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Encoding::Hex => hex::encode(bytes),
            Encoding::Base64 => STANDARD.encode(bytes),
            Encoding::Base64Url => URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    pub fn decode(&self, text: &str) -> Result<Vec<u8>> {
        let text = text.trim();
        match self {
            Encoding::Hex => hex::decode(text).map_err(|e| Error::Encoding(format!("Invalid hex: {}", e))),
            Encoding::Base64 => STANDARD
                .decode(text)
                .map_err(|e| Error::Encoding(format!("Invalid base64: {}", e))),
            Encoding::Base64Url => URL_SAFE_NO_PAD
                .decode(text)
                .map_err(|e| Error::Encoding(format!("Invalid base64url: {}", e))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Hex => f.write_str("hex"),
            Encoding::Base64 => f.write_str("base64"),
            Encoding::Base64Url => f.write_str("base64url"),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(Encoding::Hex),
            "base64" => Ok(Encoding::Base64),
            "base64url" => Ok(Encoding::Base64Url),
            _ => Err(Error::Serialization(format!("Unknown encoding: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptoshield_common::ErrorKind;

    #[test]
    fn test_encode_known_values() {
        let bytes = [0xde, 0xad, 0xbe, 0xef, 0xfb];

        assert_eq!(Encoding::Hex.encode(&bytes), "deadbeeffb");
        assert_eq!(Encoding::Base64.encode(&bytes), "3q2+7/s=");
        assert_eq!(Encoding::Base64Url.encode(&bytes), "3q2-7_s");
    }

    #[test]
    fn test_decode_reverses_encode() {
        let bytes: Vec<u8> = (0..=255).collect();

        for encoding in [Encoding::Hex, Encoding::Base64, Encoding::Base64Url] {
            let text = encoding.encode(&bytes);
            assert_eq!(encoding.decode(&text).unwrap(), bytes);
        }
    }

    #[test]
    fn test_decode_invalid_input() {
        let err = Encoding::Hex.decode("not hex!").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);

        assert!(Encoding::Base64.decode("%%%").is_err());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("HEX".parse::<Encoding>().unwrap(), Encoding::Hex);
        assert_eq!("base64url".parse::<Encoding>().unwrap(), Encoding::Base64Url);
        assert!("utf16".parse::<Encoding>().is_err());
    }
}
