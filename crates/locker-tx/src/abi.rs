//! Solidity ABI encoding/decoding utilities
//!
//! Every value travels as one or more 32-byte words:
//! - `address`: 12 zero bytes + 20 address bytes
//! - `uint256`: big-endian, left-padded
//! - `bool`: uint256 0 or 1
//! - dynamic arrays: head word holds a byte offset to `length` followed by
//!   the inline elements

use locker_core::{Address, Amount};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Size of one ABI word
pub const WORD: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("Invalid hex data")]
    InvalidHex,

    #[error("Return data truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Value does not fit in {target}")]
    Overflow { target: &'static str },

    #[error("Invalid bool word")]
    InvalidBool,

    #[error("Address word has non-zero padding")]
    InvalidAddressPadding,
}

/// First 4 bytes of the Keccak-256 hash of a canonical function signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode an address as a left-padded word
pub fn encode_address(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Encode an unsigned integer as a big-endian uint256 word
pub fn encode_uint(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Build calldata from a selector and a list of static argument words
pub fn encode_call(selector: [u8; 4], args: &[[u8; WORD]]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len() * WORD);
    data.extend_from_slice(&selector);
    for word in args {
        data.extend_from_slice(word);
    }
    data
}

/// Render bytes as `0x`-prefixed hex
pub fn to_hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse `0x`-prefixed (or bare) hex into bytes. `"0x"` decodes to empty.
pub fn from_hex_data(s: &str) -> Result<Vec<u8>, AbiError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|_| AbiError::InvalidHex)
}

/// Cursor-free reader over ABI-encoded return data
pub struct AbiReader<'a> {
    data: &'a [u8],
}

impl<'a> AbiReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// The 32-byte word starting at byte offset `at`
    pub fn word(&self, at: usize) -> Result<&'a [u8], AbiError> {
        let end = at.checked_add(WORD).ok_or(AbiError::Overflow { target: "usize" })?;
        if end > self.data.len() {
            return Err(AbiError::Truncated {
                needed: end,
                available: self.data.len(),
            });
        }
        Ok(&self.data[at..end])
    }

    /// uint256 that must fit in `u128`
    pub fn uint(&self, at: usize) -> Result<Amount, AbiError> {
        let word = self.word(at)?;
        if word[..16].iter().any(|&b| b != 0) {
            return Err(AbiError::Overflow { target: "u128" });
        }
        let mut buf = [0u8; 16];
        buf.copy_from_slice(&word[16..]);
        Ok(u128::from_be_bytes(buf))
    }

    /// uint256 that must fit in `u64`
    pub fn uint_u64(&self, at: usize) -> Result<u64, AbiError> {
        u64::try_from(self.uint(at)?).map_err(|_| AbiError::Overflow { target: "u64" })
    }

    pub fn address(&self, at: usize) -> Result<Address, AbiError> {
        let word = self.word(at)?;
        if word[..12].iter().any(|&b| b != 0) {
            return Err(AbiError::InvalidAddressPadding);
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Ok(Address::from_bytes(bytes))
    }

    pub fn bool(&self, at: usize) -> Result<bool, AbiError> {
        match self.uint(at) {
            Ok(0) => Ok(false),
            Ok(1) => Ok(true),
            Ok(_) | Err(AbiError::Overflow { .. }) => Err(AbiError::InvalidBool),
            Err(e) => Err(e),
        }
    }

    /// Follow the dynamic-array head at `at`.
    ///
    /// Returns the byte offset of the first element and the element count.
    /// The caller knows the element width; the whole body is bounds-checked
    /// against `element_words`.
    pub fn array(&self, at: usize, element_words: usize) -> Result<(usize, usize), AbiError> {
        let offset = usize::try_from(self.uint_u64(at)?)
            .map_err(|_| AbiError::Overflow { target: "usize" })?;
        let len = usize::try_from(self.uint_u64(offset)?)
            .map_err(|_| AbiError::Overflow { target: "usize" })?;
        let start = offset + WORD;
        let body = len
            .checked_mul(element_words * WORD)
            .ok_or(AbiError::Overflow { target: "usize" })?;
        let end = start
            .checked_add(body)
            .ok_or(AbiError::Overflow { target: "usize" })?;
        if end > self.data.len() {
            return Err(AbiError::Truncated {
                needed: end,
                available: self.data.len(),
            });
        }
        Ok((start, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(selector("approve(address,uint256)")), "095ea7b3");
        assert_eq!(hex::encode(selector("allowance(address,address)")), "dd62ed3e");
        assert_eq!(hex::encode(selector("withdraw(uint256)")), "2e1a7d4d");
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
    }

    #[test]
    fn test_encode_address_left_pads() {
        let addr: Address = "0x20c0000000000000000000000000000000000001".parse().unwrap();
        let word = encode_address(&addr);
        assert!(word[..12].iter().all(|&b| b == 0));
        assert_eq!(word[12], 0x20);
        assert_eq!(word[31], 0x01);
    }

    #[test]
    fn test_uint_reads_back() {
        let data = encode_uint(500_000_000);
        let reader = AbiReader::new(&data);
        assert_eq!(reader.uint(0).unwrap(), 500_000_000);
        assert_eq!(reader.uint_u64(0).unwrap(), 500_000_000);
    }

    #[test]
    fn test_uint_overflow_is_rejected() {
        let data = [0xffu8; 32];
        let reader = AbiReader::new(&data);
        assert_eq!(
            reader.uint(0),
            Err(AbiError::Overflow { target: "u128" })
        );
    }

    #[test]
    fn test_truncated_word() {
        let data = [0u8; 31];
        let reader = AbiReader::new(&data);
        assert_eq!(
            reader.word(0),
            Err(AbiError::Truncated {
                needed: 32,
                available: 31
            })
        );
    }

    #[test]
    fn test_bool_rejects_other_values() {
        let reader_data = encode_uint(2);
        assert_eq!(AbiReader::new(&reader_data).bool(0), Err(AbiError::InvalidBool));
        let one = encode_uint(1);
        assert!(AbiReader::new(&one).bool(0).unwrap());
    }

    #[test]
    fn test_empty_array() {
        let mut data = Vec::new();
        data.extend_from_slice(&encode_uint(32));
        data.extend_from_slice(&encode_uint(0));
        let reader = AbiReader::new(&data);
        assert_eq!(reader.array(0, 4).unwrap(), (64, 0));
    }

    #[test]
    fn test_array_length_beyond_data() {
        let mut data = Vec::new();
        data.extend_from_slice(&encode_uint(32));
        data.extend_from_slice(&encode_uint(2));
        data.extend_from_slice(&[0u8; 128]);
        let reader = AbiReader::new(&data);
        assert!(matches!(
            reader.array(0, 4),
            Err(AbiError::Truncated { .. })
        ));
    }

    #[test]
    fn test_hex_data() {
        assert_eq!(to_hex_data(&[0x09, 0x5e]), "0x095e");
        assert_eq!(from_hex_data("0x").unwrap(), Vec::<u8>::new());
        assert_eq!(from_hex_data("0x0a0b").unwrap(), vec![0x0a, 0x0b]);
        assert_eq!(from_hex_data("0xzz"), Err(AbiError::InvalidHex));
    }
}
