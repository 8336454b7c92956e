//! Registry and allowance reads via the contract gateway

use chain_client::ContractGateway;
use locker_core::{Address, Amount, GatewayError};
use locker_tx::{AbiError, AbiReader, ContractCall, WORD};

use crate::state::Lock;

/// Words per `(address, uint256, uint256, bool)` tuple
const LOCK_TUPLE_WORDS: usize = 4;

/// Read every lock of `account` with a single `getMyLocks` call.
pub async fn fetch_locks<G: ContractGateway + ?Sized>(
    gateway: &G,
    escrow: Address,
    account: &Address,
) -> Result<Vec<Lock>, GatewayError> {
    let call = ContractCall::get_my_locks(escrow);
    let data = gateway.read(Some(account), &call).await?;
    let locks = decode_locks(&data).map_err(|e| GatewayError::Decode(format!("getMyLocks: {}", e)))?;

    tracing::debug!(account = %account, count = locks.len(), "Fetched locks");
    Ok(locks)
}

/// Read `allowance(owner, escrow)` on a token contract
pub async fn fetch_allowance<G: ContractGateway + ?Sized>(
    gateway: &G,
    token: Address,
    owner: &Address,
    escrow: Address,
) -> Result<Amount, GatewayError> {
    let call = ContractCall::allowance(token, *owner, escrow);
    let data = gateway.read(Some(owner), &call).await?;
    AbiReader::new(&data)
        .uint(0)
        .map_err(|e| GatewayError::Decode(format!("allowance: {}", e)))
}

/// Decode `getMyLocks()` return data: `(address,uint256,uint256,bool)[]`
pub fn decode_locks(data: &[u8]) -> Result<Vec<Lock>, AbiError> {
    let reader = AbiReader::new(data);
    let (start, len) = reader.array(0, LOCK_TUPLE_WORDS)?;

    (0..len)
        .map(|i| {
            let base = start + i * LOCK_TUPLE_WORDS * WORD;
            Ok(Lock {
                token: reader.address(base)?,
                amount: reader.uint(base + WORD)?,
                unlock_time: reader.uint_u64(base + 2 * WORD)?,
                withdrawn: reader.bool(base + 3 * WORD)?,
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn encode_locks(locks: &[Lock]) -> Vec<u8> {
    use locker_tx::{encode_address, encode_uint};

    let mut data = Vec::new();
    data.extend_from_slice(&encode_uint(WORD as u128));
    data.extend_from_slice(&encode_uint(locks.len() as u128));
    for lock in locks {
        data.extend_from_slice(&encode_address(&lock.token));
        data.extend_from_slice(&encode_uint(lock.amount));
        data.extend_from_slice(&encode_uint(u128::from(lock.unlock_time)));
        data.extend_from_slice(&encode_uint(u128::from(lock.withdrawn)));
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_positional_locks() {
        let alpha: Address = "0x20c0000000000000000000000000000000000001".parse().unwrap();
        let beta: Address = "0x20c0000000000000000000000000000000000002".parse().unwrap();
        let locks = vec![
            Lock {
                token: alpha,
                amount: 500_000_000,
                unlock_time: 1_760_000_000,
                withdrawn: false,
            },
            Lock {
                token: beta,
                amount: 1,
                unlock_time: 1_700_000_000,
                withdrawn: true,
            },
        ];

        let decoded = decode_locks(&encode_locks(&locks)).unwrap();
        assert_eq!(decoded, locks);
    }

    #[test]
    fn test_decode_empty_list() {
        assert!(decode_locks(&encode_locks(&[])).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_empty_return_data() {
        // An address without code answers eth_call with "0x"
        assert!(matches!(
            decode_locks(&[]),
            Err(AbiError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_raw_hex_fixture() {
        let hex = concat!(
            "0000000000000000000000000000000000000000000000000000000000000020",
            "0000000000000000000000000000000000000000000000000000000000000001",
            "00000000000000000000000020c0000000000000000000000000000000000003",
            "000000000000000000000000000000000000000000000000000000001dcd6500",
            "0000000000000000000000000000000000000000000000000000000068d5a680",
            "0000000000000000000000000000000000000000000000000000000000000000",
        );
        let locks = decode_locks(&hex::decode(hex).unwrap()).unwrap();
        assert_eq!(locks.len(), 1);
        assert_eq!(
            locks[0].token.to_string(),
            "0x20c0000000000000000000000000000000000003"
        );
        assert_eq!(locks[0].amount, 500_000_000);
        assert_eq!(locks[0].unlock_time, 0x68d5a680);
        assert!(!locks[0].withdrawn);
    }
}
