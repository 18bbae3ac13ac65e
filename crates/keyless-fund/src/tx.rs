//! Pre-EIP-155 legacy transactions for keyless (Nick's Method) deployment.
//!
//! A keyless transaction is a contract creation whose signature is chosen rather than produced
//! by a private key:
//!
//! 1. Build the deployment transaction (to = empty, nonce = 0)
//! 2. Pick a signature `(v, r, s)` with v = 27 (pre-EIP-155, no chain id)
//! 3. Recover the signer from the signature (nobody knows this private key)
//! 4. Fund the signer with `value + gas_limit * gas_price`
//! 5. Anyone can broadcast the signed transaction
//!
//! The payee contract lands at `keccak256(rlp([signer, 0]))[12:]`.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header, EMPTY_STRING_CODE};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{KEYLESS_NONCE, KEYLESS_V},
    KeylessTxError,
};

/// A pre-EIP-155 legacy contract-creation transaction with an explicit signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeylessTx {
    /// Transaction nonce (always 0 for keyless senders)
    pub nonce: u64,
    /// Gas price in wei
    pub gas_price: u128,
    /// Gas limit for the transaction
    pub gas_limit: u64,
    /// Value forwarded to the created contract
    pub value: U256,
    /// Contract initialization code
    pub init_code: Bytes,
    /// Signature v component (27 or 28 for pre-EIP-155)
    pub v: u8,
    /// Signature r component
    pub r: U256,
    /// Signature s component
    pub s: U256,
}

impl KeylessTx {
    /// Creates a keyless template with nonce 0, v = 27 and both signature components set to
    /// `seed`.
    pub fn template(
        gas_price: u128,
        gas_limit: u64,
        value: U256,
        init_code: Bytes,
        seed: U256,
    ) -> Self {
        Self {
            nonce: KEYLESS_NONCE,
            gas_price,
            gas_limit,
            value,
            init_code,
            v: KEYLESS_V,
            r: seed,
            s: seed,
        }
    }

    fn unsigned_payload_length(&self) -> usize {
        // The empty 'to' field is encoded as a single 0x80 byte
        self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + 1
            + self.value.length()
            + self.init_code.length()
    }

    fn encode_unsigned_fields(&self, out: &mut dyn BufMut) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        out.put_u8(EMPTY_STRING_CODE);
        self.value.encode(out);
        self.init_code.encode(out);
    }

    /// The hash a pre-EIP-155 signature commits to:
    /// `keccak256(rlp([nonce, gasPrice, gasLimit, "", value, data]))`.
    ///
    /// It does not depend on `v`, `r` or `s`.
    pub fn signature_hash(&self) -> B256 {
        let payload_length = self.unsigned_payload_length();
        let mut buf = Vec::with_capacity(payload_length + 9);
        Header { list: true, payload_length }.encode(&mut buf);
        self.encode_unsigned_fields(&mut buf);
        keccak256(&buf)
    }

    fn signed_payload_length(&self) -> usize {
        self.unsigned_payload_length()
            + u64::from(self.v).length()
            + self.r.length()
            + self.s.length()
    }

    /// Encodes the signed transaction as
    /// `rlp([nonce, gasPrice, gasLimit, "", value, data, v, r, s])`.
    pub fn encode(&self, out: &mut dyn BufMut) {
        Header { list: true, payload_length: self.signed_payload_length() }.encode(out);
        self.encode_unsigned_fields(out);
        u64::from(self.v).encode(out);
        self.r.encode(out);
        self.s.encode(out);
    }

    /// The raw signed transaction, ready to broadcast.
    pub fn encoded(&self) -> Bytes {
        let payload_length = self.signed_payload_length();
        let mut buf = Vec::with_capacity(payload_length + 9);
        self.encode(&mut buf);
        buf.into()
    }

    /// The transaction hash, `keccak256` of the raw signed transaction.
    pub fn tx_hash(&self) -> B256 {
        keccak256(self.encoded())
    }
}

/// Decodes a pre-EIP-155 keyless transaction from RLP bytes.
///
/// The expected RLP structure is: `[nonce, gasPrice, gasLimit, to, value, data, v, r, s]`
///
/// # Validation
/// - The RLP encoding must be valid and span the whole input
/// - The `to` field must be empty (contract creation)
/// - The `v` value must be 27 or 28 (pre-EIP-155)
pub fn decode_keyless_tx(rlp_bytes: &[u8]) -> Result<KeylessTx, KeylessTxError> {
    let mut buf = rlp_bytes;

    let header = Header::decode(&mut buf).map_err(|_| KeylessTxError::MalformedEncoding)?;
    if !header.list || buf.len() < header.payload_length {
        return Err(KeylessTxError::MalformedEncoding);
    }
    let (mut payload, rest) = buf.split_at(header.payload_length);
    if !rest.is_empty() {
        return Err(KeylessTxError::TrailingBytes);
    }

    let nonce = u64::decode(&mut payload).map_err(|_| KeylessTxError::MalformedEncoding)?;
    let gas_price = u128::decode(&mut payload).map_err(|_| KeylessTxError::MalformedEncoding)?;
    let gas_limit = u64::decode(&mut payload).map_err(|_| KeylessTxError::MalformedEncoding)?;

    // For contract creation, 'to' must be an empty string (not a list, payload_length = 0)
    let to_header = Header::decode(&mut payload).map_err(|_| KeylessTxError::MalformedEncoding)?;
    if to_header.list || to_header.payload_length != 0 {
        return Err(KeylessTxError::NotContractCreation);
    }

    let value = U256::decode(&mut payload).map_err(|_| KeylessTxError::MalformedEncoding)?;
    let init_code = Bytes::decode(&mut payload).map_err(|_| KeylessTxError::MalformedEncoding)?;
    let v_raw = u64::decode(&mut payload).map_err(|_| KeylessTxError::MalformedEncoding)?;
    let r = U256::decode(&mut payload).map_err(|_| KeylessTxError::MalformedEncoding)?;
    let s = U256::decode(&mut payload).map_err(|_| KeylessTxError::MalformedEncoding)?;
    if !payload.is_empty() {
        return Err(KeylessTxError::MalformedEncoding);
    }

    if v_raw != 27 && v_raw != 28 {
        return Err(KeylessTxError::NotPreEIP155);
    }

    Ok(KeylessTx { nonce, gas_price, gas_limit, value, init_code, v: v_raw as u8, r, s })
}

/// Recovers the signer address from a keyless transaction.
///
/// # Algorithm
/// 1. Compute the signing hash = keccak256(RLP([nonce, gasPrice, gasLimit, to, value, data]))
/// 2. Recover the public key from (hash, v, r, s)
/// 3. Compute address = keccak256(pubkey)[12:]
pub fn recover_signer(tx: &KeylessTx) -> Result<Address, KeylessTxError> {
    recover_signer_from_prehash(&tx.signature_hash(), tx.v, tx.r, tx.s)
}

/// Recovers the signer of `(v, r, s)` over an already computed signing hash.
///
/// Fails for a zero or out-of-range scalar, a high `s`, or an `r` that is not the x-coordinate of
/// a curve point.
pub fn recover_signer_from_prehash(
    msg_hash: &B256,
    v: u8,
    r: U256,
    s: U256,
) -> Result<Address, KeylessTxError> {
    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&r.to_be_bytes::<32>());
    sig_bytes[32..].copy_from_slice(&s.to_be_bytes::<32>());

    // Recovery ID: v - 27 (v is 27 or 28, so recovery_id is 0 or 1)
    let recovery_id = v
        .checked_sub(27)
        .and_then(|id| RecoveryId::try_from(id).ok())
        .ok_or(KeylessTxError::InvalidSignature)?;

    let signature =
        Signature::from_slice(&sig_bytes).map_err(|_| KeylessTxError::InvalidSignature)?;

    let recovered_key = VerifyingKey::recover_from_prehash(&msg_hash[..], &signature, recovery_id)
        .map_err(|_| KeylessTxError::InvalidSignature)?;

    // The uncompressed point is 0x04 || x || y; the address is the tail of keccak256(x || y)
    let pubkey_point = recovered_key.to_encoded_point(false);
    let pubkey_hash = keccak256(&pubkey_point.as_bytes()[1..]);

    Ok(Address::from_slice(&pubkey_hash[12..]))
}

/// Calculates the address of the payee contract created by a keyless signer.
///
/// The nonce is always 0, so this is `keccak256(rlp([signer, 0]))[12:]`.
#[inline]
pub fn calculate_payee_address(signer: Address) -> Address {
    signer.create(KEYLESS_NONCE)
}
