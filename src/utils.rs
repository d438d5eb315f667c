//! Identifier minting helpers.

use bech32::Bech32m;

const TOKEN_HRP: bech32::Hrp = bech32::Hrp::parse_unchecked("token");

/// Mints a fresh, unguessable token value: 16 CSPRNG bytes in a compact,
/// copy-safe bech32m text form.
pub fn mint_token_value() -> String {
    let entropy: [u8; 16] = rand::random();
    bech32::encode::<Bech32m>(TOKEN_HRP, &entropy)
        .expect("a 16 byte payload is within the bech32m length limit")
}
