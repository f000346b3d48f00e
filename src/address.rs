// Copyright © Aptos Foundation
// Parts of the project are originally copyright © Meta Platforms, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// A 20-byte account address, as used by EVM-compatible chains. The
/// scheduler only ever compares and hashes addresses (in the address-based
/// DAG predictor); it never interprets their bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

#[cfg(any(test, feature = "fuzzing"))]
impl Address {
    /// Test-only helper: builds an address whose low bytes are `n`, so test
    /// fixtures can write `Address::from_u64(3)` instead of spelling out 20
    /// bytes by hand.
    pub fn from_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..20].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }
}
