//! ROCA fingerprint test (CVE-2017-15361).
//!
//! Moduli produced by the affected key generator are built from powers of
//! 65537 modulo a primorial, so for every small prime `p` of that primorial
//! the residue `n mod p` lies in the subgroup of `(Z/pZ)*` generated by 65537.
//! For a random modulus that happens with negligible probability.

use std::sync::OnceLock;

const GENERATOR: u64 = 65537;

const PRIMES: [u64; 38] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167,
];

/// Bitmask of residues reachable as powers of 65537 modulo `p` (p < 256).
type Marker = [u64; 4];

fn subgroup_marker(p: u64) -> Marker {
    let mut marker: Marker = [0; 4];
    let g = GENERATOR % p;
    let mut x = 1u64;
    loop {
        marker[(x / 64) as usize] |= 1 << (x % 64);
        x = x * g % p;
        if x == 1 {
            break;
        }
    }
    marker
}

fn markers() -> &'static [(u64, Marker)] {
    static MARKERS: OnceLock<Vec<(u64, Marker)>> = OnceLock::new();
    MARKERS.get_or_init(|| PRIMES.iter().map(|&p| (p, subgroup_marker(p))).collect())
}

/// Remainder of a big-endian unsigned integer modulo a small value.
fn residue(modulus: &[u8], p: u64) -> u64 {
    modulus
        .iter()
        .fold(0u64, |acc, &byte| ((acc << 8) | byte as u64) % p)
}

/// Whether an RSA modulus (big-endian bytes) carries the ROCA fingerprint.
pub fn is_vulnerable(modulus: &[u8]) -> bool {
    if modulus.iter().all(|&b| b == 0) {
        return false;
    }
    markers().iter().all(|(p, marker)| {
        let r = residue(modulus, *p);
        marker[(r / 64) as usize] & (1 << (r % 64)) != 0
    })
}
