//! NMEA sentence checksum.
//!
//! The checksum is the XOR of every byte between the leading `$` (or `!`)
//! and the `*` delimiter, both excluded.

use crate::error::{FuseError, Result};

/// XOR checksum over a sentence body.
///
/// Accepts either the bare body or a full sentence: a leading `$`/`!` is
/// skipped and the sum stops at the first `*`.
pub fn checksum(sentence: &[u8]) -> u8 {
    let body = match sentence.first() {
        Some(b'$') | Some(b'!') => &sentence[1..],
        _ => sentence,
    };
    body.iter()
        .take_while(|&&b| b != b'*')
        .fold(0u8, |acc, &b| acc ^ b)
}

/// Verify the two hex digits following `*` against the computed checksum.
pub fn verify_checksum(sentence: &str) -> Result<()> {
    let sentence = sentence.trim_end();
    let star = sentence
        .rfind('*')
        .ok_or_else(|| FuseError::Unpack("missing checksum delimiter".into()))?;
    let digits = sentence
        .get(star + 1..star + 3)
        .ok_or_else(|| FuseError::Unpack("truncated checksum".into()))?;
    let expected = u8::from_str_radix(digits, 16)
        .map_err(|_| FuseError::Unpack(format!("invalid checksum digits: {}", digits)))?;
    let actual = checksum(&sentence.as_bytes()[..star]);
    if expected == actual {
        Ok(())
    } else {
        Err(FuseError::Checksum { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_sentence() {
        // Reference GPGGA sentence with published checksum 47
        let s = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*";
        assert_eq!(checksum(s), 0x47);
    }

    #[test]
    fn test_checksum_body_only() {
        assert_eq!(checksum(b"AB"), b'A' ^ b'B');
        assert_eq!(checksum(b""), 0);
        assert_eq!(checksum(b"$*"), 0);
    }

    #[test]
    fn test_verify_checksum() {
        assert!(
            verify_checksum("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n")
                .is_ok()
        );
        assert!(
            verify_checksum("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47")
                .is_ok()
        );
    }

    #[test]
    fn test_verify_checksum_mismatch() {
        let err = verify_checksum("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*48")
            .unwrap_err();
        assert!(matches!(
            err,
            FuseError::Checksum {
                expected: 0x48,
                actual: 0x47
            }
        ));
    }

    #[test]
    fn test_verify_checksum_malformed() {
        assert!(verify_checksum("$GPGGA,no,star").is_err());
        assert!(verify_checksum("$GPGGA,*4").is_err());
        assert!(verify_checksum("$GPGGA,*ZZ").is_err());
    }
}
