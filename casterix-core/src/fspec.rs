//! Field Specification (FSPEC) bitmap.
//!
//! Every record opens with an FX-terminated bitmap announcing which UAP
//! items follow. Bit 7 of the first octet gates FRN 1, bit 1 gates FRN 7,
//! bit 0 is the FX continuation; each further octet carries seven more FRNs.

use crate::error::Error;

/// Octet cap on the FSPEC prelude (56 FRNs). No published category comes
/// close; longer chains are hostile or corrupt input.
pub const MAX_FSPEC_OCTETS: usize = 8;

/// An FSPEC bitmap, as read off the wire or built for a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fspec {
    bytes: Vec<u8>,
}

impl Fspec {
    /// Creates a single zero octet. ASTERIX requires at least one FSPEC
    /// octet even for an empty record.
    pub fn new() -> Self {
        Fspec { bytes: vec![0x00] }
    }

    /// Reads an FX-terminated FSPEC from the start of `window`.
    ///
    /// `at` is the absolute offset of the window start, used for error
    /// context. Chains past [`MAX_FSPEC_OCTETS`] are rejected.
    pub fn read(window: &[u8], at: usize) -> Result<Self, Error> {
        let mut bytes = Vec::with_capacity(1);
        loop {
            if bytes.len() >= MAX_FSPEC_OCTETS {
                return Err(Error::ExtensionLimit {
                    category: None,
                    item: None,
                    max: MAX_FSPEC_OCTETS,
                });
            }
            let Some(&octet) = window.get(bytes.len()) else {
                return Err(Error::Truncated {
                    offset: at + bytes.len(),
                    category: None,
                    item: None,
                });
            };
            bytes.push(octet);
            if octet & 0x01 == 0 {
                break;
            }
        }
        Ok(Self { bytes })
    }

    /// Length of the bitmap in octets.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The raw octets, FX bits included.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.bytes)
    }

    /// FRNs whose presence bit is set, in ascending order.
    ///
    /// FRN 1 is bit 7 of octet 0; each octet carries seven FRNs with its
    /// LSB reserved for FX.
    pub fn frns(&self) -> Vec<usize> {
        let mut frns = Vec::new();
        for (octet_index, octet) in self.bytes.iter().enumerate() {
            for bit in (1..=7u8).rev() {
                if octet & (1 << bit) != 0 {
                    frns.push(7 * octet_index + (8 - bit) as usize);
                }
            }
        }
        frns
    }

    /// Whether the presence bit of `frn` (1-based) is set.
    pub fn is_frn_set(&self, frn: usize) -> bool {
        let octet = (frn - 1) / 7;
        let shift = 7 - ((frn - 1) % 7) as u8;
        self.bytes
            .get(octet)
            .map(|b| b & (1 << shift) != 0)
            .unwrap_or(false)
    }

    /// Sets the presence bit of `frn`, growing the bitmap and raising the
    /// FX bit of every preceding octet.
    pub fn set_frn(&mut self, frn: usize) {
        let octet = (frn - 1) / 7;
        let shift = 7 - ((frn - 1) % 7) as u8;
        while self.bytes.len() <= octet {
            self.bytes.push(0);
        }
        self.bytes[octet] |= 1 << shift;
        for earlier in &mut self.bytes[..octet] {
            *earlier |= 0x01;
        }
    }
}

impl Default for Fspec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_single_octet() {
        let fspec = Fspec::read(&[0x80, 0xFF], 0).unwrap();
        assert_eq!(fspec.len(), 1);
        assert_eq!(fspec.bytes(), &[0x80]);
        assert_eq!(fspec.frns(), vec![1]);
    }

    #[test]
    fn read_follows_fx_chain() {
        let fspec = Fspec::read(&[0x81, 0x40], 0).unwrap();
        assert_eq!(fspec.len(), 2);
        assert_eq!(fspec.frns(), vec![1, 9]);
    }

    #[test]
    fn read_truncated_chain_fails() {
        let err = Fspec::read(&[0x01], 5).unwrap_err();
        assert!(matches!(err, Error::Truncated { offset: 6, .. }));
        assert!(matches!(
            Fspec::read(&[], 0),
            Err(Error::Truncated { offset: 0, .. })
        ));
    }

    #[test]
    fn read_caps_the_chain_length() {
        // Eight octets all continuing would require a ninth.
        let window = [0x01u8; 9];
        assert!(matches!(
            Fspec::read(&window, 0),
            Err(Error::ExtensionLimit { max: 8, .. })
        ));

        let mut window = [0x01u8; 8];
        window[7] = 0x80;
        let fspec = Fspec::read(&window, 0).unwrap();
        assert_eq!(fspec.len(), 8);
        assert_eq!(fspec.frns(), vec![50]);
    }

    #[test]
    fn frn_numbering_spans_octets() {
        // FRN 7 is bit 1 of octet 0; FRN 8 is bit 7 of octet 1.
        let fspec = Fspec::read(&[0x03, 0x80], 0).unwrap();
        assert_eq!(fspec.frns(), vec![7, 8]);
        assert!(fspec.is_frn_set(7));
        assert!(fspec.is_frn_set(8));
        assert!(!fspec.is_frn_set(1));
        assert!(!fspec.is_frn_set(50));
    }

    #[test]
    fn set_frn_raises_fx_on_preceding_octets() {
        let mut fspec = Fspec::new();
        fspec.set_frn(1);
        fspec.set_frn(3);
        fspec.set_frn(8);
        assert_eq!(fspec.bytes(), &[0xA1, 0x80]);
    }

    #[test]
    fn set_then_read_round_trips() {
        let mut fspec = Fspec::new();
        for frn in [1, 7, 9, 20] {
            fspec.set_frn(frn);
        }

        let restored = Fspec::read(fspec.bytes(), 0).unwrap();
        assert_eq!(restored, fspec);
        assert_eq!(restored.frns(), vec![1, 7, 9, 20]);
    }

    #[test]
    fn hex_rendering() {
        let fspec = Fspec::read(&[0x81, 0x40], 0).unwrap();
        assert_eq!(fspec.to_hex(), "8140");
    }
}
