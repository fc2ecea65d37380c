//! Virtual key codes understood by remote sessions.
//!
//! Values follow the Windows virtual-key numbering the remote desktop
//! protocol uses on the wire.

use std::fmt;

/// A virtual key code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualKey(pub u32);

impl VirtualKey {
    /// No key; transitions carrying it are never transmitted.
    pub const NONE: Self = Self(0x00);

    pub const BACK: Self = Self(0x08);
    pub const TAB: Self = Self(0x09);
    pub const RETURN: Self = Self(0x0D);
    pub const SHIFT: Self = Self(0x10);
    pub const CONTROL: Self = Self(0x11);
    pub const MENU: Self = Self(0x12);
    pub const PAUSE: Self = Self(0x13);
    pub const CAPITAL: Self = Self(0x14);
    pub const ESCAPE: Self = Self(0x1B);
    pub const SPACE: Self = Self(0x20);
    pub const PRIOR: Self = Self(0x21);
    pub const NEXT: Self = Self(0x22);
    pub const END: Self = Self(0x23);
    pub const HOME: Self = Self(0x24);
    pub const LEFT: Self = Self(0x25);
    pub const UP: Self = Self(0x26);
    pub const RIGHT: Self = Self(0x27);
    pub const DOWN: Self = Self(0x28);
    pub const INSERT: Self = Self(0x2D);
    pub const DELETE: Self = Self(0x2E);
    pub const LWIN: Self = Self(0x5B);
    pub const RWIN: Self = Self(0x5C);
    pub const F1: Self = Self(0x70);
    pub const NUMLOCK: Self = Self(0x90);
    pub const LSHIFT: Self = Self(0xA0);
    pub const RSHIFT: Self = Self(0xA1);
    pub const LCONTROL: Self = Self(0xA2);
    pub const RCONTROL: Self = Self(0xA3);
    pub const LMENU: Self = Self(0xA4);
    pub const RMENU: Self = Self(0xA5);
    pub const OEM_1: Self = Self(0xBA);
    pub const OEM_PLUS: Self = Self(0xBB);
    pub const OEM_COMMA: Self = Self(0xBC);
    pub const OEM_MINUS: Self = Self(0xBD);
    pub const OEM_PERIOD: Self = Self(0xBE);
    pub const OEM_2: Self = Self(0xBF);
    pub const OEM_3: Self = Self(0xC0);
    pub const OEM_4: Self = Self(0xDB);
    pub const OEM_5: Self = Self(0xDC);
    pub const OEM_6: Self = Self(0xDD);
    pub const OEM_7: Self = Self(0xDE);
    /// Eisu (alphanumeric) toggle on Japanese keyboards.
    pub const DBE_ALPHANUMERIC: Self = Self(0xF0);

    pub const A: Self = Self::letter(b'A');
    pub const D: Self = Self::letter(b'D');
    pub const F: Self = Self::letter(b'F');

    /// Key for an ASCII letter; lowercase is folded to uppercase.
    pub const fn letter(ch: u8) -> Self {
        Self(ch.to_ascii_uppercase() as u32)
    }

    /// Key for a digit on the main row, `0..=9`.
    pub const fn digit(n: u8) -> Self {
        Self(0x30 + (n % 10) as u32)
    }

    /// Function key `F1..=F24`.
    pub const fn function(n: u8) -> Self {
        let n = if n == 0 { 1 } else { n };
        Self(Self::F1.0 + (n as u32 - 1))
    }

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Shift, control and alt in any of their generic/left/right forms.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::SHIFT
                | Self::LSHIFT
                | Self::RSHIFT
                | Self::CONTROL
                | Self::LCONTROL
                | Self::RCONTROL
                | Self::MENU
                | Self::LMENU
                | Self::RMENU
        )
    }
}

impl fmt::Debug for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VK(0x{:02X})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_and_digit_codes() {
        assert_eq!(VirtualKey::letter(b'a'), VirtualKey(0x41));
        assert_eq!(VirtualKey::D, VirtualKey(0x44));
        assert_eq!(VirtualKey::digit(7), VirtualKey(0x37));
        assert_eq!(VirtualKey::function(12), VirtualKey(0x7B));
    }

    #[test]
    fn test_modifier_classification() {
        assert!(VirtualKey::LMENU.is_modifier());
        assert!(VirtualKey::CONTROL.is_modifier());
        assert!(!VirtualKey::CAPITAL.is_modifier());
        assert!(VirtualKey::NONE.is_none());
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", VirtualKey::LMENU), "VK(0xA4)");
    }
}
