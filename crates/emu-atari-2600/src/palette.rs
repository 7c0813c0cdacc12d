//! NTSC colour palette.
//!
//! 128 colours as ARGB32, indexed by `luminance << 4 | hue` as produced by
//! `atari_tia::color_index`. Each row of 16 is one luminance step across
//! all hues.

/// NTSC palette: 128 colours in ARGB32 format.
pub const PALETTE: [u32; 128] = [
    // Luminance 0
    0xFF00_0000, 0xFF44_4400, 0xFF70_2800, 0xFF84_1800,
    0xFF88_0000, 0xFF78_005C, 0xFF48_0078, 0xFF14_0084,
    0xFF00_0088, 0xFF00_187C, 0xFF00_2C5C, 0xFF00_402C,
    0xFF00_3C00, 0xFF14_3800, 0xFF2C_3000, 0xFF44_2800,
    // Luminance 1
    0xFF40_4040, 0xFF64_6410, 0xFF84_4414, 0xFF98_3418,
    0xFF9C_2020, 0xFF8C_2074, 0xFF60_2090, 0xFF30_2098,
    0xFF1C_209C, 0xFF1C_3890, 0xFF1C_4C78, 0xFF1C_5C48,
    0xFF20_5C20, 0xFF34_5C1C, 0xFF4C_501C, 0xFF64_4818,
    // Luminance 2
    0xFF6C_6C6C, 0xFF84_8424, 0xFF98_5C28, 0xFFAC_5030,
    0xFFB0_3C3C, 0xFFA0_3C88, 0xFF78_3CA4, 0xFF4C_3CAC,
    0xFF38_40B0, 0xFF38_54A8, 0xFF38_6890, 0xFF38_7C64,
    0xFF40_7C40, 0xFF50_7C38, 0xFF68_7034, 0xFF84_6830,
    // Luminance 3
    0xFF90_9090, 0xFFA0_A034, 0xFFAC_783C, 0xFFC0_6848,
    0xFFC0_5858, 0xFFB0_589C, 0xFF8C_58B8, 0xFF68_58C0,
    0xFF50_5CC0, 0xFF50_70BC, 0xFF50_84AC, 0xFF50_9C80,
    0xFF5C_9C5C, 0xFF6C_9850, 0xFF84_8C4C, 0xFFA0_8444,
    // Luminance 4
    0xFFB0_B0B0, 0xFFB8_B840, 0xFFBC_8C4C, 0xFFD0_805C,
    0xFFD0_7070, 0xFFC0_70B0, 0xFFA0_70CC, 0xFF7C_70D0,
    0xFF68_74D0, 0xFF68_88CC, 0xFF68_9CC0, 0xFF68_B494,
    0xFF74_B474, 0xFF84_B468, 0xFF9C_A864, 0xFFB8_9C58,
    // Luminance 5
    0xFFC8_C8C8, 0xFFD0_D050, 0xFFCC_A05C, 0xFFE0_9470,
    0xFFE0_8888, 0xFFD0_84C0, 0xFFB4_84DC, 0xFF94_88E0,
    0xFF7C_8CE0, 0xFF7C_9CDC, 0xFF7C_B4D4, 0xFF7C_D0AC,
    0xFF8C_D08C, 0xFF9C_CC7C, 0xFFB4_C078, 0xFFD0_B46C,
    // Luminance 6
    0xFFDC_DCDC, 0xFFE8_E85C, 0xFFDC_B468, 0xFFEC_A880,
    0xFFEC_A0A0, 0xFFDC_9CD0, 0xFFC4_9CEC, 0xFFA8_A0EC,
    0xFF90_A4EC, 0xFF90_B4EC, 0xFF90_CCE8, 0xFF90_E4C0,
    0xFFA4_E4A4, 0xFFB4_E490, 0xFFCC_D488, 0xFFE8_CC7C,
    // Luminance 7
    0xFFEC_ECEC, 0xFFFC_FC68, 0xFFFC_BC94, 0xFFFC_B4B4,
    0xFFEC_B0E0, 0xFFD4_B0FC, 0xFFBC_B4FC, 0xFFA4_B8FC,
    0xFFA4_C8FC, 0xFFA4_E0FC, 0xFFA4_FCD4, 0xFFB8_FCB8,
    0xFFC8_FCA4, 0xFFE0_EC9C, 0xFFFC_E08C, 0xFFFF_FFFF,
];

/// ARGB32 colour for a palette index. Only the low 7 bits are used.
#[must_use]
pub fn argb(index: u8) -> u32 {
    PALETTE[usize::from(index & 0x7F)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_and_white_ends() {
        assert_eq!(argb(0), 0xFF00_0000);
        assert_eq!(argb(0x7F), 0xFFFF_FFFF);
        assert_eq!(argb(0x80), argb(0));
    }

    #[test]
    fn all_entries_opaque() {
        assert!(PALETTE.iter().all(|&c| c >> 24 == 0xFF));
    }
}
