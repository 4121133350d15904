//! Mac OS Roman text encoding
//!
//! Resource names and every string drawn into a picture use it. The lower half is plain ASCII.

/// Characters for bytes `0x80..=0xFF`.
const UPPER_HALF: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á', 'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è', //
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó', 'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü', //
    '†', '°', '¢', '£', '§', '•', '¶', 'ß', '®', '©', '™', '´', '¨', '≠', 'Æ', 'Ø', //
    '∞', '±', '≤', '≥', '¥', 'µ', '∂', '∑', '∏', 'π', '∫', 'ª', 'º', 'Ω', 'æ', 'ø', //
    '¿', '¡', '¬', '√', 'ƒ', '≈', '∆', '«', '»', '…', '\u{A0}', 'À', 'Ã', 'Õ', 'Œ', 'œ', //
    '–', '—', '“', '”', '‘', '’', '÷', '◊', 'ÿ', 'Ÿ', '⁄', '€', '‹', '›', 'ﬁ', 'ﬂ', //
    '‡', '·', '‚', '„', '‰', 'Â', 'Ê', 'Á', 'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô', //
    '\u{F8FF}', 'Ò', 'Ú', 'Û', 'Ù', 'ı', 'ˆ', '˜', '¯', '˘', '˙', '˚', '¸', '˝', '˛', 'ˇ', //
];

/// Decodes Mac Roman bytes into a string. Every byte maps to exactly one character.
///
/// ## Example
/// ```
/// use avara_utils::mac_roman;
/// assert_eq!(mac_roman::decode(b"Caf\x8E"), "Café");
/// ```
pub fn decode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&byte| match byte {
            0x00..=0x7F => byte as char,
            _ => UPPER_HALF[(byte - 0x80) as usize],
        })
        .collect()
}

/// Encodes a string as Mac Roman. Characters without a Mac Roman equivalent become `?`.
pub fn encode(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| {
            if c.is_ascii() {
                c as u8
            } else {
                UPPER_HALF
                    .iter()
                    .position(|&upper| upper == c)
                    .map(|index| 0x80 + index as u8)
                    .unwrap_or(b'?')
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #[test]
    fn upper_half_survives_encoding() {
        let bytes = (0x80..=0xFFu8).collect::<Vec<_>>();
        assert_eq!(super::encode(&super::decode(&bytes)), bytes);
    }

    #[test]
    fn unknown_characters_become_question_marks() {
        assert_eq!(super::encode("a→b"), b"a?b");
    }
}
