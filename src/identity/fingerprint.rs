const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Rolling 31-multiplier hash over UTF-16 code units, wrapping at 32 bits.
///
/// `h = (h << 5) - h + unit`, two's-complement overflow. Consumers on other platforms
/// hash the same path strings, so this must stay bit-for-bit identical.
pub fn hash_code(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Lower-case base-36 rendering, `-` prefixed for negative values.
pub fn to_base36(value: i32) -> String {
    let mut magnitude = value.unsigned_abs();
    if magnitude == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(8);
    while magnitude > 0 {
        digits.push(BASE36_DIGITS[(magnitude % 36) as usize]);
        magnitude /= 36;
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Base identifier for a structural path, before collision suffixing.
pub fn base_id(path: &str) -> String {
    to_base36(hash_code(path))
}

/// Identifier for an element whose path could not be derived.
pub fn fallback_id(tag_name: &str, traversal_index: usize) -> String {
    format!(
        "fallback_{}",
        to_base36(hash_code(&format!("{tag_name}_{traversal_index}")))
    )
}
