pub mod ip;

/// 追踪短码字母表：32 个符号，排除易混淆字符（0/O/1/I/L）
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成指定长度的追踪短码
///
/// 只从 `CODE_ALPHABET` 中取字符；唯一性由调用方对存储做碰撞检查保证。
pub fn generate_tracker_code(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| CODE_ALPHABET[rand::random_range(0..CODE_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// 校验短码格式是否合法（只含字母表字符，长度 1..=16）
pub fn is_valid_tracker_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 16
        && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

/// 短码统一大写归一化
pub fn normalize_tracker_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
