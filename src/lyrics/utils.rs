//! 包含一些节拍歌词处理用的工具函数。

use regex::Regex;
use std::sync::LazyLock;

/// 匹配字符串开头的十进制数字（可带符号、小数部分和指数）
static LEADING_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("编译 LEADING_NUMBER_REGEX 失败")
});

/// 将逗号小数点规范化为点号。
///
/// 社区制作的脚本可能使用 `128,5` 或 `128.5` 两种写法。
pub fn normalize_decimal(value: &str) -> String {
    value.trim().replace(',', ".")
}

/// 宽松地解析一个头部数值。
///
/// 先规范化小数点，再取字符串开头最长的数字前缀，
/// 因此 `"120 ; comment"` 会被解析为 `120.0`。
///
/// # 返回
/// * `Some(value)` - 开头存在有限的数字。
/// * `None` - 开头没有数字，或结果不是有限值。
pub fn parse_lenient_f64(value: &str) -> Option<f64> {
    let normalized = normalize_decimal(value);
    let prefix = LEADING_NUMBER_REGEX.find(&normalized)?;
    prefix
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// 去除文本中的 `*` 与 `~` 标记残留。
pub fn strip_marker_chars(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '*' | '~')).collect()
}

/// 将换算得到的毫秒值取整为非负整数。
pub fn round_ms(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
