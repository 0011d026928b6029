//! # 节拍歌词（UltraStar 风格）格式解析器
//!
//! 脚本由 `#KEY:VALUE` 头部行和音符行组成：
//!
//! ```text
//! #BPM:128,5
//! #GAP:1500
//! : 0 4 59 Hel
//! * 4 4 61 lo
//! - 8 2 0 ~
//! ```
//!
//! 解析是尽力而为的：无法识别的行会被跳过，解析永远不会失败。

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::lyrics::{
    types::{LyricEvent, LyricKind, ParsedScript, TempoContext},
    utils::{parse_lenient_f64, round_ms},
};

/// 音符行中至少需要的字段数：开始节拍、节拍长度、音高、文本。
const MIN_NOTE_FIELDS: usize = 4;

/// 解析节拍歌词脚本，只返回按文件顺序排列的歌词事件。
///
/// 空脚本或完全无法解析的脚本返回空列表。
pub fn parse_script(content: &str) -> Vec<LyricEvent> {
    parse_ultrastar(content).events
}

/// 解析节拍歌词脚本到 `ParsedScript` 结构，附带头部元数据与警告信息。
pub fn parse_ultrastar(content: &str) -> ParsedScript {
    let mut warnings: Vec<String> = Vec::new();

    // 第一遍：读取头部
    let (tempo, raw_metadata) = parse_header(content, &mut warnings);

    // 第二遍：读取音符行
    let mut events: Vec<LyricEvent> = Vec::new();
    for (i, line_str_raw) in content.lines().enumerate() {
        let line_num = i + 1;
        let trimmed_line = line_str_raw.trim();

        let Some(marker) = trimmed_line.chars().next() else {
            continue;
        };
        let Some(kind) = LyricKind::from_marker(marker) else {
            continue;
        };

        match parse_note_line(&trimmed_line[marker.len_utf8()..], kind, &tempo) {
            Ok(event) => events.push(event),
            Err(reason) => {
                debug!("[UltraStar] 跳过第 {line_num} 行: {reason}");
                warnings.push(format!("第 {line_num} 行: {reason}"));
            }
        }
    }

    ParsedScript {
        events,
        raw_metadata,
        warnings,
    }
}

/// 扫描所有头部行，构建 `TempoContext` 并收集原始元数据。
fn parse_header(
    content: &str,
    warnings: &mut Vec<String>,
) -> (TempoContext, HashMap<String, String>) {
    let mut tempo = TempoContext::default();
    let mut raw_metadata: HashMap<String, String> = HashMap::new();

    for line_str_raw in content.lines() {
        let trimmed_line = line_str_raw.trim();
        let Some(header) = trimmed_line.strip_prefix('#') else {
            continue;
        };
        let Some((key, rest)) = header.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_uppercase();
        if key.is_empty() {
            continue;
        }

        match key.as_str() {
            // 数值只取第一个冒号之后、下一个冒号之前的部分
            "BPM" | "GAP" | "VIDEOGAP" => {
                let value_str = rest.split(':').next().unwrap_or_default();
                match parse_lenient_f64(value_str) {
                    Some(bpm) if key == "BPM" && bpm <= 0.0 => {
                        warn!("[UltraStar] BPM 必须大于 0，忽略值 '{value_str}'。");
                        warnings.push(format!("无效的 BPM '{value_str}'，使用默认值。"));
                    }
                    Some(value) => match key.as_str() {
                        "BPM" => tempo.beats_per_minute = value,
                        "GAP" => tempo.gap_ms = value,
                        _ => tempo.video_gap_ms = value * 1000.0,
                    },
                    None => {
                        warn!("[UltraStar] 无法解析头部 #{key} 的值 '{value_str}'。");
                        warnings.push(format!("无法解析 #{key} 的值 '{value_str}'，使用默认值。"));
                    }
                }
            }
            _ => {}
        }

        raw_metadata.insert(key, rest.trim().to_string());
    }

    (tempo, raw_metadata)
}

/// 解析标记字符之后的音符行内容。
///
/// 内容按单个空格切分，文本为第四个字段之后的所有字段以单个空格重新拼接。
fn parse_note_line(
    body: &str,
    kind: LyricKind,
    tempo: &TempoContext,
) -> Result<LyricEvent, String> {
    let parts: Vec<&str> = body.trim().split(' ').collect();
    if parts.len() < MIN_NOTE_FIELDS {
        return Err(format!("字段数不足 ({} < {MIN_NOTE_FIELDS})", parts.len()));
    }

    let start_beat: i64 = parts[0]
        .parse()
        .map_err(|_| format!("无效的开始节拍 '{}'", parts[0]))?;
    let length_beat: i64 = parts[1]
        .parse()
        .map_err(|_| format!("无效的节拍长度 '{}'", parts[1]))?;

    // parts[2] 为音高，此处不使用
    let text = parts[MIN_NOTE_FIELDS - 1..].join(" ");

    let raw_start = tempo.beat_to_ms(start_beat).round();
    let raw_end = tempo
        .beat_to_ms(start_beat.saturating_add(length_beat))
        .round()
        .max(raw_start);

    // 完全落在 0 时刻之前的音符永远不会显示，钳到 0 反而会让它们在开头一起闪现
    if raw_end < 0.0 {
        return Err(format!("音符结束于 {raw_end}ms，早于播放起点"));
    }

    // 跨越 0 时刻的音符只钳制开始时间
    let start_ms = round_ms(raw_start);
    let end_ms = round_ms(raw_end).max(start_ms);

    Ok(LyricEvent {
        start_ms,
        end_ms,
        text,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::activation::{DEFAULT_BUFFER_MS, active_display_texts};

    #[test]
    fn test_golden_line_at_120_bpm() {
        let content = "#BPM:120\n#GAP:0\n* 10 5 3 Hello";
        let events = parse_script(content);

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.kind, LyricKind::Golden);
        assert_eq!(event.start_ms, 5000);
        assert_eq!(event.end_ms, 7500);
        assert_eq!(event.text, "Hello");
    }

    #[test]
    fn test_default_tempo_is_160_bpm() {
        let events = parse_script(": 0 160 0 a\n: 160 1 0 b");
        assert_eq!(events[0].start_ms, 0);
        assert_eq!(events[0].end_ms, 60000);
        assert_eq!(events[1].start_ms, 60000);
    }

    #[test]
    fn test_gap_shifts_every_event() {
        let events = parse_script("#GAP:500\n: 0 4 0 first");
        assert_eq!(events[0].start_ms, 500);
    }

    #[test]
    fn test_videogap_is_seconds_and_subtracted() {
        let result = parse_ultrastar("#BPM:60\n#GAP:3000\n#VIDEOGAP:1,5\n: 2 1 0 x");
        // 3000 + 2 * 1000 - 1500
        assert_eq!(result.events[0].start_ms, 3500);
        assert_eq!(result.events[0].end_ms, 4500);
    }

    #[test]
    fn test_negative_videogap_shifts_events_later() {
        let result = parse_ultrastar("#BPM:60\n#VIDEOGAP:-0,5\n: 0 1 0 x\n: 3 2 0 y");
        assert_eq!(result.events[0].start_ms, 500);
        assert_eq!(result.events[0].end_ms, 1500);
        assert_eq!((result.events[1].start_ms, result.events[1].end_ms), (3500, 5500));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_notes_before_playback_start_are_dropped() {
        let content = "#BPM:60\n#VIDEOGAP:10\n: 0 1 0 early1\n: 1 1 0 early2\n: 9 2 0 cross\n: 20 1 0 real";
        let result = parse_ultrastar(content);

        let texts: Vec<&str> = result.events.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["cross", "real"]);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].starts_with("第 3 行"));

        // 跨越 0 时刻的音符：-1000..1000 只钳制开始时间
        assert_eq!((result.events[0].start_ms, result.events[0].end_ms), (0, 1000));
        assert_eq!((result.events[1].start_ms, result.events[1].end_ms), (10000, 11000));

        for now in [0, 50, 100] {
            assert_eq!(
                active_display_texts(&result.events, now, DEFAULT_BUFFER_MS),
                vec!["cross".to_string()],
                "时间 {now} 处不应出现早于起点的歌词"
            );
        }
    }

    #[test]
    fn test_note_ending_exactly_at_zero_is_kept() {
        let events = parse_script("#BPM:60\n#VIDEOGAP:2\n: 0 2 0 edge");
        assert_eq!(events.len(), 1);
        assert_eq!((events[0].start_ms, events[0].end_ms), (0, 0));
    }

    #[test]
    fn test_decimal_comma_bpm() {
        let result = parse_ultrastar("#BPM:128,5\n: 257 0 0 x");
        // 257 * 60000 / 128.5 = 120000
        assert_eq!(result.events[0].start_ms, 120000);
        assert_eq!(result.metadata("bpm"), Some("128,5"));
    }

    #[test]
    fn test_header_with_trailing_comment() {
        let events = parse_script("#BPM:120 ; fixed by hand\n: 10 5 0 x");
        assert_eq!(events[0].start_ms, 5000);
    }

    #[test]
    fn test_invalid_bpm_keeps_default_and_warns() {
        let result = parse_ultrastar("#BPM:0\n#GAP:abc\n: 160 0 0 x");
        assert_eq!(result.events[0].start_ms, 60000);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_text_is_rejoined_and_keeps_markers() {
        let events = parse_script(": 0 2 5 hello big ~world*");
        assert_eq!(events[0].text, "hello big ~world*");
        assert_eq!(events[0].display_text(), "hello big world");
    }

    #[test]
    fn test_leading_whitespace_before_marker() {
        let events = parse_script("   ~ 4 2 0 oh\n\t: 6 2 0 yeah");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, LyricKind::Prolongation);
        assert_eq!(events[1].kind, LyricKind::Normal);
    }

    #[test]
    fn test_short_and_malformed_lines_are_dropped() {
        let content = "\n   \n- 12\n: 1 2 3\n: x 2 3 word\nE\n: 4 4 0 kept";
        let result = parse_ultrastar(content);
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].text, "kept");
        assert_eq!(result.warnings.len(), 3);
    }

    #[test]
    fn test_pause_line_with_four_fields_is_kept() {
        let events = parse_script("- 20 4 0 ~");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, LyricKind::Pause);
    }

    #[test]
    fn test_output_keeps_file_order() {
        let events = parse_script(": 40 2 0 late\n: 0 2 0 early");
        assert_eq!(events[0].text, "late");
        assert_eq!(events[1].text, "early");
    }

    #[test]
    fn test_empty_script_yields_no_events() {
        assert!(parse_script("").is_empty());
        assert!(parse_script("just some prose\nwithout notes").is_empty());
    }

    #[test]
    fn test_metadata_is_captured() {
        let result = parse_ultrastar("#TITLE:Take On Me\n#ARTIST:a-ha\n#MP3:song.mp3");
        assert_eq!(result.metadata("title"), Some("Take On Me"));
        assert_eq!(result.metadata("ARTIST"), Some("a-ha"));
        assert_eq!(result.metadata("COVER"), None);
    }
}
