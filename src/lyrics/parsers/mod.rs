//! 歌词脚本解析器模块

pub mod ultrastar_parser;
