//! 로그 포매터
//!
//! 로그 레벨, 로그 레코드, 그리고 패턴 기반 라인 레이아웃을 담당합니다.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// 로그 레벨 열거형
///
/// 값이 작을수록 상세한(verbose) 레벨입니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum LogLevel {
    /// 상세한 추적 정보 (개발환경)
    Trace = 0,
    /// 디버깅 정보 (개발/스테이징)
    Debug = 1,
    /// 일반 정보 (모든 환경, 기본값)
    #[default]
    Info = 2,
    /// 경고 상황 (복구 가능한 오류)
    Warn = 3,
    /// 오류 상황 (복구 불가능한 오류)
    Error = 4,
    /// 시스템 중단 수준 오류
    Fatal = 5,
}

impl LogLevel {
    /// 로그 레벨을 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// ANSI 색상 코드 반환
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[90m", // 회색
            LogLevel::Debug => "\x1b[36m", // 청록색
            LogLevel::Info => "\x1b[32m",  // 녹색
            LogLevel::Warn => "\x1b[33m",  // 노란색
            LogLevel::Error => "\x1b[31m", // 빨간색
            LogLevel::Fatal => "\x1b[35m", // 자홍색
        }
    }

    /// 레벨 집합에서 가장 상세한 레벨 선택
    ///
    /// 집합이 비어 있으면 `None`을 반환합니다.
    pub fn most_verbose<I>(levels: I) -> Option<Self>
    where
        I: IntoIterator<Item = LogLevel>,
    {
        levels.into_iter().min()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(()),
        }
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

/// 단일 로그 레코드
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// 기록 시각 (로컬 시간대)
    pub timestamp: DateTime<Local>,
    /// 로그 레벨
    pub level: LogLevel,
    /// 로거 이름
    pub logger: String,
    /// 스레드 이름
    pub thread: String,
    /// 로그 메시지
    pub message: String,
    /// 에러 추적 정보 (선택적)
    pub error: Option<String>,
}

impl LogRecord {
    /// 현재 시각과 현재 스레드로 새 레코드 생성
    pub fn new<L, M>(level: LogLevel, logger: L, message: M) -> Self
    where
        L: Into<String>,
        M: Into<String>,
    {
        let current = std::thread::current();
        let thread = match current.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", current.id()),
        };

        Self {
            timestamp: Local::now(),
            level,
            logger: logger.into(),
            thread,
            message: message.into(),
            error: None,
        }
    }

    /// 에러와 그 원인 체인을 추적 정보로 첨부
    pub fn with_error(mut self, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut trace = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            let _ = write!(trace, "\nCaused by: {}", cause);
            source = cause.source();
        }
        self.error = Some(trace);
        self
    }

    /// 추적 정보를 문자열로 직접 설정
    pub fn with_trace<S: Into<String>>(mut self, trace: S) -> Self {
        self.error = Some(trace.into());
        self
    }

    /// 기록 시각 설정
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Date(String),
    Level,
    Logger,
    Thread,
    Message,
    Newline,
    Throwable,
}

/// 패턴 기반 라인 레이아웃
///
/// 지원 토큰: `%d{strftime}`/`%d`, `%level`/`%p`, `%c`/`%logger`,
/// `%t`/`%thread`, `%msg`/`%m`, `%n`, `%ex`/`%xEx`/`%throwable`, `%%`.
/// 알 수 없는 토큰은 그대로 출력됩니다. 결과는 항상 개행으로 끝납니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternLayout {
    pattern: String,
    segments: Vec<Segment>,
}

impl PatternLayout {
    /// 패턴 문자열을 컴파일 (실패하지 않음)
    pub fn new<S: Into<String>>(pattern: S) -> Self {
        let pattern = pattern.into();
        let segments = Self::compile(&pattern);
        Self { pattern, segments }
    }

    /// 원본 패턴 문자열
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn compile(pattern: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }

            if chars.peek() == Some(&'%') {
                chars.next();
                literal.push('%');
                continue;
            }

            let mut ident = String::new();
            while let Some(&next) = chars.peek() {
                if !next.is_ascii_alphabetic() {
                    break;
                }
                ident.push(next);
                chars.next();
            }

            let segment = match ident.as_str() {
                "d" | "date" => {
                    let mut format = String::new();
                    if chars.peek() == Some(&'{') {
                        chars.next();
                        for inner in chars.by_ref() {
                            if inner == '}' {
                                break;
                            }
                            format.push(inner);
                        }
                    }
                    Some(Segment::Date(Self::checked_date_format(format)))
                }
                "level" | "p" => Some(Segment::Level),
                "c" | "logger" => Some(Segment::Logger),
                "t" | "thread" => Some(Segment::Thread),
                "msg" | "m" | "message" => Some(Segment::Message),
                "n" => Some(Segment::Newline),
                "ex" | "xEx" | "throwable" => Some(Segment::Throwable),
                _ => None,
            };

            match segment {
                Some(segment) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                None => {
                    literal.push('%');
                    literal.push_str(&ident);
                }
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        segments
    }

    // chrono는 잘못된 지정자를 출력 시점에 에러로 처리하므로 컴파일 단계에서 걸러냅니다.
    fn checked_date_format(format: String) -> String {
        if format.is_empty() || StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            DEFAULT_DATE_FORMAT.to_string()
        } else {
            format
        }
    }

    /// 레코드를 한 줄(또는 추적 정보 포함 여러 줄)로 포매팅
    pub fn format(&self, record: &LogRecord) -> String {
        let mut out = String::with_capacity(self.pattern.len() + record.message.len() + 32);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Date(format) => {
                    let _ = write!(out, "{}", record.timestamp.format(format));
                }
                Segment::Level => out.push_str(record.level.as_str()),
                Segment::Logger => out.push_str(&record.logger),
                Segment::Thread => out.push_str(&record.thread),
                Segment::Message => out.push_str(&record.message),
                Segment::Newline => out.push('\n'),
                Segment::Throwable => {
                    if let Some(trace) = &record.error {
                        out.push_str(trace);
                        if !trace.ends_with('\n') {
                            out.push('\n');
                        }
                    }
                }
            }
        }

        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}
