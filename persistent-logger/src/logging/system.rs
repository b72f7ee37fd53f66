//! 등록된 로거 핸들
//!
//! 빌더가 만들어 레지스트리에 등록하는 최종 결과물입니다. 유효 레벨 이상의
//! 레코드를 연결된 모든 Appender로 전달합니다.

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::logging::formatter::{LogLevel, LogRecord};
use crate::logging::writer::Appender;

/// 이름 있는 로그 싱크
pub struct Logger {
    /// 로거 이름 (레지스트리 키)
    name: String,
    /// 유효 레벨 (이 레벨 미만은 버림)
    level: LogLevel,
    /// 출력 대상
    appenders: Vec<Arc<dyn Appender>>,
}

impl Logger {
    pub fn new<S: Into<String>>(name: S, level: LogLevel, appenders: Vec<Arc<dyn Appender>>) -> Self {
        Self {
            name: name.into(),
            level,
            appenders,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 유효 레벨
    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    /// 연결된 Appender 이름 목록
    pub fn appender_names(&self) -> Vec<&str> {
        self.appenders.iter().map(|appender| appender.name()).collect()
    }

    /// 레코드 전달
    ///
    /// Appender 쓰기 실패는 표준 에러로 보고하고 나머지 Appender는 계속 진행합니다.
    pub fn emit(&self, record: &LogRecord) {
        if !self.is_enabled(record.level) {
            return;
        }
        for appender in &self.appenders {
            if let Err(e) = appender.append(record) {
                eprintln!("로그 작성 실패 [{}]: {}", appender.name(), e);
            }
        }
    }

    /// 일반 로그 작성 메서드
    pub fn log<S: AsRef<str>>(&self, level: LogLevel, message: S) {
        if !self.is_enabled(level) {
            return;
        }
        self.emit(&LogRecord::new(level, self.name.as_str(), message.as_ref()));
    }

    /// 에러 추적 정보를 포함한 로그 작성
    pub fn log_error<S: AsRef<str>>(
        &self,
        level: LogLevel,
        message: S,
        error: &(dyn std::error::Error + 'static),
    ) {
        if !self.is_enabled(level) {
            return;
        }
        let record = LogRecord::new(level, self.name.as_str(), message.as_ref()).with_error(error);
        self.emit(&record);
    }

    pub fn trace<S: AsRef<str>>(&self, message: S) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug<S: AsRef<str>>(&self, message: S) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info<S: AsRef<str>>(&self, message: S) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn<S: AsRef<str>>(&self, message: S) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error<S: AsRef<str>>(&self, message: S) {
        self.log(LogLevel::Error, message);
    }

    pub fn fatal<S: AsRef<str>>(&self, message: S) {
        self.log(LogLevel::Fatal, message);
    }

    /// 모든 Appender 플러시
    pub fn flush(&self) -> io::Result<()> {
        for appender in &self.appenders {
            appender.flush()?;
        }
        Ok(())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("appenders", &self.appender_names())
            .finish()
    }
}
