//! 영속 로깅 시스템
//!
//! 모듈(로거)별 파일 로깅을 구성합니다.
//!
//! # 주요 기능
//! - **전용/공유 파일**: 로거별 `<root>/<dir>/<name>.log` 또는 공용 `latest.log`
//! - **장식 헤더**: 새 파일 첫머리에 버전/호환성 정보 블록 기록
//! - **시작 시 순환**: 이전 실행의 로그를 gzip 보관 후 새 파일로 시작
//! - **보관 개수 제한**: 오래된 보관 파일부터 삭제
//! - **콘솔 미러링**: 등록된 콘솔 Appender로 동시 출력
//!
//! # 사용 예시
//! ```no_run
//! use persistent_logger::logging::{init_logger, LogLevel, PersistentLogger};
//!
//! fn main() -> Result<(), persistent_logger::logging::LoggingError> {
//!     let builder = PersistentLogger::new()
//!         .logger_name("Core")
//!         .log_directory("MyApp")
//!         .app_version("1.2.3")
//!         .java_compatibility("21", "17", "22", "ASM9")
//!         .logging_levels([LogLevel::Debug]);
//!
//!     let logger = init_logger(builder, None::<&str>)?;
//!     logger.info("서버 시작");
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod formatter;
pub mod header;
pub mod layer;
pub mod policy;
pub mod registry;
pub mod rotation;
pub mod system;
pub mod writer;

pub use builder::PersistentLogger;
pub use config::{LoggerConfiguration, LoggingSettings};
pub use error::{LoggingError, Result};
pub use formatter::{LogLevel, LogRecord, PatternLayout};
pub use header::{render_header, HeaderSpec};
pub use layer::LoggerLayer;
pub use policy::{FireOnce, NeverTrigger, RolloverDecision, TriggerPolicy, TriggeringPolicy};
pub use registry::LoggerRegistry;
pub use rotation::RolloverStrategy;
pub use system::Logger;
pub use writer::{Appender, ConsoleAppender, ConsoleTarget, InMemoryAppender, RollingFileAppender};

use std::path::Path;
use std::sync::Arc;

/// 로거 초기화 함수
///
/// 환경변수 설정을 읽고, 전역 레지스트리에 `Console` Appender가 없으면 설치한 뒤
/// 로거를 만들어 등록합니다.
///
/// # Arguments
/// * `builder` - 이름/디렉토리/버전 정보가 채워진 빌더
/// * `log_dir` - 로그 루트 디렉토리 (기본값: 환경변수 또는 "logs")
pub fn init_logger<P: AsRef<Path>>(
    builder: PersistentLogger,
    log_dir: Option<P>,
) -> Result<Arc<Logger>> {
    let mut settings = LoggingSettings::from_env();
    if let Some(dir) = log_dir {
        settings = settings.with_root_dir(dir.as_ref());
    }

    let registry = LoggerRegistry::global();
    if registry.appender(registry::CONSOLE).is_none() {
        registry.install_console(settings.console_ansi);
    }

    builder.settings(settings).registry(registry).build()
}
