//! 로깅 설정 관리
//!
//! 프로세스 수준 설정(`LoggingSettings`)과 로거 하나를 만들기 위한
//! 요청 값(`LoggerConfiguration`)을 정의합니다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::error::{LoggingError, Result};
use crate::logging::formatter::LogLevel;
use crate::logging::header::DEFAULT_HEADER_WIDTH;

/// 로깅 시스템 공통 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// 로그 루트 디렉토리 (기본값: "logs")
    pub root_dir: PathBuf,

    /// 헤더 폭 (기본값: 150)
    pub header_width: usize,

    /// 공유 로그 파일 이름 (기본값: "latest.log")
    pub shared_file_name: String,

    /// 레코드마다 플러시 여부 (기본값: true)
    pub immediate_flush: bool,

    /// 콘솔 ANSI 색상 사용 여부 (기본값: true)
    pub console_ansi: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("logs"),
            header_width: DEFAULT_HEADER_WIDTH,
            shared_file_name: "latest.log".to_string(),
            immediate_flush: true,
            console_ansi: true,
        }
    }
}

impl LoggingSettings {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // 테스트에서 프로세스 환경을 건드리지 않도록 조회 함수를 주입받습니다.
    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(val) = lookup("PERSISTENT_LOG_DIR") {
            if !val.trim().is_empty() {
                settings.root_dir = PathBuf::from(val);
            }
        }

        if let Some(val) = lookup("PERSISTENT_LOG_HEADER_WIDTH") {
            if let Ok(width) = val.parse() {
                settings.header_width = width;
            }
        }

        if let Some(val) = lookup("PERSISTENT_LOG_SHARED_FILE") {
            settings.shared_file_name = val;
        }

        if let Some(val) = lookup("PERSISTENT_LOG_IMMEDIATE_FLUSH") {
            settings.immediate_flush = val.to_lowercase() == "true";
        }

        if let Some(val) = lookup("PERSISTENT_LOG_CONSOLE_ANSI") {
            settings.console_ansi = val.to_lowercase() == "true";
        }

        settings
    }

    /// JSON 문서에서 설정 로드 (빠진 필드는 기본값)
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| LoggingError::configuration(format!("invalid logging settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// 루트 디렉토리 지정
    pub fn with_root_dir<P: Into<PathBuf>>(mut self, root_dir: P) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        if self.header_width == 0 {
            return Err(LoggingError::configuration(
                "header_width must be greater than 0",
            ));
        }

        if self.shared_file_name.trim().is_empty() {
            return Err(LoggingError::configuration(
                "shared_file_name must not be empty",
            ));
        }

        Ok(())
    }
}

/// 로거 하나를 만들기 위한 구성 요청
///
/// 빌더가 필드 단위로 채우며, 검증은 `build` 시점에만 수행됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfiguration {
    /// 로거 이름 (레지스트리 키, 파일 이름)
    pub name: Option<String>,
    /// 로그 디렉토리 (파일 경로와 헤더 제목에 사용)
    pub directory: Option<String>,
    pub description: String,
    pub app_version: Option<String>,
    pub java_version: Option<String>,
    pub default_compatibility: Option<String>,
    pub max_compatibility: Option<String>,
    pub asm_support_details: Option<String>,
    /// 최대 보관 파일 수 (기본값: 5)
    pub max_backup_files: u32,
    /// 로거 전용 파일 사용 여부 (기본값: true)
    pub use_separate_file: bool,
    /// 비어 있지 않으면 가장 상세한 레벨이 유효 레벨
    pub levels: Vec<LogLevel>,
    pub layout_pattern: Option<String>,
    pub header_override: Option<String>,
    /// 콘솔 미러링 여부 (기본값: true)
    pub attach_console: bool,
}

impl Default for LoggerConfiguration {
    fn default() -> Self {
        Self {
            name: None,
            directory: None,
            description: String::new(),
            app_version: None,
            java_version: None,
            default_compatibility: None,
            max_compatibility: None,
            asm_support_details: None,
            max_backup_files: 5,
            use_separate_file: true,
            levels: Vec::new(),
            layout_pattern: None,
            header_override: None,
            attach_console: true,
        }
    }
}

impl LoggerConfiguration {
    /// JSON 문서에서 구성 로드 (빠진 필드는 기본값)
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| LoggingError::configuration(format!("invalid logger configuration: {}", e)))
    }

    /// 유효 레벨 (레벨 집합 중 가장 상세한 레벨, 없으면 INFO)
    pub fn effective_level(&self) -> LogLevel {
        LogLevel::most_verbose(self.levels.iter().copied()).unwrap_or_default()
    }
}
