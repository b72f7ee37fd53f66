//! 영속 로거 구성기
//!
//! 빌더 방식으로 로거 이름, 버전, 보관 정책, 레벨, 레이아웃 등을 누적한 뒤
//! `build`에서 한 번에 검증하고 로거를 만들어 레지스트리에 등록합니다.
//!
//! ```no_run
//! use persistent_logger::logging::{LogLevel, PersistentLogger};
//!
//! # fn main() -> Result<(), persistent_logger::logging::LoggingError> {
//! let logger = PersistentLogger::new()
//!     .logger_name("MyModule")
//!     .log_directory("MyApp")
//!     .app_version("1.0.0-beta.1")
//!     .java_compatibility("22.0", "Default", "Max", "Up to Java 23 (class file version 67.0)")
//!     .description("Simple Description")
//!     .logging_levels([LogLevel::Info, LogLevel::Warn, LogLevel::Debug])
//!     .build()?;
//!
//! logger.info("module loaded");
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::logging::config::{LoggerConfiguration, LoggingSettings};
use crate::logging::error::{LoggingError, Result};
use crate::logging::formatter::{LogLevel, PatternLayout};
use crate::logging::header::HeaderSpec;
use crate::logging::policy::TriggerPolicy;
use crate::logging::registry::LoggerRegistry;
use crate::logging::rotation::RolloverStrategy;
use crate::logging::system::Logger;
use crate::logging::writer::{Appender, RollingFileAppender};

/// 전용 파일 기본 레이아웃
pub const DEFAULT_SEPARATE_PATTERN: &str = "[%d{%H:%M:%S%.3f}] [%c/%level]: %msg%n%ex";
/// 공유 파일 기본 레이아웃
pub const DEFAULT_SHARED_PATTERN: &str = "[%d{%d%b%Y %H:%M:%S%.3f}] [%t/%level] [%c]: %msg%n%ex";
/// 공유 파일 Appender 이름
pub const SHARED_APPENDER_NAME: &str = "LatestFileAppender";

/// 영속 로거 빌더
pub struct PersistentLogger {
    config: LoggerConfiguration,
    triggering_policy: Option<TriggerPolicy>,
    settings: Option<LoggingSettings>,
    registry: Option<Arc<LoggerRegistry>>,
}

impl Default for PersistentLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentLogger {
    /// 빈 구성으로 시작 (설정은 환경변수, 레지스트리는 전역)
    pub fn new() -> Self {
        Self::from_configuration(LoggerConfiguration::default())
    }

    /// 기존 구성 요청에서 시작
    pub fn from_configuration(config: LoggerConfiguration) -> Self {
        Self {
            config,
            triggering_policy: None,
            settings: None,
            registry: None,
        }
    }

    /// 현재까지 누적된 구성
    pub fn configuration(&self) -> &LoggerConfiguration {
        &self.config
    }

    pub fn logger_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.name = Some(name.into());
        self
    }

    pub fn log_directory<S: Into<String>>(mut self, directory: S) -> Self {
        self.config.directory = Some(directory.into());
        self
    }

    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.config.description = description.into();
        self
    }

    pub fn app_version<S: Into<String>>(mut self, version: S) -> Self {
        self.config.app_version = Some(version.into());
        self
    }

    /// 호환성 정보 네 가지를 한 번에 설정
    pub fn java_compatibility<J, D, M, A>(
        self,
        java_version: J,
        default_compatibility: D,
        max_compatibility: M,
        asm_support: A,
    ) -> Self
    where
        J: Into<String>,
        D: Into<String>,
        M: Into<String>,
        A: Into<String>,
    {
        self.java_version(java_version)
            .default_compatibility(default_compatibility)
            .max_compatibility(max_compatibility)
            .asm_support_details(asm_support)
    }

    pub fn java_version<S: Into<String>>(mut self, java_version: S) -> Self {
        self.config.java_version = Some(java_version.into());
        self
    }

    pub fn default_compatibility<S: Into<String>>(mut self, compatibility: S) -> Self {
        self.config.default_compatibility = Some(compatibility.into());
        self
    }

    pub fn max_compatibility<S: Into<String>>(mut self, compatibility: S) -> Self {
        self.config.max_compatibility = Some(compatibility.into());
        self
    }

    pub fn asm_support_details<S: Into<String>>(mut self, details: S) -> Self {
        self.config.asm_support_details = Some(details.into());
        self
    }

    pub fn max_backup_files(mut self, max_files: u32) -> Self {
        self.config.max_backup_files = max_files;
        self
    }

    /// `false`면 모든 로거가 함께 쓰는 공유 파일 사용
    pub fn separate_log_file(mut self, separate: bool) -> Self {
        self.config.use_separate_file = separate;
        self
    }

    /// 레벨 집합 설정 (가장 상세한 레벨이 유효 레벨)
    pub fn logging_levels<I>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = LogLevel>,
    {
        self.config.levels = levels.into_iter().collect();
        self
    }

    pub fn layout_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.config.layout_pattern = Some(pattern.into());
        self
    }

    /// 생성된 헤더 대신 사용할 헤더
    pub fn custom_header<S: Into<String>>(mut self, header: S) -> Self {
        self.config.header_override = Some(header.into());
        self
    }

    pub fn attach_console(mut self, attach: bool) -> Self {
        self.config.attach_console = attach;
        self
    }

    /// 전용 파일의 기본 트리거 정책(최초 1회 순환) 대체
    pub fn triggering_policy(mut self, policy: TriggerPolicy) -> Self {
        self.triggering_policy = Some(policy);
        self
    }

    pub fn settings(mut self, settings: LoggingSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// 등록 대상 레지스트리 (기본값: 전역 레지스트리)
    pub fn registry(mut self, registry: Arc<LoggerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 구성을 검증하고 로거를 생성해 레지스트리에 등록
    pub fn build(self) -> Result<Arc<Logger>> {
        let Self {
            config,
            triggering_policy,
            settings,
            registry,
        } = self;

        let (name, directory) = match (&config.name, &config.directory) {
            (Some(name), Some(directory)) => (name.clone(), directory.clone()),
            _ => {
                return Err(LoggingError::configuration(
                    "Logger name and log directory must be provided.",
                ))
            }
        };
        let details = version_details(&config).ok_or_else(|| {
            LoggingError::configuration("App version and Java compatibility details must be set.")
        })?;

        let settings = settings.unwrap_or_else(LoggingSettings::from_env);
        settings.validate()?;
        let registry = registry.unwrap_or_else(LoggerRegistry::global);
        let level = config.effective_level();

        let file_appender = if config.use_separate_file {
            let header = match &config.header_override {
                Some(header) => header.clone(),
                None => build_header(&name, &directory, &config.description, &details, &settings),
            };
            separate_file_appender(&name, &directory, &config, header, triggering_policy, &settings)?
        } else {
            shared_file_appender(&config, &settings, &registry)?
        };

        let mut appenders = vec![file_appender];
        if config.attach_console {
            appenders.extend(registry.console_appenders());
        }

        let logger = Arc::new(Logger::new(name.as_str(), level, appenders));
        registry.register(Arc::clone(&logger));

        info!(
            logger = %name,
            directory = %directory,
            level = %level,
            separate_file = config.use_separate_file,
            appenders = ?logger.appender_names(),
            "영속 로거 등록 완료"
        );

        Ok(logger)
    }
}

/// 헤더 상세 항목 (모두 설정된 경우에만)
fn version_details(config: &LoggerConfiguration) -> Option<[(&'static str, String); 5]> {
    Some([
        ("Version", config.app_version.clone()?),
        ("Java Version", config.java_version.clone()?),
        ("Default Compatibility", config.default_compatibility.clone()?),
        ("Max Effective Compatibility", config.max_compatibility.clone()?),
        ("ASM Support Details", config.asm_support_details.clone()?),
    ])
}

fn build_header(
    name: &str,
    directory: &str,
    description: &str,
    details: &[(&'static str, String)],
    settings: &LoggingSettings,
) -> String {
    let spec = HeaderSpec::new()
        .total_width(settings.header_width)
        .title(format!("{} {}", directory, name))
        .description(&format!("Module Description:\n{}", description));

    details
        .iter()
        .fold(spec, |spec, (key, value)| spec.add_detail(*key, value.as_str()))
        .render()
}

/// 로거 전용 파일 경로: `<root>/<directory>/<name>.log`
pub fn separate_log_path(settings: &LoggingSettings, directory: &str, name: &str) -> PathBuf {
    settings
        .root_dir
        .join(directory)
        .join(format!("{}.log", name))
}

/// 공유 파일 경로: `<root>/<shared_file_name>`
pub fn shared_log_path(settings: &LoggingSettings) -> PathBuf {
    settings.root_dir.join(&settings.shared_file_name)
}

fn separate_file_appender(
    name: &str,
    directory: &str,
    config: &LoggerConfiguration,
    header: String,
    triggering_policy: Option<TriggerPolicy>,
    settings: &LoggingSettings,
) -> Result<Arc<dyn Appender>> {
    let path = separate_log_path(settings, directory, name);
    let archive_dir = settings.root_dir.join(directory);
    let pattern = config
        .layout_pattern
        .as_deref()
        .unwrap_or(DEFAULT_SEPARATE_PATTERN);

    let appender = RollingFileAppender::builder(format!("{} FileAppender", name), &path)
        .layout(PatternLayout::new(pattern))
        .header(header)
        .policy(triggering_policy.unwrap_or_else(TriggerPolicy::fire_once))
        .strategy(RolloverStrategy::new(
            archive_dir,
            format!("{}-backup-", name),
            config.max_backup_files,
        ))
        .immediate_flush(settings.immediate_flush)
        .build()
        .map_err(|e| LoggingError::io(&path, e))?;

    Ok(Arc::new(appender))
}

// 공유 파일은 프로세스에서 Appender 하나를 함께 사용합니다.
// 먼저 만든 로거의 레이아웃과 보관 개수가 유지됩니다.
fn shared_file_appender(
    config: &LoggerConfiguration,
    settings: &LoggingSettings,
    registry: &LoggerRegistry,
) -> Result<Arc<dyn Appender>> {
    let path = shared_log_path(settings);

    registry
        .appender_or_insert_with(SHARED_APPENDER_NAME, || {
            let pattern = config
                .layout_pattern
                .as_deref()
                .unwrap_or(DEFAULT_SHARED_PATTERN);
            let appender = RollingFileAppender::builder(SHARED_APPENDER_NAME, &path)
                .layout(PatternLayout::new(pattern))
                .policy(TriggerPolicy::never())
                .strategy(RolloverStrategy::new(
                    &settings.root_dir,
                    "",
                    config.max_backup_files,
                ))
                .immediate_flush(settings.immediate_flush)
                .build()?;
            Ok(Arc::new(appender) as Arc<dyn Appender>)
        })
        .map_err(|e| LoggingError::io(&path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::writer::InMemoryAppender;
    use crate::logging::registry::{CONSOLE, SYS_OUT};
    use std::fs;
    use tempfile::TempDir;

    fn complete(temp_dir: &TempDir, registry: &Arc<LoggerRegistry>) -> PersistentLogger {
        PersistentLogger::new()
            .logger_name("Core")
            .log_directory("MyApp")
            .app_version("1.2.3")
            .java_compatibility("21", "17", "22", "ASM9")
            .settings(LoggingSettings::default().with_root_dir(temp_dir.path()))
            .registry(Arc::clone(registry))
    }

    #[test]
    fn test_build_succeeds_with_required_fields() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let registry = Arc::new(LoggerRegistry::new());

        let logger = complete(&temp_dir, &registry).build().expect("Test assertion failed");
        assert_eq!(logger.name(), "Core");
        assert_eq!(logger.level(), LogLevel::Info);
        assert!(registry.lookup("Core").is_some());
        assert!(temp_dir.path().join("MyApp").join("Core.log").exists());
    }

    #[test]
    fn test_each_missing_required_field_fails() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let registry = Arc::new(LoggerRegistry::new());

        let clear: [fn(&mut LoggerConfiguration); 7] = [
            |c| c.name = None,
            |c| c.directory = None,
            |c| c.app_version = None,
            |c| c.java_version = None,
            |c| c.default_compatibility = None,
            |c| c.max_compatibility = None,
            |c| c.asm_support_details = None,
        ];

        for unset in clear {
            let mut config = complete(&temp_dir, &registry).configuration().clone();
            unset(&mut config);
            let result = PersistentLogger::from_configuration(config)
                .settings(LoggingSettings::default().with_root_dir(temp_dir.path()))
                .registry(Arc::clone(&registry))
                .build();

            let err = result.expect_err("Test assertion failed");
            assert!(err.is_configuration());
        }

        // 실패한 build는 레지스트리와 파일 시스템을 건드리지 않음
        assert!(registry.names().is_empty());
        assert!(!temp_dir.path().join("MyApp").exists());
    }

    #[test]
    fn test_invalid_settings_fail() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let registry = Arc::new(LoggerRegistry::new());
        let mut settings = LoggingSettings::default().with_root_dir(temp_dir.path());
        settings.header_width = 0;

        let err = complete(&temp_dir, &registry)
            .settings(settings)
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_effective_level_from_levels() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let registry = Arc::new(LoggerRegistry::new());

        let logger = complete(&temp_dir, &registry)
            .logging_levels([LogLevel::Warn, LogLevel::Debug, LogLevel::Error])
            .build()
            .unwrap();
        assert_eq!(logger.level(), LogLevel::Debug);

        let logger = complete(&temp_dir, &registry)
            .logging_levels(Vec::new())
            .build()
            .unwrap();
        assert_eq!(logger.level(), LogLevel::Info);
    }

    #[test]
    fn test_header_contents() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let registry = Arc::new(LoggerRegistry::new());

        complete(&temp_dir, &registry)
            .description("Handles startup")
            .build()
            .unwrap();

        let content = fs::read_to_string(temp_dir.path().join("MyApp").join("Core.log")).unwrap();
        assert!(content.contains("MyApp Core"));
        assert!(content.contains("Module Description:"));
        assert!(content.contains("Handles startup"));
        assert!(content.contains("Version : 1.2.3"));
        for key in [
            "Java Version : ",
            "Default Compatibility : ",
            "Max Effective Compatibility : ",
            "ASM Support Details : ",
        ] {
            assert_eq!(content.matches(key).count(), 1, "key: {}", key);
        }
        for line in content.lines() {
            assert_eq!(line.chars().count(), 150);
        }
    }

    #[test]
    fn test_custom_header_replaces_generated() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let registry = Arc::new(LoggerRegistry::new());

        complete(&temp_dir, &registry)
            .custom_header("# custom header\n")
            .build()
            .unwrap();

        let content = fs::read_to_string(temp_dir.path().join("MyApp").join("Core.log")).unwrap();
        assert_eq!(content, "# custom header\n");
    }

    #[test]
    fn test_console_mirroring() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let registry = Arc::new(LoggerRegistry::new());
        let console = Arc::new(InMemoryAppender::new(SYS_OUT));
        registry.register_appender(console.clone());

        let logger = complete(&temp_dir, &registry).build().unwrap();
        assert_eq!(logger.appender_names(), vec!["Core FileAppender", SYS_OUT]);
        logger.info("mirrored");
        assert_eq!(console.len(), 1);

        let detached = complete(&temp_dir, &registry)
            .logger_name("Quiet")
            .attach_console(false)
            .build()
            .unwrap();
        assert_eq!(detached.appender_names(), vec!["Quiet FileAppender"]);
        assert!(registry.appender(CONSOLE).is_none());
    }

    #[test]
    fn test_shared_file_is_reused() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let registry = Arc::new(LoggerRegistry::new());

        let first = complete(&temp_dir, &registry)
            .separate_log_file(false)
            .attach_console(false)
            .build()
            .unwrap();
        let second = complete(&temp_dir, &registry)
            .logger_name("Network")
            .log_directory("Other")
            .separate_log_file(false)
            .attach_console(false)
            .build()
            .unwrap();

        first.info("from core");
        second.info("from network");

        let content = fs::read_to_string(temp_dir.path().join("latest.log")).unwrap();
        assert!(content.contains("[Core]: from core"));
        assert!(content.contains("[Network]: from network"));
        assert!(!content.contains("/*"));
        assert!(!temp_dir.path().join("MyApp").exists());
        assert_eq!(first.appender_names(), vec![SHARED_APPENDER_NAME]);
    }

    #[test]
    fn test_custom_layout_pattern() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let registry = Arc::new(LoggerRegistry::new());

        let logger = complete(&temp_dir, &registry)
            .custom_header("")
            .layout_pattern("%level|%msg%n")
            .attach_console(false)
            .build()
            .unwrap();
        logger.warn("custom");

        let content = fs::read_to_string(temp_dir.path().join("MyApp").join("Core.log")).unwrap();
        assert_eq!(content, "WARN|custom\n");
    }

    #[test]
    fn test_unwritable_root_is_io_error() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let registry = Arc::new(LoggerRegistry::new());
        // 루트 경로가 파일이면 디렉토리를 만들 수 없음
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = complete(&temp_dir, &registry)
            .settings(LoggingSettings::default().with_root_dir(&blocker))
            .build()
            .unwrap_err();
        assert!(matches!(err, LoggingError::Io { .. }));
        assert!(registry.lookup("Core").is_none());
    }
}
