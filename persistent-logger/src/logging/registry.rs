//! 프로세스 전역 로거 레지스트리
//!
//! 이름으로 등록된 로거와 공유 Appender(콘솔, 공유 파일)를 보관합니다.
//! 조회는 여러 스레드에서 동시에 가능하고, 등록은 시작 단계에서 한 번씩
//! 수행된다고 가정합니다. 같은 이름으로 다시 등록하면 이전 항목을 대체합니다.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tracing::debug;

use crate::logging::system::Logger;
use crate::logging::writer::{Appender, ConsoleAppender, ConsoleTarget};

/// 기본 콘솔 Appender 이름
pub const CONSOLE: &str = "Console";
/// 표준 출력 Appender 이름
pub const SYS_OUT: &str = "SysOut";
/// 서버 GUI 콘솔 Appender 이름
pub const SERVER_GUI_CONSOLE: &str = "ServerGuiConsole";

/// 콘솔 미러링 시 찾는 Appender 이름 (순서대로 연결)
pub const CONSOLE_APPENDER_NAMES: [&str; 3] = [CONSOLE, SYS_OUT, SERVER_GUI_CONSOLE];

/// 전역 레지스트리 인스턴스 (프로세스 시작 시 비어 있음)
static GLOBAL_REGISTRY: Lazy<Arc<LoggerRegistry>> = Lazy::new(|| Arc::new(LoggerRegistry::new()));

/// 로거/Appender 레지스트리
#[derive(Default)]
pub struct LoggerRegistry {
    /// 이름별 로거
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
    /// 이름별 공유 Appender
    appenders: RwLock<HashMap<String, Arc<dyn Appender>>>,
}

impl LoggerRegistry {
    /// 빈 레지스트리 생성 (테스트마다 새로 만들어 사용)
    pub fn new() -> Self {
        Self::default()
    }

    /// 프로세스 전역 레지스트리
    pub fn global() -> Arc<LoggerRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// 로거 등록 (같은 이름이면 대체하고 이전 로거를 반환)
    pub fn register(&self, logger: Arc<Logger>) -> Option<Arc<Logger>> {
        let name = logger.name().to_string();
        let previous = self.loggers.write().insert(name.clone(), logger);
        if previous.is_some() {
            debug!(logger = %name, "기존 로거를 새 로거로 대체");
        }
        previous
    }

    /// 이름으로 로거 조회
    pub fn lookup(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.read().get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.write().remove(name)
    }

    /// 등록된 로거 이름 (정렬됨)
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// 공유 Appender 등록 (Appender 자신의 이름으로)
    pub fn register_appender(&self, appender: Arc<dyn Appender>) -> Option<Arc<dyn Appender>> {
        let name = appender.name().to_string();
        self.appenders.write().insert(name, appender)
    }

    /// 이름으로 공유 Appender 조회
    pub fn appender(&self, name: &str) -> Option<Arc<dyn Appender>> {
        self.appenders.read().get(name).cloned()
    }

    /// 이름으로 찾고, 없으면 만들어 등록
    ///
    /// 쓰기 잠금 안에서 생성하므로 동시에 호출해도 하나만 만들어집니다.
    pub fn appender_or_insert_with<F>(&self, name: &str, create: F) -> io::Result<Arc<dyn Appender>>
    where
        F: FnOnce() -> io::Result<Arc<dyn Appender>>,
    {
        let mut appenders = self.appenders.write();
        if let Some(existing) = appenders.get(name) {
            return Ok(Arc::clone(existing));
        }
        let appender = create()?;
        appenders.insert(name.to_string(), Arc::clone(&appender));
        Ok(appender)
    }

    /// 등록된 콘솔 계열 Appender 목록 (없는 이름은 건너뜀)
    pub fn console_appenders(&self) -> Vec<Arc<dyn Appender>> {
        let appenders = self.appenders.read();
        CONSOLE_APPENDER_NAMES
            .iter()
            .filter_map(|name| appenders.get(*name).cloned())
            .collect()
    }

    /// 표준 출력 `Console` Appender 등록
    pub fn install_console(&self, ansi: bool) -> Arc<dyn Appender> {
        let console: Arc<dyn Appender> =
            Arc::new(ConsoleAppender::new(CONSOLE, ConsoleTarget::Stdout).with_ansi(ansi));
        self.register_appender(Arc::clone(&console));
        console
    }

    /// 모든 로거와 공유 Appender 플러시
    ///
    /// 실패가 있어도 끝까지 진행하고 첫 번째 에러를 반환합니다.
    pub fn flush_all(&self) -> io::Result<()> {
        let mut first_error = None;

        for logger in self.loggers.read().values() {
            if let Err(e) = logger.flush() {
                first_error.get_or_insert(e);
            }
        }
        for appender in self.appenders.read().values() {
            if let Err(e) = appender.flush() {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// 플러시 후 모든 항목 해제 (파일 핸들은 마지막 참조가 사라질 때 닫힘)
    pub fn shutdown(&self) -> io::Result<()> {
        let result = self.flush_all();
        self.loggers.write().clear();
        self.appenders.write().clear();
        debug!("로거 레지스트리 종료됨");
        result
    }
}
