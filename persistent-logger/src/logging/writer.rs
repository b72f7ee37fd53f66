//! 로그 작성기 (Appender)
//!
//! 포매팅된 레코드를 실제 출력 대상(파일, 콘솔, 메모리)에 기록합니다.
//! 모든 Appender는 레코드 하나를 잠금 안에서 통째로 기록하므로 여러 스레드가
//! 동시에 써도 줄이 섞이지 않습니다.

use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::logging::formatter::{LogRecord, PatternLayout};
use crate::logging::policy::{TriggerPolicy, TriggeringPolicy};
use crate::logging::rotation::RolloverStrategy;

/// 로그 출력 대상
pub trait Appender: Send + Sync {
    /// 레지스트리에 등록되는 이름
    fn name(&self) -> &str;

    /// 레코드 한 건 기록
    fn append(&self, record: &LogRecord) -> io::Result<()>;

    /// 버퍼 비우기
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

struct FileState {
    writer: Option<BufWriter<File>>,
    policy: TriggerPolicy,
    strategy: RolloverStrategy,
    /// 활성 파일에 방금 쓴 헤더 외에는 아무것도 없는 상태
    pristine: bool,
}

/// 순환 정책을 갖는 파일 Appender
pub struct RollingFileAppender {
    name: String,
    path: PathBuf,
    layout: PatternLayout,
    header: Option<String>,
    immediate_flush: bool,
    state: Mutex<FileState>,
}

/// `RollingFileAppender` 생성기
pub struct RollingFileAppenderBuilder {
    name: String,
    path: PathBuf,
    layout: PatternLayout,
    header: Option<String>,
    policy: TriggerPolicy,
    strategy: Option<RolloverStrategy>,
    immediate_flush: bool,
}

impl RollingFileAppenderBuilder {
    pub fn layout(mut self, layout: PatternLayout) -> Self {
        self.layout = layout;
        self
    }

    /// 새(빈) 파일을 열 때마다 맨 앞에 기록할 헤더
    pub fn header<S: Into<String>>(mut self, header: S) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn policy(mut self, policy: TriggerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn strategy(mut self, strategy: RolloverStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn immediate_flush(mut self, immediate_flush: bool) -> Self {
        self.immediate_flush = immediate_flush;
        self
    }

    /// 디렉토리를 만들고 활성 파일을 연 뒤 Appender 생성
    pub fn build(self) -> io::Result<RollingFileAppender> {
        let strategy = match self.strategy {
            Some(strategy) => strategy,
            None => {
                let directory = self.path.parent().unwrap_or_else(|| Path::new("."));
                RolloverStrategy::new(directory, "", 0)
            }
        };

        let (writer, pristine) = open_active_file(&self.path, self.header.as_deref())?;

        debug!(
            appender = %self.name,
            path = %self.path.display(),
            policy = ?self.policy,
            max_backups = strategy.max_backups(),
            "로그 파일 Appender 생성됨"
        );

        Ok(RollingFileAppender {
            name: self.name,
            path: self.path,
            layout: self.layout,
            header: self.header,
            immediate_flush: self.immediate_flush,
            state: Mutex::new(FileState {
                writer: Some(writer),
                policy: self.policy,
                strategy,
                pristine,
            }),
        })
    }
}

impl RollingFileAppender {
    /// 기본값: 순환 안 함, 보관 0개, 즉시 플러시
    pub fn builder<N, P>(name: N, path: P) -> RollingFileAppenderBuilder
    where
        N: Into<String>,
        P: AsRef<Path>,
    {
        RollingFileAppenderBuilder {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
            layout: PatternLayout::new("%msg%n%ex"),
            header: None,
            policy: TriggerPolicy::never(),
            strategy: None,
            immediate_flush: true,
        }
    }

    /// 활성 로그 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &PatternLayout {
        &self.layout
    }

    /// 현재까지 남아 있는 보관 파일 목록 (오래된 순)
    pub fn archives(&self) -> io::Result<Vec<PathBuf>> {
        self.state.lock().strategy.archives()
    }

    fn roll(&self, state: &mut FileState) -> io::Result<()> {
        if let Some(mut writer) = state.writer.take() {
            writer.flush()?;
        }

        state.strategy.archive(&self.path)?;

        let (writer, pristine) = open_active_file(&self.path, self.header.as_deref())?;
        state.writer = Some(writer);
        state.pristine = pristine;
        Ok(())
    }
}

impl Appender for RollingFileAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, record: &LogRecord) -> io::Result<()> {
        let line = self.layout.format(record);
        let mut state = self.state.lock();

        // 헤더만 있는 새 파일은 순환할 내용이 없음
        if state.policy.decide(record).should_roll() && !state.pristine {
            self.roll(&mut state)?;
        }

        // 이전 순환이 중간에 실패했다면 다시 연다
        if state.writer.is_none() {
            let (writer, pristine) = open_active_file(&self.path, self.header.as_deref())?;
            state.writer = Some(writer);
            state.pristine = pristine;
        }

        if let Some(writer) = state.writer.as_mut() {
            writer.write_all(line.as_bytes())?;
            if self.immediate_flush {
                writer.flush()?;
            }
        }
        state.pristine = false;
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        match self.state.lock().writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for RollingFileAppender {
    fn drop(&mut self) {
        if let Some(writer) = self.state.get_mut().writer.as_mut() {
            let _ = writer.flush();
        }
    }
}

/// 활성 파일을 추가 모드로 열고, 비어 있으면 헤더를 기록
fn open_active_file(path: &Path, header: Option<&str>) -> io::Result<(BufWriter<File>, bool)> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_empty = file.metadata()?.len() == 0;
    let mut writer = BufWriter::new(file);

    if is_empty {
        if let Some(header) = header {
            writer.write_all(header.as_bytes())?;
            writer.flush()?;
        }
    }

    Ok((writer, is_empty))
}

/// 콘솔 출력 대상
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

/// 콘솔 Appender
pub struct ConsoleAppender {
    name: String,
    target: ConsoleTarget,
    layout: PatternLayout,
    ansi: bool,
}

impl ConsoleAppender {
    /// 콘솔 기본 레이아웃
    pub const DEFAULT_PATTERN: &'static str = "[%d{%H:%M:%S}] [%t/%level] (%c) %msg%n%ex";

    pub fn new<S: Into<String>>(name: S, target: ConsoleTarget) -> Self {
        Self {
            name: name.into(),
            target,
            layout: PatternLayout::new(Self::DEFAULT_PATTERN),
            ansi: false,
        }
    }

    pub fn with_layout(mut self, layout: PatternLayout) -> Self {
        self.layout = layout;
        self
    }

    /// 레벨별 ANSI 색상 사용 여부
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn render(&self, record: &LogRecord) -> String {
        let line = self.layout.format(record);
        if self.ansi {
            format!(
                "{}{}\x1b[0m\n",
                record.level.color_code(),
                line.trim_end_matches('\n')
            )
        } else {
            line
        }
    }
}

impl Appender for ConsoleAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, record: &LogRecord) -> io::Result<()> {
        let line = self.render(record);
        match self.target {
            ConsoleTarget::Stdout => io::stdout().lock().write_all(line.as_bytes()),
            ConsoleTarget::Stderr => io::stderr().lock().write_all(line.as_bytes()),
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self.target {
            ConsoleTarget::Stdout => io::stdout().flush(),
            ConsoleTarget::Stderr => io::stderr().flush(),
        }
    }
}

/// 메모리 내 Appender (테스트/진단용)
pub struct InMemoryAppender {
    name: String,
    layout: PatternLayout,
    /// 포매팅된 로그 줄
    entries: Mutex<Vec<String>>,
}

impl InMemoryAppender {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            layout: PatternLayout::new("[%c/%level]: %msg%n%ex"),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_layout(mut self, layout: PatternLayout) -> Self {
        self.layout = layout;
        self
    }

    /// 모든 로그 항목 반환
    pub fn get_logs(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Appender for InMemoryAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, record: &LogRecord) -> io::Result<()> {
        let line = self.layout.format(record);
        self.entries.lock().push(line);
        Ok(())
    }
}
