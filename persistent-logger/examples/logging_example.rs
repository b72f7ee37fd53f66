//! 영속 로거 사용 예제
//!
//! 이 예제는 로거 구성 빌더의 다양한 사용 패턴을 보여줍니다.
//! `.env` 파일의 `PERSISTENT_LOG_*` 값이 있으면 함께 적용됩니다.

use anyhow::Result;
use persistent_logger::logging::{
    init_logger, LogLevel, LoggerLayer, LoggerRegistry, LoggingSettings, PersistentLogger,
    TriggerPolicy,
};
use tracing_subscriber::layer::SubscriberExt;

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    println!("📝 영속 로거 예제 시작");

    // === 예제 1: 기본 사용법 ===
    println!("\n📝 예제 1: 전용 로그 파일");
    basic_example()?;

    // === 예제 2: 공유 파일 ===
    println!("\n📂 예제 2: 여러 로거가 latest.log 공유");
    shared_file_example()?;

    // === 예제 3: 트리거 정책 교체 ===
    println!("\n🔁 예제 3: 순환하지 않는 로거");
    never_trigger_example()?;

    // === 예제 4: tracing 연동 ===
    println!("\n🔗 예제 4: tracing 이벤트 전달");
    tracing_bridge_example()?;

    LoggerRegistry::global().shutdown()?;
    println!("\n✅ 모든 예제 완료! logs/ 디렉토리에서 생성된 로그를 확인하세요.");
    Ok(())
}

/// 예제 1: 필수 정보만 채운 기본 로거
fn basic_example() -> Result<()> {
    let builder = PersistentLogger::new()
        .logger_name("Core")
        .log_directory("MyApp")
        .app_version("1.0.0-beta.1")
        .java_compatibility("22.0", "Default", "Max", "Up to Java 23 (class file version 67.0)")
        .description("Core module\nHandles startup and shutdown")
        .max_backup_files(3)
        .logging_levels([LogLevel::Info, LogLevel::Warn, LogLevel::Debug]);

    let logger = init_logger(builder, None::<&str>)?;

    logger.trace("표시되지 않음");
    logger.debug("디버깅 정보");
    logger.info("서버 시작");
    logger.warn("메모리 사용량 85%");

    let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "config.json");
    logger.log_error(LogLevel::Error, "설정 파일 로드 실패", &cause);

    logger.flush()?;
    println!("   ✓ logs/MyApp/Core.log 생성됨");
    Ok(())
}

/// 예제 2: 공유 파일 모드
fn shared_file_example() -> Result<()> {
    for name in ["Network", "Storage"] {
        let logger = PersistentLogger::new()
            .logger_name(name)
            .log_directory("MyApp")
            .app_version("1.0.0")
            .java_compatibility("21", "17", "22", "ASM9")
            .separate_log_file(false)
            .build()?;
        logger.info(format!("{} 모듈 준비 완료", name));
    }

    println!("   ✓ logs/latest.log 에 두 로거가 함께 기록됨");
    Ok(())
}

/// 예제 3: 이전 로그를 이어 쓰는 로거
fn never_trigger_example() -> Result<()> {
    let settings = LoggingSettings::from_env();
    let logger = PersistentLogger::new()
        .logger_name("Audit")
        .log_directory("MyApp")
        .app_version("1.0.0")
        .java_compatibility("21", "17", "22", "ASM9")
        .triggering_policy(TriggerPolicy::never())
        .layout_pattern("%d{%Y-%m-%d %H:%M:%S} %level %msg%n")
        .settings(settings)
        .build()?;

    logger.info("감사 로그는 실행 간에 누적됨");
    println!("   ✓ logs/MyApp/Audit.log 는 순환되지 않음");
    Ok(())
}

/// 예제 4: tracing 매크로를 로거로 전달
fn tracing_bridge_example() -> Result<()> {
    let logger = LoggerRegistry::global()
        .lookup("Core")
        .ok_or_else(|| anyhow::anyhow!("Core 로거가 등록되지 않음"))?;

    let subscriber = tracing_subscriber::registry().with(LoggerLayer::new(logger));
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(target: "app", port = 50051, "gRPC 서버 시작");
        tracing::warn!(target: "app", latency_ms = 120, "응답 지연");
    });

    println!("   ✓ tracing 이벤트가 Core.log 에 기록됨");
    Ok(())
}
