//! 영속 로거 구성 라이브러리
//!
//! 애플리케이션 모듈마다 이름 있는 로거를 만들고, 장식 헤더가 붙은 로그 파일과
//! 시작 시 순환/보관 정책을 함께 구성합니다. 자세한 내용은 [`logging`] 모듈 참고.

pub mod logging;

pub use logging::{
    init_logger, LogLevel, Logger, LoggerRegistry, LoggingError, PersistentLogger, TriggerPolicy,
};
