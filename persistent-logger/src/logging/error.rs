//! 로깅 구성 에러 타입
//!
//! 로거 생성 시점에만 발생하는 에러를 정의합니다. 로거가 등록된 이후의
//! 쓰기 실패는 각 Appender가 `io::Result`로 보고합니다.

use std::path::PathBuf;
use thiserror::Error;

/// 로거 구성 및 생성 에러
#[derive(Error, Debug)]
pub enum LoggingError {
    /// 필수 설정 누락 또는 잘못된 설정값
    #[error("로거 설정 오류: {message}")]
    Configuration { message: String },

    /// 로그 파일/디렉토리 접근 실패
    #[error("로그 파일 I/O 오류 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoggingError {
    /// 설정 에러 생성
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 경로 정보를 포함한 I/O 에러 생성
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// 설정 에러 여부
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// 로깅 모듈 전용 Result 타입
pub type Result<T> = std::result::Result<T, LoggingError>;
