//! 로그 파일 순환 트리거 정책
//!
//! 레코드를 쓰기 직전에 현재 파일을 순환할지 결정합니다.

use std::fmt;

use crate::logging::formatter::LogRecord;

/// 순환 여부 결정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverDecision {
    /// 기록 전에 파일 순환
    Roll,
    /// 현재 파일 유지
    Hold,
}

impl RolloverDecision {
    pub fn should_roll(self) -> bool {
        self == RolloverDecision::Roll
    }
}

/// 순환 트리거 정책
///
/// Appender 인스턴스마다 하나씩 소유하며, 쓰기 잠금 안에서 호출됩니다.
pub trait TriggeringPolicy: Send {
    /// 레코드마다 순환 여부 결정
    fn decide(&mut self, record: &LogRecord) -> RolloverDecision;
}

/// 최초 1회만 순환하는 정책
///
/// 첫 레코드에서 한 번 순환한 뒤에는 프로세스가 끝날 때까지 순환하지 않습니다.
/// 즉 실행마다 이전 실행의 로그가 보관 파일로 넘어갑니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FireOnce {
    has_fired: bool,
}

impl FireOnce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fired(&self) -> bool {
        self.has_fired
    }
}

impl TriggeringPolicy for FireOnce {
    fn decide(&mut self, _record: &LogRecord) -> RolloverDecision {
        if self.has_fired {
            RolloverDecision::Hold
        } else {
            self.has_fired = true;
            RolloverDecision::Roll
        }
    }
}

/// 절대 순환하지 않는 정책 (공유 로그 파일용)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverTrigger;

impl TriggeringPolicy for NeverTrigger {
    fn decide(&mut self, _record: &LogRecord) -> RolloverDecision {
        RolloverDecision::Hold
    }
}

/// 빌더에 전달되는 트리거 정책 선택지
pub enum TriggerPolicy {
    FireOnce(FireOnce),
    NeverTrigger(NeverTrigger),
    /// 호출자가 직접 구현한 정책
    Custom(Box<dyn TriggeringPolicy>),
}

impl TriggerPolicy {
    pub fn fire_once() -> Self {
        TriggerPolicy::FireOnce(FireOnce::new())
    }

    pub fn never() -> Self {
        TriggerPolicy::NeverTrigger(NeverTrigger)
    }

    pub fn custom<P: TriggeringPolicy + 'static>(policy: P) -> Self {
        TriggerPolicy::Custom(Box::new(policy))
    }
}

impl TriggeringPolicy for TriggerPolicy {
    fn decide(&mut self, record: &LogRecord) -> RolloverDecision {
        match self {
            TriggerPolicy::FireOnce(policy) => policy.decide(record),
            TriggerPolicy::NeverTrigger(policy) => policy.decide(record),
            TriggerPolicy::Custom(policy) => policy.decide(record),
        }
    }
}

impl fmt::Debug for TriggerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerPolicy::FireOnce(policy) => f.debug_tuple("FireOnce").field(policy).finish(),
            TriggerPolicy::NeverTrigger(_) => f.write_str("NeverTrigger"),
            TriggerPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
