//! 로그 파일 헤더 포매터
//!
//! 전용 로그 파일의 맨 앞에 기록되는 고정 폭 주석 블록을 생성합니다.
//!
//! ```text
//! //////////////////////////////////////////////////
//! /*                  MyApp Core                  */
//! //////////////////////////////////////////////////
//! /*Module Description:                           */
//! //////////////////////////////////////////////////
//! /*Version : 1.0.0                               */
//! //////////////////////////////////////////////////
//! ```
//!
//! 렌더링은 순수 함수이며 실패하지 않습니다. 폭을 넘는 내용은 줄바꿈 없이
//! 잘려 나가고, 모든 줄은 정확히 `total_width` 문자입니다.

/// 헤더 기본 폭
pub const DEFAULT_HEADER_WIDTH: usize = 150;

/// 헤더 블록 명세
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpec {
    total_width: usize,
    border_char: String,
    comment_start: String,
    comment_end: String,
    title: String,
    description_lines: Vec<String>,
    details: Vec<(String, String)>,
}

impl Default for HeaderSpec {
    fn default() -> Self {
        Self {
            total_width: DEFAULT_HEADER_WIDTH,
            border_char: "/".to_string(),
            comment_start: "/*".to_string(),
            comment_end: "*/".to_string(),
            title: String::new(),
            description_lines: Vec::new(),
            details: Vec::new(),
        }
    }
}

impl HeaderSpec {
    /// 기본값(폭 150, `/` 테두리, `/* */` 주석)으로 새 명세 생성
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_width(mut self, total_width: usize) -> Self {
        self.total_width = total_width;
        self
    }

    pub fn border_char<S: Into<String>>(mut self, border_char: S) -> Self {
        self.border_char = border_char.into();
        self
    }

    pub fn comment_markers<S, E>(mut self, start: S, end: E) -> Self
    where
        S: Into<String>,
        E: Into<String>,
    {
        self.comment_start = start.into();
        self.comment_end = end.into();
        self
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    /// 설명 한 줄 추가 (분할/트림 없이 그대로)
    pub fn add_description_line<S: Into<String>>(mut self, line: S) -> Self {
        self.description_lines.push(line.into());
        self
    }

    /// 여러 줄 설명 설정
    ///
    /// 기존 설명을 대체합니다. `\n` 기준으로 나눈 뒤 각 줄을 트림하며,
    /// 끝쪽의 빈 줄은 버립니다. 공백뿐인 텍스트는 설명을 비웁니다.
    pub fn description(mut self, description: &str) -> Self {
        self.description_lines.clear();
        if description.trim().is_empty() {
            return self;
        }

        let mut lines: Vec<String> = description
            .split('\n')
            .map(|line| line.trim().to_string())
            .collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        self.description_lines = lines;
        self
    }

    /// 키-값 상세 항목 추가
    ///
    /// 이미 있는 키는 위치를 유지한 채 값만 교체합니다.
    pub fn add_detail<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        let value = value.into();
        match self.details.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.details.push((key, value)),
        }
        self
    }

    pub fn width(&self) -> usize {
        self.total_width
    }

    pub fn description_lines(&self) -> &[String] {
        &self.description_lines
    }

    pub fn details(&self) -> &[(String, String)] {
        &self.details
    }

    /// 헤더 문자열 생성
    pub fn render(&self) -> String {
        let border = self.border_line();
        let mut header = String::new();

        push_line(&mut header, &border);

        if !self.title.is_empty() {
            let centered = center_text(&self.title, self.content_width());
            push_line(&mut header, &self.comment_line(&centered));
            push_line(&mut header, &border);
        }

        for line in &self.description_lines {
            push_line(&mut header, &self.comment_line(line));
        }
        if !self.description_lines.is_empty() {
            push_line(&mut header, &border);
        }

        for (key, value) in &self.details {
            let detail = format!("{} : {}", key, value);
            push_line(&mut header, &self.comment_line(&detail));
        }

        push_line(&mut header, &border);
        header
    }

    fn content_width(&self) -> usize {
        self.total_width
            .saturating_sub(self.comment_start.chars().count())
            .saturating_sub(self.comment_end.chars().count())
    }

    fn border_line(&self) -> String {
        if self.border_char.is_empty() {
            return " ".repeat(self.total_width);
        }
        self.border_char.chars().cycle().take(self.total_width).collect()
    }

    fn comment_line(&self, content: &str) -> String {
        let width = self.content_width();
        let truncated: String = content.chars().take(width).collect();
        let padding = width - truncated.chars().count();

        let line = format!(
            "{}{}{}{}",
            self.comment_start,
            truncated,
            " ".repeat(padding),
            self.comment_end
        );
        // 주석 마커 자체가 폭보다 긴 경우
        line.chars().take(self.total_width).collect()
    }
}

/// `HeaderSpec::render`의 함수형 진입점
pub fn render_header(spec: &HeaderSpec) -> String {
    spec.render()
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn center_text(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}
