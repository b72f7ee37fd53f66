//! 로그 파일 순환 및 보관 관리
//!
//! 순환된 파일은 활성 파일 옆에 `<prefix><타임스탬프>[-n].log.gz` 이름으로
//! gzip 압축되어 보관되고, `max_backups` 개를 넘는 오래된 보관 파일은 삭제됩니다.

use chrono::{Local, NaiveDateTime};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 보관 파일 타임스탬프 형식
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
/// 보관 파일 확장자
pub const ARCHIVE_SUFFIX: &str = ".log.gz";

const TIMESTAMP_LEN: usize = "2000-01-01_00-00-00".len();

/// 순환 전략 (보관 파일 이름 규칙 + 보관 개수 제한)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverStrategy {
    /// 보관 파일 디렉토리
    directory: PathBuf,
    /// 보관 파일 이름 접두사
    prefix: String,
    /// 최대 보관 파일 수
    max_backups: u32,
}

impl RolloverStrategy {
    pub fn new<P, S>(directory: P, prefix: S, max_backups: u32) -> Self
    where
        P: AsRef<Path>,
        S: Into<String>,
    {
        Self {
            directory: directory.as_ref().to_path_buf(),
            prefix: prefix.into(),
            max_backups,
        }
    }

    pub fn max_backups(&self) -> u32 {
        self.max_backups
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// 현재 시각 기준으로 다음 보관 파일 경로 생성
    ///
    /// 같은 초에 여러 번 순환하면 `-1`, `-2` 순번이 붙습니다. 순번은 해당 초의
    /// 가장 큰 순번 다음 값이며, 삭제로 비어 있는 순번은 다시 쓰지 않습니다.
    pub fn next_archive_path(&self) -> io::Result<PathBuf> {
        self.next_archive_path_at(Local::now().naive_local())
    }

    fn next_archive_path_at(&self, now: NaiveDateTime) -> io::Result<PathBuf> {
        let timestamp = now.format(ARCHIVE_TIMESTAMP_FORMAT).to_string();
        let current = NaiveDateTime::parse_from_str(&timestamp, ARCHIVE_TIMESTAMP_FORMAT).ok();

        let mut index = self
            .sorted_archives()?
            .into_iter()
            .filter(|((archived_at, _), _)| Some(*archived_at) == current)
            .map(|((_, index), _)| index + 1)
            .max()
            .unwrap_or(0);

        loop {
            let candidate = self.directory.join(archive_file_name(&self.prefix, &timestamp, index));
            if !candidate.exists() {
                return Ok(candidate);
            }
            index += 1;
        }
    }

    /// 활성 파일을 보관 파일로 이동
    ///
    /// 보관 개수가 0이면 보관 없이 파일을 버립니다. 파일이 없으면 아무것도 하지 않습니다.
    pub fn archive(&self, active: &Path) -> io::Result<Option<PathBuf>> {
        self.archive_at(active, Local::now().naive_local())
    }

    fn archive_at(&self, active: &Path, now: NaiveDateTime) -> io::Result<Option<PathBuf>> {
        if !active.exists() {
            return Ok(None);
        }

        if self.max_backups == 0 {
            fs::remove_file(active)?;
            debug!(path = %active.display(), "보관 개수 0: 이전 로그 파일 폐기");
            return Ok(None);
        }

        let target = self.next_archive_path_at(now)?;
        compress_into(active, &target)?;
        fs::remove_file(active)?;

        debug!(
            old_path = %active.display(),
            archive = %target.display(),
            "로그 파일 순환 완료"
        );

        self.purge()?;
        Ok(Some(target))
    }

    /// 이 전략에 속한 보관 파일 목록 (오래된 순)
    pub fn archives(&self) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .sorted_archives()?
            .into_iter()
            .map(|(_, path)| path)
            .collect())
    }

    fn sorted_archives(&self) -> io::Result<Vec<((NaiveDateTime, u32), PathBuf)>> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }

        let mut archives = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let key = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| self.sort_key(name));
            if let Some(key) = key {
                archives.push((key, path));
            }
        }

        archives.sort();
        Ok(archives)
    }

    /// 보관 개수를 넘는 오래된 보관 파일 삭제
    ///
    /// 삭제된 파일 수를 반환합니다. 개별 삭제 실패는 경고만 남기고 건너뜁니다.
    pub fn purge(&self) -> io::Result<usize> {
        let archives = self.archives()?;
        let keep = self.max_backups as usize;
        if archives.len() <= keep {
            return Ok(0);
        }

        let mut deleted_count = 0;
        for path in &archives[..archives.len() - keep] {
            match fs::remove_file(path) {
                Ok(_) => {
                    deleted_count += 1;
                    debug!(path = %path.display(), "오래된 보관 파일 삭제됨");
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "보관 파일 삭제 실패"
                    );
                }
            }
        }

        Ok(deleted_count)
    }

    // `<prefix><timestamp>[-n].log.gz` 형식일 때만 정렬 키를 돌려줍니다.
    fn sort_key(&self, file_name: &str) -> Option<(NaiveDateTime, u32)> {
        let middle = file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(ARCHIVE_SUFFIX)?;
        if middle.len() < TIMESTAMP_LEN || !middle.is_char_boundary(TIMESTAMP_LEN) {
            return None;
        }

        let (timestamp, rest) = middle.split_at(TIMESTAMP_LEN);
        let timestamp = NaiveDateTime::parse_from_str(timestamp, ARCHIVE_TIMESTAMP_FORMAT).ok()?;
        let index = if rest.is_empty() {
            0
        } else {
            rest.strip_prefix('-')?.parse().ok()?
        };
        Some((timestamp, index))
    }
}

fn archive_file_name(prefix: &str, timestamp: &str, index: u32) -> String {
    if index == 0 {
        format!("{}{}{}", prefix, timestamp, ARCHIVE_SUFFIX)
    } else {
        format!("{}{}-{}{}", prefix, timestamp, index, ARCHIVE_SUFFIX)
    }
}

fn compress_into(source: &Path, target: &Path) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(source)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(target)?), Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).expect("Test assertion failed");
        path
    }

    #[test]
    fn test_archive_compresses_and_removes_active() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let active = temp_dir.path().join("Core.log");
        fs::write(&active, "previous run\n").expect("Test assertion failed");

        let strategy = RolloverStrategy::new(temp_dir.path(), "Core-backup-", 3);
        let archive = strategy
            .archive(&active)
            .expect("Test assertion failed")
            .expect("Test assertion failed");

        assert!(!active.exists());
        let name = archive.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Core-backup-"));
        assert!(name.ends_with(".log.gz"));

        let mut content = String::new();
        GzDecoder::new(File::open(&archive).unwrap())
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "previous run\n");
    }

    #[test]
    fn test_archive_missing_file_is_noop() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let strategy = RolloverStrategy::new(temp_dir.path(), "Core-backup-", 3);
        let result = strategy
            .archive(&temp_dir.path().join("missing.log"))
            .expect("Test assertion failed");
        assert!(result.is_none());
    }

    #[test]
    fn test_zero_backups_discards_file() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let active = touch(temp_dir.path(), "Core.log");

        let strategy = RolloverStrategy::new(temp_dir.path(), "Core-backup-", 0);
        assert!(strategy.archive(&active).unwrap().is_none());
        assert!(!active.exists());
        assert!(strategy.archives().unwrap().is_empty());
    }

    fn fixed_now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-03-01_12-00-00", ARCHIVE_TIMESTAMP_FORMAT)
            .expect("Test assertion failed")
    }

    fn archive_run(strategy: &RolloverStrategy, dir: &Path, run: usize) -> PathBuf {
        let active = dir.join("Core.log");
        fs::write(&active, format!("run {}\n", run)).expect("Test assertion failed");
        strategy
            .archive_at(&active, fixed_now())
            .expect("Test assertion failed")
            .expect("Test assertion failed")
    }

    fn gunzip(path: &Path) -> String {
        let mut content = String::new();
        GzDecoder::new(File::open(path).expect("Test assertion failed"))
            .read_to_string(&mut content)
            .expect("Test assertion failed");
        content
    }

    #[test]
    fn test_same_second_archives_get_index() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let strategy = RolloverStrategy::new(temp_dir.path(), "Core-backup-", 10);

        let created: Vec<PathBuf> = (0..3)
            .map(|run| archive_run(&strategy, temp_dir.path(), run))
            .collect();

        let names: Vec<String> = created
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "Core-backup-2024-03-01_12-00-00.log.gz",
                "Core-backup-2024-03-01_12-00-00-1.log.gz",
                "Core-backup-2024-03-01_12-00-00-2.log.gz",
            ]
        );
        assert_eq!(strategy.archives().unwrap(), created);
    }

    #[test]
    fn test_same_second_retention_keeps_latest_run() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let strategy = RolloverStrategy::new(temp_dir.path(), "Core-backup-", 1);

        for run in 0..3 {
            archive_run(&strategy, temp_dir.path(), run);
            let archives = strategy.archives().unwrap();
            assert_eq!(archives.len(), 1);
            assert_eq!(gunzip(&archives[0]), format!("run {}\n", run));
        }
    }

    #[test]
    fn test_same_second_retention_with_small_cap() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let strategy = RolloverStrategy::new(temp_dir.path(), "Core-backup-", 2);

        for run in 0..5 {
            archive_run(&strategy, temp_dir.path(), run);
        }

        let contents: Vec<String> = strategy.archives().unwrap().iter().map(|p| gunzip(p)).collect();
        assert_eq!(contents, ["run 3\n", "run 4\n"]);
    }

    #[test]
    fn test_index_never_fills_a_gap() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let dir = temp_dir.path();
        // 순번 0은 이미 삭제되고 -2만 남은 상태
        touch(dir, "Core-backup-2024-03-01_12-00-00-2.log.gz");

        let strategy = RolloverStrategy::new(dir, "Core-backup-", 5);
        let next = strategy.next_archive_path_at(fixed_now()).unwrap();
        assert_eq!(next, dir.join("Core-backup-2024-03-01_12-00-00-3.log.gz"));

        // 다른 초에는 순번 없이 시작
        let later = NaiveDateTime::parse_from_str("2024-03-01_12-00-01", ARCHIVE_TIMESTAMP_FORMAT)
            .expect("Test assertion failed");
        let next = strategy.next_archive_path_at(later).unwrap();
        assert_eq!(next, dir.join("Core-backup-2024-03-01_12-00-01.log.gz"));
    }

    #[test]
    fn test_purge_keeps_newest() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let dir = temp_dir.path();
        touch(dir, "Core-backup-2024-01-01_00-00-00.log.gz");
        touch(dir, "Core-backup-2024-01-02_00-00-00.log.gz");
        touch(dir, "Core-backup-2024-01-02_00-00-00-1.log.gz");
        touch(dir, "Core-backup-2024-01-03_00-00-00.log.gz");
        // 다른 로거/형식의 파일은 건드리지 않음
        touch(dir, "Other-backup-2024-01-01_00-00-00.log.gz");
        touch(dir, "Core.log");

        let strategy = RolloverStrategy::new(dir, "Core-backup-", 2);
        assert_eq!(strategy.purge().unwrap(), 2);

        let names: Vec<String> = strategy
            .archives()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "Core-backup-2024-01-02_00-00-00-1.log.gz",
                "Core-backup-2024-01-03_00-00-00.log.gz",
            ]
        );
        assert!(dir.join("Other-backup-2024-01-01_00-00-00.log.gz").exists());
        assert!(dir.join("Core.log").exists());
    }

    #[test]
    fn test_shared_prefix_ignores_active_file() {
        let temp_dir = TempDir::new().expect("Test assertion failed");
        let dir = temp_dir.path();
        touch(dir, "latest.log");
        touch(dir, "2024-05-01_10-00-00.log.gz");
        touch(dir, "notes.log.gz");

        let strategy = RolloverStrategy::new(dir, "", 5);
        let archives = strategy.archives().unwrap();
        assert_eq!(archives, vec![dir.join("2024-05-01_10-00-00.log.gz")]);
    }
}
