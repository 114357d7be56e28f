use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Reports writes to a single record file.
pub struct RecordWatcher {
    watcher: RecommendedWatcher,
    raw_event_rx: mpsc::Receiver<notify::Event>,
    path: PathBuf,
}

impl RecordWatcher {
    pub fn new(path: &Path) -> Result<Self, notify::Error> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else { return };
                let _ = tx.send(event);
            },
            Config::default().with_poll_interval(WATCHER_POLL_INTERVAL),
        )?;
        // 监听父目录：原子写入是 rename，直接监听文件会丢事件
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(Self {
            watcher,
            raw_event_rx: rx,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the file was created or modified since the last drain.
    pub fn drain(&mut self) -> bool {
        let _watcher_guard = &self.watcher;
        let mut touched = false;
        while let Ok(event) = self.raw_event_rx.try_recv() {
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                continue;
            }
            if event.paths.iter().any(|p| same_file(p, &self.path)) {
                touched = true;
            }
        }
        touched
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    a.canonicalize().is_ok_and(|a| a == b)
}
