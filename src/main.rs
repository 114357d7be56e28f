//! zlive：记录字段的实时编辑器（无界面驱动）
//!
//! Lines read from stdin are typed into the widget. `:q` quits, `:bs` deletes
//! backwards, `:reload` re-reads the record. Saves are debounced; external
//! changes to the record file are picked up automatically.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use zlive::app::{FieldEditor, FieldEditorDeps};
use zlive::kernel::services::adapters::{
    ensure_settings_file, load_settings, AsyncRuntime, ConfigService, FsResourceLoader,
    JsonFileRecordStore, LibraryRegistry, RecordWatcher, StaticResourceLoader,
};
use zlive::kernel::services::ports::{
    AllowAll, FieldRef, LibraryManifest, LibrarySource, ResourceLoader, Settings,
};
use zlive::kernel::{Anchor, LanguageId, LoadRequest, Marker, Scheduler, Size, WidgetInput};
use zlive::widgets::rope::{
    RopeLibraryInstaller, BUILTIN_SCRIPT, BUILTIN_SCRIPT_PATH, BUILTIN_STYLE, BUILTIN_STYLE_PATH,
};

mod logging;

const TICK: Duration = Duration::from_millis(16);

struct Args {
    records: PathBuf,
    record_id: String,
    field: String,
    language: LanguageId,
}

fn parse_args() -> Option<Args> {
    let mut positional = Vec::new();
    let mut language = LanguageId::Json;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--language" {
            language = LanguageId::from_id(&args.next()?);
        } else {
            positional.push(arg);
        }
    }
    let [records, record_id, field]: [String; 3] = positional.try_into().ok()?;
    Some(Args {
        records: PathBuf::from(records),
        record_id,
        field,
        language,
    })
}

fn library_source(settings: &Settings) -> LibrarySource {
    let library = &settings.library;
    match (&library.style, library.is_configured()) {
        (Some(style), true) => {
            let root = library.root.clone().unwrap_or_else(|| ".".to_string());
            LibrarySource {
                loader: Arc::new(FsResourceLoader::new(root)) as Arc<dyn ResourceLoader>,
                manifest: LibraryManifest::new(style.clone(), library.scripts.clone()),
                installer: RopeLibraryInstaller::factory(),
            }
        }
        _ => LibrarySource {
            loader: Arc::new(
                StaticResourceLoader::new()
                    .with_resource(BUILTIN_STYLE_PATH, BUILTIN_STYLE)
                    .with_resource(BUILTIN_SCRIPT_PATH, BUILTIN_SCRIPT),
            ),
            manifest: LibraryManifest::new(BUILTIN_STYLE_PATH, [BUILTIN_SCRIPT_PATH]),
            installer: RopeLibraryInstaller::factory(),
        },
    }
}

fn print_markers(out: &mut impl Write, markers: &[Marker]) -> io::Result<()> {
    if markers.is_empty() {
        writeln!(out, "[ok] no syntax errors")?;
    }
    for marker in markers {
        writeln!(
            out,
            "[error] {}:{} {}",
            marker.start_line, marker.start_column, marker.message
        )?;
    }
    out.flush()
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn main() -> io::Result<()> {
    let _logging = logging::init();

    let Some(args) = parse_args() else {
        eprintln!("usage: zlive <records.json> <record-id> <field> [--language <id>]");
        std::process::exit(2);
    };

    if let Err(e) = ensure_settings_file() {
        tracing::warn!(error = %e, "settings file unavailable");
    }
    let settings = load_settings().unwrap_or_default();
    let config = ConfigService::from_settings(&settings);
    let runtime = AsyncRuntime::new()?;

    let store = Rc::new(JsonFileRecordStore::new(&args.records));
    let field = FieldRef::new(args.record_id.as_str(), args.field.as_str());
    let deps = FieldEditorDeps {
        store: store.clone(),
        permissions: Rc::new(AllowAll),
        scheduler: Rc::new(Scheduler::system()),
        registry: LibraryRegistry::global(),
        load_request: Some(LoadRequest {
            source: library_source(&settings),
            runtime: runtime.tokio_handle(),
        }),
        config: config.editor().clone(),
    };
    let anchor = Anchor::new("main", Size::new(80, 24));
    let mut editor = FieldEditor::open(field, args.language, anchor, deps)
        .map_err(|e| io::Error::other(e.to_string()))?;

    let mut watcher = match RecordWatcher::new(&args.records) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "record watcher unavailable");
            None
        }
    };

    let input = spawn_stdin_reader();
    let mut stdout = io::stdout();
    let mut shown_errors: Option<Vec<Marker>> = None;
    let mut announced = false;

    loop {
        editor.tick();

        if editor.is_loaded() && !announced {
            announced = true;
            writeln!(stdout, "editing {} ({})", editor.field(), args.language)?;
            writeln!(stdout, "{}", editor.value())?;
        }
        if let Some(err) = editor.sync().load_error() {
            eprintln!("widget library failed to load: {}", err);
            break;
        }

        if watcher.as_mut().is_some_and(RecordWatcher::drain) && store.is_external_change() {
            match editor.refresh() {
                Ok(()) => writeln!(stdout, "[reload] {}", editor.value())?,
                Err(e) => tracing::warn!(error = %e, "refresh failed"),
            }
        }

        match input.recv_timeout(TICK) {
            Ok(line) => match line.as_str() {
                ":q" => break,
                ":bs" => editor.handle_input(&WidgetInput::DeleteBackward),
                ":reload" => {
                    if let Err(e) = editor.refresh() {
                        writeln!(stdout, "[reload failed] {}", e)?;
                    }
                }
                text => editor.handle_input(&WidgetInput::InsertText(text.to_string())),
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if let Some(err) = editor.take_save_error() {
            writeln!(stdout, "[save failed] {}", err)?;
        }
        if shown_errors.as_deref() != Some(editor.errors()) && editor.is_loaded() {
            print_markers(&mut stdout, editor.errors())?;
            shown_errors = Some(editor.errors().to_vec());
        }
    }

    // 退出前让挂起的保存落盘
    if editor.is_loaded() {
        std::thread::sleep(config.editor().save_debounce());
        editor.tick();
    }
    editor.close();
    Ok(())
}
