#![allow(dead_code)]

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc, Mutex,
    },
    thread,
};

use rosu_recalc::{
    batch::{
        AttributesStore, BatchScheduler, BatchSettings, BatchStatus, BoxError, ChartLibrary,
        ChartParser, ChartRef, ProgressSink,
    },
    model::{
        chart::{ParseError, ParsedChart},
        hit_object::{ChartObject, Pos},
    },
    OsuDifficultyAttributes,
};

/// Path of a chart that makes [`MemoryParser`] panic.
pub const PANICKING_CHART: &str = "panic.osu";

pub fn chart_path(i: usize) -> PathBuf {
    PathBuf::from(format!("{i}.osu"))
}

/// A 1/4 stream of `count` circles.
pub fn stream_chart(count: u32) -> ParsedChart {
    let objects = (0..count)
        .map(|i| {
            let x = if i % 2 == 0 { 100.0 } else { 200.0 };

            ChartObject::circle(Pos::new(x, 192.0), 500.0 + f64::from(i) * 120.0)
        })
        .collect();

    ParsedChart::new(8.0, 4.0, objects)
}

pub struct MemoryLibrary {
    charts: Vec<(ChartRef, bool)>,
}

impl MemoryLibrary {
    /// `total` charts of which the first `pending` need a recalculation.
    pub fn new(total: usize, pending: usize) -> Self {
        let charts = (0..total)
            .map(|i| (ChartRef::new(chart_path(i)), i < pending))
            .collect();

        Self { charts }
    }

    pub fn push(&mut self, path: impl Into<PathBuf>, needs_recalculation: bool) {
        self.charts
            .push((ChartRef::new(path), needs_recalculation));
    }
}

impl ChartLibrary for MemoryLibrary {
    fn list_items(&self) -> Vec<ChartRef> {
        self.charts.iter().map(|(chart, _)| chart.clone()).collect()
    }

    fn needs_recalculation(&self, chart: &ChartRef) -> bool {
        self.charts
            .iter()
            .any(|(c, needs_recalculation)| c == chart && *needs_recalculation)
    }
}

/// Parser serving charts from memory and remembering which threads asked.
#[derive(Default)]
pub struct MemoryParser {
    charts: HashMap<PathBuf, ParsedChart>,
    threads: Mutex<Vec<String>>,
}

impl MemoryParser {
    pub fn new(count: usize) -> Self {
        let charts = (0..count)
            .map(|i| (chart_path(i), stream_chart(32)))
            .collect();

        Self {
            charts,
            threads: Mutex::default(),
        }
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, chart: ParsedChart) {
        self.charts.insert(path.into(), chart);
    }

    /// Names of all threads that parsed a chart, deduplicated.
    pub fn thread_names(&self) -> Vec<String> {
        let mut names = self.threads.lock().unwrap().clone();
        names.sort_unstable();
        names.dedup();

        names
    }
}

impl ChartParser for MemoryParser {
    fn parse(&self, path: &Path) -> Result<ParsedChart, ParseError> {
        if let Some(name) = thread::current().name() {
            self.threads.lock().unwrap().push(name.to_owned());
        }

        if path == Path::new(PANICKING_CHART) {
            panic!("corrupted chart");
        }

        self.charts
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound).into())
    }
}

/// Parser that blocks on every chart until it is released.
pub struct GatedParser {
    inner: MemoryParser,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

pub struct Gate {
    /// Receives a message whenever the parser starts on a chart.
    pub entered: Receiver<()>,
    /// Each message lets one chart through.
    pub release: Sender<()>,
}

impl GatedParser {
    pub fn new(inner: MemoryParser) -> (Self, Gate) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();

        let parser = Self {
            inner,
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };

        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };

        (parser, gate)
    }
}

impl ChartParser for GatedParser {
    fn parse(&self, path: &Path) -> Result<ParsedChart, ParseError> {
        let _ = self.entered.lock().unwrap().send(());

        // A dropped gate opens it for good
        let _ = self.release.lock().unwrap().recv();

        self.inner.parse(path)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    updates: Mutex<Vec<(ChartRef, OsuDifficultyAttributes)>>,
    failing: Option<PathBuf>,
}

impl MemoryStore {
    pub fn failing_on(path: impl Into<PathBuf>) -> Self {
        Self {
            updates: Mutex::default(),
            failing: Some(path.into()),
        }
    }

    pub fn updates(&self) -> Vec<(ChartRef, OsuDifficultyAttributes)> {
        self.updates.lock().unwrap().clone()
    }
}

impl AttributesStore for MemoryStore {
    fn update(&self, chart: &ChartRef, attrs: &OsuDifficultyAttributes) -> Result<(), BoxError> {
        if self.failing.as_ref() == Some(&chart.path) {
            return Err("database is locked".into());
        }

        self.updates
            .lock()
            .unwrap()
            .push((chart.clone(), attrs.clone()));

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Started,
    Progress(u8, String),
    Finished(BatchStatus),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn percents(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Progress(percent, _) => Some(percent),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn on_started(&self) {
        self.events.lock().unwrap().push(Event::Started);
    }

    fn on_progress(&self, percent: u8, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Progress(percent, message.to_owned()));
    }

    fn on_finished(&self, status: BatchStatus) {
        self.events.lock().unwrap().push(Event::Finished(status));
    }
}

pub struct Setup<P> {
    pub scheduler: BatchScheduler,
    pub parser: Arc<P>,
    pub store: Arc<MemoryStore>,
    pub sink: Arc<RecordingSink>,
}

pub fn setup<P: ChartParser + 'static>(settings: BatchSettings, parser: P, store: MemoryStore) -> Setup<P> {
    let parser = Arc::new(parser);
    let store = Arc::new(store);
    let sink = Arc::new(RecordingSink::default());

    let scheduler = BatchScheduler::new(
        settings,
        Arc::clone(&parser) as Arc<dyn ChartParser>,
        Arc::clone(&store) as Arc<dyn AttributesStore>,
        Arc::clone(&sink) as Arc<dyn ProgressSink>,
    );

    Setup {
        scheduler,
        parser,
        store,
        sink,
    }
}
