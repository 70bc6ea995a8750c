use sigcom_signals::{Task, Worker};
use std::sync::mpsc::{Sender, channel};
use std::thread::JoinHandle;

enum Message {
    Run(Task),
    Stop,
}

/// Best-effort tracing init so failing async tests show the dispatch trail.
#[allow(unused)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).try_init();
}

/// Single-threaded FIFO worker backed by a plain thread, so tests can verify
/// asynchronous dispatch deterministically: `flush` returns once every task
/// posted before it has run.
pub struct ThreadWorker {
    tx: Sender<Message>,
    handle: Option<JoinHandle<()>>,
}

#[allow(unused)]
impl ThreadWorker {
    pub fn new() -> Self {
        let (tx, rx) = channel::<Message>();
        let handle = std::thread::spawn(move || {
            while let Ok(Message::Run(task)) = rx.recv() {
                task();
            }
        });
        Self { tx, handle: Some(handle) }
    }

    /// Blocks until every previously posted task has executed.
    pub fn flush(&self) {
        let (done_tx, done_rx) = channel();
        let _ = self.tx.send(Message::Run(Box::new(move || {
            let _ = done_tx.send(());
        })));
        let _ = done_rx.recv();
    }
}

impl Worker for ThreadWorker {
    fn post(&self, task: Task) {
        let _ = self.tx.send(Message::Run(task));
    }
}

impl Drop for ThreadWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(Message::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
