use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use fsxdrt_contract::{Association, AssociationLifecycle, FileSystemId};
use tracing::subscriber::DefaultGuard;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

pub(crate) fn fs_id() -> FileSystemId {
    FileSystemId::parse("fs-0123456789").expect("fs id")
}

pub(crate) fn association(
    id: &str,
    lifecycle: AssociationLifecycle,
    storage_path: &str,
    filesystem_path: &str,
) -> Association {
    Association {
        association_id: Some(id.to_string()),
        lifecycle,
        data_repository_path: Some(storage_path.to_string()),
        file_system_path: Some(filesystem_path.to_string()),
    }
}

/// Collects formatted log output for the current thread.
#[derive(Clone, Default)]
pub(crate) struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Installs a subscriber writing into this capture until the guard drops.
    pub(crate) fn install(&self) -> DefaultGuard {
        self.install_at(Level::DEBUG)
    }

    pub(crate) fn install_at(&self, level: Level) -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(level)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub(crate) fn contents(&self) -> String {
        let bytes = self
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
