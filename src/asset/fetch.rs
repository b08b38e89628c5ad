use std::io::Read;

use super::AssetSource;
use crate::error::VitrineError;

const CHUNK_SIZE: usize = 64 * 1024;
/// Upper bound on the up-front reservation taken from an announced size.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Bytes received so far and, when the source announced it, the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Bytes received.
    pub loaded: u64,
    /// Announced total size, if any.
    pub total: Option<u64>,
}

/// Read a source to completion, reporting progress after every chunk.
///
/// # Errors
///
/// [`VitrineError::Io`] for local files, [`VitrineError::Fetch`] for HTTP
/// failures (including non-2xx status codes).
pub fn fetch(
    source: &AssetSource,
    mut on_progress: impl FnMut(Progress),
) -> Result<Vec<u8>, VitrineError> {
    match source {
        AssetSource::Bytes { data, .. } => {
            let len = data.len() as u64;
            on_progress(Progress {
                loaded: len,
                total: Some(len),
            });
            Ok(data.to_vec())
        }
        AssetSource::Path(path) => {
            let file = std::fs::File::open(path)?;
            let total = file.metadata().ok().map(|m| m.len());
            read_chunks(file, total, on_progress)
        }
        AssetSource::Url(url) => fetch_url(url, on_progress),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn fetch_url(
    url: &str,
    on_progress: impl FnMut(Progress),
) -> Result<Vec<u8>, VitrineError> {
    log::debug!("GET {url}");
    let mut response = ureq::get(url)
        .call()
        .map_err(|e| VitrineError::Fetch(format!("{url}: {e}")))?;
    let total = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let reader = response.body_mut().as_reader();
    read_chunks(reader, total, on_progress)
        .map_err(|e| VitrineError::Fetch(format!("{url}: {e}")))
}

#[cfg(target_arch = "wasm32")]
fn fetch_url(
    url: &str,
    _on_progress: impl FnMut(Progress),
) -> Result<Vec<u8>, VitrineError> {
    Err(VitrineError::Fetch(format!(
        "{url}: blocking fetch is unavailable in the browser"
    )))
}

/// Drain `reader` in fixed-size chunks, reporting progress after each.
///
/// # Errors
///
/// Propagates read errors (interrupted reads are retried).
pub fn read_chunks(
    mut reader: impl Read,
    total: Option<u64>,
    mut on_progress: impl FnMut(Progress),
) -> Result<Vec<u8>, VitrineError> {
    let capacity = total
        .and_then(|t| usize::try_from(t.min(MAX_PREALLOC)).ok())
        .unwrap_or(CHUNK_SIZE);
    let mut out = Vec::with_capacity(capacity);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        out.extend_from_slice(&chunk[..n]);
        on_progress(Progress {
            loaded: out.len() as u64,
            total,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn chunks_report_monotonic_progress() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 10];
        let mut seen = Vec::new();
        let out = read_chunks(Cursor::new(&data), None, |p| seen.push(p)).unwrap();
        assert_eq!(out, data);
        assert!(seen.len() >= 3);
        assert!(seen.windows(2).all(|w| w[0].loaded < w[1].loaded));
        assert_eq!(seen.last().unwrap().loaded, data.len() as u64);
        assert!(seen.iter().all(|p| p.total.is_none()));
    }

    #[test]
    fn oversized_announced_total_does_not_reserve_it() {
        let mut last = None;
        let out = read_chunks(Cursor::new(vec![1u8, 2, 3, 4]), Some(1u64 << 46), |p| {
            last = Some(p);
        })
        .unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
        assert!(out.capacity() as u64 <= MAX_PREALLOC);
        assert_eq!(
            last,
            Some(Progress {
                loaded: 4,
                total: Some(1u64 << 46)
            })
        );
    }

    #[test]
    fn file_fetch_knows_its_total() {
        let path = std::env::temp_dir()
            .join(format!("vitrine-fetch-{}.bin", std::process::id()));
        std::fs::write(&path, b"glTF-ish").unwrap();
        let mut last = None;
        let bytes =
            fetch(&AssetSource::Path(path.clone()), |p| last = Some(p)).unwrap();
        assert_eq!(bytes, b"glTF-ish");
        assert_eq!(
            last,
            Some(Progress {
                loaded: 8,
                total: Some(8)
            })
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let src = AssetSource::Path("/definitely/not/here.glb".into());
        assert!(matches!(fetch(&src, |_| {}), Err(VitrineError::Io(_))));
    }

    #[test]
    fn in_memory_bytes_complete_at_once() {
        let src = AssetSource::from_bytes("blob", vec![1u8; 5]);
        let mut events = 0;
        let out = fetch(&src, |_| events += 1).unwrap();
        assert_eq!(out.len(), 5);
        assert_eq!(events, 1);
    }
}
