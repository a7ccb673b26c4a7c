// src/output.rs
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use tempfile::Builder;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result, Stage};
use crate::tickers::Ticker;

/// Write one ticker per line to `path`, replacing whatever is there.
///
/// Lines go to a temp file next to `path` which is renamed over it once
/// complete, so readers never see a half-written list. The result keeps
/// the permissions of the file it replaces; a new file gets the mode a
/// plain create would give it.
#[instrument(level = "info", skip(tickers), fields(path = %path.display(), count = tickers.len()))]
pub fn write_tickers(path: &Path, tickers: &[Ticker]) -> Result<()> {
    let io_err = |action: &'static str, source: std::io::Error| Error::Io {
        stage: Stage::Output,
        action,
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| io_err("creating directory for", e))?;
    }

    let mut builder = Builder::new();
    builder.prefix(".holdscrape");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // umask applies, as for File::create
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let tmp = builder
        .tempfile_in(dir)
        .map_err(|e| io_err("creating temp file for", e))?;
    debug!(tmp = %tmp.path().display(), "writing");
    {
        let mut w = BufWriter::new(tmp.as_file());
        for ticker in tickers {
            writeln!(w, "{}", ticker).map_err(|e| io_err("writing", e))?;
        }
        w.flush().map_err(|e| io_err("writing", e))?;
    }
    if let Ok(existing) = fs::metadata(path) {
        if existing.is_file() {
            fs::set_permissions(tmp.path(), existing.permissions())
                .map_err(|e| io_err("copying permissions of", e))?;
        }
    }
    tmp.persist(path)
        .map_err(|e| io_err("replacing", e.error))?;

    info!("ticker list written");
    Ok(())
}
