use flate2::Compression;
use flate2::write::GzEncoder;

use crate::core::ChorusError;

/// Build an in-memory `.tar.gz` with one regular file per entry.
pub(crate) fn tar_gz(entries: &[(String, Vec<u8>)], mtime: u64) -> Result<Vec<u8>, ChorusError> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        builder
            .append_data(&mut header, name, data.as_slice())
            .map_err(|e| ChorusError::Archive(format!("failed to add '{name}': {e}")))?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| ChorusError::Archive(format!("failed to finish tar: {e}")))?;
    encoder
        .finish()
        .map_err(|e| ChorusError::Archive(format!("failed to finish gzip: {e}")))
}
