use super::play::PlayDocument;
use std::fs;
use std::path::Path;

/// Save a play document as JSON
pub fn save_play_json<P: AsRef<Path>>(doc: &PlayDocument, path: P) -> anyhow::Result<()> {
    let data = serde_json::to_string_pretty(doc)?;
    fs::write(&path, &data)?;
    log::debug!("Saved {} bytes to {:?}", data.len(), path.as_ref());
    Ok(())
}

/// Load a play document from JSON
pub fn load_play_json<P: AsRef<Path>>(path: P) -> anyhow::Result<PlayDocument> {
    let data = fs::read_to_string(&path)?;
    let doc = PlayDocument::from_json(&data)?;
    log::debug!("Loaded {} entities from {:?}", doc.len(), path.as_ref());
    Ok(doc)
}
