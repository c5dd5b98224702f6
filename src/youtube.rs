/// Pulls the 11-character video id out of the common YouTube URL shapes:
/// `watch?v=`, `youtu.be/`, `/embed/` and `/v/`. Returns `None` when no
/// plausible id is present, mirroring how the shell gates embedding.
pub fn video_id(url: &str) -> Option<&str> {
    let candidate = url
        .split_once('?')
        .and_then(|(_, query)| query.split('&').find_map(|kv| kv.strip_prefix("v=")))
        .or_else(|| url.split_once("youtu.be/").map(|(_, rest)| rest))
        .or_else(|| url.split_once("/embed/").map(|(_, rest)| rest))
        .or_else(|| url.split_once("/v/").map(|(_, rest)| rest))?;

    let end = candidate
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '_')
        .unwrap_or(candidate.len());
    let id = &candidate[..end];
    (id.len() == 11).then_some(id)
}
