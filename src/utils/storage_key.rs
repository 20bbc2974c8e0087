use chrono::Utc;
use rand::Rng;

pub const DEFAULT_FOLDER: &str = "uploads";

/// Upper bound (exclusive) of the random component in generated names.
const RANDOM_BOUND: u32 = 1_000_000_000;

/// Text after the last `.` of `original_name`, case preserved. Empty when there is no dot.
pub fn file_extension(original_name: &str) -> &str {
    original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default()
}

/// `<unixMillis>-<random>.<extension>`
pub fn generate_file_name(timestamp_ms: i64, random: u32, extension: &str) -> String {
    format!("{}-{}.{}", timestamp_ms, random, extension)
}

/// Resolves the target folder; missing or empty folders fall back to `uploads`.
pub fn resolve_folder(folder: Option<&str>) -> &str {
    folder.filter(|f| !f.is_empty()).unwrap_or(DEFAULT_FOLDER)
}

/// Builds `<folder>/<unixMillis>-<random>.<extension>` for a new upload.
///
/// Two keys produced in the same millisecond for the same name collide only if
/// the random components match, so uniqueness is probabilistic, not guaranteed.
pub fn generate_storage_key(folder: Option<&str>, original_name: &str) -> String {
    let random = rand::thread_rng().gen_range(0..RANDOM_BOUND);
    let file_name = generate_file_name(
        Utc::now().timestamp_millis(),
        random,
        file_extension(original_name),
    );
    format!("{}/{}", resolve_folder(folder), file_name)
}
