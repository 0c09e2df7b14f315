const GCS_SCHEME: &str = "gs://";
const MIN_BUCKET_NAME_LENGTH: usize = 3;
const MAX_BUCKET_NAME_LENGTH: usize = 222;

const ERROR_MESSAGE_INVALID_BUCKET_NAME: &str =
    "Bucket name must be 3-222 characters of lowercase letters, digits, '-', '_' and '.', and must start and end with a letter or digit.";

/// Accept `my-bucket` or `gs://my-bucket` (with an optional trailing slash)
/// and return the bare bucket name.
pub fn check_bucket_name(s: &str) -> Result<String, String> {
    let name = s.strip_prefix(GCS_SCHEME).unwrap_or(s);
    let name = name.strip_suffix('/').unwrap_or(name);

    if !(MIN_BUCKET_NAME_LENGTH..=MAX_BUCKET_NAME_LENGTH).contains(&name.len()) {
        return Err(ERROR_MESSAGE_INVALID_BUCKET_NAME.to_string());
    }

    let valid_char = |c: char| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' || c == '.'
    };
    let alphanumeric = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();

    let first = name.chars().next().unwrap_or('-');
    let last = name.chars().last().unwrap_or('-');
    if !name.chars().all(valid_char) || !alphanumeric(first) || !alphanumeric(last) {
        return Err(ERROR_MESSAGE_INVALID_BUCKET_NAME.to_string());
    }

    Ok(name.to_string())
}
