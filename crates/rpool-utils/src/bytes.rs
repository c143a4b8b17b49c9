const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Formats a byte count with binary units and `precision` decimal places.
///
/// # Example
///
/// ```
/// use rpool_utils::bytes::format_bytes;
///
/// assert_eq!(format_bytes(1024 * 1024, 2), "1.00 MiB");
/// assert_eq!(format_bytes(512, 0), "512 B");
/// ```
pub fn format_bytes(bytes: u64, precision: usize) -> String {
    let mut value = bytes as f64;
    let mut idx = 0;

    while value >= 1024.0 && idx < UNITS.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }

    format!("{value:.precision$} {}", UNITS[idx])
}
