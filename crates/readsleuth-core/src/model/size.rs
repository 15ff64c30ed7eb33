/// Display formatting for byte counts, speeds, and wait times.
///
/// All internal sizes are `u64` bytes and speeds are `f64` MB/s. Floating
/// point is only used at the display-formatting boundary.

/// Format a byte count into a human-readable string with appropriate unit.
///
/// Uses binary units (KiB = 1024) but labels them with common short forms
/// (KB, MB, GB, TB) because that is what operators expect in a storage tool.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    const TB: f64 = GB * 1024.0;

    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MB)
    } else if b < TB {
        format!("{:.2} GB", b / GB)
    } else {
        format!("{:.2} TB", b / TB)
    }
}

/// Format a throughput figure with one decimal, e.g. `42.5 MB/s`.
pub fn format_speed(mb_per_sec: f64) -> String {
    format!("{mb_per_sec:.1} MB/s")
}

/// Format a throttle wait with millisecond precision, e.g. `0.004 s`.
pub fn format_wait(seconds: f64) -> String {
    format!("{seconds:.3} s")
}
